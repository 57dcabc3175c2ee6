//! core::state::view
//!
//! Borrowed views of nested levels.
//!
//! A view aliases its parent's storage. The borrow checker ties the view to
//! the parent, so a view cannot outlive a structural change to the level it
//! came from.

use super::{Mapping, Tree, TreeMut};

/// The result of indexing a level.
#[derive(Debug)]
pub enum Item<'a, L> {
    /// The current value of a cell.
    Leaf(&'a L),
    /// A read-only view of a nested level.
    State(StateRef<'a, L>),
}

impl<'a, L> Item<'a, L> {
    /// The leaf value, if this item is a leaf.
    pub fn leaf(&self) -> Option<&'a L> {
        match self {
            Item::Leaf(value) => Some(*value),
            Item::State(_) => None,
        }
    }

    /// The nested view, if this item is a container.
    pub fn into_state(self) -> Option<StateRef<'a, L>> {
        match self {
            Item::Leaf(_) => None,
            Item::State(view) => Some(view),
        }
    }
}

/// The result of indexing a level for mutation.
#[derive(Debug)]
pub enum ItemMut<'a, L> {
    /// The value of a cell, mutable in place.
    Leaf(&'a mut L),
    /// A mutable view of a nested level.
    State(StateMut<'a, L>),
}

impl<'a, L> ItemMut<'a, L> {
    /// The leaf value, if this item is a leaf.
    pub fn into_leaf(self) -> Option<&'a mut L> {
        match self {
            ItemMut::Leaf(value) => Some(value),
            ItemMut::State(_) => None,
        }
    }

    /// The nested view, if this item is a container.
    pub fn into_state(self) -> Option<StateMut<'a, L>> {
        match self {
            ItemMut::Leaf(_) => None,
            ItemMut::State(view) => Some(view),
        }
    }
}

/// A read-only view of a nested level.
#[derive(Debug)]
pub struct StateRef<'a, L> {
    mapping: &'a Mapping<L>,
}

impl<'a, L> StateRef<'a, L> {
    pub(crate) fn new(mapping: &'a Mapping<L>) -> Self {
        Self { mapping }
    }
}

impl<L> Clone for StateRef<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for StateRef<'_, L> {}

impl<L> Tree<L> for StateRef<'_, L> {
    fn mapping(&self) -> &Mapping<L> {
        self.mapping
    }
}

/// A mutable view of a nested level.
#[derive(Debug)]
pub struct StateMut<'a, L> {
    mapping: &'a mut Mapping<L>,
}

impl<'a, L> StateMut<'a, L> {
    pub(crate) fn new(mapping: &'a mut Mapping<L>) -> Self {
        Self { mapping }
    }
}

impl<L> Tree<L> for StateMut<'_, L> {
    fn mapping(&self) -> &Mapping<L> {
        self.mapping
    }
}

impl<L> TreeMut<L> for StateMut<'_, L> {
    fn mapping_mut(&mut self) -> &mut Mapping<L> {
        self.mapping
    }
}

#[cfg(test)]
mod tests {
    use crate::core::cell::Cell;
    use crate::core::state::{Node, State, Tree, TreeMut, Update};

    fn nested() -> State<i64> {
        let inner = State::from_entries([
            ("a", Node::from(Cell::param(1))),
            ("b", Node::from(Cell::param(2))),
        ])
        .unwrap();
        State::from_entries([("inner", Node::from(inner))]).unwrap()
    }

    #[test]
    fn leaf_item_accessors() {
        let state = nested();
        let inner = state.get("inner").unwrap().into_state().unwrap();
        assert_eq!(inner.get("a").unwrap().leaf(), Some(&1));
        assert!(inner.get("a").unwrap().into_state().is_none());
    }

    #[test]
    fn leaf_mutated_in_place() {
        let mut state = nested();
        {
            let mut inner = state.get_mut("inner").unwrap().into_state().unwrap();
            *inner.get_mut("b").unwrap().into_leaf().unwrap() += 40;
        }
        let inner = state.get("inner").unwrap().into_state().unwrap();
        assert_eq!(inner.get("b").unwrap().leaf(), Some(&42));
    }

    #[test]
    fn delete_through_view() {
        let mut state = nested();
        {
            let mut inner = state.get_mut("inner").unwrap().into_state().unwrap();
            inner.delete("a").unwrap();
        }
        let inner = state.get("inner").unwrap().into_state().unwrap();
        assert_eq!(inner.len(), 1);
    }

    #[test]
    fn nested_container_assignment_through_view() {
        let mut state = nested();
        {
            let mut inner = state.get_mut("inner").unwrap().into_state().unwrap();
            inner.set("deeper", Update::State(State::new())).unwrap();
        }
        let inner = state.get("inner").unwrap().into_state().unwrap();
        assert!(inner.get("deeper").unwrap().into_state().unwrap().is_empty());
    }

    #[test]
    fn view_to_state_copies() {
        let state = nested();
        let copy = state.get("inner").unwrap().into_state().unwrap().to_state();
        assert_eq!(copy.len(), 2);
        assert_eq!(copy.flat_state().len(), 2);
    }
}

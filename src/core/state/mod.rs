//! core::state
//!
//! The hierarchical, path-addressed state container.
//!
//! # Structure
//!
//! A [`State`] is an insertion-ordered mapping from [`Key`] to [`Node`],
//! where each node is either a [`Cell`] (a leaf) or a nested mapping.
//! The structure is a strict tree: nodes are owned by exactly one parent.
//!
//! # Access
//!
//! Read access is provided by the [`Tree`] trait and write access by
//! [`TreeMut`]. Both are implemented for the owned [`State`] and for the
//! borrowed views ([`StateRef`], [`StateMut`]) returned when indexing a
//! nested container, so a nested level is read and mutated exactly like the
//! root. Mutations through a view land in the parent's storage.
//!
//! # Assignment Rules
//!
//! - Assigning a container replaces the slot wholesale.
//! - Assigning a leaf value requires the slot to already hold a cell; the
//!   cell's value is replaced in place and its kind is kept.
//!
//! # Example
//!
//! ```
//! use treestate::core::cell::Cell;
//! use treestate::core::state::{Item, Node, State, Tree, TreeMut, Update};
//! use treestate::core::types::Kind;
//!
//! let mut state = State::from_entries([
//!     ("w", Node::from(Cell::param(1.0))),
//!     ("count", Node::from(Cell::new(0.0, Kind::COUNTER))),
//! ])
//! .unwrap();
//!
//! state.set("w", Update::Leaf(2.0)).unwrap();
//! assert!(matches!(state.get("w").unwrap(), Item::Leaf(v) if *v == 2.0));
//! assert!(state.set("missing", Update::Leaf(1.0)).is_err());
//! ```

mod variables;
mod view;

pub use variables::{Variables, VariablesIter, VariablesMut};
pub use view::{Item, ItemMut, StateMut, StateRef};

use indexmap::map::{Iter, Keys};
use indexmap::IndexMap;
use serde::Serialize;

use super::cell::Cell;
use super::error::StateError;
use super::flat::{self, FlatState};
use super::types::Key;

/// One level of a state tree.
pub type Mapping<L> = IndexMap<Key, Node<L>>;

/// A slot in a state tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node<L> {
    /// A leaf.
    Cell(Cell<L>),
    /// A nested level.
    State(Mapping<L>),
}

impl<L> Node<L> {
    /// Whether this slot holds a leaf.
    pub fn is_cell(&self) -> bool {
        matches!(self, Node::Cell(_))
    }

    /// The cell in this slot, if it is a leaf.
    pub fn as_cell(&self) -> Option<&Cell<L>> {
        match self {
            Node::Cell(cell) => Some(cell),
            Node::State(_) => None,
        }
    }

    /// The nested level in this slot, if it is not a leaf.
    pub fn as_mapping(&self) -> Option<&Mapping<L>> {
        match self {
            Node::Cell(_) => None,
            Node::State(mapping) => Some(mapping),
        }
    }
}

impl<L> From<Cell<L>> for Node<L> {
    fn from(cell: Cell<L>) -> Self {
        Node::Cell(cell)
    }
}

impl<L> From<State<L>> for Node<L> {
    fn from(state: State<L>) -> Self {
        Node::State(state.mapping)
    }
}

/// The right-hand side of [`TreeMut::set`].
#[derive(Debug, Clone, PartialEq)]
pub enum Update<L> {
    /// Replace the value of an existing cell.
    Leaf(L),
    /// Replace the slot with a nested container.
    State(State<L>),
}

impl<L> From<State<L>> for Update<L> {
    fn from(state: State<L>) -> Self {
        Update::State(state)
    }
}

/// An owned state tree.
///
/// Equality is structural: the same keys at every level, with equal kinds
/// and values at every leaf. Key order does not take part in equality.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct State<L> {
    mapping: Mapping<L>,
}

impl<L> Default for State<L> {
    fn default() -> Self {
        Self {
            mapping: Mapping::new(),
        }
    }
}

impl<L> State<L> {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-built mapping.
    pub fn from_mapping(mapping: Mapping<L>) -> Self {
        Self { mapping }
    }

    /// Build one level from `(key, node)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidKey` if a key fails validation.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, StateError>
    where
        I: IntoIterator<Item = (&'a str, Node<L>)>,
    {
        let mut mapping = Mapping::new();
        for (key, node) in entries {
            mapping.insert(Key::new(key)?, node);
        }
        Ok(Self { mapping })
    }

    /// Insert a node directly, bypassing the leaf-assignment rule.
    ///
    /// This is the construction path used while building a tree; it will
    /// happily replace a subtree with a leaf or vice versa.
    pub fn insert(&mut self, key: Key, node: impl Into<Node<L>>) -> Option<Node<L>> {
        self.mapping.insert(key, node.into())
    }

    /// The underlying mapping.
    pub fn raw_mapping(&self) -> &Mapping<L> {
        &self.mapping
    }

    /// Consume the state, returning the underlying mapping.
    pub fn into_mapping(self) -> Mapping<L> {
        self.mapping
    }

    /// Consume the state, producing its flat representation.
    pub fn into_flat_state(self) -> FlatState<L> {
        flat::flatten_owned(self.mapping)
    }

    /// Rebuild a state from its flat representation.
    ///
    /// # Errors
    ///
    /// Returns `StateError::PathConflict` if a path is both a leaf and the
    /// prefix of another path.
    pub fn from_flat_state(flat_state: FlatState<L>) -> Result<Self, StateError> {
        flat::unflatten(flat_state)
    }
}

impl<L> From<Mapping<L>> for State<L> {
    fn from(mapping: Mapping<L>) -> Self {
        Self { mapping }
    }
}

impl<L> FromIterator<(Key, Node<L>)> for State<L> {
    fn from_iter<I: IntoIterator<Item = (Key, Node<L>)>>(iter: I) -> Self {
        Self {
            mapping: iter.into_iter().collect(),
        }
    }
}

impl<'a, L> IntoIterator for &'a State<L> {
    type Item = (&'a Key, &'a Node<L>);
    type IntoIter = Iter<'a, Key, Node<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.mapping.iter()
    }
}

/// Read access to one level of a state tree.
pub trait Tree<L> {
    /// The mapping backing this level.
    fn mapping(&self) -> &Mapping<L>;

    /// Index one key.
    ///
    /// A cell yields its current value; a nested level yields a view that
    /// borrows the parent's storage.
    ///
    /// # Errors
    ///
    /// Returns `StateError::MissingKey` if the key is absent.
    fn get(&self, key: &str) -> Result<Item<'_, L>, StateError> {
        match self.mapping().get(key) {
            Some(Node::Cell(cell)) => Ok(Item::Leaf(cell.get())),
            Some(Node::State(mapping)) => Ok(Item::State(StateRef::new(mapping))),
            None => Err(StateError::MissingKey(key.to_string())),
        }
    }

    /// Index an integer key, stored as its decimal string.
    ///
    /// # Errors
    ///
    /// Returns `StateError::MissingKey` if the key is absent.
    fn get_at(&self, index: usize) -> Result<Item<'_, L>, StateError> {
        self.get(Key::from(index).as_str())
    }

    /// The raw node stored under a key.
    fn node(&self, key: &str) -> Option<&Node<L>> {
        self.mapping().get(key)
    }

    /// Whether the key is present at this level.
    fn contains_key(&self, key: &str) -> bool {
        self.mapping().contains_key(key)
    }

    /// Number of slots at this level.
    fn len(&self) -> usize {
        self.mapping().len()
    }

    /// Whether this level has no slots.
    fn is_empty(&self) -> bool {
        self.mapping().is_empty()
    }

    /// Keys of this level in insertion order. Not recursive.
    fn keys(&self) -> Keys<'_, Key, Node<L>> {
        self.mapping().keys()
    }

    /// Slots of this level in insertion order. Not recursive.
    fn iter(&self) -> Iter<'_, Key, Node<L>> {
        self.mapping().iter()
    }

    /// A view over the cells of this level only.
    fn variables(&self) -> Variables<'_, L> {
        Variables::new(self.mapping())
    }

    /// Depth-first flat representation in insertion order.
    fn flat_state(&self) -> FlatState<L>
    where
        L: Clone,
    {
        flat::flatten(self.mapping())
    }

    /// An owned copy of this level and everything below it.
    fn to_state(&self) -> State<L>
    where
        L: Clone,
    {
        State::from_mapping(self.mapping().clone())
    }
}

/// Write access to one level of a state tree.
pub trait TreeMut<L>: Tree<L> {
    /// The mapping backing this level.
    fn mapping_mut(&mut self) -> &mut Mapping<L>;

    /// Index one key for mutation.
    ///
    /// # Errors
    ///
    /// Returns `StateError::MissingKey` if the key is absent.
    fn get_mut(&mut self, key: &str) -> Result<ItemMut<'_, L>, StateError> {
        match self.mapping_mut().get_mut(key) {
            Some(Node::Cell(cell)) => Ok(ItemMut::Leaf(cell.get_mut())),
            Some(Node::State(mapping)) => Ok(ItemMut::State(StateMut::new(mapping))),
            None => Err(StateError::MissingKey(key.to_string())),
        }
    }

    /// Assign to a key.
    ///
    /// A container replaces the slot wholesale. A leaf value requires the
    /// slot to hold a cell already, whose value is replaced in place.
    ///
    /// # Errors
    ///
    /// - `StateError::InvalidAssignment` if a leaf value targets an absent
    ///   slot or a nested container
    /// - `StateError::InvalidKey` if a container is assigned to an invalid key
    fn set(&mut self, key: &str, value: Update<L>) -> Result<(), StateError> {
        match value {
            Update::State(state) => {
                let key = Key::new(key)?;
                self.mapping_mut()
                    .insert(key, Node::State(state.into_mapping()));
                Ok(())
            }
            Update::Leaf(value) => match self.mapping_mut().get_mut(key) {
                Some(Node::Cell(cell)) => {
                    cell.set(value);
                    Ok(())
                }
                Some(Node::State(_)) => Err(StateError::InvalidAssignment {
                    key: key.to_string(),
                    reason: "the slot holds a nested container".into(),
                }),
                None => Err(StateError::InvalidAssignment {
                    key: key.to_string(),
                    reason: "the slot does not exist".into(),
                }),
            },
        }
    }

    /// Assign to an integer key, stored as its decimal string.
    ///
    /// # Errors
    ///
    /// Same as [`TreeMut::set`].
    fn set_at(&mut self, index: usize, value: Update<L>) -> Result<(), StateError> {
        self.set(Key::from(index).as_str(), value)
    }

    /// Remove a slot, leaf or subtree, keeping the order of the others.
    ///
    /// # Errors
    ///
    /// Returns `StateError::MissingKey` if the key is absent.
    fn delete(&mut self, key: &str) -> Result<Node<L>, StateError> {
        self.mapping_mut()
            .shift_remove(key)
            .ok_or_else(|| StateError::MissingKey(key.to_string()))
    }

    /// A mutable view over the cells of this level only.
    fn variables_mut(&mut self) -> VariablesMut<'_, L> {
        VariablesMut::new(self.mapping_mut())
    }
}

impl<L> Tree<L> for State<L> {
    fn mapping(&self) -> &Mapping<L> {
        &self.mapping
    }
}

impl<L> TreeMut<L> for State<L> {
    fn mapping_mut(&mut self) -> &mut Mapping<L> {
        &mut self.mapping
    }
}

//! core::state::variables
//!
//! Variable-only views: the cells of one level, with nested levels hidden.

use indexmap::map::Iter;

use super::{Mapping, Node};
use crate::core::cell::Cell;
use crate::core::error::StateError;
use crate::core::types::Key;

/// Iterator over the cells of one level.
pub struct VariablesIter<'a, L> {
    inner: Iter<'a, Key, Node<L>>,
}

impl<'a, L> Iterator for VariablesIter<'a, L> {
    type Item = (&'a Key, &'a Cell<L>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .by_ref()
            .find_map(|(key, node)| node.as_cell().map(|cell| (key, cell)))
    }
}

fn cell_in<'m, L>(mapping: &'m Mapping<L>, key: &str) -> Result<&'m Cell<L>, StateError> {
    mapping
        .get(key)
        .and_then(Node::as_cell)
        .ok_or_else(|| StateError::MissingKey(key.to_string()))
}

/// Read-only variable view.
#[derive(Debug)]
pub struct Variables<'a, L> {
    mapping: &'a Mapping<L>,
}

impl<'a, L> Variables<'a, L> {
    pub(crate) fn new(mapping: &'a Mapping<L>) -> Self {
        Self { mapping }
    }

    /// The cell under a key.
    ///
    /// # Errors
    ///
    /// Returns `StateError::MissingKey` if the slot is absent or holds a
    /// nested container.
    pub fn get(&self, key: &str) -> Result<&'a Cell<L>, StateError> {
        cell_in(self.mapping, key)
    }

    /// Cells of this level in insertion order.
    pub fn iter(&self) -> VariablesIter<'a, L> {
        VariablesIter {
            inner: self.mapping.iter(),
        }
    }

    /// Number of cells at this level.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether this level has no cells.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Mutable variable view.
#[derive(Debug)]
pub struct VariablesMut<'a, L> {
    mapping: &'a mut Mapping<L>,
}

impl<'a, L> VariablesMut<'a, L> {
    pub(crate) fn new(mapping: &'a mut Mapping<L>) -> Self {
        Self { mapping }
    }

    /// The cell under a key.
    ///
    /// # Errors
    ///
    /// Returns `StateError::MissingKey` if the slot is absent or holds a
    /// nested container.
    pub fn get(&self, key: &str) -> Result<&Cell<L>, StateError> {
        cell_in(&*self.mapping, key)
    }

    /// The cell under a key, mutably.
    ///
    /// # Errors
    ///
    /// Returns `StateError::MissingKey` if the slot is absent or holds a
    /// nested container.
    pub fn get_mut(&mut self, key: &str) -> Result<&mut Cell<L>, StateError> {
        match self.mapping.get_mut(key) {
            Some(Node::Cell(cell)) => Ok(cell),
            _ => Err(StateError::MissingKey(key.to_string())),
        }
    }

    /// Store a cell under a key, inserting the slot if it is absent.
    ///
    /// Returns the replaced cell, if any.
    ///
    /// # Errors
    ///
    /// - `StateError::NonVariableAssignment` if the slot holds a nested container
    /// - `StateError::InvalidKey` if the key fails validation
    pub fn set(&mut self, key: &str, cell: Cell<L>) -> Result<Option<Cell<L>>, StateError> {
        match self.mapping.get_mut(key) {
            Some(Node::Cell(existing)) => Ok(Some(std::mem::replace(existing, cell))),
            Some(Node::State(_)) => Err(StateError::NonVariableAssignment(key.to_string())),
            None => {
                self.mapping.insert(Key::new(key)?, Node::Cell(cell));
                Ok(None)
            }
        }
    }

    /// Remove a cell.
    ///
    /// # Errors
    ///
    /// Returns `StateError::MissingKey` if the slot is absent or holds a
    /// nested container; nested containers are left untouched.
    pub fn delete(&mut self, key: &str) -> Result<Cell<L>, StateError> {
        cell_in(&*self.mapping, key)?;
        match self.mapping.shift_remove(key) {
            Some(Node::Cell(cell)) => Ok(cell),
            _ => Err(StateError::MissingKey(key.to_string())),
        }
    }

    /// Cells of this level in insertion order.
    pub fn iter(&self) -> VariablesIter<'_, L> {
        VariablesIter {
            inner: self.mapping.iter(),
        }
    }

    /// Number of cells at this level.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether this level has no cells.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

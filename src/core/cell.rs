//! core::cell
//!
//! The mutable leaf wrapper stored in every container slot that is not a
//! nested container.

use serde::{Deserialize, Serialize};

use super::types::Kind;

/// A leaf value together with its variant tag.
///
/// The value is opaque to the container. Assigning through a container
/// replaces the value in place and never touches the kind.
///
/// # Example
///
/// ```
/// use treestate::core::cell::Cell;
/// use treestate::core::types::Kind;
///
/// let mut cell = Cell::new(1.0, Kind::PARAM);
/// cell.set(0.5);
/// assert_eq!(*cell.get(), 0.5);
/// assert_eq!(cell.kind(), &Kind::PARAM);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell<L> {
    kind: Kind,
    value: L,
}

impl<L> Cell<L> {
    /// Create a cell.
    pub fn new(value: L, kind: Kind) -> Self {
        Self { kind, value }
    }

    /// Shorthand for a [`Kind::PARAM`] cell.
    pub fn param(value: L) -> Self {
        Self::new(value, Kind::PARAM)
    }

    /// The current value.
    pub fn get(&self) -> &L {
        &self.value
    }

    /// Mutable access to the current value.
    pub fn get_mut(&mut self) -> &mut L {
        &mut self.value
    }

    /// Replace the value, returning the previous one.
    pub fn set(&mut self, value: L) -> L {
        std::mem::replace(&mut self.value, value)
    }

    /// The variant tag.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Consume the cell, returning its value.
    pub fn into_value(self) -> L {
        self.value
    }

    /// Build a cell of the same kind around a transformed value.
    pub fn map<M>(self, f: impl FnOnce(L) -> M) -> Cell<M> {
        Cell {
            kind: self.kind,
            value: f(self.value),
        }
    }
}

//! core::flat
//!
//! Flat representation of a state tree and the flatten/unflatten pair.
//!
//! # Representation
//!
//! A [`FlatState`] maps each leaf's [`Path`] (keys from the root joined by
//! `/`) to its [`Cell`]. Entries keep the order in which they were produced,
//! which for [`flatten`] is a depth-first walk in insertion order.
//!
//! # Round Trip
//!
//! `unflatten(flatten(t)) == t` for every tree `t` whose nested levels are
//! non-empty. Empty nested levels hold no leaves and therefore have no flat
//! representation; they are dropped by flattening.
//!
//! # Example
//!
//! ```
//! use treestate::core::cell::Cell;
//! use treestate::core::flat::{flatten, unflatten};
//! use treestate::core::state::{Node, State};
//!
//! let layer = State::from_entries([("w", Node::from(Cell::param(1)))]).unwrap();
//! let state = State::from_entries([("layer1", Node::from(layer))]).unwrap();
//!
//! let flat = flatten(state.raw_mapping());
//! assert_eq!(flat.paths().map(|p| p.as_str()).collect::<Vec<_>>(), ["layer1/w"]);
//! assert_eq!(unflatten(flat).unwrap(), state);
//! ```

use indexmap::map::{IntoIter, Iter, Keys};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::error::StateError;
use super::state::{Mapping, Node, State};
use super::types::Path;

/// A flat, ordered `path -> cell` mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatState<L> {
    entries: IndexMap<Path, Cell<L>>,
}

impl<L> Default for FlatState<L> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<L> FlatState<L> {
    /// Create an empty flat state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no leaves.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The cell at a path.
    pub fn get(&self, path: &str) -> Option<&Cell<L>> {
        self.entries.get(path)
    }

    /// The cell at a path, mutably.
    pub fn get_mut(&mut self, path: &str) -> Option<&mut Cell<L>> {
        self.entries.get_mut(path)
    }

    /// Whether a leaf exists at a path.
    pub fn contains_path(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Insert a leaf. An existing path keeps its position and gets the new cell.
    pub fn insert(&mut self, path: Path, cell: Cell<L>) -> Option<Cell<L>> {
        self.entries.insert(path, cell)
    }

    /// Remove a leaf, keeping the order of the others.
    pub fn remove(&mut self, path: &str) -> Option<Cell<L>> {
        self.entries.shift_remove(path)
    }

    /// Leaf paths in order.
    pub fn paths(&self) -> Keys<'_, Path, Cell<L>> {
        self.entries.keys()
    }

    /// `(path, cell)` pairs in order.
    pub fn iter(&self) -> Iter<'_, Path, Cell<L>> {
        self.entries.iter()
    }

    /// Keep only the leaves for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Path, &Cell<L>) -> bool) {
        self.entries.retain(|path, cell| keep(path, cell));
    }
}

impl<L> IntoIterator for FlatState<L> {
    type Item = (Path, Cell<L>);
    type IntoIter = IntoIter<Path, Cell<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, L> IntoIterator for &'a FlatState<L> {
    type Item = (&'a Path, &'a Cell<L>);
    type IntoIter = Iter<'a, Path, Cell<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<L> FromIterator<(Path, Cell<L>)> for FlatState<L> {
    fn from_iter<I: IntoIterator<Item = (Path, Cell<L>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<L> Extend<(Path, Cell<L>)> for FlatState<L> {
    fn extend<I: IntoIterator<Item = (Path, Cell<L>)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

/// Flatten a mapping depth-first in insertion order, cloning the cells.
pub fn flatten<L: Clone>(mapping: &Mapping<L>) -> FlatState<L> {
    let mut out = FlatState::new();
    flatten_into(mapping, None, &mut out);
    out
}

fn flatten_into<L: Clone>(mapping: &Mapping<L>, prefix: Option<&Path>, out: &mut FlatState<L>) {
    for (key, node) in mapping {
        let path = Path::join(prefix, key);
        match node {
            Node::Cell(cell) => {
                out.insert(path, cell.clone());
            }
            Node::State(children) => flatten_into(children, Some(&path), out),
        }
    }
}

/// Flatten a mapping depth-first in insertion order, moving the cells.
pub fn flatten_owned<L>(mapping: Mapping<L>) -> FlatState<L> {
    let mut out = FlatState::new();
    flatten_owned_into(mapping, None, &mut out);
    out
}

fn flatten_owned_into<L>(mapping: Mapping<L>, prefix: Option<&Path>, out: &mut FlatState<L>) {
    for (key, node) in mapping {
        let path = Path::join(prefix, &key);
        match node {
            Node::Cell(cell) => {
                out.insert(path, cell);
            }
            Node::State(children) => flatten_owned_into(children, Some(&path), out),
        }
    }
}

/// Rebuild a state tree from a flat state.
///
/// Intermediate levels are created on demand, in the order their first
/// leaf appears.
///
/// # Errors
///
/// Returns `StateError::PathConflict` if one path is a prefix of another,
/// since a slot cannot be both a leaf and a nested level.
pub fn unflatten<L>(flat_state: FlatState<L>) -> Result<State<L>, StateError> {
    let mut mapping = Mapping::new();
    for (path, cell) in flat_state {
        insert_path(&mut mapping, &path, cell)?;
    }
    Ok(State::from_mapping(mapping))
}

/// Rebuild a state tree where later leaves win every collision.
///
/// Used for flat states derived from trees (never conflicting) and for
/// merges, where a later leaf replaces an earlier subtree and vice versa.
pub(crate) fn rebuild<L>(flat_state: FlatState<L>) -> State<L> {
    let mut mapping = Mapping::new();
    for (path, cell) in flat_state {
        overwrite_path(&mut mapping, &path, cell);
    }
    State::from_mapping(mapping)
}

/// Paths of every leaf, depth-first in insertion order.
pub fn leaf_paths<L>(mapping: &Mapping<L>) -> Vec<Path> {
    let mut out = Vec::new();
    leaf_paths_into(mapping, None, &mut out);
    out
}

fn leaf_paths_into<L>(mapping: &Mapping<L>, prefix: Option<&Path>, out: &mut Vec<Path>) {
    for (key, node) in mapping {
        let path = Path::join(prefix, key);
        match node {
            Node::Cell(_) => out.push(path),
            Node::State(children) => leaf_paths_into(children, Some(&path), out),
        }
    }
}

/// Insert a cell at a path, failing if it runs into a slot of the other shape.
pub(crate) fn insert_path<L>(
    mapping: &mut Mapping<L>,
    path: &Path,
    cell: Cell<L>,
) -> Result<(), StateError> {
    let keys = path.keys();
    let Some((last, parents)) = keys.split_last() else {
        return Err(StateError::PathConflict(path.clone()));
    };

    let mut cursor = mapping;
    for key in parents {
        let slot = cursor
            .entry(key.clone())
            .or_insert_with(|| Node::State(Mapping::new()));
        cursor = match slot {
            Node::State(children) => children,
            Node::Cell(_) => return Err(StateError::PathConflict(path.clone())),
        };
    }

    if matches!(cursor.get(last.as_str()), Some(Node::State(_))) {
        return Err(StateError::PathConflict(path.clone()));
    }
    cursor.insert(last.clone(), Node::Cell(cell));
    Ok(())
}

/// Insert a cell at a path, replacing whatever is in the way.
pub(crate) fn overwrite_path<L>(mapping: &mut Mapping<L>, path: &Path, cell: Cell<L>) {
    let keys = path.keys();
    let Some((last, parents)) = keys.split_last() else {
        return;
    };

    let mut cursor = mapping;
    for key in parents {
        let slot = cursor
            .entry(key.clone())
            .or_insert_with(|| Node::State(Mapping::new()));
        if slot.is_cell() {
            *slot = Node::State(Mapping::new());
        }
        cursor = match slot {
            Node::State(children) => children,
            // replaced just above
            Node::Cell(_) => return,
        };
    }
    cursor.insert(last.clone(), Node::Cell(cell));
}

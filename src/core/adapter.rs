//! core::adapter
//!
//! The boundary between a state tree and a tree-transformation engine.
//!
//! # Contracts
//!
//! An engine that maps, differentiates, or compiles over leaves needs two
//! things from a container type: a flat leaf sequence with enough metadata
//! to rebuild the container, and the rebuild itself. [`TreeAdapter`] is that
//! contract. Engines receive the adapter as an argument; nothing is
//! registered globally.
//!
//! - [`TreeAdapter::to_flat_keyed`] walks the tree with every level sorted
//!   by key, so structurally equal trees produce the same leaf order no
//!   matter how they were built. The sorted paths form the [`TreeDef`].
//! - [`TreeAdapter::from_flat_keyed`] zips a `TreeDef` with transformed
//!   leaves. An empty `TreeDef` signals that the engine passed the whole
//!   subtree back as a single opaque payload, which is wrapped directly.
//! - [`TreeAdapter::to_flat`] hands over the underlying mapping as one
//!   opaque child, for engines that never address individual leaves.
//!
//! # Example
//!
//! ```
//! use treestate::core::adapter::{Leaves, StateAdapter, TreeAdapter};
//! use treestate::core::cell::Cell;
//! use treestate::core::state::{Node, State};
//!
//! let state = State::from_entries([
//!     ("b", Node::from(Cell::param(2))),
//!     ("a", Node::from(Cell::param(1))),
//! ])
//! .unwrap();
//!
//! let (leaves, def) = StateAdapter.to_flat_keyed(state.clone());
//! assert_eq!(def.paths().iter().map(|p| p.as_str()).collect::<Vec<_>>(), ["a", "b"]);
//!
//! let cells = leaves.into_iter().map(|(_, cell)| cell).collect();
//! let rebuilt = StateAdapter.from_flat_keyed(&def, Leaves::Cells(cells)).unwrap();
//! assert_eq!(rebuilt, state);
//! ```

use std::fmt;

use sha2::{Digest, Sha256};

use super::cell::Cell;
use super::error::StateError;
use super::flat::{self, FlatState};
use super::state::{Mapping, Node, State};
use super::types::{Key, Path};

/// Reconstruction metadata for a keyed flatten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TreeDef {
    paths: Vec<Path>,
}

impl TreeDef {
    /// Build from leaf paths in flatten order.
    pub fn new(paths: Vec<Path>) -> Self {
        Self { paths }
    }

    /// Leaf paths in flatten order.
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Number of leaves the definition expects.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the definition carries no paths.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// SHA-256 of the structure, hex encoded.
    ///
    /// Trees with the same leaf paths share a fingerprint regardless of
    /// values, kinds, or insertion order.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for path in &self.paths {
            hasher.update(path.as_str().as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for TreeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeDef(")?;
        for (i, path) in self.paths.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{path}")?;
        }
        write!(f, ")")
    }
}

/// Leaves handed back by an engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaves<L> {
    /// One cell per path of the `TreeDef`, in the same order.
    Cells(Vec<Cell<L>>),
    /// The whole tree collapsed into one ready-made mapping.
    Payload(Mapping<L>),
}

/// Exposes a container type to a tree-transformation engine.
pub trait TreeAdapter<L> {
    /// The container type this adapter handles.
    type Tree;

    /// Flatten with every level sorted by key.
    fn to_flat_keyed(&self, tree: Self::Tree) -> (Vec<(Path, Cell<L>)>, TreeDef);

    /// Rebuild a container from a definition and leaves.
    ///
    /// # Errors
    ///
    /// Returns `StateError::StructureMismatch` if the leaves do not fit the
    /// definition.
    fn from_flat_keyed(&self, def: &TreeDef, leaves: Leaves<L>) -> Result<Self::Tree, StateError>;

    /// Hand over the underlying mapping as one opaque child.
    fn to_flat(&self, tree: Self::Tree) -> Mapping<L>;
}

/// [`TreeAdapter`] for [`State`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StateAdapter;

impl<L> TreeAdapter<L> for StateAdapter {
    type Tree = State<L>;

    fn to_flat_keyed(&self, tree: State<L>) -> (Vec<(Path, Cell<L>)>, TreeDef) {
        let mut leaves = Vec::new();
        sorted_into(tree.into_mapping(), None, &mut leaves);
        let def = TreeDef::new(leaves.iter().map(|(path, _)| path.clone()).collect());
        (leaves, def)
    }

    fn from_flat_keyed(&self, def: &TreeDef, leaves: Leaves<L>) -> Result<State<L>, StateError> {
        match leaves {
            Leaves::Payload(mapping) if def.is_empty() => Ok(State::from_mapping(mapping)),
            Leaves::Payload(_) => Err(StateError::StructureMismatch(format!(
                "got a single payload for a definition of {} leaves",
                def.len()
            ))),
            Leaves::Cells(cells) => {
                if cells.len() != def.len() {
                    return Err(StateError::StructureMismatch(format!(
                        "expected {} leaves, got {}",
                        def.len(),
                        cells.len()
                    )));
                }
                let flat: FlatState<L> = def.paths().iter().cloned().zip(cells).collect();
                if flat.len() != def.len() {
                    return Err(StateError::StructureMismatch(
                        "definition repeats a path".into(),
                    ));
                }
                flat::unflatten(flat).map_err(|err| StateError::StructureMismatch(err.to_string()))
            }
        }
    }

    fn to_flat(&self, tree: State<L>) -> Mapping<L> {
        tree.into_mapping()
    }
}

fn sorted_into<L>(mapping: Mapping<L>, prefix: Option<&Path>, out: &mut Vec<(Path, Cell<L>)>) {
    let mut entries: Vec<(Key, Node<L>)> = mapping.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
    for (key, node) in entries {
        let path = Path::join(prefix, &key);
        match node {
            Node::Cell(cell) => out.push((path, cell)),
            Node::State(children) => sorted_into(children, Some(&path), out),
        }
    }
}

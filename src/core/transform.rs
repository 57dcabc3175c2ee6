//! core::transform
//!
//! Leaf-wise maps over trees, written purely against [`TreeAdapter`].
//!
//! These are the smallest useful engines: they flatten through the adapter,
//! transform the leaf sequence, and rebuild through the adapter. Kinds ride
//! along untouched.
//!
//! # Example
//!
//! ```
//! use treestate::core::adapter::StateAdapter;
//! use treestate::core::cell::Cell;
//! use treestate::core::state::{Node, State, Tree};
//! use treestate::core::transform::tree_map2;
//!
//! let params = State::from_entries([("w", Node::from(Cell::param(1.0)))]).unwrap();
//! let grads = State::from_entries([("w", Node::from(Cell::param(0.5)))]).unwrap();
//!
//! let updated: State<f64> =
//!     tree_map2(&StateAdapter, params, grads, |p: f64, g: f64| p - 0.5 * g).unwrap();
//! assert_eq!(updated.get("w").unwrap().leaf(), Some(&0.75));
//! ```

use tracing::debug;

use super::adapter::{Leaves, TreeAdapter};
use super::error::StateError;

/// Apply `f` to every leaf value.
///
/// # Errors
///
/// Propagates `StateError::StructureMismatch` from the adapter's rebuild.
pub fn tree_map<A, L, M, F>(
    adapter: &A,
    tree: <A as TreeAdapter<L>>::Tree,
    mut f: F,
) -> Result<<A as TreeAdapter<M>>::Tree, StateError>
where
    A: TreeAdapter<L> + TreeAdapter<M>,
    F: FnMut(L) -> M,
{
    let (leaves, def) = <A as TreeAdapter<L>>::to_flat_keyed(adapter, tree);
    let cells = leaves
        .into_iter()
        .map(|(_, cell)| cell.map(&mut f))
        .collect();
    debug!(leaves = def.len(), "mapped tree");
    <A as TreeAdapter<M>>::from_flat_keyed(adapter, &def, Leaves::Cells(cells))
}

/// Apply `f` to matching leaves of two trees with the same structure.
///
/// Leaves are paired by path. The left tree's kinds are kept.
///
/// # Errors
///
/// Returns `StateError::StructureMismatch` if the trees have different leaf
/// paths.
pub fn tree_map2<A, L, R, M, F>(
    adapter: &A,
    left: <A as TreeAdapter<L>>::Tree,
    right: <A as TreeAdapter<R>>::Tree,
    mut f: F,
) -> Result<<A as TreeAdapter<M>>::Tree, StateError>
where
    A: TreeAdapter<L> + TreeAdapter<R> + TreeAdapter<M>,
    F: FnMut(L, R) -> M,
{
    let (left, left_def) = <A as TreeAdapter<L>>::to_flat_keyed(adapter, left);
    let (right, right_def) = <A as TreeAdapter<R>>::to_flat_keyed(adapter, right);
    if left_def != right_def {
        return Err(StateError::StructureMismatch(format!(
            "structures differ: {} vs {}",
            left_def.fingerprint(),
            right_def.fingerprint()
        )));
    }

    let cells = left
        .into_iter()
        .zip(right)
        .map(|((_, l), (_, r))| l.map(|l| f(l, r.into_value())))
        .collect();
    debug!(leaves = left_def.len(), "mapped tree pair");
    <A as TreeAdapter<M>>::from_flat_keyed(adapter, &left_def, Leaves::Cells(cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::adapter::StateAdapter;
    use crate::core::cell::Cell;
    use crate::core::state::{Node, State, Tree};
    use crate::core::types::Kind;

    fn params() -> State<f64> {
        let layer = State::from_entries([
            ("w", Node::from(Cell::param(1.0))),
            ("b", Node::from(Cell::param(0.5))),
        ])
        .unwrap();
        State::from_entries([
            ("layer", Node::from(layer)),
            ("count", Node::from(Cell::new(3.0, Kind::COUNTER))),
        ])
        .unwrap()
    }

    #[test]
    fn map_changes_values_and_keeps_kinds() {
        let doubled: State<f64> = tree_map(&StateAdapter, params(), |v: f64| v * 2.0).unwrap();
        assert_eq!(doubled.get("count").unwrap().leaf(), Some(&6.0));
        let count = doubled.node("count").and_then(|n| n.as_cell()).unwrap();
        assert_eq!(count.kind(), &Kind::COUNTER);
    }

    #[test]
    fn map_can_change_leaf_type() {
        let rendered: State<String> =
            tree_map(&StateAdapter, params(), |v: f64| format!("{v:.1}")).unwrap();
        let layer = rendered.get("layer").unwrap().into_state().unwrap();
        assert_eq!(layer.get("w").unwrap().leaf().map(String::as_str), Some("1.0"));
    }

    #[test]
    fn map2_pairs_by_path_not_insertion_order() {
        let grads = State::from_entries([
            ("count", Node::from(Cell::new(0.0, Kind::COUNTER))),
            (
                "layer",
                Node::from(
                    State::from_entries([
                        ("b", Node::from(Cell::param(1.0))),
                        ("w", Node::from(Cell::param(2.0))),
                    ])
                    .unwrap(),
                ),
            ),
        ])
        .unwrap();
        let updated: State<f64> =
            tree_map2(&StateAdapter, params(), grads, |p: f64, g: f64| p - 0.5 * g).unwrap();
        let layer = updated.get("layer").unwrap().into_state().unwrap();
        assert_eq!(layer.get("w").unwrap().leaf(), Some(&0.0));
        assert_eq!(layer.get("b").unwrap().leaf(), Some(&0.0));
    }

    #[test]
    fn map2_rejects_different_structures() {
        let other = State::from_entries([("w", Node::from(Cell::param(1.0)))]).unwrap();
        let result: Result<State<f64>, _> =
            tree_map2(&StateAdapter, params(), other, |a: f64, b: f64| a + b);
        assert!(matches!(result, Err(StateError::StructureMismatch(_))));
    }
}

//! Property-based tests for the state algebra.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated trees.

use std::collections::HashSet;

use proptest::prelude::*;

use treestate::core::adapter::{Leaves, StateAdapter, TreeAdapter};
use treestate::core::cell::Cell;
use treestate::core::error::StateError;
use treestate::core::filter::Filter;
use treestate::core::state::{Node, State, Tree};
use treestate::core::types::{Key, Kind, Path};

const KINDS: [Kind; 3] = [Kind::PARAM, Kind::COUNTER, Kind::BATCH_STAT];

/// A generated tree before it is turned into a `State`.
#[derive(Debug, Clone)]
enum Shape {
    Leaf(i32, usize),
    Level(Vec<(String, Shape)>),
}

/// Strategy for keys: short, so siblings collide now and then.
fn key() -> impl Strategy<Value = String> {
    "[a-e][a-e0-9_]{0,2}"
}

/// Strategy for one slot: a leaf or a non-empty nested level.
fn shape() -> impl Strategy<Value = Shape> {
    let leaf = (any::<i32>(), 0..KINDS.len()).prop_map(|(v, k)| Shape::Leaf(v, k));
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop::collection::vec((key(), inner), 1..4).prop_map(Shape::Level)
    })
}

fn build(entries: Vec<(String, Shape)>) -> State<i32> {
    let mut state = State::new();
    for (key, shape) in entries {
        let key = Key::new(key).unwrap();
        match shape {
            Shape::Leaf(value, kind) => {
                state.insert(key, Cell::new(value, KINDS[kind].clone()));
            }
            Shape::Level(children) => {
                state.insert(key, build(children));
            }
        }
    }
    state
}

/// Strategy for whole states, in arbitrary (non-sorted) key order.
fn state() -> impl Strategy<Value = State<i32>> {
    prop::collection::vec((key(), shape()), 0..5).prop_map(build)
}

/// The same state moved under a single top-level key.
fn nest(name: &str, inner: State<i32>) -> State<i32> {
    let mut state = State::new();
    if !inner.is_empty() {
        state.insert(Key::new(name).unwrap(), inner);
    }
    state
}

fn path_set(state: &State<i32>) -> HashSet<Path> {
    state.flat_state().paths().cloned().collect()
}

proptest! {
    /// Flatten then unflatten rebuilds an equal tree, in the same order.
    #[test]
    fn flatten_roundtrip(state in state()) {
        let flat = state.flat_state();
        let rebuilt = State::from_flat_state(flat.clone()).unwrap();
        prop_assert_eq!(&rebuilt, &state);
        let order: Vec<&Path> = flat.paths().collect();
        let rebuilt_flat = rebuilt.flat_state();
        let rebuilt_order: Vec<&Path> = rebuilt_flat.paths().collect();
        prop_assert_eq!(order, rebuilt_order);
    }

    /// The adapter's keyed flatten round-trips and yields sorted paths.
    #[test]
    fn adapter_roundtrip(state in state()) {
        let (leaves, def) = StateAdapter.to_flat_keyed(state.clone());
        let cells = leaves.into_iter().map(|(_, cell)| cell).collect();
        let rebuilt = StateAdapter.from_flat_keyed(&def, Leaves::Cells(cells)).unwrap();
        prop_assert_eq!(&rebuilt, &state);

        let components: Vec<Vec<&str>> =
            def.paths().iter().map(|p| p.components().collect()).collect();
        let mut sorted = components.clone();
        sorted.sort();
        prop_assert_eq!(components, sorted);
    }

    /// Ending the filters with the catch-all partitions the leaves exactly.
    #[test]
    fn split_with_catch_all_partitions(state in state()) {
        let all = path_set(&state);
        let parts = state
            .split(&[
                Filter::kind(Kind::PARAM),
                Filter::kind(Kind::COUNTER),
                Filter::everything(),
            ])
            .unwrap();
        prop_assert_eq!(parts.len(), 3);

        let mut seen = HashSet::new();
        for part in &parts {
            for path in part.flat_state().paths() {
                prop_assert!(seen.insert(path.clone()), "leaf {} in two parts", path);
            }
        }
        prop_assert_eq!(seen, all);
    }

    /// Without a catch-all, split fails exactly when some leaf is unclaimed,
    /// and names every unclaimed leaf.
    #[test]
    fn split_without_catch_all_names_leftovers(state in state()) {
        let unclaimed: Vec<Path> = state
            .flat_state()
            .iter()
            .filter(|(_, cell)| cell.kind() != &Kind::PARAM)
            .map(|(path, _)| path.clone())
            .collect();

        match state.split(&[Filter::kind(Kind::PARAM)]) {
            Ok(parts) => {
                prop_assert!(unclaimed.is_empty());
                prop_assert_eq!(parts.len(), 1);
            }
            Err(StateError::ExhaustivePartition(paths)) => {
                prop_assert_eq!(paths, unclaimed);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    /// Split then merge restores the original tree.
    #[test]
    fn split_then_merge_restores(state in state()) {
        let mut parts = state
            .clone()
            .split(&[Filter::kind(Kind::BATCH_STAT), Filter::everything()])
            .unwrap()
            .into_iter();
        let first = parts.next().unwrap();
        prop_assert_eq!(State::merge(first, parts), state);
    }

    /// Merge is associative when no paths collide.
    #[test]
    fn merge_associative_without_collisions(a in state(), b in state(), c in state()) {
        let (a, b, c) = (nest("x", a), nest("y", b), nest("z", c));
        let left = State::merge(State::merge(a.clone(), [b.clone()]), [c.clone()]);
        let right = State::merge(a, [State::merge(b, [c])]);
        prop_assert_eq!(left, right);
    }

    /// On collisions, every leaf of the later state survives the merge.
    #[test]
    fn merge_later_state_wins(a in state(), b in state()) {
        let merged = State::merge(a, [b.clone()]).flat_state();
        for (path, cell) in b.flat_state().iter() {
            prop_assert_eq!(merged.get(path.as_str()), Some(cell));
        }
    }

    /// Union with an empty state changes nothing, order included.
    #[test]
    fn union_identity(state in state()) {
        let keys: Vec<Key> = state.keys().cloned().collect();
        let result = state.clone() | State::new();
        prop_assert_eq!(result.keys().cloned().collect::<Vec<_>>(), keys);
        prop_assert_eq!(result, state);
    }

    /// Subtracting a state from itself leaves nothing, shallow or deep.
    #[test]
    fn difference_with_self_is_empty(state in state()) {
        prop_assert!((state.clone() - &state).is_empty());
        prop_assert!(state.clone().difference_deep(&state).is_empty());
    }

    /// Deep difference removes exactly the other state's leaf paths.
    #[test]
    fn deep_difference_is_set_difference(a in state(), b in state()) {
        let expected: HashSet<Path> = path_set(&a).difference(&path_set(&b)).cloned().collect();
        let result = a.difference_deep(&b);
        prop_assert_eq!(path_set(&result), expected);
    }

    /// Structurally equal trees share a fingerprint whatever their order.
    #[test]
    fn fingerprint_ignores_insertion_order(state in state()) {
        let (_, def) = StateAdapter.to_flat_keyed(state.clone());
        let (sorted_leaves, _) = StateAdapter.to_flat_keyed(state);
        let resorted: State<i32> = State::from_flat_state(sorted_leaves.into_iter().collect()).unwrap();
        let (_, resorted_def) = StateAdapter.to_flat_keyed(resorted);
        prop_assert_eq!(def.fingerprint(), resorted_def.fingerprint());
    }
}

#[test]
fn nested_scenario_paths() {
    let layer1 = State::from_entries([
        ("w", Node::from(Cell::param(1))),
        ("b", Node::from(Cell::param(2))),
    ])
    .unwrap();
    let layer2 = State::from_entries([("w", Node::from(Cell::param(3)))]).unwrap();
    let state =
        State::from_entries([("layer1", Node::from(layer1)), ("layer2", Node::from(layer2))])
            .unwrap();

    let flat = state.flat_state();
    let paths: Vec<&str> = flat.paths().map(Path::as_str).collect();
    assert_eq!(paths, ["layer1/w", "layer1/b", "layer2/w"]);
    assert_eq!(State::from_flat_state(flat).unwrap(), state);
}

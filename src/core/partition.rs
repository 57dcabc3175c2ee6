//! core::partition
//!
//! Split a state into disjoint states by filter, and merge states back.
//!
//! # Algorithm
//!
//! Every operation works on the flat representation. `split` and `extract`
//! route each leaf to the first filter that matches it; leaves no filter
//! claims land in a remainder bucket. The buckets are then rebuilt into
//! nested states.
//!
//! # Exhaustiveness
//!
//! `split` refuses to drop leaves: a non-empty remainder is an
//! `ExhaustivePartition` error naming the unmatched paths. Ending the filter
//! list with the catch-all makes the remainder empty by construction.
//! `extract` discards the remainder silently.
//!
//! # Example
//!
//! ```
//! use treestate::core::cell::Cell;
//! use treestate::core::filter::Filter;
//! use treestate::core::state::{Node, State, Tree};
//! use treestate::core::types::Kind;
//!
//! let state = State::from_entries([
//!     ("w", Node::from(Cell::param(1.0))),
//!     ("count", Node::from(Cell::new(0.0, Kind::COUNTER))),
//! ])
//! .unwrap();
//!
//! let parts = state
//!     .clone()
//!     .split(&[Filter::kind(Kind::PARAM), Filter::everything()])
//!     .unwrap();
//! assert_eq!(parts.len(), 2);
//!
//! let merged = State::merge(parts[0].clone(), [parts[1].clone()]);
//! assert_eq!(merged, state);
//! ```

use std::collections::HashSet;
use std::ops::{BitOr, Sub};

use tracing::{debug, trace};

use super::error::StateError;
use super::filter::{to_predicate, Filter};
use super::flat::{self, FlatState};
use super::state::{Mapping, State, Tree};
use super::types::Path;

/// Route every leaf to the first matching filter.
///
/// Returns one bucket per filter plus the remainder.
fn partition<L: 'static>(
    state: State<L>,
    filters: &[Filter<L>],
) -> Result<(Vec<FlatState<L>>, FlatState<L>), StateError> {
    if filters.is_empty() {
        return Err(StateError::NoFilters);
    }
    let last = filters.len() - 1;
    if let Some(index) = filters.iter().position(Filter::is_catch_all) {
        if index != last {
            return Err(StateError::FilterOrdering {
                index,
                len: filters.len(),
            });
        }
    }

    let predicates: Vec<_> = filters.iter().map(to_predicate).collect();
    let mut buckets: Vec<FlatState<L>> = (0..filters.len()).map(|_| FlatState::new()).collect();
    let mut rest = FlatState::new();

    for (path, cell) in state.into_flat_state() {
        match predicates.iter().position(|predicate| predicate(&path, &cell)) {
            Some(index) => {
                trace!(path = %path, bucket = index, "routed leaf");
                buckets[index].insert(path, cell);
            }
            None => {
                trace!(path = %path, "leaf matched no filter");
                rest.insert(path, cell);
            }
        }
    }

    debug!(
        filters = filters.len(),
        matched = buckets.iter().map(FlatState::len).sum::<usize>(),
        remainder = rest.len(),
        "partitioned state"
    );
    Ok((buckets, rest))
}

impl<L: 'static> State<L> {
    /// Split into one state per filter, requiring every leaf to be claimed.
    ///
    /// # Errors
    ///
    /// - `StateError::NoFilters` if `filters` is empty
    /// - `StateError::FilterOrdering` if the catch-all is not last
    /// - `StateError::ExhaustivePartition` if some leaves matched no filter
    pub fn split(self, filters: &[Filter<L>]) -> Result<Vec<State<L>>, StateError> {
        let (buckets, rest) = partition(self, filters)?;
        if !rest.is_empty() {
            return Err(StateError::ExhaustivePartition(
                rest.paths().cloned().collect(),
            ));
        }
        Ok(buckets.into_iter().map(flat::rebuild).collect())
    }

    /// Split into one state per filter, discarding unclaimed leaves.
    ///
    /// # Errors
    ///
    /// - `StateError::NoFilters` if `filters` is empty
    /// - `StateError::FilterOrdering` if the catch-all is not last
    pub fn extract(self, filters: &[Filter<L>]) -> Result<Vec<State<L>>, StateError> {
        let (buckets, _rest) = partition(self, filters)?;
        Ok(buckets.into_iter().map(flat::rebuild).collect())
    }
}

impl<L> State<L> {
    /// Merge states left to right; later states win on path collisions.
    ///
    /// A single state is returned unchanged.
    pub fn merge<I>(first: State<L>, rest: I) -> State<L>
    where
        I: IntoIterator<Item = State<L>>,
    {
        let mut rest = rest.into_iter().peekable();
        if rest.peek().is_none() {
            return first;
        }

        let mut mapping = Mapping::new();
        let mut merged = 0usize;
        for state in std::iter::once(first).chain(rest) {
            merged += 1;
            for (path, cell) in state.into_flat_state() {
                flat::overwrite_path(&mut mapping, &path, cell);
            }
        }
        debug!(states = merged, "merged states");
        State::from_mapping(mapping)
    }

    /// `self | other`. An empty `other` returns `self` untouched.
    pub fn union(self, other: State<L>) -> State<L> {
        if other.is_empty() {
            return self;
        }
        State::merge(self, [other])
    }

    /// `self - other`: drop every top-level key present in `other`.
    ///
    /// This is shallow: a top-level key in `other` removes the whole slot,
    /// whatever lies below it. See [`State::difference_deep`] for the
    /// path-granular form.
    pub fn difference(self, other: &State<L>) -> State<L> {
        if other.is_empty() {
            return self;
        }
        self.into_mapping()
            .into_iter()
            .filter(|(key, _)| !other.contains_key(key.as_str()))
            .collect()
    }

    /// Drop exactly the leaf paths present in `other`.
    ///
    /// Levels left without leaves disappear.
    pub fn difference_deep(self, other: &State<L>) -> State<L> {
        if other.is_empty() {
            return self;
        }
        let removed: HashSet<Path> = flat::leaf_paths(other.raw_mapping()).into_iter().collect();
        let mut remaining = self.into_flat_state();
        remaining.retain(|path, _| !removed.contains(path));
        flat::rebuild(remaining)
    }
}

impl<L> BitOr for State<L> {
    type Output = State<L>;

    fn bitor(self, other: State<L>) -> State<L> {
        self.union(other)
    }
}

impl<L> Sub for State<L> {
    type Output = State<L>;

    fn sub(self, other: State<L>) -> State<L> {
        self.difference(&other)
    }
}

impl<L> Sub<&State<L>> for State<L> {
    type Output = State<L>;

    fn sub(self, other: &State<L>) -> State<L> {
        self.difference(other)
    }
}

//! core::error
//!
//! Errors raised by container, flattening and partition operations.
//!
//! Every error is raised at the point of violation and propagates to the
//! caller; nothing is recovered internally.

use thiserror::Error;

use super::types::{Path, TypeError};

/// Errors from state container operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// Indexing or deleting a key absent from the current level.
    #[error("key '{0}' not found")]
    MissingKey(String),

    /// Assigning a plain leaf value to an absent slot or to a nested container.
    #[error("cannot assign a leaf value to '{key}': {reason}")]
    InvalidAssignment {
        /// The key being assigned
        key: String,
        /// Why the slot cannot take a leaf
        reason: String,
    },

    /// Assigning through the variable view to a slot that is not a cell.
    #[error("'{0}' holds a nested container, not a variable")]
    NonVariableAssignment(String),

    /// `split` left leaves unmatched and no catch-all filter was given.
    #[error(
        "non-exhaustive filters, got a non-empty remainder: {}; use a catch-all as the last filter to match all remaining leaves",
        format_paths(.0)
    )]
    ExhaustivePartition(Vec<Path>),

    /// A catch-all filter appeared before the last position.
    #[error("the catch-all filter can only be used last, got it at index {index} of {len}")]
    FilterOrdering {
        /// Position of the misplaced catch-all
        index: usize,
        /// Number of filters given
        len: usize,
    },

    /// `split` or `extract` was called without any filter.
    #[error("at least one filter is required")]
    NoFilters,

    /// A path is both a leaf and the prefix of another path.
    #[error("path '{0}' conflicts with an existing leaf or subtree")]
    PathConflict(Path),

    /// The same path appears more than once in a flat listing.
    #[error("path '{0}' appears more than once")]
    DuplicatePath(Path),

    /// Leaves handed back by a transformation do not fit the tree definition.
    #[error("structure mismatch: {0}")]
    StructureMismatch(String),

    /// A key or path string failed validation.
    #[error(transparent)]
    InvalidKey(#[from] TypeError),
}

fn format_paths(paths: &[Path]) -> String {
    let names: Vec<&str> = paths.iter().map(Path::as_str).collect();
    format!("[{}]", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustive_partition_names_paths() {
        let err = StateError::ExhaustivePartition(vec![
            Path::new("count").unwrap(),
            Path::new("layer/b").unwrap(),
        ]);
        let message = err.to_string();
        assert!(message.contains("[count, layer/b]"));
        assert!(message.contains("catch-all"));
    }

    #[test]
    fn filter_ordering_message() {
        let err = StateError::FilterOrdering { index: 0, len: 2 };
        assert_eq!(
            err.to_string(),
            "the catch-all filter can only be used last, got it at index 0 of 2"
        );
    }

    #[test]
    fn type_error_converts() {
        let err: StateError = TypeError::InvalidKey("key cannot be empty".into()).into();
        assert_eq!(err.to_string(), "invalid key: key cannot be empty");
    }
}

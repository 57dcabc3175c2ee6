//! treestate - hierarchical, path-addressed state containers
//!
//! A [`State`](core::state::State) is an ordered tree of keys whose leaves
//! are [`Cell`](core::cell::Cell)s: a value plus a kind tag such as `param`
//! or `counter`. treestate flattens states to `path -> cell` form and back,
//! partitions them by ordered filters, merges them, and exposes them to
//! leaf-wise transformation engines through an explicit adapter.
//!
//! # Architecture
//!
//! - [`core`] - The container, its flat form, filters, the partition/merge
//!   algebra, the transformation adapter, config and state files
//! - [`cli`] - The `tst` command-line interface
//! - [`ui`] - Output formatting
//!
//! # Invariants
//!
//! 1. `unflatten(flatten(t)) == t` for every tree whose nested levels hold
//!    at least one leaf
//! 2. `split` either claims every leaf exactly once or fails naming the
//!    unclaimed paths
//! 3. A leaf is addressed by the same path in flatten, split and merge

pub mod cli;
pub mod core;
pub mod ui;

//! core
//!
//! Core domain types and operations for treestate.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Key, Path, Kind
//! - [`cell`] - The leaf wrapper
//! - [`error`] - Errors raised by state operations
//! - [`state`] - The nested container and its views
//! - [`flat`] - Flat `path -> cell` form, flatten and unflatten
//! - [`filter`] - Selectors, predicates and the catch-all
//! - [`partition`] - split, extract, merge, union, difference
//! - [`adapter`] - The boundary to tree-transformation engines
//! - [`transform`] - Leaf-wise maps built on the adapter
//! - [`store`] - State files on disk
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing keeps invalid keys and paths out of the tree
//! - Partition and merge are defined on the flat form
//! - Schemas are strict and self-describing

pub mod adapter;
pub mod cell;
pub mod config;
pub mod error;
pub mod filter;
pub mod flat;
pub mod partition;
pub mod state;
pub mod store;
pub mod transform;
pub mod types;

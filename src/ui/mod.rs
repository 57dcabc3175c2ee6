//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All output goes through this module so the quiet and debug flags are
//! honored in one place.

pub mod output;

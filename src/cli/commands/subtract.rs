//! subtract command - Remove the contents of one state from another

use std::path::Path;

use anyhow::Result;

use super::{emit, load};
use crate::cli::Context;

/// Remove `other` from `file`.
///
/// Shallow by default: each top-level key of `other` drops the whole slot.
/// With `deep`, only the exact leaf paths of `other` are dropped.
pub fn subtract(
    ctx: &Context,
    file: &Path,
    other: &Path,
    deep: bool,
    output: Option<&Path>,
) -> Result<()> {
    let state = load(ctx, file)?;
    let other = load(ctx, other)?;

    let result = if deep {
        state.difference_deep(&other)
    } else {
        state - &other
    };
    emit(ctx, &result, output)
}

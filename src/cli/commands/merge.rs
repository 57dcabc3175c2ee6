//! merge command - Merge state files left to right

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use super::{emit, load};
use crate::cli::Context;
use crate::core::state::State;

/// Merge state files; a later file wins every path collision.
pub fn merge(ctx: &Context, files: &[PathBuf], output: Option<&Path>) -> Result<()> {
    let Some((first, rest)) = files.split_first() else {
        bail!("merge needs at least one state file");
    };

    let first = load(ctx, first)?;
    let rest = rest
        .iter()
        .map(|file| load(ctx, file))
        .collect::<Result<Vec<_>>>()?;

    let merged = State::merge(first, rest);
    emit(ctx, &merged, output)
}

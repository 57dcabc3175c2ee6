//! split and extract commands - Partition a state by filters

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::{load, resolve_filter};
use crate::cli::args::PartitionArgs;
use crate::cli::Context;
use crate::core::filter::Filter;
use crate::core::state::Tree;
use crate::core::store::{self, JsonState};
use crate::ui::output;

/// Split a state into one part per filter. Every leaf must be claimed.
pub fn split(ctx: &Context, args: &PartitionArgs) -> Result<()> {
    let (state, filters) = prepare(ctx, args)?;
    let parts = state
        .split(&filters)
        .with_context(|| format!("Failed to split '{}'", args.file.display()))?;
    write_parts(ctx, args, &parts)
}

/// Pull out the leaves matching each filter; unclaimed leaves are dropped.
pub fn extract(ctx: &Context, args: &PartitionArgs) -> Result<()> {
    let (state, filters) = prepare(ctx, args)?;
    let total = state.flat_state().len();
    let parts = state
        .extract(&filters)
        .with_context(|| format!("Failed to extract from '{}'", args.file.display()))?;

    let kept: usize = parts.iter().map(|p| p.flat_state().len()).sum();
    if kept < total {
        output::debug(
            format!("dropped {} unclaimed leaves", total - kept),
            ctx.verbosity(),
        );
    }
    write_parts(ctx, args, &parts)
}

fn prepare(
    ctx: &Context,
    args: &PartitionArgs,
) -> Result<(JsonState, Vec<Filter<serde_json::Value>>)> {
    let filters = args
        .filters
        .iter()
        .map(|text| resolve_filter(ctx, text))
        .collect::<Result<Vec<_>>>()?;
    let state = load(ctx, &args.file)?;
    Ok((state, filters))
}

/// File name of part `index` of `input`: `model.json` gives `model.0.json`.
fn part_file_name(input: &Path, index: usize) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state".to_string());
    format!("{}.{}.json", stem, index)
}

fn write_parts(ctx: &Context, args: &PartitionArgs, parts: &[JsonState]) -> Result<()> {
    match &args.out_dir {
        Some(dir) => {
            let dir = ctx.resolve(dir);
            for (index, (part, filter)) in parts.iter().zip(&args.filters).enumerate() {
                let path: PathBuf = dir.join(part_file_name(&args.file, index));
                store::save_state(&path, part, ctx.pretty())
                    .with_context(|| format!("Failed to write '{}'", path.display()))?;
                output::print(
                    format!(
                        "Wrote {} ({} leaves, {})",
                        path.display(),
                        part.flat_state().len(),
                        filter
                    ),
                    ctx.verbosity(),
                );
            }
        }
        None => {
            let flats: Vec<_> = parts.iter().map(|part| part.flat_state()).collect();
            let text = if ctx.pretty() {
                serde_json::to_string_pretty(&flats)?
            } else {
                serde_json::to_string(&flats)?
            };
            output::data(text);
        }
    }
    Ok(())
}

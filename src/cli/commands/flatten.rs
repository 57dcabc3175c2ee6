//! flatten command - List every leaf of a state file

use std::path::Path;

use anyhow::Result;

use super::load;
use crate::cli::Context;
use crate::core::adapter::{StateAdapter, TreeAdapter};
use crate::core::state::Tree;
use crate::ui::output;

/// List every leaf as `path<TAB>kind<TAB>value`.
///
/// With `sorted`, every level is sorted by key, matching the order a
/// transformation engine receives.
pub fn flatten(ctx: &Context, file: &Path, sorted: bool) -> Result<()> {
    let state = load(ctx, file)?;

    let lines: Vec<String> = if sorted {
        let (leaves, _) = StateAdapter.to_flat_keyed(state);
        leaves
            .iter()
            .map(|(path, cell)| output::format_leaf(path, cell))
            .collect()
    } else {
        state
            .flat_state()
            .iter()
            .map(|(path, cell)| output::format_leaf(path, cell))
            .collect()
    };

    if !lines.is_empty() {
        output::data(lines.join("\n"));
    }
    output::debug(format!("{} leaves", lines.len()), ctx.verbosity());
    Ok(())
}

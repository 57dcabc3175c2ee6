//! show command - Print a state file as JSON

use std::path::Path;

use anyhow::Result;

use super::load;
use crate::cli::Context;
use crate::core::store;
use crate::ui::output;

/// Print a state in flat or nested JSON form.
pub fn show(ctx: &Context, file: &Path, nested: bool) -> Result<()> {
    let state = load(ctx, file)?;
    let text = if nested {
        if ctx.pretty() {
            serde_json::to_string_pretty(&state)?
        } else {
            serde_json::to_string(&state)?
        }
    } else {
        store::render_state(&state, ctx.pretty())?
    };
    output::data(text.trim_end());
    Ok(())
}

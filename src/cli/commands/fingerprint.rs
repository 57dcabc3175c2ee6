//! fingerprint command - Print the structural fingerprint of a state

use std::path::Path;

use anyhow::Result;

use super::load;
use crate::cli::Context;
use crate::core::adapter::{StateAdapter, TreeAdapter};
use crate::ui::output;

/// Print the hex SHA-256 of the state's sorted leaf paths.
pub fn fingerprint(ctx: &Context, file: &Path) -> Result<()> {
    let state = load(ctx, file)?;
    let (_, def) = StateAdapter.to_flat_keyed(state);

    output::data(def.fingerprint());
    output::debug(
        format!("{} leaves:\n{}", def.len(), output::format_list(def.paths(), "  ")),
        ctx.verbosity(),
    );
    Ok(())
}

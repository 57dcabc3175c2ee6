//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads its input state files
//! 2. Calls the state algebra
//! 3. Writes result files or prints to stdout
//!
//! Handlers never modify their input files.

mod completion;
mod config_cmd;
mod fingerprint;
mod flatten;
mod merge;
mod partition;
mod show;
mod subtract;

// Re-export command functions for testing and direct invocation
pub use completion::completion;
pub use config_cmd::list as config_list;
pub use fingerprint::fingerprint;
pub use flatten::flatten;
pub use merge::merge;
pub use partition::{extract, split};
pub use show::show;
pub use subtract::subtract;

use std::path::Path;

use anyhow::{anyhow, Context as _, Result};

use super::args::{Command, ConfigAction};
use super::Context;
use crate::core::filter::{Filter, Selector};
use crate::core::store::{self, JsonState};
use crate::ui::output;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Flatten { file, sorted } => flatten::flatten(ctx, &file, sorted),
        Command::Show { file, nested, flat } => {
            let nested = if nested || flat {
                nested
            } else {
                ctx.config.nested()
            };
            show::show(ctx, &file, nested)
        }
        Command::Split { partition } => partition::split(ctx, &partition),
        Command::Extract { partition } => partition::extract(ctx, &partition),
        Command::Merge { files, output } => merge::merge(ctx, &files, output.as_deref()),
        Command::Subtract {
            file,
            other,
            deep,
            output,
        } => subtract::subtract(ctx, &file, &other, deep, output.as_deref()),
        Command::Fingerprint { file } => fingerprint::fingerprint(ctx, &file),
        Command::Config { action } => match action {
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Load a state file named on the command line.
fn load(ctx: &Context, file: &Path) -> Result<JsonState> {
    let path = ctx.resolve(file);
    output::debug(format!("loading {}", path.display()), ctx.verbosity());
    store::load_state(&path).with_context(|| format!("Failed to load '{}'", file.display()))
}

/// Print a state as flat JSON, or write it to `output` if given.
fn emit(ctx: &Context, state: &JsonState, output: Option<&Path>) -> Result<()> {
    match output {
        Some(file) => {
            let path = ctx.resolve(file);
            store::save_state(&path, state, ctx.pretty())
                .with_context(|| format!("Failed to write '{}'", file.display()))?;
            output::print(format!("Wrote {}", path.display()), ctx.verbosity());
        }
        None => {
            let text = store::render_state(state, ctx.pretty())?;
            output::data(text.trim_end());
        }
    }
    Ok(())
}

/// Turn a `--filter` argument into a filter.
///
/// `@name` looks the selector up in the config; anything else is parsed as
/// compact selector syntax.
fn resolve_filter(ctx: &Context, text: &str) -> Result<Filter<serde_json::Value>> {
    if let Some(name) = text.strip_prefix('@') {
        let selector = ctx
            .config
            .filter(name)
            .context("Failed to read filter from config")?
            .ok_or_else(|| {
                anyhow!(
                    "Unknown filter '@{}'. Define it under [filters] in treestate.toml",
                    name
                )
            })?;
        return Ok(Filter::from(selector));
    }
    let selector: Selector = text
        .parse()
        .with_context(|| format!("Invalid filter '{}'", text))?;
    Ok(Filter::from(selector))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, FileConfig, FilterSpec};
    use crate::core::types::Kind;

    fn ctx_with_filter(name: &str, spec: &str) -> Context {
        let mut global = FileConfig::default();
        global
            .filters
            .insert(name.to_string(), FilterSpec::Compact(spec.to_string()));
        Context {
            config: Config::from_files(global, None),
            ..Default::default()
        }
    }

    #[test]
    fn resolves_named_filter() {
        let ctx = ctx_with_filter("trainable", "kind:param");
        let filter = resolve_filter(&ctx, "@trainable").unwrap();
        assert!(matches!(filter, Filter::Selector(Selector::Kind(ref k)) if *k == Kind::PARAM));
    }

    #[test]
    fn unknown_named_filter() {
        let ctx = Context::default();
        let err = resolve_filter(&ctx, "@missing").unwrap_err();
        assert!(err.to_string().contains("@missing"));
    }

    #[test]
    fn catch_all_syntax() {
        let filter = resolve_filter(&Context::default(), "...").unwrap();
        assert!(filter.is_catch_all());
    }

    #[test]
    fn invalid_syntax() {
        assert!(resolve_filter(&Context::default(), "bogus").is_err());
    }
}

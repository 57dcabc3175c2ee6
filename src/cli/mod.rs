//! cli
//!
//! Command-line interface layer for treestate.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install logging and load configuration
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers load state files through
//! [`crate::core::store`], call the state algebra in [`crate::core`], and
//! print through [`crate::ui::output`].

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::ui::output::{self, Verbosity};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "TST_LOG";

/// Execution context shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Force single-line JSON.
    pub compact: bool,
    /// Loaded configuration.
    pub config: Config,
}

impl Context {
    /// Output verbosity derived from the flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Whether JSON output is pretty-printed.
    pub fn pretty(&self) -> bool {
        !self.compact && self.config.pretty()
    }

    /// Resolve a path argument against `--cwd`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.cwd {
            Some(cwd) if path.is_relative() => cwd.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Install the stderr log subscriber.
///
/// `TST_LOG` takes precedence; otherwise `--debug` selects `debug` and the
/// default is `warn`.
fn init_logging(debug: bool) {
    let fallback = if debug { "treestate=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let project_dir = match &cli.cwd {
        Some(cwd) => cwd.clone(),
        None => std::env::current_dir().context("Failed to determine the working directory")?,
    };
    let loaded = Config::load(Some(&project_dir)).context("Failed to load config")?;

    let ctx = Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        compact: cli.compact,
        config: loaded.config,
    };
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            ctx.verbosity(),
        );
    }

    commands::dispatch(cli.command, &ctx)
}

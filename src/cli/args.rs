//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--compact`: Single-line JSON output
//!
//! # Filters
//!
//! Commands that partition a state take `--filter` / `-f` once per filter,
//! in order. A filter is compact selector syntax (`kind:param`,
//! `prefix:encoder`, `!kind:counter`, `...`) or `@name` for a filter defined
//! in the config file.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// treestate - inspect, split and merge path-addressed state files
#[derive(Parser, Debug)]
#[command(name = "tst")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if tst was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print JSON on one line, overriding `output.pretty`
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every leaf with its path, kind and value
    #[command(
        name = "flatten",
        long_about = "List every leaf of a state file with its path, kind and value.\n\n\
            Leaves are listed depth-first in file order. With --sorted, every level \
            is sorted by key instead, which is the order handed to transformation \
            engines.",
        after_help = "\
WORKFLOW EXAMPLES:
    # See what a checkpoint holds
    tst flatten model.json

    # The order a transformation engine sees
    tst flatten --sorted model.json"
    )]
    Flatten {
        /// State file
        file: PathBuf,

        /// Sort every level by key
        #[arg(long)]
        sorted: bool,
    },

    /// Print a state file as JSON
    #[command(
        name = "show",
        long_about = "Print a state file as JSON.\n\n\
            The flat form has one entry per leaf path. The nested form rebuilds \
            the hierarchy. The default comes from `output.nested` in the config."
    )]
    Show {
        /// State file
        file: PathBuf,

        /// Print the nested form
        #[arg(long, conflicts_with = "flat")]
        nested: bool,

        /// Print the flat form
        #[arg(long)]
        flat: bool,
    },

    /// Split a state into one file per filter, claiming every leaf
    #[command(
        name = "split",
        long_about = "Split a state into one part per filter.\n\n\
            Each leaf goes to the first filter that matches it. Every leaf must be \
            claimed: if some leaf matches no filter the command fails and names it. \
            End the filter list with '...' to collect everything else.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Trainable parameters and everything else
    tst split model.json -f kind:param -f ... -o parts/

    # Using filters from treestate.toml
    tst split model.json -f @trainable -f @stats -f ..."
    )]
    Split {
        #[command(flatten)]
        partition: PartitionArgs,
    },

    /// Pull out the leaves matching each filter, dropping the rest
    #[command(
        name = "extract",
        long_about = "Pull out the leaves matching each filter.\n\n\
            Works like split, but leaves that match no filter are dropped \
            silently.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Just the parameters
    tst extract model.json -f kind:param"
    )]
    Extract {
        #[command(flatten)]
        partition: PartitionArgs,
    },

    /// Merge state files; later files win on collisions
    #[command(name = "merge")]
    Merge {
        /// State files, merged left to right
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove the keys of one state from another
    #[command(
        name = "subtract",
        long_about = "Remove the contents of OTHER from FILE.\n\n\
            By default every top-level key of OTHER removes the whole slot from \
            FILE. With --deep only the exact leaf paths of OTHER are removed."
    )]
    Subtract {
        /// State to subtract from
        file: PathBuf,

        /// State whose keys are removed
        other: PathBuf,

        /// Remove exact leaf paths instead of top-level keys
        #[arg(long)]
        deep: bool,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the structural fingerprint of a state
    #[command(
        name = "fingerprint",
        long_about = "Print the SHA-256 fingerprint of a state's structure.\n\n\
            States with the same leaf paths share a fingerprint regardless of \
            values, kinds and key order."
    )]
    Fingerprint {
        /// State file
        file: PathBuf,
    },

    /// Inspect configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    tst completion bash >> ~/.bashrc

    # Zsh
    tst completion zsh > ~/.zfunc/_tst"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments shared by `split` and `extract`.
#[derive(clap::Args, Debug, Clone)]
pub struct PartitionArgs {
    /// State file
    pub file: PathBuf,

    /// Filter, in order; repeat for each part
    #[arg(short, long = "filter", value_name = "FILTER", required = true)]
    pub filters: Vec<String>,

    /// Write one file per part into this directory instead of stdout
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// List loaded config files, named filters and output settings
    List,
}

/// Supported shells for completion
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

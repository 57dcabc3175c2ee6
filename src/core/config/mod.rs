//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! treestate has two configuration scopes:
//! - **Global**: User-level settings
//! - **Project**: `treestate.toml` in the working directory
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Project config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$TST_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/treestate/config.toml`
//! 3. `~/.treestate/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use treestate::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("."))).unwrap();
//! let config = result.config;
//!
//! if let Some(selector) = config.filter("trainable").unwrap() {
//!     println!("trainable = {:?}", selector);
//! }
//! println!("Pretty: {}", config.pretty());
//! ```

pub mod schema;

pub use schema::{FileConfig, FilterSpec, OutputConfig};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::filter::Selector;

/// Name of the project config file.
pub const PROJECT_FILE: &str = "treestate.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Where a named filter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Project,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Project => "project",
        }
    }
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence: project config overrides global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: FileConfig,
    /// Project configuration (if present)
    pub project: Option<FileConfig>,
    global_path: Option<PathBuf>,
    project_path: Option<PathBuf>,
}

impl Config {
    /// Build from already-parsed files, with no on-disk origin.
    pub fn from_files(global: FileConfig, project: Option<FileConfig>) -> Self {
        Self {
            global,
            project,
            global_path: None,
            project_path: None,
        }
    }

    /// Load configuration from default locations.
    ///
    /// If `project_dir` is provided, also loads `treestate.toml` from it.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or fail
    /// validation. Missing config files are not an error.
    pub fn load(project_dir: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_from(Self::locate_global(), project_dir)
    }

    /// Load from an explicit global file and project directory.
    pub fn load_from(
        global_path: Option<PathBuf>,
        project_dir: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let global = match &global_path {
            Some(path) => Self::read_config(path)?,
            None => FileConfig::default(),
        };

        let project_path = project_dir
            .map(|dir| dir.join(PROJECT_FILE))
            .filter(|path| path.exists());
        let project = match &project_path {
            Some(path) => Some(Self::read_config(path)?),
            None => None,
        };

        global.validate()?;
        if let Some(ref p) = project {
            p.validate()?;
        }

        let mut warnings = Vec::new();
        if let (Some(p), Some(path)) = (&project, &project_path) {
            for name in p.filters.keys() {
                if global.filters.contains_key(name) {
                    warnings.push(ConfigWarning {
                        message: format!("project filter '{}' shadows the global one", name),
                        path: path.clone(),
                    });
                }
            }
        }

        tracing::debug!(
            global = ?global_path,
            project = ?project_path,
            "loaded configuration"
        );

        Ok(ConfigLoadResult {
            config: Config {
                global,
                project,
                global_path,
                project_path,
            },
            warnings,
        })
    }

    /// Find the global config file, if any.
    fn locate_global() -> Option<PathBuf> {
        // 1. Check $TST_CONFIG
        if let Ok(path) = std::env::var("TST_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/treestate/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("treestate/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.treestate/config.toml
        dirs::home_dir()
            .map(|home| home.join(".treestate/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Look up a named filter.
    ///
    /// Returns `Ok(None)` if no scope defines it.
    pub fn filter(&self, name: &str) -> Result<Option<Selector>, ConfigError> {
        let spec = self
            .project
            .as_ref()
            .and_then(|p| p.filters.get(name))
            .or_else(|| self.global.filters.get(name));
        spec.map(FilterSpec::selector).transpose()
    }

    /// Every named filter with the scope it resolves from.
    ///
    /// Global filters come first, then project-only ones.
    pub fn filters(&self) -> Vec<(&str, &FilterSpec, Scope)> {
        let project = self.project.as_ref();
        let mut out: Vec<(&str, &FilterSpec, Scope)> = self
            .global
            .filters
            .iter()
            .map(|(name, spec)| {
                match project.and_then(|p| p.filters.get(name)) {
                    Some(over) => (name.as_str(), over, Scope::Project),
                    None => (name.as_str(), spec, Scope::Global),
                }
            })
            .collect();
        if let Some(p) = project {
            out.extend(
                p.filters
                    .iter()
                    .filter(|(name, _)| !self.global.filters.contains_key(*name))
                    .map(|(name, spec)| (name.as_str(), spec, Scope::Project)),
            );
        }
        out
    }

    /// Whether JSON output is pretty-printed.
    ///
    /// Defaults to `true` if not configured.
    pub fn pretty(&self) -> bool {
        self.output_value(|o| o.pretty).unwrap_or(true)
    }

    /// Whether `show` prints nested JSON.
    ///
    /// Defaults to `false` if not configured.
    pub fn nested(&self) -> bool {
        self.output_value(|o| o.nested).unwrap_or(false)
    }

    fn output_value(&self, pick: impl Fn(&OutputConfig) -> Option<bool>) -> Option<bool> {
        self.project
            .as_ref()
            .and_then(|p| p.output.as_ref())
            .and_then(&pick)
            .or_else(|| self.global.output.as_ref().and_then(&pick))
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded project config file.
    pub fn project_config_loaded_from(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Kind;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_empty_defaults() {
        let temp = TempDir::new().unwrap();
        let result = Config::load_from(None, Some(temp.path())).unwrap();
        let config = result.config;

        assert!(config.filter("trainable").unwrap().is_none());
        assert!(config.pretty());
        assert!(!config.nested());
        assert!(config.global_config_loaded_from().is_none());
        assert!(config.project_config_loaded_from().is_none());
    }

    #[test]
    fn load_global_file() {
        let temp = TempDir::new().unwrap();
        let global = write(
            temp.path(),
            "config.toml",
            r#"
            [filters]
            trainable = "kind:param"

            [output]
            pretty = false
            "#,
        );

        let result = Config::load_from(Some(global.clone()), None).unwrap();
        let config = result.config;

        assert!(!config.pretty());
        assert_eq!(
            config.filter("trainable").unwrap(),
            Some(Selector::Kind(Kind::PARAM))
        );
        assert_eq!(config.global_config_loaded_from(), Some(global.as_path()));
    }

    #[test]
    fn project_overrides_global() {
        let temp = TempDir::new().unwrap();
        let global = write(
            temp.path(),
            "global.toml",
            r#"
            [filters]
            trainable = "kind:param"
            stats = "kind:batch_stat"

            [output]
            pretty = false
            nested = true
            "#,
        );
        write(
            temp.path(),
            PROJECT_FILE,
            r#"
            [filters]
            trainable = "prefix:head"
            local = "nothing"

            [output]
            pretty = true
            "#,
        );

        let result = Config::load_from(Some(global), Some(temp.path())).unwrap();
        let config = &result.config;

        assert!(config.pretty());
        assert!(config.nested());
        assert_eq!(
            config.filter("trainable").unwrap(),
            Some("prefix:head".parse().unwrap())
        );

        let listed: Vec<(&str, Scope)> = config
            .filters()
            .into_iter()
            .map(|(name, _, scope)| (name, scope))
            .collect();
        assert_eq!(
            listed,
            [
                ("trainable", Scope::Project),
                ("stats", Scope::Global),
                ("local", Scope::Project),
            ]
        );

        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("shadows"));
    }

    #[test]
    fn invalid_selector_rejected() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            PROJECT_FILE,
            r#"
            [filters]
            broken = "kind:"
            "#,
        );

        let result = Config::load_from(None, Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            PROJECT_FILE,
            r#"
            trunk = "main"
            "#,
        );

        let result = Config::load_from(None, Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn unreadable_global_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load_from(Some(temp.path().join("missing.toml")), None);
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }
}

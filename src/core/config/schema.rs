//! core::config::schema
//!
//! Configuration schema types.
//!
//! The global file and the project file share one schema. Project values
//! override global ones.
//!
//! # Validation
//!
//! Structured selectors are checked during deserialization. Compact
//! selectors and filter names are checked afterwards by
//! [`FileConfig::validate`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::filter::Selector;

/// One configuration file.
///
/// # Example
///
/// ```toml
/// [filters]
/// trainable = "kind:param"
/// stats = { any = [{ kind = "batch_stat" }, { kind = "counter" }] }
///
/// [output]
/// pretty = true
/// nested = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Named selectors, referenced from the command line as `@name`.
    pub filters: IndexMap<String, FilterSpec>,

    /// Output defaults
    pub output: Option<OutputConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a filter name is invalid or a
    /// compact selector does not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, spec) in &self.filters {
            validate_filter_name(name)?;
            spec.selector()?;
        }
        Ok(())
    }
}

/// A named filter: either compact selector syntax or a structured table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilterSpec {
    /// `name = "kind:param,prefix:head"`
    Compact(String),
    /// `name = { kind = "param" }`
    Structured(Selector),
}

impl FilterSpec {
    /// Resolve to a selector.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the compact form does not parse.
    pub fn selector(&self) -> Result<Selector, ConfigError> {
        match self {
            FilterSpec::Compact(text) => text
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("invalid selector '{text}': {e}"))),
            FilterSpec::Structured(selector) => Ok(selector.clone()),
        }
    }
}

/// Output defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: Option<bool>,

    /// `show` prints nested JSON instead of flat paths
    pub nested: Option<bool>,
}

fn validate_filter_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::InvalidValue(
            "filter name cannot be empty".to_string(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::InvalidValue(format!(
            "invalid filter name '{}', use letters, digits, '-' and '_'",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Kind;

    #[test]
    fn defaults() {
        let config = FileConfig::default();
        assert!(config.filters.is_empty());
        assert!(config.output.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn compact_and_structured_filters() {
        let config: FileConfig = toml::from_str(
            r#"
            [filters]
            trainable = "kind:param"
            stats = { any = [{ kind = "batch_stat" }, { kind = "counter" }] }
            "#,
        )
        .unwrap();
        assert_eq!(
            config.filters["trainable"].selector().unwrap(),
            Selector::Kind(Kind::PARAM)
        );
        assert_eq!(
            config.filters["stats"].selector().unwrap(),
            Selector::Any(vec![
                Selector::Kind(Kind::BATCH_STAT),
                Selector::Kind(Kind::COUNTER)
            ])
        );
        let names: Vec<&str> = config.filters.keys().map(String::as_str).collect();
        assert_eq!(names, ["trainable", "stats"]);
    }

    #[test]
    fn bad_compact_selector_fails_validation() {
        let config: FileConfig = toml::from_str(
            r#"
            [filters]
            broken = "colour:red"
            "#,
        )
        .unwrap();
        assert!(config.filters["broken"].selector().is_err());
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_filter_name() {
        let mut config = FileConfig::default();
        config
            .filters
            .insert("has space".into(), FilterSpec::Compact("...".into()));
        assert!(config.validate().is_err());
    }

    #[test]
    fn roundtrip() {
        let mut config = FileConfig {
            output: Some(OutputConfig {
                pretty: Some(false),
                nested: Some(true),
            }),
            ..Default::default()
        };
        config
            .filters
            .insert("trainable".into(), FilterSpec::Compact("kind:param".into()));

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: FileConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn reject_unknown_fields() {
        let toml = r#"
            [output]
            pretty = true
            colour = "always"
        "#;

        let result: Result<FileConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}

//! core::store
//!
//! State files on disk.
//!
//! # Format
//!
//! A state file is a JSON object in flat form: one entry per leaf, keyed by
//! its `/`-joined path, holding the cell's kind and value.
//!
//! ```json
//! {
//!   "layer1/w": { "kind": "param", "value": [0.1, 0.2] },
//!   "count": { "kind": "counter", "value": 3 }
//! }
//! ```
//!
//! Leaf values are arbitrary JSON and are never interpreted. A path may
//! appear only once per file.
//!
//! # Writes
//!
//! Writes are atomic: the file is written to a sibling temp file, synced,
//! and renamed into place. A failed write removes the temp file.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::cell::Cell;
use super::error::StateError;
use super::flat::FlatState;
use super::state::{State, Tree};
use super::types;

/// A state whose leaves are arbitrary JSON values.
pub type JsonState = State<Value>;

/// Errors from reading or writing state files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read state file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse state file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("state file '{path}' is malformed: {source}")]
    Malformed { path: PathBuf, source: StateError },

    #[error("failed to write state file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize state: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Entries of a state file in file order, duplicates included.
struct Entries(Vec<(types::Path, Cell<Value>)>);

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object mapping paths to cells")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Entries, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Parse a state from flat JSON text.
///
/// # Errors
///
/// Returns `StoreError::ParseError` for invalid JSON or invalid paths, and
/// `StoreError::Malformed` if a path repeats or paths conflict.
pub fn parse_state(text: &str, origin: &Path) -> Result<JsonState, StoreError> {
    let malformed = |source| StoreError::Malformed {
        path: origin.to_path_buf(),
        source,
    };
    let Entries(entries) =
        serde_json::from_str(text).map_err(|source| StoreError::ParseError {
            path: origin.to_path_buf(),
            source,
        })?;

    let mut flat = FlatState::new();
    for (path, cell) in entries {
        if flat.contains_path(path.as_str()) {
            return Err(malformed(StateError::DuplicatePath(path)));
        }
        flat.insert(path, cell);
    }
    State::from_flat_state(flat).map_err(malformed)
}

/// Load a state file.
///
/// # Errors
///
/// Returns `StoreError::ReadError` if the file cannot be read, plus the
/// errors of [`parse_state`].
pub fn load_state(path: &Path) -> Result<JsonState, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let state = parse_state(&text, path)?;
    debug!(path = %path.display(), "loaded state");
    Ok(state)
}

/// Render a state as flat JSON text.
pub fn render_state(state: &JsonState, pretty: bool) -> Result<String, StoreError> {
    let flat = state.flat_state();
    let mut text = if pretty {
        serde_json::to_string_pretty(&flat)?
    } else {
        serde_json::to_string(&flat)?
    };
    text.push('\n');
    Ok(text)
}

/// Write a state file atomically, creating parent directories as needed.
///
/// # Errors
///
/// Returns `StoreError::WriteError` on any filesystem failure.
pub fn save_state(path: &Path, state: &JsonState, pretty: bool) -> Result<(), StoreError> {
    let contents = render_state(state, pretty)?;
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| StoreError::WriteError { path, source }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err(path))?;
    }

    let temp_path = path.with_extension("json.tmp");
    let written = write_temp(&temp_path, contents.as_bytes())
        .map_err(write_err(&temp_path))
        .and_then(|()| fs::rename(&temp_path, path).map_err(write_err(path)));
    if let Err(err) = written {
        // The write error wins over a failed cleanup.
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    debug!(path = %path.display(), "saved state");
    Ok(())
}

fn write_temp(temp_path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::Node;
    use crate::core::types::Kind;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> JsonState {
        let layer = State::from_entries([("w", Node::from(Cell::param(json!([0.1, 0.2]))))])
            .unwrap();
        State::from_entries([
            ("layer1", Node::from(layer)),
            ("count", Node::from(Cell::new(json!(3), Kind::COUNTER))),
        ])
        .unwrap()
    }

    #[test]
    fn save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/state.json");
        save_state(&path, &sample(), true).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(load_state(&path).unwrap(), sample());
    }

    #[test]
    fn compact_rendering() {
        let text = render_state(&sample(), false).unwrap();
        assert_eq!(
            text,
            "{\"layer1/w\":{\"kind\":\"param\",\"value\":[0.1,0.2]},\"count\":{\"kind\":\"counter\",\"value\":3}}\n"
        );
    }

    #[test]
    fn keeps_file_order() {
        let state = parse_state(
            r#"{"z": {"kind": "param", "value": 1}, "a": {"kind": "param", "value": 2}}"#,
            Path::new("inline"),
        )
        .unwrap();
        assert_eq!(
            state.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
            ["z", "a"]
        );
    }

    #[test]
    fn missing_file() {
        let temp = TempDir::new().unwrap();
        let err = load_state(&temp.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, StoreError::ReadError { .. }));
    }

    #[test]
    fn invalid_json() {
        let err = parse_state("{not json", Path::new("inline")).unwrap_err();
        assert!(matches!(err, StoreError::ParseError { .. }));
    }

    #[test]
    fn conflicting_paths() {
        let err = parse_state(
            r#"{"a": {"kind": "param", "value": 1}, "a/b": {"kind": "param", "value": 2}}"#,
            Path::new("inline"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Malformed {
                source: StateError::PathConflict(_),
                ..
            }
        ));
    }

    #[test]
    fn repeated_path_is_malformed() {
        let err = parse_state(
            r#"{"w": {"kind": "param", "value": 1}, "w": {"kind": "param", "value": 2}}"#,
            Path::new("inline"),
        )
        .unwrap_err();
        match err {
            StoreError::Malformed {
                source: StateError::DuplicatePath(path),
                ..
            } => assert_eq!(path.as_str(), "w"),
            other => panic!("expected a duplicate path error, got {other:?}"),
        }
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        let err = save_state(&path, &sample(), true).unwrap_err();
        assert!(matches!(err, StoreError::WriteError { .. }));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn missing_kind_is_a_parse_error() {
        let err = parse_state(r#"{"a": {"value": 1}}"#, Path::new("inline")).unwrap_err();
        assert!(matches!(err, StoreError::ParseError { .. }));
    }
}

//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Key`] - A single container key (one path component)
//! - [`Path`] - A `/`-joined sequence of keys addressing a leaf
//! - [`Kind`] - The variant tag carried by every cell
//!
//! # Validation
//!
//! These types enforce validity at construction time. A key can never
//! contain the path separator, so joining keys into a path and splitting
//! it again always yields the same keys.
//!
//! # Examples
//!
//! ```
//! use treestate::core::types::{Key, Kind, Path};
//!
//! let layer = Key::new("layer1").unwrap();
//! let path = Path::from_keys([layer, Key::new("w").unwrap()]).unwrap();
//! assert_eq!(path.as_str(), "layer1/w");
//!
//! assert!(Key::new("a/b").is_err());
//! assert!(Path::new("a//b").is_err());
//! assert_eq!(Kind::new("param").unwrap(), Kind::PARAM);
//! ```

use std::borrow::{Borrow, Cow};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between path components.
pub const SEPARATOR: char = '/';

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid kind: {0}")]
    InvalidKind(String),

    #[error("invalid selector: {0}")]
    InvalidSelector(String),
}

/// A validated container key.
///
/// Keys must be non-empty and must not contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key(String);

impl Key {
    /// Create a new validated key.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidKey` if the key is empty or contains `/`.
    pub fn new(key: impl Into<String>) -> Result<Self, TypeError> {
        let key = key.into();
        Self::validate(&key)?;
        Ok(Self(key))
    }

    fn validate(key: &str) -> Result<(), TypeError> {
        if key.is_empty() {
            return Err(TypeError::InvalidKey("key cannot be empty".into()));
        }
        if key.contains(SEPARATOR) {
            return Err(TypeError::InvalidKey(format!(
                "key '{key}' cannot contain '{SEPARATOR}'"
            )));
        }
        Ok(())
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Self(index.to_string())
    }
}

impl TryFrom<String> for Key {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Key {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated `/`-joined path of one or more keys.
///
/// # Example
///
/// ```
/// use treestate::core::types::Path;
///
/// let path = Path::new("layer1/w").unwrap();
/// assert_eq!(path.components().collect::<Vec<_>>(), vec!["layer1", "w"]);
/// assert!(path.starts_with(&Path::new("layer1").unwrap()));
/// assert!(!path.starts_with(&Path::new("layer").unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path(String);

impl Path {
    /// Parse and validate a path string.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPath` if the path is empty or has an
    /// empty component (leading, trailing or doubled `/`).
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        if path.is_empty() {
            return Err(TypeError::InvalidPath("path cannot be empty".into()));
        }
        if path.split(SEPARATOR).any(str::is_empty) {
            return Err(TypeError::InvalidPath(format!(
                "path '{path}' has an empty component"
            )));
        }
        Ok(Self(path))
    }

    /// Build a path by joining keys.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPath` if no keys are given.
    pub fn from_keys<I>(keys: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = Key>,
    {
        let joined = keys
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
            .join("/");
        if joined.is_empty() {
            return Err(TypeError::InvalidPath("path cannot be empty".into()));
        }
        Ok(Self(joined))
    }

    /// A single-component path.
    pub fn root(key: &Key) -> Self {
        Self(key.as_str().to_string())
    }

    /// Extend this path by one key.
    pub fn child(&self, key: &Key) -> Self {
        Self(format!("{}{}{}", self.0, SEPARATOR, key.as_str()))
    }

    /// Join an optional prefix with a key.
    pub(crate) fn join(prefix: Option<&Path>, key: &Key) -> Self {
        match prefix {
            Some(prefix) => prefix.child(key),
            None => Self::root(key),
        }
    }

    /// Iterate over the path components.
    pub fn components(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.split(SEPARATOR)
    }

    /// Path components as owned keys.
    ///
    /// Components of a validated path are always valid keys.
    pub fn keys(&self) -> Vec<Key> {
        self.components().map(|c| Key(c.to_string())).collect()
    }

    /// Number of components.
    pub fn depth(&self) -> usize {
        self.components().count()
    }

    /// Component-wise prefix test.
    ///
    /// `a/bc` does not start with `a/b`, but `a/b/c` does.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        match self.0.strip_prefix(prefix.as_str()) {
            Some("") => true,
            Some(rest) => rest.starts_with(SEPARATOR),
            None => false,
        }
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Path {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Path {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.0
    }
}

impl Borrow<str> for Path {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The variant tag of a cell.
///
/// The container never interprets a kind; it only exists so filters can
/// select cells by category (trainable parameters, counters, caches).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Kind(Cow<'static, str>);

impl Kind {
    /// Trainable parameters.
    pub const PARAM: Kind = Kind(Cow::Borrowed("param"));
    /// Running statistics updated outside of gradient steps.
    pub const BATCH_STAT: Kind = Kind(Cow::Borrowed("batch_stat"));
    /// Autoregressive caches.
    pub const CACHE: Kind = Kind(Cow::Borrowed("cache"));
    /// Step or call counters.
    pub const COUNTER: Kind = Kind(Cow::Borrowed("counter"));
    /// Values captured during a forward pass.
    pub const INTERMEDIATE: Kind = Kind(Cow::Borrowed("intermediate"));

    /// Create a new validated kind.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidKind` if the kind is empty or contains
    /// whitespace, `:` or `,` (reserved by the selector syntax).
    pub fn new(kind: impl Into<String>) -> Result<Self, TypeError> {
        let kind = kind.into();
        if kind.is_empty() {
            return Err(TypeError::InvalidKind("kind cannot be empty".into()));
        }
        if let Some(c) = kind
            .chars()
            .find(|c| c.is_whitespace() || *c == ':' || *c == ',')
        {
            return Err(TypeError::InvalidKind(format!(
                "kind '{kind}' cannot contain {c:?}"
            )));
        }
        Ok(Self(Cow::Owned(kind)))
    }

    /// Get the kind as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Kind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Kind {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> Self {
        kind.0.into_owned()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod key {
        use super::*;

        #[test]
        fn valid_keys() {
            assert!(Key::new("w").is_ok());
            assert!(Key::new("layer_1").is_ok());
            assert!(Key::new("0").is_ok());
        }

        #[test]
        fn rejects_empty() {
            assert!(matches!(Key::new(""), Err(TypeError::InvalidKey(_))));
        }

        #[test]
        fn rejects_separator() {
            assert!(matches!(Key::new("a/b"), Err(TypeError::InvalidKey(_))));
        }

        #[test]
        fn from_index() {
            assert_eq!(Key::from(3).as_str(), "3");
        }

        #[test]
        fn serde_roundtrip() {
            let key = Key::new("bias").unwrap();
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, "\"bias\"");
            let parsed: Key = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, key);
        }

        #[test]
        fn serde_rejects_invalid() {
            let result: Result<Key, _> = serde_json::from_str("\"a/b\"");
            assert!(result.is_err());
        }
    }

    mod path {
        use super::*;

        #[test]
        fn parses_nested() {
            let path = Path::new("a/b/c").unwrap();
            assert_eq!(path.depth(), 3);
            assert_eq!(path.keys().len(), 3);
        }

        #[test]
        fn rejects_empty_components() {
            assert!(Path::new("").is_err());
            assert!(Path::new("/a").is_err());
            assert!(Path::new("a/").is_err());
            assert!(Path::new("a//b").is_err());
        }

        #[test]
        fn from_keys_joins() {
            let keys = vec![Key::new("x").unwrap(), Key::new("y").unwrap()];
            assert_eq!(Path::from_keys(keys).unwrap().as_str(), "x/y");
        }

        #[test]
        fn from_keys_rejects_empty() {
            assert!(Path::from_keys(Vec::new()).is_err());
        }

        #[test]
        fn child_appends() {
            let path = Path::new("a").unwrap();
            assert_eq!(path.child(&Key::new("b").unwrap()).as_str(), "a/b");
        }

        #[test]
        fn starts_with_is_component_wise() {
            let path = Path::new("layer1/w").unwrap();
            assert!(path.starts_with(&Path::new("layer1").unwrap()));
            assert!(path.starts_with(&Path::new("layer1/w").unwrap()));
            assert!(!path.starts_with(&Path::new("layer").unwrap()));
            assert!(!path.starts_with(&Path::new("layer1/w/x").unwrap()));
        }
    }

    mod kind {
        use super::*;

        #[test]
        fn constants_match_parsed() {
            assert_eq!(Kind::new("param").unwrap(), Kind::PARAM);
            assert_eq!(Kind::new("counter").unwrap(), Kind::COUNTER);
        }

        #[test]
        fn rejects_reserved_chars() {
            assert!(Kind::new("").is_err());
            assert!(Kind::new("a b").is_err());
            assert!(Kind::new("a:b").is_err());
            assert!(Kind::new("a,b").is_err());
        }

        #[test]
        fn display() {
            assert_eq!(Kind::BATCH_STAT.to_string(), "batch_stat");
        }
    }
}

//! core::filter
//!
//! Filters select leaves by path and cell attributes.
//!
//! # Forms
//!
//! A [`Filter`] is one of:
//! - the catch-all, which matches every leaf and may only appear last in an
//!   ordered filter list,
//! - a declarative [`Selector`] (by kind, by path, combinations), or
//! - an arbitrary predicate closure over `(path, cell)`.
//!
//! [`to_predicate`] compiles any of these into a callable.
//!
//! # Selector Syntax
//!
//! Selectors parse from a compact string form:
//!
//! | Form            | Meaning                                 |
//! |-----------------|-----------------------------------------|
//! | `...` or `*`    | everything                              |
//! | `everything`    | everything                              |
//! | `nothing`       | nothing                                 |
//! | `kind:NAME`     | cells whose kind is `NAME`              |
//! | `path:A/B`      | the leaf at exactly `A/B`               |
//! | `prefix:A`      | leaves at or below `A`                  |
//! | `!TERM`         | negation of a term                      |
//! | `T1,T2`         | any of the terms                        |
//!
//! # Example
//!
//! ```
//! use treestate::core::filter::Selector;
//! use treestate::core::types::{Kind, Path};
//!
//! let selector: Selector = "kind:param,prefix:head".parse().unwrap();
//! assert!(selector.matches(&Path::new("body/w").unwrap(), &Kind::PARAM));
//! assert!(selector.matches(&Path::new("head/count").unwrap(), &Kind::COUNTER));
//! assert!(!selector.matches(&Path::new("body/count").unwrap(), &Kind::COUNTER));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::types::{Kind, Path, TypeError};

/// A compiled filter.
pub type Predicate<L> = Arc<dyn Fn(&Path, &Cell<L>) -> bool + Send + Sync>;

/// Declarative leaf selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// Matches every leaf.
    Everything,
    /// Matches no leaf.
    Nothing,
    /// Matches cells of one kind.
    Kind(Kind),
    /// Matches the leaf at exactly this path.
    Path(Path),
    /// Matches leaves at or below this path.
    Prefix(Path),
    /// Matches when any inner selector matches.
    Any(Vec<Selector>),
    /// Matches when every inner selector matches.
    All(Vec<Selector>),
    /// Matches when the inner selector does not.
    Not(Box<Selector>),
}

impl Selector {
    /// Evaluate the selector against a leaf's path and kind.
    pub fn matches(&self, path: &Path, kind: &Kind) -> bool {
        match self {
            Selector::Everything => true,
            Selector::Nothing => false,
            Selector::Kind(expected) => kind == expected,
            Selector::Path(expected) => path == expected,
            Selector::Prefix(prefix) => path.starts_with(prefix),
            Selector::Any(inner) => inner.iter().any(|s| s.matches(path, kind)),
            Selector::All(inner) => inner.iter().all(|s| s.matches(path, kind)),
            Selector::Not(inner) => !inner.matches(path, kind),
        }
    }

    /// Whether the selector claims every leaf regardless of path or kind.
    ///
    /// True for `everything`, an any-of that contains such a selector, a
    /// non-empty all-of made only of such selectors, and `!nothing`.
    pub fn matches_everything(&self) -> bool {
        match self {
            Selector::Everything => true,
            Selector::Any(inner) => inner.iter().any(Selector::matches_everything),
            Selector::All(inner) => {
                !inner.is_empty() && inner.iter().all(Selector::matches_everything)
            }
            Selector::Not(inner) => matches!(**inner, Selector::Nothing),
            _ => false,
        }
    }

    fn parse_term(term: &str) -> Result<Self, TypeError> {
        let term = term.trim();
        if let Some(rest) = term.strip_prefix('!') {
            return Ok(Selector::Not(Box::new(Self::parse_term(rest)?)));
        }
        match term {
            "" => Err(TypeError::InvalidSelector("empty selector".into())),
            "..." | "*" | "everything" => Ok(Selector::Everything),
            "nothing" => Ok(Selector::Nothing),
            _ => {
                let (tag, value) = term.split_once(':').ok_or_else(|| {
                    TypeError::InvalidSelector(format!(
                        "'{term}' must be '...', 'nothing', or 'kind:', 'path:', 'prefix:' followed by a value"
                    ))
                })?;
                match tag {
                    "kind" => Ok(Selector::Kind(Kind::new(value)?)),
                    "path" => Ok(Selector::Path(Path::new(value)?)),
                    "prefix" => Ok(Selector::Prefix(Path::new(value)?)),
                    other => Err(TypeError::InvalidSelector(format!(
                        "unknown selector tag '{other}'"
                    ))),
                }
            }
        }
    }
}

impl FromStr for Selector {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut terms = s
            .split(',')
            .map(Self::parse_term)
            .collect::<Result<Vec<_>, _>>()?;
        if terms.len() == 1 {
            Ok(terms.remove(0))
        } else {
            Ok(Selector::Any(terms))
        }
    }
}

/// One entry of an ordered filter list.
pub enum Filter<L> {
    /// The catch-all. Only valid as the last filter of a list.
    Everything,
    /// A declarative selector.
    Selector(Selector),
    /// An arbitrary predicate over `(path, cell)`.
    Predicate(Predicate<L>),
}

impl<L> Filter<L> {
    /// The catch-all filter.
    pub fn everything() -> Self {
        Filter::Everything
    }

    /// Select cells of one kind.
    pub fn kind(kind: Kind) -> Self {
        Filter::Selector(Selector::Kind(kind))
    }

    /// Wrap a predicate closure.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Path, &Cell<L>) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Arc::new(f))
    }

    /// Whether this filter is the catch-all.
    ///
    /// Any selector that claims every leaf counts as the catch-all as well,
    /// so `...,kind:param` is subject to the same ordering rule as `...`.
    pub fn is_catch_all(&self) -> bool {
        match self {
            Filter::Everything => true,
            Filter::Selector(selector) => selector.matches_everything(),
            Filter::Predicate(_) => false,
        }
    }

    /// Evaluate the filter against one leaf.
    pub fn matches(&self, path: &Path, cell: &Cell<L>) -> bool {
        match self {
            Filter::Everything => true,
            Filter::Selector(selector) => selector.matches(path, cell.kind()),
            Filter::Predicate(predicate) => predicate(path, cell),
        }
    }
}

impl<L> Clone for Filter<L> {
    fn clone(&self) -> Self {
        match self {
            Filter::Everything => Filter::Everything,
            Filter::Selector(selector) => Filter::Selector(selector.clone()),
            Filter::Predicate(predicate) => Filter::Predicate(Arc::clone(predicate)),
        }
    }
}

impl<L> fmt::Debug for Filter<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Everything => f.write_str("Everything"),
            Filter::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl<L> From<Selector> for Filter<L> {
    fn from(selector: Selector) -> Self {
        Filter::Selector(selector)
    }
}

impl<L> From<Kind> for Filter<L> {
    fn from(kind: Kind) -> Self {
        Filter::kind(kind)
    }
}

/// Compile a filter into a predicate callable.
pub fn to_predicate<L: 'static>(filter: &Filter<L>) -> Predicate<L> {
    match filter {
        Filter::Everything => Arc::new(|_: &Path, _: &Cell<L>| true),
        Filter::Selector(selector) => {
            let selector = selector.clone();
            Arc::new(move |path: &Path, cell: &Cell<L>| {
                selector.matches(path, cell.kind())
            })
        }
        Filter::Predicate(predicate) => Arc::clone(predicate),
    }
}

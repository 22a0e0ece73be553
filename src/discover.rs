//! Bean discovery modes.
//!
//! A discovery mode decides which classes of an archive are considered as beans.
//! Callers hold a *set* of modes ([`DiscoverySet`]) built from a `discover`
//! expression: every token adds a mode, a token prefixed with `!` removes it.
//!
//! Parsing never adds an implicit default; callers apply
//! [`Discover::AnnotatedByBean`] themselves when the resulting set is empty
//! (see [`DiscoverySet::or_default`]).
//!
//! # Examples
//!
//! ```rust
//! use cdi_capgen::discover::{Discover, DiscoverySet};
//!
//! let mut modes = DiscoverySet::new();
//! modes.parse("all").unwrap();
//! modes.parse("!all").unwrap();
//! assert!(modes.is_empty());
//!
//! assert!(modes.parse("sometimes").is_err());
//! assert!(modes.or_default().contains(Discover::AnnotatedByBean));
//! ```

use crate::core::{CapgenError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Maximum Levenshtein distance for "did you mean" suggestions.
const SUGGESTION_DISTANCE: usize = 3;

/// One bean discovery mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discover {
    /// Every class is a candidate bean.
    All,
    /// Only classes with a bean defining annotation are candidates.
    Annotated,
    /// Only classes marked with `@Bean`, or listed by a package `@Beans`.
    AnnotatedByBean,
    /// Nothing is discovered.
    None,
}

impl Discover {
    /// All modes, in declaration order.
    pub const ALL: [Self; 4] = [Self::All, Self::Annotated, Self::AnnotatedByBean, Self::None];

    /// The name used in instructions and descriptors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Annotated => "annotated",
            Self::AnnotatedByBean => "annotated_by_bean",
            Self::None => "none",
        }
    }

    fn closest(token: &str) -> Option<String> {
        Self::ALL
            .iter()
            .map(|mode| (mode.as_str(), strsim::levenshtein(token, mode.as_str())))
            .filter(|(_, distance)| *distance <= SUGGESTION_DISTANCE)
            .min_by_key(|(_, distance)| *distance)
            .map(|(name, _)| name.to_string())
    }
}

impl fmt::Display for Discover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Discover {
    type Err = CapgenError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == s).ok_or_else(|| {
            CapgenError::DiscoveryMode {
                token: s.to_string(),
                suggestion: Self::closest(s),
            }
        })
    }
}

/// A mutable set of discovery modes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiscoverySet {
    modes: BTreeSet<Discover>,
}

impl DiscoverySet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one token: `mode` adds it, `!mode` removes it.
    ///
    /// # Errors
    ///
    /// Returns [`CapgenError::DiscoveryMode`] when the token (without `!`) is not
    /// a known mode. The set is left untouched in that case.
    pub fn parse(&mut self, token: &str) -> Result<()> {
        let token = token.trim();
        let (negated, name) = match token.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, token),
        };

        let mode: Discover = name.parse()?;
        if negated {
            self.modes.remove(&mode);
        } else {
            self.modes.insert(mode);
        }
        Ok(())
    }

    /// Apply every token of an expression separated by commas or whitespace.
    ///
    /// Stops at the first unknown token; tokens before it stay applied.
    pub fn parse_expression(&mut self, expression: &str) -> Result<()> {
        expression
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .try_for_each(|token| self.parse(token))
    }

    pub fn insert(&mut self, mode: Discover) {
        self.modes.insert(mode);
    }

    #[must_use]
    pub fn contains(&self, mode: Discover) -> bool {
        self.modes.contains(&mode)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn clear(&mut self) {
        self.modes.clear();
    }

    /// The set itself, or `{annotated_by_bean}` when it is empty.
    #[must_use]
    pub fn or_default(mut self) -> Self {
        if self.modes.is_empty() {
            self.modes.insert(Discover::AnnotatedByBean);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = Discover> + '_ {
        self.modes.iter().copied()
    }
}

impl FromIterator<Discover> for DiscoverySet {
    fn from_iter<I: IntoIterator<Item = Discover>>(iter: I) -> Self {
        Self {
            modes: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for DiscoverySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.modes.iter().map(|m| m.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

//! Class-name instructions.
//!
//! An instruction selects classes by fully-qualified name. Instructions are
//! written in bnd style and are the way users tell the analyzer which classes to
//! consider, and with which attributes (`discover`, `noservicecapabilities`,
//! `noservicerequirements`).
//!
//! # Syntax
//!
//! - `com.acme.Greeter` matches exactly that class
//! - `*` matches any sequence of characters (dots included)
//! - `?` matches any single character
//! - `[abc]` / `[a-z]` match one character of a set or range
//! - `com.acme.*` matches every class below `com.acme`, and `com.acme` itself
//! - a leading `!` negates the instruction: a class it matches is excluded
//!
//! [`Instructions`] keeps declaration order; the first instruction that matches a
//! name decides, so `!com.acme.internal.*,com.acme.*` excludes the internal
//! package and includes the rest.
//!
//! # Examples
//!
//! ```rust
//! use cdi_capgen::instruction::Instructions;
//!
//! let instructions = Instructions::parse("!com.acme.internal.*,com.acme.*;discover=all").unwrap();
//!
//! let (instruction, attrs) = instructions.first_match("com.acme.Greeter").unwrap();
//! assert!(!instruction.is_negated());
//! assert_eq!(attrs.get("discover"), Some("all"));
//!
//! let (instruction, _) = instructions.first_match("com.acme.internal.Impl").unwrap();
//! assert!(instruction.is_negated());
//! ```

use crate::core::{CapgenError, Result};
use crate::header::{Attrs, Parameters};
use glob::Pattern;
use std::fmt;
use tracing::trace;

/// A single compiled instruction.
#[derive(Debug, Clone)]
pub struct Instruction {
    original: String,
    negated: bool,
    matcher: NameMatcher,
}

#[derive(Debug, Clone)]
enum NameMatcher {
    Literal(String),
    Glob {
        pattern: Pattern,
        /// Bare package also matched by a trailing `.*`.
        package: Option<String>,
    },
}

impl Instruction {
    /// Compile an instruction.
    ///
    /// # Errors
    ///
    /// Returns [`CapgenError::InvalidInstruction`] for empty instructions and
    /// invalid glob syntax.
    pub fn new(input: &str) -> Result<Self> {
        let original = input.trim().to_string();
        let (negated, body) = match original.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, original.as_str()),
        };

        if body.is_empty() {
            return Err(CapgenError::InvalidInstruction {
                instruction: original.clone(),
                reason: "empty pattern".to_string(),
            });
        }

        let matcher = if body.contains(['*', '?', '[']) {
            let pattern = Pattern::new(body).map_err(|e| CapgenError::InvalidInstruction {
                instruction: original.clone(),
                reason: e.to_string(),
            })?;
            let package = body.strip_suffix(".*").map(str::to_string);
            NameMatcher::Glob {
                pattern,
                package,
            }
        } else {
            NameMatcher::Literal(body.to_string())
        };

        Ok(Self {
            original,
            negated,
            matcher,
        })
    }

    /// Whether `name` matches the pattern, ignoring negation.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match &self.matcher {
            NameMatcher::Literal(literal) => literal == name,
            NameMatcher::Glob {
                pattern,
                package,
            } => pattern.matches(name) || package.as_deref() == Some(name),
        }
    }

    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    /// The instruction as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.original
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// An ordered list of instructions with their attributes.
#[derive(Debug, Clone, Default)]
pub struct Instructions {
    entries: Vec<(Instruction, Attrs)>,
}

impl Instructions {
    /// Parse a bnd-style header, e.g. `com.acme.*;discover=all,!com.acme.test.*`.
    ///
    /// # Errors
    ///
    /// Returns an error when the header is malformed or a pattern is invalid.
    pub fn parse(header: &str) -> Result<Self> {
        let parameters = Parameters::parse(header)?;
        let entries = parameters
            .into_iter()
            .map(|clause| Ok((Instruction::new(&clause.key)?, clause.attrs)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            entries,
        })
    }

    /// Build attribute-less instructions from plain patterns.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = patterns
            .into_iter()
            .map(|p| Ok((Instruction::new(p.as_ref())?, Attrs::default())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            entries,
        })
    }

    /// The first instruction (in declaration order) matching `name`.
    #[must_use]
    pub fn first_match(&self, name: &str) -> Option<(&Instruction, &Attrs)> {
        let hit = self
            .entries
            .iter()
            .find(|(instruction, _)| instruction.matches(name))
            .map(|(instruction, attrs)| (instruction, attrs));
        if let Some((instruction, _)) = hit {
            trace!("'{name}' matched instruction '{instruction}'");
        }
        hit
    }

    /// Whether `name` is selected: its first match exists and is not negated.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.first_match(name).is_some_and(|(instruction, _)| !instruction.is_negated())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Instruction, &Attrs)> {
        self.entries.iter().map(|(i, a)| (i, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_instruction() {
        let instruction = Instruction::new("com.acme.Greeter").unwrap();
        assert!(instruction.matches("com.acme.Greeter"));
        assert!(!instruction.matches("com.acme.GreeterImpl"));
        assert!(!instruction.is_negated());
    }

    #[test]
    fn test_wildcard_crosses_package_boundaries() {
        let instruction = Instruction::new("com.*.Impl").unwrap();
        assert!(instruction.matches("com.acme.Impl"));
        assert!(instruction.matches("com.acme.deep.Impl"));
        assert!(!instruction.matches("org.acme.Impl"));
    }

    #[test]
    fn test_package_wildcard_matches_bare_package() {
        let instruction = Instruction::new("com.acme.*").unwrap();
        assert!(instruction.matches("com.acme"));
        assert!(instruction.matches("com.acme.Greeter"));
        assert!(instruction.matches("com.acme.sub.Greeter"));
        assert!(!instruction.matches("com.acmefoo.Greeter"));
    }

    #[test]
    fn test_question_mark_and_class() {
        let instruction = Instruction::new("com.acme.Bean[0-9]?").unwrap();
        assert!(instruction.matches("com.acme.Bean1X"));
        assert!(!instruction.matches("com.acme.BeanXX"));
    }

    #[test]
    fn test_nested_class_names() {
        let instruction = Instruction::new("com.acme.Outer$*").unwrap();
        assert!(instruction.matches("com.acme.Outer$Inner"));
        assert!(!instruction.matches("com.acme.Outer"));
    }

    #[test]
    fn test_negated_instruction() {
        let instruction = Instruction::new("!com.acme.*").unwrap();
        assert!(instruction.is_negated());
        assert!(instruction.matches("com.acme.Greeter"));
        assert_eq!(instruction.as_str(), "!com.acme.*");
    }

    #[test]
    fn test_invalid_instructions() {
        assert!(Instruction::new("").is_err());
        assert!(Instruction::new("!").is_err());
        assert!(Instruction::new("com.acme.[").is_err());
    }

    #[test]
    fn test_first_match_wins() {
        let instructions = Instructions::parse("!com.acme.internal.*,com.acme.*").unwrap();
        assert!(!instructions.matches("com.acme.internal.Impl"));
        assert!(instructions.matches("com.acme.Greeter"));
        assert!(!instructions.matches("org.other.Greeter"));
        assert_eq!(instructions.len(), 2);
    }

    #[test]
    fn test_attributes_are_kept() {
        let instructions =
            Instructions::parse("com.acme.*;discover=annotated;noservicerequirements=true").unwrap();
        let (_, attrs) = instructions.first_match("com.acme.Greeter").unwrap();
        assert_eq!(attrs.get("discover"), Some("annotated"));
        assert!(attrs.contains_key("noservicerequirements"));
        assert!(!attrs.contains_key("noservicecapabilities"));
    }

    #[test]
    fn test_from_patterns() {
        let instructions = Instructions::from_patterns(["com.acme.A", "com.acme.B"]).unwrap();
        assert!(instructions.matches("com.acme.A"));
        assert!(instructions.matches("com.acme.B"));
        assert!(!instructions.matches("com.acme.C"));
    }
}

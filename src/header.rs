//! OSGi manifest header model.
//!
//! Headers such as `Require-Capability` are a comma separated list of clauses;
//! each clause is a name followed by `;`-separated attributes (`key=value`,
//! typed as `key:Type=value`) and directives (`key:=value`):
//!
//! ```text
//! osgi.service;objectClass:List<String>="com.acme.Greeter",osgi.extender;filter:="(osgi.extender=osgi.cdi)"
//! ```
//!
//! [`Parameters::parse`] reads such a value, and the `Display` implementations
//! write it back. Values are quoted when they are not plain tokens; typed list
//! values are always quoted. A clause written with several names
//! (`a;b;x=1`) expands to one clause per name sharing the attributes.
//!
//! # Examples
//!
//! ```rust
//! use cdi_capgen::header::Parameters;
//!
//! let parameters = Parameters::parse(r#"osgi.service;filter:="(objectClass=com.acme.Foo)";effective:=active"#).unwrap();
//! let clause = parameters.iter().next().unwrap();
//! assert_eq!(clause.key, "osgi.service");
//! assert_eq!(clause.attrs.directive("filter"), Some("(objectClass=com.acme.Foo)"));
//! assert_eq!(
//!     clause.to_string(),
//!     r#"osgi.service;filter:="(objectClass=com.acme.Foo)";effective:=active"#
//! );
//! ```

use crate::core::{CapgenError, Result};
use std::fmt;

/// Whether an attribute is a plain attribute or a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrKind {
    /// `key=value`, or `key:Type=value` when typed.
    Attribute { ty: Option<String> },
    /// `key:=value`
    Directive,
}

/// One attribute or directive of a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub key: String,
    pub kind: AttrKind,
    /// Unquoted value.
    pub value: String,
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)?;
        let always_quote = match &self.kind {
            AttrKind::Attribute {
                ty: Some(ty),
            } => {
                write!(f, ":{ty}=")?;
                ty.starts_with("List")
            }
            AttrKind::Attribute {
                ty: None,
            } => {
                f.write_str("=")?;
                false
            }
            AttrKind::Directive => {
                f.write_str(":=")?;
                false
            }
        };
        write_value(f, &self.value, always_quote)
    }
}

fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &str, always_quote: bool) -> fmt::Result {
    if value.len() > 1 && value.starts_with('"') && value.ends_with('"') {
        return f.write_str(value);
    }
    if !always_quote && is_token(value) {
        return f.write_str(value);
    }
    f.write_str("\"")?;
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

/// Ordered attributes and directives of a clause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    entries: Vec<Attr>,
}

impl Attrs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn upsert(&mut self, attr: Attr) {
        let is_directive = attr.kind == AttrKind::Directive;
        match self
            .entries
            .iter_mut()
            .find(|e| e.key == attr.key && (e.kind == AttrKind::Directive) == is_directive)
        {
            Some(existing) => *existing = attr,
            None => self.entries.push(attr),
        }
    }

    /// Set an untyped attribute, replacing any attribute of the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.upsert(Attr {
            key: key.into(),
            kind: AttrKind::Attribute {
                ty: None,
            },
            value: value.into(),
        });
    }

    /// Set a typed attribute such as `objectClass:List<String>`.
    pub fn insert_typed(
        &mut self,
        key: impl Into<String>,
        ty: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.upsert(Attr {
            key: key.into(),
            kind: AttrKind::Attribute {
                ty: Some(ty.into()),
            },
            value: value.into(),
        });
    }

    /// Set a directive, replacing any directive of the same name.
    pub fn insert_directive(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.upsert(Attr {
            key: key.into(),
            kind: AttrKind::Directive,
            value: value.into(),
        });
    }

    /// Value of the attribute `key` (directives are not considered).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key && e.kind != AttrKind::Directive)
            .map(|e| e.value.as_str())
    }

    /// Value of the directive `key`.
    #[must_use]
    pub fn directive(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key && e.kind == AttrKind::Directive)
            .map(|e| e.value.as_str())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.entries.iter()
    }
}

impl fmt::Display for Attrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attr) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{attr}")?;
        }
        Ok(())
    }
}

/// A named clause with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub key: String,
    pub attrs: Attrs,
}

impl Clause {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            attrs: Attrs::new(),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)?;
        if !self.attrs.is_empty() {
            write!(f, ";{}", self.attrs)?;
        }
        Ok(())
    }
}

/// A parsed header: an ordered list of clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    clauses: Vec<Clause>,
}

impl Parameters {
    /// Parse a header value.
    ///
    /// # Errors
    ///
    /// Returns [`CapgenError::HeaderParse`] for unterminated quotes, missing
    /// attribute names and missing separators.
    pub fn parse(header: &str) -> Result<Self> {
        HeaderParser::new(header).parse()
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }
}

impl IntoIterator for Parameters {
    type Item = Clause;
    type IntoIter = std::vec::IntoIter<Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.into_iter()
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

struct HeaderParser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> HeaderParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> CapgenError {
        CapgenError::HeaderParse {
            header: self.input.to_string(),
            reason: format!("{} (at character {})", reason.into(), self.pos),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn read_until(&mut self, stops: &[char]) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| !stops.contains(&c)) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect::<String>().trim().to_string()
    }

    fn read_value(&mut self) -> Result<String> {
        self.skip_whitespace();
        if self.peek() != Some('"') {
            return Ok(self.read_until(&[';', ',']));
        }

        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated quoted string")),
                Some('"') => {
                    self.pos += 1;
                    break;
                }
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(c) => value.push(c),
                        None => return Err(self.error("dangling escape")),
                    }
                    self.pos += 1;
                }
                Some(c) => {
                    value.push(c);
                    self.pos += 1;
                }
            }
        }
        self.skip_whitespace();
        Ok(value)
    }

    fn parse(mut self) -> Result<Parameters> {
        let mut parameters = Parameters::default();

        loop {
            self.skip_whitespace();
            if self.peek().is_none() {
                break;
            }

            let mut keys = vec![self.read_until(&[';', ','])];
            if keys[0].is_empty() {
                return Err(self.error("missing clause name"));
            }
            let mut attrs = Attrs::new();

            while self.peek() == Some(';') {
                self.pos += 1;
                let name = self.read_until(&['=', ':', ';', ',']);
                match self.peek() {
                    Some(':') if self.chars.get(self.pos + 1) == Some(&'=') => {
                        self.pos += 2;
                        if name.is_empty() {
                            return Err(self.error("directive without a name"));
                        }
                        let value = self.read_value()?;
                        attrs.insert_directive(name, value);
                    }
                    Some(':') => {
                        self.pos += 1;
                        let ty = self.read_until(&['=', ';', ',']);
                        if self.peek() != Some('=') || name.is_empty() || ty.is_empty() {
                            return Err(self.error("malformed typed attribute"));
                        }
                        self.pos += 1;
                        let value = self.read_value()?;
                        attrs.insert_typed(name, ty, value);
                    }
                    Some('=') => {
                        self.pos += 1;
                        if name.is_empty() {
                            return Err(self.error("attribute without a name"));
                        }
                        let value = self.read_value()?;
                        attrs.insert(name, value);
                    }
                    _ if name.is_empty() => {}
                    _ if attrs.is_empty() => keys.push(name),
                    _ => return Err(self.error(format!("unexpected name '{name}' after attributes"))),
                }
            }

            match self.peek() {
                None => {}
                Some(',') => self.pos += 1,
                Some(c) => return Err(self.error(format!("unexpected character '{c}'"))),
            }

            for key in keys {
                parameters.push(Clause {
                    key,
                    attrs: attrs.clone(),
                });
            }
        }

        Ok(parameters)
    }
}

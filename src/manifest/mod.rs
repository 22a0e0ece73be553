//! `META-INF/MANIFEST.MF` reading and writing.
//!
//! The analysis commits its results through the [`HeaderStore`] trait; the
//! [`Manifest`] type is the file-backed store used by the CLI.
//!
//! # Format
//!
//! A manifest is a main section followed by optional named sections, each a
//! list of `Name: value` lines separated by a blank line. Lines are at most 72
//! bytes; longer values continue on following lines that start with a single
//! space:
//!
//! ```text
//! Manifest-Version: 1.0
//! Bundle-SymbolicName: com.acme.greeter
//! Require-Capability: osgi.service;filter:="(objectClass=com.acme.Greeti
//!  ng)";effective:=active
//! ```
//!
//! Header names are matched case-insensitively. Parsing keeps header order so
//! that writing an unchanged manifest reproduces it (line endings aside; output
//! always uses CRLF).

use crate::core::{CapgenError, Result};
use std::fmt;
use std::path::Path;

/// Maximum line length in bytes, line break excluded.
const LINE_LIMIT: usize = 72;

/// Read/write access to manifest main headers.
pub trait HeaderStore {
    fn get_header(&self, name: &str) -> Option<&str>;

    /// Set `name` to `value`, replacing any existing value.
    fn set_header(&mut self, name: &str, value: String);
}

type Section = Vec<(String, String)>;

/// A parsed manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    main: Section,
    sections: Vec<Section>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            main: vec![("Manifest-Version".to_string(), "1.0".to_string())],
            sections: Vec::new(),
        }
    }
}

impl Manifest {
    /// An empty manifest with `Manifest-Version: 1.0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse manifest text.
    ///
    /// # Errors
    ///
    /// Returns [`CapgenError::ManifestParse`] for a continuation line without a
    /// preceding header and for lines without a `: ` separator.
    pub fn parse(text: &str) -> Result<Self> {
        let mut sections: Vec<Section> = vec![Vec::new()];
        let mut previous_blank = false;

        for (number, line) in text.lines().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let line_number = number + 1;

            if line.is_empty() {
                previous_blank = true;
                continue;
            }

            if let Some(continuation) = line.strip_prefix(' ') {
                let current = sections.last_mut().and_then(|s| s.last_mut());
                match current {
                    Some((_, value)) if !previous_blank => value.push_str(continuation),
                    _ => {
                        return Err(CapgenError::ManifestParse {
                            line: line_number,
                            reason: "continuation line without a header".to_string(),
                        });
                    }
                }
                continue;
            }

            if previous_blank && sections.last().is_some_and(|s| !s.is_empty()) {
                sections.push(Vec::new());
            }
            previous_blank = false;

            let Some((name, value)) = line.split_once(':') else {
                return Err(CapgenError::ManifestParse {
                    line: line_number,
                    reason: format!("expected 'Name: value', found '{line}'"),
                });
            };
            let name = name.trim();
            if name.is_empty() {
                return Err(CapgenError::ManifestParse {
                    line: line_number,
                    reason: "empty header name".to_string(),
                });
            }
            let value = value.strip_prefix(' ').unwrap_or(value);
            if let Some(section) = sections.last_mut() {
                section.push((name.to_string(), value.to_string()));
            }
        }

        let mut sections = sections.into_iter();
        let main = sections.next().unwrap_or_default();
        Ok(Self {
            main,
            sections: sections.filter(|s| !s.is_empty()).collect(),
        })
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Write the manifest to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_string())?;
        Ok(())
    }

    /// Main headers in file order.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.main.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of named sections.
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

impl HeaderStore for Manifest {
    fn get_header(&self, name: &str) -> Option<&str> {
        self.main
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn set_header(&mut self, name: &str, value: String) {
        match self.main.iter_mut().find(|(existing, _)| existing.eq_ignore_ascii_case(name)) {
            Some((_, existing)) => *existing = value,
            None => self.main.push((name.to_string(), value)),
        }
    }
}

fn write_header(f: &mut fmt::Formatter<'_>, name: &str, value: &str) -> fmt::Result {
    let line = format!("{name}: {value}");
    let mut rest = line.as_str();
    let mut limit = LINE_LIMIT;
    let mut first = true;

    while !rest.is_empty() {
        let mut split = rest.len().min(limit);
        while !rest.is_char_boundary(split) {
            split -= 1;
        }
        if !first {
            f.write_str(" ")?;
        }
        f.write_str(&rest[..split])?;
        f.write_str("\r\n")?;
        rest = &rest[split..];
        limit = LINE_LIMIT - 1;
        first = false;
    }
    Ok(())
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.main {
            write_header(f, name, value)?;
        }
        f.write_str("\r\n")?;
        for section in &self.sections {
            for (name, value) in section {
                write_header(f, name, value)?;
            }
            f.write_str("\r\n")?;
        }
        Ok(())
    }
}

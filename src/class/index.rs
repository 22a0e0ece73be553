//! JSON class index.
//!
//! The index is the class space of one packaging unit, as produced by a
//! bytecode reader:
//!
//! ```json
//! {
//!   "name": "com.acme.greeter",
//!   "version": "1.2.0",
//!   "packages": { "com.acme.lib": "lib/acme-lib.jar" },
//!   "classes": [
//!     { "name": "com.acme.Greeter", "annotations": [{ "name": "org.osgi.service.cdi.annotations.Bean" }] }
//!   ]
//! }
//! ```
//!
//! `packages` attributes packages to the `Bundle-ClassPath` entry they were
//! loaded from; packages not listed come from the unit itself (`.`).

use super::{ClassIntrospector, ClassModel, package_of};
use crate::core::{CapgenError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

/// Class-path entry of the unit itself.
pub const UNIT_SOURCE: &str = ".";

#[derive(Deserialize)]
struct RawIndex {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    packages: BTreeMap<String, String>,
    #[serde(default)]
    classes: Vec<ClassModel>,
}

/// An in-memory class space, ordered by class name.
#[derive(Debug, Clone, Default)]
pub struct ClassIndex {
    name: Option<String>,
    version: Option<String>,
    packages: BTreeMap<String, String>,
    classes: BTreeMap<String, ClassModel>,
}

impl ClassIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an index from JSON text; `file` names the source in errors.
    pub fn from_json(json: &str, file: &str) -> Result<Self> {
        let raw: RawIndex = serde_json::from_str(json).map_err(|e| CapgenError::ClassIndexParse {
            file: file.to_string(),
            reason: e.to_string(),
        })?;

        let mut index = Self {
            name: raw.name,
            version: raw.version,
            packages: raw.packages,
            classes: BTreeMap::new(),
        };
        for class in raw.classes {
            if index.classes.contains_key(&class.name) {
                return Err(CapgenError::ClassIndexParse {
                    file: file.to_string(),
                    reason: format!("duplicate class '{}'", class.name),
                });
            }
            index.insert(class);
        }
        debug!("Loaded {} classes from {file}", index.classes.len());
        Ok(index)
    }

    /// Load an index file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, &path.display().to_string())
    }

    pub fn insert(&mut self, class: ClassModel) {
        self.classes.insert(class.name.clone(), class);
    }

    /// Attribute `package` to a `Bundle-ClassPath` entry.
    pub fn set_package_source(&mut self, package: impl Into<String>, source: impl Into<String>) {
        self.packages.insert(package.into(), source.into());
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Package attribution for every package with at least one class.
    #[must_use]
    pub fn package_sources(&self) -> PackageSources {
        let sources = self
            .classes
            .values()
            .map(|class| class.package())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|package| {
                let source = self.packages.get(package).map_or(UNIT_SOURCE, String::as_str);
                (package.to_string(), source.to_string())
            })
            .collect();
        PackageSources {
            sources,
        }
    }
}

impl ClassIntrospector for ClassIndex {
    fn classes(&self) -> Vec<&ClassModel> {
        self.classes.values().collect()
    }

    fn lookup(&self, name: &str) -> Option<&ClassModel> {
        self.classes.get(name)
    }
}

/// Which class-path entry each contained package was loaded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSources {
    sources: BTreeMap<String, String>,
}

impl PackageSources {
    /// Source of `package`; `None` when the unit does not contain it.
    #[must_use]
    pub fn source_of(&self, package: &str) -> Option<&str> {
        self.sources.get(package).map(String::as_str)
    }

    /// Source of the package of class `name`.
    #[must_use]
    pub fn source_of_class(&self, name: &str) -> Option<&str> {
        self.source_of(package_of(name))
    }

    pub fn insert(&mut self, package: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(package.into(), source.into());
    }
}

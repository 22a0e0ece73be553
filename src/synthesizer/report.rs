//! Result of one analysis run.

use crate::bean::BeanDef;
use crate::core::Diagnostic;
use crate::discover::DiscoverySet;
use serde::Serialize;
use std::collections::BTreeMap;

/// A class accepted as a bean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BeanEntry {
    pub class: String,
    /// Discovery modes the class was read under.
    pub modes: DiscoverySet,
    /// Identity bean first, then producer definitions.
    pub definitions: Vec<BeanDef>,
}

/// Everything one analysis run found and committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// `<name>-<version>` of every bean archive of the unit.
    pub bean_archives: Vec<String>,
    pub beans: Vec<BeanEntry>,
    /// Capability clauses computed by this run, sorted.
    pub provided: Vec<String>,
    /// Requirement clauses computed by this run (extender included), sorted.
    pub required: Vec<String>,
    /// Header values written to the store, after merging existing clauses.
    pub headers: BTreeMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisReport {
    /// Names of the discovered bean classes, in discovery order.
    #[must_use]
    pub fn bean_names(&self) -> Vec<&str> {
        self.beans.iter().map(|bean| bean.class.as_str()).collect()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == crate::core::Severity::Error)
            .count()
    }
}

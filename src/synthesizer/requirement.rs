//! Requirement merging.

use crate::header::Clause;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FilterInfo {
    effective: String,
    optional: bool,
    multiple: bool,
}

/// Requirements of one namespace, one per distinct filter.
///
/// Putting the same filter twice merges the `optional` and `multiple` flags
/// with a logical OR instead of producing a second requirement.
#[derive(Debug, Clone)]
pub struct MergedRequirement {
    namespace: String,
    filters: BTreeMap<String, FilterInfo>,
}

impl MergedRequirement {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            filters: BTreeMap::new(),
        }
    }

    pub fn put(&mut self, filter: impl Into<String>, effective: &str, optional: bool, multiple: bool) {
        let info = self.filters.entry(filter.into()).or_insert_with(|| FilterInfo {
            effective: effective.to_string(),
            ..FilterInfo::default()
        });
        info.optional |= optional;
        info.multiple |= multiple;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// One clause per filter, ordered by filter.
    #[must_use]
    pub fn to_string_list(&self) -> Vec<String> {
        self.filters
            .iter()
            .map(|(filter, info)| {
                let mut clause = Clause::new(self.namespace.as_str());
                clause.attrs.insert_directive("filter", filter.as_str());
                if info.optional {
                    clause.attrs.insert_directive("resolution", "optional");
                }
                if info.multiple {
                    clause.attrs.insert_directive("cardinality", "multiple");
                }
                clause.attrs.insert_directive("effective", info.effective.as_str());
                clause.to_string()
            })
            .collect()
    }
}

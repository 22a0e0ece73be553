//! Capability synthesis for a whole packaging unit.
//!
//! The [`CapabilitySynthesizer`] walks the class space, selects classes with
//! the configured [`Instructions`], reads their bean definitions and folds
//! them into manifest clauses:
//!
//! - `Provide-Capability`: one `osgi.service` capability per definition that
//!   publishes services, with the sorted types as `objectClass:List<String>`
//! - `Require-Capability`: one `osgi.service` requirement per referenced
//!   type (see [`MergedRequirement`]) and, when any bean was found, one
//!   `osgi.extender` requirement on the CDI extender naming all bean classes
//!
//! Instructions accept three attributes:
//!
//! | Attribute               | Effect                                        |
//! |-------------------------|-----------------------------------------------|
//! | `discover`              | discovery modes, default `annotated_by_bean`  |
//! | `noservicecapabilities` | matched classes provide no capabilities       |
//! | `noservicerequirements` | matched classes add no service requirements   |
//!
//! Existing header clauses are kept: the committed value is the sorted,
//! deduplicated union of existing and computed clauses. A header is only
//! written when something was computed for it.
//!
//! # Example
//!
//! ```rust
//! use cdi_capgen::class::{Annotation, ClassIndex, ClassModel};
//! use cdi_capgen::core::AnalysisContext;
//! use cdi_capgen::instruction::Instructions;
//! use cdi_capgen::manifest::{HeaderStore, Manifest};
//! use cdi_capgen::archive::BeanArchives;
//! use cdi_capgen::synthesizer::CapabilitySynthesizer;
//!
//! let mut greeter = ClassModel::new("com.acme.Greeter");
//! greeter.annotations.push(Annotation::new("org.osgi.service.cdi.annotations.Bean"));
//! greeter.annotations.push(Annotation::new("org.osgi.service.cdi.annotations.Service"));
//! let mut index = ClassIndex::new();
//! index.insert(greeter);
//!
//! let instructions = Instructions::parse("*").unwrap();
//! let sources = index.package_sources();
//! let archives = BeanArchives::unit("app.jar", None);
//! let mut manifest = Manifest::new();
//! let ctx = AnalysisContext::new();
//!
//! CapabilitySynthesizer::new(&index, &instructions, &sources, &archives).analyze(&mut manifest, &ctx);
//!
//! assert_eq!(
//!     manifest.get_header("Provide-Capability"),
//!     Some(r#"osgi.service;objectClass:List<String>="com.acme.Greeter""#)
//! );
//! ```

mod report;
mod requirement;

pub use report::{AnalysisReport, BeanEntry};
pub use requirement::MergedRequirement;

use crate::archive::BeanArchives;
use crate::bean::BeanDef;
use crate::class::{ClassIntrospector, ClassModel, PackageSources};
use crate::constants::{
    CDI_EXTENDER, DEFAULT_EXTENDER_VERSION, EXTENDER_NAMESPACE, PROVIDE_CAPABILITY,
    REQUIRE_CAPABILITY, SERVICE_NAMESPACE,
};
use crate::core::AnalysisContext;
use crate::discover::{Discover, DiscoverySet};
use crate::header::{Attrs, Clause, Parameters};
use crate::instruction::Instructions;
use crate::manifest::HeaderStore;
use crate::reader::{BeanReader, PackageCache};
use semver::Version;
use std::collections::BTreeSet;
use tracing::{debug, info, trace};

const DISCOVER_ATTRIBUTE: &str = "discover";
const NO_SERVICE_CAPABILITIES: &str = "noservicecapabilities";
const NO_SERVICE_REQUIREMENTS: &str = "noservicerequirements";
const EFFECTIVE_ACTIVE: &str = "active";

/// Synthesizes service capabilities and requirements for one unit.
pub struct CapabilitySynthesizer<'a, I: ClassIntrospector + ?Sized> {
    introspector: &'a I,
    instructions: &'a Instructions,
    sources: &'a PackageSources,
    archives: &'a BeanArchives,
    extender_version: Version,
}

impl<'a, I: ClassIntrospector + ?Sized> CapabilitySynthesizer<'a, I> {
    pub fn new(
        introspector: &'a I,
        instructions: &'a Instructions,
        sources: &'a PackageSources,
        archives: &'a BeanArchives,
    ) -> Self {
        Self {
            introspector,
            instructions,
            sources,
            archives,
            extender_version: Version::parse(DEFAULT_EXTENDER_VERSION)
                .unwrap_or_else(|_| Version::new(1, 0, 0)),
        }
    }

    /// Require `version` of the CDI extender instead of 1.0.0.
    #[must_use]
    pub fn with_extender_version(mut self, version: Version) -> Self {
        self.extender_version = version;
        self
    }

    /// Analyze every class and commit the resulting headers to `store`.
    pub fn analyze(&self, store: &mut dyn HeaderStore, ctx: &AnalysisContext) -> AnalysisReport {
        let mut report = AnalysisReport {
            bean_archives: self.archives.names().into_iter().map(str::to_string).collect(),
            ..AnalysisReport::default()
        };
        if self.instructions.is_empty() {
            debug!("No instructions, nothing to analyze");
            report.diagnostics = ctx.diagnostics();
            return report;
        }

        let packages = PackageCache::new();
        let reader = BeanReader::new(self.introspector, &packages, ctx);
        let mut provides = BTreeSet::new();
        let mut services = MergedRequirement::new(SERVICE_NAMESPACE);

        for class in self.introspector.classes() {
            if !self.is_candidate(class) {
                continue;
            }

            let Some((instruction, attrs)) = self.instructions.first_match(&class.name) else {
                continue;
            };
            if instruction.is_negated() {
                trace!("{}: excluded by '{instruction}'", class.name);
                continue;
            }

            let modes = discovery_modes(&class.name, attrs, ctx);
            if modes.contains(Discover::None) {
                trace!("{}: discovery mode none", class.name);
                continue;
            }

            let Some(definitions) = reader.read_bean(class, &modes) else {
                continue;
            };

            if !attrs.contains_key(NO_SERVICE_CAPABILITIES) {
                for definition in definitions.iter().filter(|d| !d.service.is_empty()) {
                    provides.insert(service_capability(definition));
                }
            }
            if !attrs.contains_key(NO_SERVICE_REQUIREMENTS)
                && let Some(identity) = definitions.first()
            {
                for reference in &identity.references {
                    services.put(
                        format!("(objectClass={})", reference.service),
                        EFFECTIVE_ACTIVE,
                        reference.cardinality.is_optional(),
                        reference.cardinality.is_multiple(),
                    );
                }
            }

            report.beans.push(BeanEntry {
                class: class.name.clone(),
                modes,
                definitions,
            });
        }

        let mut requires: BTreeSet<String> = services.to_string_list().into_iter().collect();
        if !report.beans.is_empty() {
            requires.insert(self.extender_requirement(&report.bean_names()));
        }
        info!(
            "Found {} bean(s), {} capability and {} requirement clause(s)",
            report.beans.len(),
            provides.len(),
            requires.len()
        );

        report.required = requires.iter().cloned().collect();
        report.provided = provides.iter().cloned().collect();

        for (name, set) in [(REQUIRE_CAPABILITY, requires), (PROVIDE_CAPABILITY, provides)] {
            if let Some(value) = update_header(store, name, set, ctx) {
                report.headers.insert(name.to_string(), value);
            }
        }

        report.diagnostics = ctx.diagnostics();
        report
    }

    /// Structural and archive checks a class must pass to be considered.
    fn is_candidate(&self, class: &ClassModel) -> bool {
        if class.is_module()
            || class.is_enum()
            || class.is_interface()
            || class.is_annotation()
            || class.is_synthetic()
            || !class.is_concrete()
            || class.is_inner_class()
            || class.name.ends_with("package-info")
            || class.name.ends_with("module-info")
        {
            return false;
        }

        match self.sources.source_of_class(&class.name) {
            Some(source) if self.archives.contains_source(source) => true,
            Some(source) => {
                trace!("{}: {source} is not a bean archive", class.name);
                false
            }
            None => false,
        }
    }

    fn extender_requirement(&self, beans: &[&str]) -> String {
        let next = Version::new(self.extender_version.major + 1, 0, 0);
        let mut clause = Clause::new(EXTENDER_NAMESPACE);
        clause.attrs.insert_directive(
            "filter",
            format!(
                "(&({EXTENDER_NAMESPACE}={CDI_EXTENDER})(version>={})(!(version>={next})))",
                self.extender_version
            ),
        );
        clause.attrs.insert_typed("beans", "List<String>", beans.join(","));
        clause.to_string()
    }
}

/// Discovery modes of a matched instruction, defaulting to
/// `annotated_by_bean`. An unknown mode is reported and discards the
/// attribute.
fn discovery_modes(class: &str, attrs: &Attrs, ctx: &AnalysisContext) -> DiscoverySet {
    let mut modes = DiscoverySet::new();
    if let Some(expression) = attrs.get(DISCOVER_ATTRIBUTE)
        && let Err(e) = modes.parse_expression(expression)
    {
        let expected: Vec<&str> = Discover::ALL.iter().map(|m| m.as_str()).collect();
        ctx.error(
            Some(class),
            None,
            format!("Unrecognized discover '{expression}', expected values are {expected:?}: {e}"),
        );
        modes.clear();
    }
    modes.or_default()
}

/// `osgi.service` capability publishing the definition's sorted services.
fn service_capability(definition: &BeanDef) -> String {
    let mut object_class: Vec<&str> = definition.service.iter().map(String::as_str).collect();
    object_class.sort_unstable();
    let mut clause = Clause::new(SERVICE_NAMESPACE);
    clause.attrs.insert_typed("objectClass", "List<String>", object_class.join(","));
    clause.to_string()
}

/// Merge `set` with the existing clauses of header `name` and write it.
///
/// Nothing is written for an empty set. Returns the committed value.
fn update_header(
    store: &mut dyn HeaderStore,
    name: &str,
    mut set: BTreeSet<String>,
    ctx: &AnalysisContext,
) -> Option<String> {
    if set.is_empty() {
        return None;
    }

    if let Some(existing) = store.get_header(name) {
        match Parameters::parse(existing) {
            Ok(parameters) => set.extend(parameters.iter().map(ToString::to_string)),
            Err(e) => {
                ctx.warning(None, None, format!("Keeping unparsable {name} header as is: {e}"));
                set.insert(existing.trim().to_string());
            }
        }
    }

    let value = set.into_iter().collect::<Vec<_>>().join(",");
    debug!("{name}: {value}");
    store.set_header(name, value.clone());
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Manifest;

    #[test]
    fn test_service_capability_sorts_types() {
        let mut definition = BeanDef::default();
        definition.service = vec!["com.x.B".to_string(), "com.x.A".to_string()];
        assert_eq!(
            service_capability(&definition),
            r#"osgi.service;objectClass:List<String>="com.x.A,com.x.B""#
        );
    }

    #[test]
    fn test_discovery_modes_default_and_errors() {
        let ctx = AnalysisContext::new();
        let mut attrs = Attrs::new();
        assert!(discovery_modes("a.A", &attrs, &ctx).contains(Discover::AnnotatedByBean));

        attrs.insert("discover", "all");
        let modes = discovery_modes("a.A", &attrs, &ctx);
        assert!(modes.contains(Discover::All));
        assert!(!modes.contains(Discover::AnnotatedByBean));

        attrs.insert("discover", "all,bogus");
        let modes = discovery_modes("a.A", &attrs, &ctx);
        assert_eq!(modes.to_string(), "[annotated_by_bean]");
        assert_eq!(ctx.error_count(), 1);
    }

    #[test]
    fn test_update_header_merges_existing() {
        let ctx = AnalysisContext::new();
        let mut manifest = Manifest::new();
        manifest.set_header(REQUIRE_CAPABILITY, "osgi.ee;filter:=\"(osgi.ee=JavaSE)\"".to_string());

        let set: BTreeSet<String> = [r#"osgi.service;filter:="(objectClass=a.A)";effective:=active"#.to_string()]
            .into_iter()
            .collect();
        let value = update_header(&mut manifest, REQUIRE_CAPABILITY, set, &ctx).unwrap();
        assert_eq!(
            value,
            r#"osgi.ee;filter:="(osgi.ee=JavaSE)",osgi.service;filter:="(objectClass=a.A)";effective:=active"#
        );
        assert_eq!(manifest.get_header(REQUIRE_CAPABILITY), Some(value.as_str()));
    }

    #[test]
    fn test_update_header_skips_empty_sets() {
        let ctx = AnalysisContext::new();
        let mut manifest = Manifest::new();
        manifest.set_header(PROVIDE_CAPABILITY, "x;a=1".to_string());
        assert!(update_header(&mut manifest, PROVIDE_CAPABILITY, BTreeSet::new(), &ctx).is_none());
        assert_eq!(manifest.get_header(PROVIDE_CAPABILITY), Some("x;a=1"));
    }

    #[test]
    fn test_update_header_keeps_unparsable_value() {
        let ctx = AnalysisContext::new();
        let mut manifest = Manifest::new();
        manifest.set_header(PROVIDE_CAPABILITY, "broken;x=\"unterminated".to_string());
        let set: BTreeSet<String> = ["a;b=1".to_string()].into_iter().collect();
        let value = update_header(&mut manifest, PROVIDE_CAPABILITY, set, &ctx).unwrap();
        assert_eq!(value, "a;b=1,broken;x=\"unterminated");
        assert!(!ctx.has_errors());
        assert_eq!(ctx.diagnostics().len(), 1);
    }
}

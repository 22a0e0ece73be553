//! Package-level bean declarations, computed once per package.

use crate::bean::PackageDef;
use crate::class::ClassIntrospector;
use crate::constants::BEANS_ANNOTATION;
use crate::core::AnalysisContext;
use crate::instruction::Instructions;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Memoized [`PackageDef`]s of one analysis run.
///
/// The first lookup of a package computes its definition while holding the
/// map entry, so concurrent lookups of the same package compute it once.
#[derive(Debug, Default)]
pub struct PackageCache {
    packages: DashMap<String, Arc<PackageDef>>,
}

impl PackageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The definition of `package`, reading its `package-info` on first use.
    pub fn get<I>(&self, package: &str, introspector: &I, ctx: &AnalysisContext) -> Arc<PackageDef>
    where
        I: ClassIntrospector + ?Sized,
    {
        let entry = self
            .packages
            .entry(package.to_string())
            .or_insert_with(|| Arc::new(read_package(package, introspector, ctx)));
        Arc::clone(entry.value())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

fn read_package<I>(package: &str, introspector: &I, ctx: &AnalysisContext) -> PackageDef
where
    I: ClassIntrospector + ?Sized,
{
    let Some(info) = introspector.package_info(package) else {
        return PackageDef::default();
    };
    let Some(beans) = info.annotations.iter().find(|a| a.name == BEANS_ANNOTATION) else {
        return PackageDef::default();
    };

    let names = beans.value("value").map(|v| v.as_strings()).unwrap_or_default();
    let matcher = if names.is_empty() {
        Instructions::from_patterns(["*"])
    } else {
        Instructions::from_patterns(names)
    };

    match matcher {
        Ok(matcher) => {
            debug!("Package {package} declares {} bean pattern(s)", matcher.len());
            PackageDef {
                marked: Some(matcher),
            }
        }
        Err(e) => {
            ctx.error(Some(&info.name), None, format!("invalid @Beans declaration: {e}"));
            PackageDef::default()
        }
    }
}

//! Bean reader: decides whether a class is a bean and collects its
//! references and services.
//!
//! # Walk
//!
//! [`BeanReader::read_bean`] walks one materialized class in classfile order:
//!
//! 1. **Rejection** (only under `annotated` discovery): vetoed classes, classes
//!    without a bean defining annotation (`@ComponentScoped`, a normal scope or
//!    a stereotype, possibly through meta-annotations, or `@Dependent` /
//!    `@Interceptor`), portable extensions and classes of a vetoed package are
//!    not beans.
//! 2. **Class begin**: the identity bean is named after the class and marked
//!    when its package's `@Beans` declaration lists it.
//! 3. **Members**: fields, then methods. Abstract, bridge and synthetic methods
//!    are skipped, as are private methods of supertypes. Each method may imply
//!    a bind reference; member, method and parameter annotations are
//!    dispatched in order.
//! 4. **Class annotations**: `@Bean`, class-level and type-use `@Service`.
//! 5. **Acceptance** (under `annotated_by_bean` discovery): an unmarked class
//!    is not a bean.
//!
//! Problems found along the way are reported to the [`AnalysisContext`] and
//! drop only the offending reference or service.
//!
//! # Example
//!
//! ```rust
//! use cdi_capgen::class::{Annotation, ClassIndex, ClassModel};
//! use cdi_capgen::core::AnalysisContext;
//! use cdi_capgen::discover::{Discover, DiscoverySet};
//! use cdi_capgen::reader::{BeanReader, PackageCache};
//!
//! let mut greeter = ClassModel::new("com.acme.Greeter");
//! greeter.annotations.push(Annotation::new("org.osgi.service.cdi.annotations.Bean"));
//! let mut index = ClassIndex::new();
//! index.insert(greeter.clone());
//!
//! let (packages, ctx) = (PackageCache::new(), AnalysisContext::new());
//! let reader = BeanReader::new(&index, &packages, &ctx);
//! let modes: DiscoverySet = [Discover::AnnotatedByBean].into_iter().collect();
//!
//! let beans = reader.read_bean(&greeter, &modes).unwrap();
//! assert_eq!(beans[0].implementation.as_deref(), Some("com.acme.Greeter"));
//! assert!(beans[0].marked);
//! ```

mod packages;
mod reference;
mod scan;
mod service;

pub use packages::PackageCache;
pub use reference::unwrap_reference;

use crate::bean::BeanDef;
use crate::class::{ClassIntrospector, ClassModel, ElementType, package_of};
use crate::constants::{
    COMPONENT_SCOPED_ANNOTATION, DEPENDENT_ANNOTATION, EXTENSION_INTERFACE,
    INTERCEPTOR_ANNOTATION, NORMAL_SCOPE_ANNOTATION, OBJECT_TYPE, STEREOTYPE_ANNOTATION,
    VETOED_ANNOTATION,
};
use crate::core::AnalysisContext;
use crate::discover::{Discover, DiscoverySet};
use crate::signature::{ClassResolver, ClassSignature};
use scan::{ClassScan, Member};
use tracing::{debug, trace};

/// Reads bean definitions from classes of one class space.
pub struct BeanReader<'a, I: ClassIntrospector + ?Sized> {
    introspector: &'a I,
    packages: &'a PackageCache,
    ctx: &'a AnalysisContext,
}

impl<'a, I: ClassIntrospector + ?Sized> BeanReader<'a, I> {
    pub const fn new(introspector: &'a I, packages: &'a PackageCache, ctx: &'a AnalysisContext) -> Self {
        Self {
            introspector,
            packages,
            ctx,
        }
    }

    /// The definitions of `class` under discovery `modes`: the identity bean
    /// first, then one producer definition per `@Service` member.
    ///
    /// `None` when the class is not a bean under these modes.
    pub fn read_bean(&self, class: &ClassModel, modes: &DiscoverySet) -> Option<Vec<BeanDef>> {
        if modes.contains(Discover::Annotated) && self.rejected_as_unannotated(class) {
            debug!("{}: no bean defining annotation, skipped", class.name);
            return None;
        }

        let resolver = ClassResolver::new(self.class_signature(class));
        let mut scan = ClassScan::new(class, &resolver, self.ctx);

        self.class_begin(&mut scan);
        walk_members(&mut scan);
        scan.annotations(&class.annotations, ElementType::Type);
        scan.end_member();

        let marked = scan.identity().is_some_and(|identity| identity.marked);
        if modes.contains(Discover::AnnotatedByBean) && !marked {
            debug!("{}: not marked as a bean, skipped", class.name);
            return None;
        }

        let definitions = scan.into_definitions();
        debug!("{}: bean with {} definition(s)", class.name, definitions.len());
        Some(definitions)
    }

    fn rejected_as_unannotated(&self, class: &ClassModel) -> bool {
        let introspector = self.introspector;
        let bean_defining = introspector.is_indirectly_annotated(class, COMPONENT_SCOPED_ANNOTATION)
            || introspector.is_indirectly_annotated(class, NORMAL_SCOPE_ANNOTATION)
            || introspector.is_indirectly_annotated(class, STEREOTYPE_ANNOTATION)
            || introspector.is_annotated(class, DEPENDENT_ANNOTATION)
            || introspector.is_annotated(class, INTERCEPTOR_ANNOTATION);

        if introspector.is_annotated(class, VETOED_ANNOTATION)
            || !bean_defining
            || introspector.implements(class, EXTENSION_INTERFACE)
        {
            return true;
        }

        introspector
            .package_info(class.package())
            .is_some_and(|info| introspector.is_annotated(info, VETOED_ANNOTATION))
    }

    fn class_signature(&self, class: &ClassModel) -> ClassSignature {
        let erased = || {
            ClassSignature::erased(
                class.super_class.as_deref().unwrap_or(OBJECT_TYPE),
                &class.interfaces,
            )
        };
        match class.signature.as_deref() {
            None => erased(),
            Some(signature) => ClassSignature::parse(signature).unwrap_or_else(|e| {
                self.ctx.error(Some(&class.name), None, format!("class signature can not be parsed: {e}"));
                erased()
            }),
        }
    }

    fn class_begin(&self, scan: &mut ClassScan<'_>) {
        let class = scan.class;
        scan.identity_mut().implementation = Some(class.name.clone());

        let package = self.packages.get(package_of(&class.name), self.introspector, self.ctx);
        if let Some(marked) = package.marks(&class.name) {
            trace!("{}: package declaration marks it {marked}", class.name);
            scan.identity_mut().marked = marked;
        }
    }
}

fn walk_members(scan: &mut ClassScan<'_>) {
    let class = scan.class;

    for field in &class.fields {
        scan.begin_member(Member::Field(field));
        scan.annotations(&field.annotations, ElementType::Field);
        scan.end_member();
    }

    for method in &class.methods {
        if method.is_abstract() || method.is_bridge() || method.is_synthetic() {
            trace!("{}: skipping method {}", class.name, method.name);
            continue;
        }
        if !scan.base_class && method.is_private() {
            trace!("{}: skipping private method {}", class.name, method.name);
            continue;
        }

        scan.begin_member(Member::Method(method));
        scan.infer_bind_reference();
        scan.annotations(&method.annotations, ElementType::Method);
        for (index, annotations) in method.parameter_annotations.iter().enumerate() {
            scan.begin_parameter(index);
            scan.annotations(annotations, ElementType::Parameter);
        }
        scan.end_member();
    }
}

//! End-to-end synthesis over in-memory class spaces.

use cdi_capgen::archive::BeanArchives;
use cdi_capgen::bean::{Cardinality, ReferenceDef};
use cdi_capgen::class::{ClassIndex, PackageSources};
use cdi_capgen::core::AnalysisContext;
use cdi_capgen::instruction::Instructions;
use cdi_capgen::manifest::{HeaderStore, Manifest};
use cdi_capgen::synthesizer::{AnalysisReport, CapabilitySynthesizer};
use cdi_capgen::test_utils::{
    ClassBuilder, bean, index_of, init_test_logging, reference, service, service_types,
};

const PROVIDE: &str = "Provide-Capability";
const REQUIRE: &str = "Require-Capability";

fn analyze(index: &ClassIndex, instructions: &str, manifest: &mut Manifest) -> AnalysisReport {
    init_test_logging(None);
    let instructions = Instructions::parse(instructions).unwrap();
    let sources = index.package_sources();
    let archives = BeanArchives::unit("app", Some("1.0.0"));
    let ctx = AnalysisContext::new();
    CapabilitySynthesizer::new(index, &instructions, &sources, &archives).analyze(manifest, &ctx)
}

fn foo_bar_bean() -> ClassBuilder {
    ClassBuilder::new("com.x.Consumer")
        .annotated(bean())
        .field("foo", "Lcom/x/Foo;", vec![reference()])
        .method("bar", "()Lcom/x/Bar;", vec![service()], vec![])
}

#[test]
fn test_end_to_end_reference_and_producer() {
    let index = index_of([foo_bar_bean().build()]);
    let mut manifest = Manifest::new();
    let report = analyze(&index, "*", &mut manifest);

    assert_eq!(
        manifest.get_header(PROVIDE),
        Some(r#"osgi.service;objectClass:List<String>="com.x.Bar""#)
    );
    assert_eq!(
        manifest.get_header(REQUIRE),
        Some(concat!(
            r#"osgi.extender;filter:="(&(osgi.extender=osgi.cdi)(version>=1.0.0)(!(version>=2.0.0)))";beans:List<String>="com.x.Consumer","#,
            r#"osgi.service;filter:="(objectClass=com.x.Foo)";effective:=active"#
        ))
    );
    assert_eq!(report.bean_names(), vec!["com.x.Consumer"]);
    assert_eq!(
        report.beans[0].definitions[0].references,
        vec![ReferenceDef::new("com.x.Foo", Cardinality::Mandatory)]
    );
    assert_eq!(report.bean_archives, vec!["app-1.0.0"]);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_optional_and_multiple_references_merge() {
    let index = index_of([
        ClassBuilder::new("com.x.A")
            .annotated(bean())
            .field("foo", "Ljava/util/Optional<Lcom/x/Foo;>;", vec![reference()])
            .build(),
        ClassBuilder::new("com.x.B")
            .annotated(bean())
            .field("foos", "Ljava/util/List<Lcom/x/Foo;>;", vec![reference()])
            .build(),
    ]);
    let mut manifest = Manifest::new();
    let report = analyze(&index, "*", &mut manifest);

    let services: Vec<_> = report.required.iter().filter(|c| c.starts_with("osgi.service")).collect();
    assert_eq!(
        services,
        vec![
            r#"osgi.service;filter:="(objectClass=com.x.Foo)";resolution:=optional;cardinality:=multiple;effective:=active"#
        ]
    );
    assert!(report.required.iter().any(|c| c.contains(r#"beans:List<String>="com.x.A,com.x.B""#)));
}

#[test]
fn test_capabilities_do_not_depend_on_class_order() {
    let provider = |name: &str, api: &str| {
        ClassBuilder::new(name).annotated(bean()).annotated(service_types(&[api])).build()
    };

    let mut forward = Manifest::new();
    let index = index_of([provider("com.x.B", "com.x.X"), provider("com.x.A", "com.x.Y")]);
    analyze(&index, "*", &mut forward);

    let mut reverse = Manifest::new();
    let index = index_of([provider("com.x.A", "com.x.Y"), provider("com.x.B", "com.x.X")]);
    analyze(&index, "*", &mut reverse);

    assert_eq!(forward.get_header(PROVIDE), reverse.get_header(PROVIDE));
    assert_eq!(
        forward.get_header(PROVIDE),
        Some(concat!(
            r#"osgi.service;objectClass:List<String>="com.x.X","#,
            r#"osgi.service;objectClass:List<String>="com.x.Y""#
        ))
    );
}

#[test]
fn test_multiple_services_are_sorted_within_a_capability() {
    let index = index_of([ClassBuilder::new("com.x.Impl")
        .annotated(bean())
        .implements("com.x.Zeta")
        .implements("com.x.Alpha")
        .annotated(service())
        .build()]);
    let mut manifest = Manifest::new();
    analyze(&index, "*", &mut manifest);
    assert_eq!(
        manifest.get_header(PROVIDE),
        Some(r#"osgi.service;objectClass:List<String>="com.x.Alpha,com.x.Zeta""#)
    );
}

#[test]
fn test_negated_instruction_contributes_nothing() {
    let index = index_of([foo_bar_bean().build()]);
    let mut manifest = Manifest::new();
    let report = analyze(&index, "!com.x.Consumer,*", &mut manifest);

    assert!(report.beans.is_empty());
    assert_eq!(manifest.get_header(PROVIDE), None);
    assert_eq!(manifest.get_header(REQUIRE), None);
}

#[test]
fn test_instruction_attributes() {
    let index = index_of([foo_bar_bean().build()]);

    let mut manifest = Manifest::new();
    analyze(&index, "*;noservicecapabilities=true", &mut manifest);
    assert_eq!(manifest.get_header(PROVIDE), None);
    assert!(manifest.get_header(REQUIRE).unwrap().contains("objectClass=com.x.Foo"));

    let mut manifest = Manifest::new();
    let report = analyze(&index, "*;noservicerequirements=true", &mut manifest);
    assert!(manifest.get_header(PROVIDE).is_some());
    assert_eq!(report.required.len(), 1);
    assert!(report.required[0].starts_with("osgi.extender"));
}

#[test]
fn test_discovery_modes_from_instructions() {
    let plain = ClassBuilder::new("com.x.Plain").annotated(service()).build();
    let index = index_of([plain]);

    let mut manifest = Manifest::new();
    assert!(analyze(&index, "*", &mut manifest).beans.is_empty());

    let report = analyze(&index, "*;discover=all", &mut manifest);
    assert_eq!(report.bean_names(), vec!["com.x.Plain"]);

    let mut manifest = Manifest::new();
    let report = analyze(&index, "*;discover=none", &mut manifest);
    assert!(report.beans.is_empty());
    assert_eq!(manifest.get_header(REQUIRE), None);
}

#[test]
fn test_unknown_discover_token_is_reported() {
    let index = index_of([
        ClassBuilder::new("com.x.Plain").build(),
        ClassBuilder::new("com.x.Marked").annotated(bean()).build(),
    ]);
    let mut manifest = Manifest::new();
    let report = analyze(&index, "*;discover=sometimes", &mut manifest);

    // The default annotated_by_bean applies after the report.
    assert_eq!(report.bean_names(), vec!["com.x.Marked"]);
    assert_eq!(report.error_count(), 2);
    assert!(report.diagnostics[0].message.contains("sometimes"));
}

#[test]
fn test_structural_skips() {
    let index = index_of([
        ClassBuilder::new("com.x.Abstract").abstract_class().annotated(bean()).build(),
        ClassBuilder::new("com.x.Outer$Inner").annotated(bean()).build(),
        ClassBuilder::new("com.x.Outer$Nested")
            .access(cdi_capgen::class::ACC_PUBLIC | cdi_capgen::class::ACC_STATIC)
            .annotated(bean())
            .build(),
        ClassBuilder::new("com.x.Api")
            .access(cdi_capgen::class::ACC_PUBLIC | cdi_capgen::class::ACC_INTERFACE | cdi_capgen::class::ACC_ABSTRACT)
            .annotated(bean())
            .build(),
    ]);
    let mut manifest = Manifest::new();
    let report = analyze(&index, "*", &mut manifest);
    assert_eq!(report.bean_names(), vec!["com.x.Outer$Nested"]);
}

#[test]
fn test_classes_outside_bean_archives_are_ignored() {
    let mut index = index_of([
        ClassBuilder::new("com.x.Own").annotated(bean()).build(),
        ClassBuilder::new("com.lib.Foreign").annotated(bean()).build(),
    ]);
    index.set_package_source("com.lib", "lib/foreign.jar");

    let mut manifest = Manifest::new();
    let report = analyze(&index, "*", &mut manifest);
    assert_eq!(report.bean_names(), vec!["com.x.Own"]);

    // Packages the unit does not contain are never analyzed either.
    let sources = PackageSources::default();
    let instructions = Instructions::parse("*").unwrap();
    let archives = BeanArchives::unit("app", None);
    let ctx = AnalysisContext::new();
    let report = CapabilitySynthesizer::new(&index, &instructions, &sources, &archives)
        .analyze(&mut Manifest::new(), &ctx);
    assert!(report.beans.is_empty());
}

#[test]
fn test_rerun_keeps_existing_clauses() {
    let index = index_of([foo_bar_bean().build()]);
    let mut manifest = Manifest::new();
    manifest.set_header(REQUIRE, r#"osgi.ee;filter:="(&(osgi.ee=JavaSE)(version=11))""#.to_string());

    analyze(&index, "*", &mut manifest);
    let first = manifest.get_header(REQUIRE).unwrap().to_string();
    assert!(first.starts_with(r#"osgi.ee;filter:="(&(osgi.ee=JavaSE)(version=11))","#));

    let index = index_of([
        foo_bar_bean().build(),
        ClassBuilder::new("com.x.Second")
            .annotated(bean())
            .field("baz", "Lcom/x/Baz;", vec![reference()])
            .build(),
    ]);
    analyze(&index, "*", &mut manifest);
    let second = manifest.get_header(REQUIRE).unwrap();

    let clauses: Vec<&str> = second.split(",osgi.").collect();
    assert!(second.contains("objectClass=com.x.Baz"));
    assert!(second.contains(r#"beans:List<String>="com.x.Consumer""#));
    assert!(second.contains(r#"beans:List<String>="com.x.Consumer,com.x.Second""#));
    assert!(clauses.len() > first.split(",osgi.").count());

    // A third identical run changes nothing.
    let before = second.to_string();
    analyze(&index, "*", &mut manifest);
    assert_eq!(manifest.get_header(REQUIRE), Some(before.as_str()));
}

#[test]
fn test_empty_instructions_do_nothing() {
    let index = index_of([foo_bar_bean().build()]);
    let mut manifest = Manifest::new();
    let report = analyze(&index, "", &mut manifest);
    assert!(report.beans.is_empty());
    assert_eq!(manifest.headers().count(), 1);
}

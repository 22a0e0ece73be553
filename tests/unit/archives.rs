//! Bean archive membership decided by nested JARs and their descriptors.

use crate::common::{jar, manifest_text};
use cdi_capgen::archive::{BeanArchives, JarArchive};
use cdi_capgen::core::AnalysisContext;
use cdi_capgen::instruction::Instructions;
use cdi_capgen::manifest::{HeaderStore, Manifest};
use cdi_capgen::synthesizer::CapabilitySynthesizer;
use cdi_capgen::test_utils::{ClassBuilder, bean, index_of, service};
use semver::Version;

fn unit_with_libraries() -> JarArchive {
    let annotated = jar(vec![(
        "META-INF/beans.xml",
        br#"<beans xmlns="https://jakarta.ee/xml/ns/jakartaee" version="3.0" bean-discovery-mode="annotated"/>"#.to_vec(),
    )])
    .unwrap();
    let plain = jar(vec![("META-INF/MANIFEST.MF", manifest_text(&[("Bundle-Version", "2.0.0")]))]).unwrap();

    let unit = jar(vec![
        (
            "META-INF/MANIFEST.MF",
            manifest_text(&[
                ("Bundle-Version", "1.4.0"),
                ("Bundle-ClassPath", ".,lib/annotated.jar,lib/plain.jar"),
            ]),
        ),
        ("lib/annotated.jar", annotated),
        ("lib/plain.jar", plain),
    ])
    .unwrap();
    JarArchive::from_bytes("app.jar", unit).unwrap()
}

#[test]
fn test_only_bean_archive_classes_are_analyzed() {
    let unit = unit_with_libraries();
    let ctx = AnalysisContext::new();
    let archives = BeanArchives::discover(&unit, &Version::new(1, 1, 0), &ctx).unwrap();
    assert_eq!(archives.names(), vec!["app.jar-1.4.0", "lib/annotated.jar-0.0.0"]);

    let mut index = index_of([
        ClassBuilder::new("com.app.Own").annotated(bean()).annotated(service()).build(),
        ClassBuilder::new("com.annotated.Lib").annotated(bean()).annotated(service()).build(),
        ClassBuilder::new("com.plain.Lib").annotated(bean()).annotated(service()).build(),
    ]);
    index.set_package_source("com.annotated", "lib/annotated.jar");
    index.set_package_source("com.plain", "lib/plain.jar");

    let instructions = Instructions::parse("*").unwrap();
    let sources = index.package_sources();
    let mut manifest = Manifest::new();
    let report = CapabilitySynthesizer::new(&index, &instructions, &sources, &archives)
        .analyze(&mut manifest, &ctx);

    assert_eq!(report.bean_names(), vec!["com.annotated.Lib", "com.app.Own"]);
    let provided = manifest.get_header("Provide-Capability").unwrap();
    assert!(provided.contains("com.app.Own"));
    assert!(!provided.contains("com.plain.Lib"));
    assert!(!ctx.has_errors());
}

#[test]
fn test_archive_version_threshold() {
    let legacy = jar(vec![(
        "META-INF/beans.xml",
        br#"<beans version="1.0" bean-discovery-mode="none"/>"#.to_vec(),
    )])
    .unwrap();
    let unit = jar(vec![
        ("META-INF/MANIFEST.MF", manifest_text(&[("Bundle-ClassPath", ".,lib/legacy.jar")])),
        ("lib/legacy.jar", legacy),
    ])
    .unwrap();
    let unit = JarArchive::from_bytes("app.jar", unit).unwrap();
    let ctx = AnalysisContext::new();

    // Below the threshold the declared mode is not honoured: the archive is `all`.
    let archives = BeanArchives::discover(&unit, &Version::new(1, 1, 0), &ctx).unwrap();
    assert!(archives.contains_source("lib/legacy.jar"));

    let archives = BeanArchives::discover(&unit, &Version::new(1, 0, 0), &ctx).unwrap();
    assert!(!archives.contains_source("lib/legacy.jar"));
}

use super::cdi_capgen;
use crate::common::TestProject;
use predicates::prelude::*;

fn check(project: &TestProject, content: Option<&str>, extra: &[&str]) -> assert_cmd::assert::Assert {
    let path = match content {
        Some(content) => project.write("beans.xml", content).unwrap(),
        None => project.path().join("missing.xml"),
    };
    cdi_capgen().arg("check-descriptor").arg(&path).args(extra).assert()
}

#[test]
fn test_descriptor_modes() {
    let project = TestProject::new().unwrap();

    check(&project, None, &[]).success().stdout("none\n");
    check(&project, Some(""), &[]).success().stdout("all\n");
    check(&project, Some("<beans/>"), &[]).success().stdout("all\n");
    check(&project, Some(r#"<beans version="1.1"/>"#), &[]).success().stdout("annotated\n");
    check(&project, Some(r#"<beans version="2.0" bean-discovery-mode="all"/>"#), &[])
        .success()
        .stdout("all\n");
}

#[test]
fn test_descriptor_archive_version_flag() {
    let project = TestProject::new().unwrap();
    let descriptor = r#"<beans version="1.1" bean-discovery-mode="none"/>"#;

    check(&project, Some(descriptor), &[]).success().stdout("none\n");
    check(&project, Some(descriptor), &["--archive-version", "2.0"]).success().stdout("all\n");
}

#[test]
fn test_descriptor_unknown_mode_fails() {
    let project = TestProject::new().unwrap();
    check(&project, Some(r#"<beans version="1.1" bean-discovery-mode="anotated"/>"#), &[])
        .failure()
        .stderr(predicate::str::contains("anotated"))
        .stderr(predicate::str::contains("annotated"));
}

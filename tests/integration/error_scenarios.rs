use super::cdi_capgen;
use crate::common::TestProject;
use predicates::prelude::*;

const BROKEN_REFERENCE_INDEX: &str = r#"{
    "classes": [
        {
            "name": "com.x.Broken",
            "annotations": [{ "name": "org.osgi.service.cdi.annotations.Bean" }],
            "fields": [
                {
                    "name": "raw",
                    "descriptor": "Ljava/util/List;",
                    "annotations": [{ "name": "org.osgi.service.cdi.annotations.Reference" }]
                }
            ]
        }
    ]
}"#;

#[test]
fn test_missing_index_fails() {
    let project = TestProject::new().unwrap();
    cdi_capgen()
        .current_dir(project.path())
        .args(["analyze", "--index", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn test_malformed_index_fails() {
    let project = TestProject::new().unwrap();
    let index = project.write("classes.json", "{ not json").unwrap();
    cdi_capgen()
        .current_dir(project.path())
        .args(["analyze", "--index"])
        .arg(&index)
        .assert()
        .failure()
        .stderr(predicate::str::contains("classes.json"));
}

#[test]
fn test_invalid_instructions_fail() {
    let project = TestProject::new().unwrap();
    let index = project.write("classes.json", BROKEN_REFERENCE_INDEX).unwrap();
    cdi_capgen()
        .current_dir(project.path())
        .args(["analyze", "--instructions", "com.x.*;discover=\"all", "--index"])
        .arg(&index)
        .assert()
        .failure();
}

#[test]
fn test_analysis_errors_fail_unless_allowed() {
    let project = TestProject::new().unwrap();
    let index = project.write("classes.json", BROKEN_REFERENCE_INDEX).unwrap();

    cdi_capgen()
        .current_dir(project.path())
        .args(["analyze", "--index"])
        .arg(&index)
        .assert()
        .failure()
        .stderr(predicate::str::contains("In bean com.x.Broken, member raw"))
        .stderr(predicate::str::contains("Analysis reported 1 error(s)"));

    // The bean itself is still reported; only the reference is dropped.
    cdi_capgen()
        .current_dir(project.path())
        .args(["analyze", "--allow-errors", "--index"])
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("beans:List<String>=\"com.x.Broken\""));

    project.write("cdi-capgen.toml", "fail_on_error = false\n").unwrap();
    cdi_capgen()
        .current_dir(project.path())
        .args(["analyze", "--index"])
        .arg(&index)
        .assert()
        .success();
}

#[test]
fn test_invalid_config_fails() {
    let project = TestProject::new().unwrap();
    let index = project.write("classes.json", BROKEN_REFERENCE_INDEX).unwrap();
    project.write("cdi-capgen.toml", "extender_version = \"one\"\n").unwrap();
    cdi_capgen()
        .current_dir(project.path())
        .args(["analyze", "--index"])
        .arg(&index)
        .assert()
        .failure()
        .stderr(predicate::str::contains("extender_version"));
}

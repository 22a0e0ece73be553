use super::cdi_capgen;
use crate::common::{CONSUMER_INDEX, TestProject};
use predicates::prelude::*;

#[test]
fn test_beans_lists_services_and_references() {
    let project = TestProject::new().unwrap();
    let index = project.write("classes.json", CONSUMER_INDEX).unwrap();

    cdi_capgen()
        .current_dir(project.path())
        .args(["beans", "--index"])
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("com.x.Consumer"))
        .stdout(predicate::str::contains("requires: com.x.Foo (MANDATORY)"))
        .stdout(predicate::str::contains("produces: com.x.Bar"))
        .stdout(predicate::str::contains("com.x.Helper").not());
}

#[test]
fn test_beans_with_discover_all() {
    let project = TestProject::new().unwrap();
    let index = project.write("classes.json", CONSUMER_INDEX).unwrap();

    let output = cdi_capgen()
        .current_dir(project.path())
        .args(["beans", "--discover", "all", "--format", "json", "--index"])
        .arg(&index)
        .output()
        .unwrap();
    assert!(output.status.success());

    let beans: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<_> = beans.as_array().unwrap().iter().map(|b| b["class"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["com.x.Consumer", "com.x.Helper"]);
}

#[test]
fn test_beans_none_found() {
    let project = TestProject::new().unwrap();
    let index = project.write("classes.json", r#"{"classes": [{"name": "a.A"}]}"#).unwrap();

    cdi_capgen()
        .current_dir(project.path())
        .args(["beans", "--index"])
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("No beans found"));
}

use super::cdi_capgen;
use crate::common::{CONSUMER_INDEX, TestProject, jar, manifest_text};
use predicates::prelude::*;

#[test]
fn test_analyze_prints_manifest() {
    let project = TestProject::new().unwrap();
    let index = project.write("classes.json", CONSUMER_INDEX).unwrap();

    cdi_capgen()
        .current_dir(project.path())
        .args(["analyze", "--index"])
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("Manifest-Version: 1.0"))
        .stdout(predicate::str::contains("Provide-Capability: osgi.service;objectClass:List<String>=\"com.x.Bar\""))
        .stdout(predicate::str::contains("Require-Capability: "))
        .stdout(predicate::str::contains("osgi.extender"));
}

#[test]
fn test_analyze_updates_manifest_in_place() {
    let project = TestProject::new().unwrap();
    let index = project.write("classes.json", CONSUMER_INDEX).unwrap();
    let manifest = project
        .write(
            "MANIFEST.MF",
            manifest_text(&[
                ("Bundle-SymbolicName", "com.x.app"),
                ("Require-Capability", "osgi.ee;filter:=\"(osgi.ee=JavaSE)\""),
            ]),
        )
        .unwrap();

    cdi_capgen()
        .current_dir(project.path())
        .args(["analyze", "--index"])
        .arg(&index)
        .arg("--manifest")
        .arg(&manifest)
        .arg("--output")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 bean(s)"));

    let written = project.read("MANIFEST.MF").unwrap();
    assert!(written.contains("Bundle-SymbolicName: com.x.app"));
    // Long headers are wrapped at 72 bytes; join continuation lines again.
    let unwrapped = written.replace("\r\n ", "");
    assert!(unwrapped.contains("Require-Capability: osgi.ee;filter:=\"(osgi.ee=JavaSE)\",osgi.extender"));
    assert!(unwrapped.contains("osgi.service;filter:=\"(objectClass=com.x.Foo)\";effective:=active"));
}

#[test]
fn test_analyze_json_report() {
    let project = TestProject::new().unwrap();
    let index = project.write("classes.json", CONSUMER_INDEX).unwrap();

    let output = cdi_capgen()
        .current_dir(project.path())
        .args(["analyze", "--format", "json", "--index"])
        .arg(&index)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["bean_archives"][0], "com.x.app-1.0.0");
    assert_eq!(report["beans"][0]["class"], "com.x.Consumer");
    assert_eq!(report["beans"][0]["modes"][0], "annotated_by_bean");
    assert_eq!(report["beans"][0]["definitions"][0]["references"][0]["cardinality"], "MANDATORY");
    assert_eq!(report["provided"][0], "osgi.service;objectClass:List<String>=\"com.x.Bar\"");
    assert!(report["headers"]["Require-Capability"].is_string());
    assert_eq!(report["diagnostics"].as_array().unwrap().len(), 0);
}

#[test]
fn test_analyze_instructions_from_config_and_flag() {
    let project = TestProject::new().unwrap();
    let index = project.write("classes.json", CONSUMER_INDEX).unwrap();
    project.write("cdi-capgen.toml", "instructions = \"!com.x.Consumer,*\"\n").unwrap();

    // The config file in the working directory excludes the bean.
    cdi_capgen()
        .current_dir(project.path())
        .args(["analyze", "--index"])
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("Capability").not());

    // The environment overrides the file.
    cdi_capgen()
        .current_dir(project.path())
        .env("CDI_CAPGEN_INSTRUCTIONS", "com.x.*")
        .args(["analyze", "--index"])
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("Provide-Capability"));

    // The flag overrides both.
    cdi_capgen()
        .current_dir(project.path())
        .env("CDI_CAPGEN_INSTRUCTIONS", "com.x.*")
        .args(["analyze", "--instructions", "com.y.*", "--index"])
        .arg(&index)
        .assert()
        .success()
        .stdout(predicate::str::contains("Capability").not());
}

#[test]
fn test_analyze_with_jar_uses_its_manifest_and_archives() {
    let project = TestProject::new().unwrap();
    let index = project
        .write(
            "classes.json",
            r#"{
                "packages": { "com.lib": "lib/lib.jar" },
                "classes": [
                    {
                        "name": "com.app.Own",
                        "annotations": [
                            { "name": "org.osgi.service.cdi.annotations.Bean" },
                            { "name": "org.osgi.service.cdi.annotations.Service" }
                        ]
                    },
                    {
                        "name": "com.lib.Foreign",
                        "annotations": [
                            { "name": "org.osgi.service.cdi.annotations.Bean" },
                            { "name": "org.osgi.service.cdi.annotations.Service" }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();
    let lib = jar(vec![("README", b"no descriptor".to_vec())]).unwrap();
    let unit = jar(vec![
        (
            "META-INF/MANIFEST.MF",
            manifest_text(&[
                ("Bundle-SymbolicName", "com.app"),
                ("Bundle-Version", "3.1.0"),
                ("Bundle-ClassPath", ".,lib/lib.jar"),
            ]),
        ),
        ("lib/lib.jar", lib),
    ])
    .unwrap();
    let unit = project.write("app.jar", unit).unwrap();

    let output = cdi_capgen()
        .current_dir(project.path())
        .args(["analyze", "--format", "json", "--index"])
        .arg(&index)
        .arg("--jar")
        .arg(&unit)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["bean_archives"], serde_json::json!(["app.jar-3.1.0"]));
    assert_eq!(report["beans"].as_array().unwrap().len(), 1);
    assert_eq!(report["beans"][0]["class"], "com.app.Own");
}

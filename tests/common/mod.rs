//! Common test utilities and fixtures for cdi-capgen tests

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use anyhow::Result;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Class index with a `@Bean` consuming `com.x.Foo` and producing `com.x.Bar`.
pub const CONSUMER_INDEX: &str = r#"{
    "name": "com.x.app",
    "version": "1.0.0",
    "classes": [
        {
            "name": "com.x.Consumer",
            "annotations": [{ "name": "org.osgi.service.cdi.annotations.Bean" }],
            "fields": [
                {
                    "name": "foo",
                    "descriptor": "Lcom/x/Foo;",
                    "annotations": [{ "name": "org.osgi.service.cdi.annotations.Reference" }]
                }
            ],
            "methods": [
                {
                    "name": "bar",
                    "descriptor": "()Lcom/x/Bar;",
                    "annotations": [{ "name": "org.osgi.service.cdi.annotations.Service" }]
                }
            ]
        },
        { "name": "com.x.Helper" }
    ]
}"#;

/// Bytes of a JAR holding `entries`.
pub fn jar(entries: Vec<(&str, Vec<u8>)>) -> Result<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (path, content) in entries {
        writer.start_file(path, SimpleFileOptions::default())?;
        writer.write_all(&content)?;
    }
    Ok(writer.finish()?.into_inner())
}

/// A manifest text with CRLF line endings.
pub fn manifest_text(headers: &[(&str, &str)]) -> Vec<u8> {
    let mut text = String::from("Manifest-Version: 1.0\r\n");
    for (name, value) in headers {
        text.push_str(&format!("{name}: {value}\r\n"));
    }
    text.push_str("\r\n");
    text.into_bytes()
}

/// Scratch directory for one test.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` inside the project and return its path.
    pub fn write(&self, name: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    pub fn read(&self, name: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.dir.path().join(name))?)
    }
}

//! Packaging units and bean archives.
//!
//! A packaging unit is a JAR whose `Bundle-ClassPath` may name nested JARs.
//! Each of them (and the unit itself) is an *archive*; an archive is a *bean
//! archive* when its `META-INF/beans.xml` declares a discovery mode other than
//! `none` (see [`descriptor`]). The unit itself always counts as a bean
//! archive. Only classes from bean archives are analyzed.
//!
//! Archives are read fully into memory: nested JARs are opened from the
//! bytes of their entry in the enclosing JAR.

pub mod descriptor;

pub use descriptor::{find_discovery_mode, parse_osgi_version};

use crate::class::index::UNIT_SOURCE;
use crate::constants::{
    BEANS_DESCRIPTOR, BUNDLE_CLASSPATH, BUNDLE_VERSION, MANIFEST_PATH, UNVERSIONED,
};
use crate::core::{AnalysisContext, CapgenError, Result};
use crate::discover::Discover;
use crate::header::Parameters;
use crate::manifest::{HeaderStore, Manifest};
use serde::Serialize;
use semver::Version;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::{debug, warn};

/// Read access to the entries of an archive.
pub trait Archive {
    fn name(&self) -> &str;

    /// Entry contents by path (`META-INF/beans.xml`).
    fn resource(&self, path: &str) -> Option<&[u8]>;

    /// The parsed `META-INF/MANIFEST.MF`, if present.
    fn manifest(&self) -> Result<Option<Manifest>> {
        self.resource(MANIFEST_PATH)
            .map(|bytes| Manifest::parse(&String::from_utf8_lossy(bytes)))
            .transpose()
    }

    /// `Bundle-Version` of the archive.
    fn version(&self) -> Option<String> {
        match self.manifest() {
            Ok(manifest) => manifest
                .and_then(|m| m.get_header(BUNDLE_VERSION).map(|v| v.trim().to_string())),
            Err(e) => {
                warn!("Ignoring unreadable manifest of {}: {e}", self.name());
                None
            }
        }
    }

    /// `Bundle-ClassPath` entries, `.` when the header is absent.
    fn bundle_class_path(&self) -> Result<Vec<String>> {
        let header = self
            .manifest()?
            .and_then(|m| m.get_header(BUNDLE_CLASSPATH).map(str::to_string));
        match header {
            Some(header) => Ok(Parameters::parse(&header)?.into_iter().map(|c| c.key).collect()),
            None => Ok(vec![UNIT_SOURCE.to_string()]),
        }
    }
}

/// An archive held as a map of entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    name: String,
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryArchive {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.entries.insert(path.into(), content.into());
    }

    #[must_use]
    pub fn with_entry(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Archive for MemoryArchive {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }
}

/// A JAR file read with the `zip` crate.
#[derive(Debug, Clone)]
pub struct JarArchive {
    entries: MemoryArchive,
}

impl JarArchive {
    /// Read a JAR from its bytes; `name` is used for archive names and errors.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let archive_error = |reason: String| CapgenError::ArchiveError {
            path: name.clone(),
            reason,
        };

        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| archive_error(e.to_string()))?;
        let mut entries = MemoryArchive::new(name.clone());

        for i in 0..zip.len() {
            let mut file = zip.by_index(i).map_err(|e| archive_error(e.to_string()))?;
            if file.is_dir() {
                continue;
            }
            let path = file.name().to_string();
            let mut content = Vec::new();
            file.read_to_end(&mut content)?;
            entries.insert(path, content);
        }
        debug!("Read {} entries from {name}", entries.entries.len());

        Ok(Self {
            entries,
        })
    }

    /// Open a JAR file; the archive is named after the file name.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self::from_bytes(name, bytes)
    }

    /// The nested JAR at `path`, if the entry exists.
    pub fn nested(&self, path: &str) -> Result<Option<Self>> {
        self.resource(path).map(|bytes| Self::from_bytes(path, bytes.to_vec())).transpose()
    }
}

impl Archive for JarArchive {
    fn name(&self) -> &str {
        self.entries.name()
    }

    fn resource(&self, path: &str) -> Option<&[u8]> {
        self.entries.resource(path)
    }
}

/// Archive name used for bean archive membership: `<name>-<version>`.
#[must_use]
pub fn archive_name(name: &str, version: Option<&str>) -> String {
    format!("{name}-{}", version.unwrap_or(UNVERSIONED))
}

/// One bean archive of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BeanArchive {
    /// `Bundle-ClassPath` entry; `.` for the unit itself.
    pub path: String,
    /// `<name>-<version>`.
    pub name: String,
    pub mode: Discover,
}

/// The bean archives of a packaging unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BeanArchives {
    archives: Vec<BeanArchive>,
}

impl BeanArchives {
    /// Only the unit itself, for class spaces without archive contents.
    #[must_use]
    pub fn unit(name: &str, version: Option<&str>) -> Self {
        Self {
            archives: vec![BeanArchive {
                path: UNIT_SOURCE.to_string(),
                name: archive_name(name, version),
                mode: Discover::All,
            }],
        }
    }

    /// The unit plus every nested `Bundle-ClassPath` JAR that is a bean
    /// archive.
    ///
    /// Unreadable descriptors are reported to `ctx` and their archive is
    /// treated as `all`.
    ///
    /// # Errors
    ///
    /// Fails when the unit's manifest or a nested JAR cannot be read.
    pub fn discover(
        unit: &JarArchive,
        archive_version: &Version,
        ctx: &AnalysisContext,
    ) -> Result<Self> {
        let unit_version = unit.version();
        let mut archives = Self::unit(unit.name(), unit_version.as_deref());
        if let Some(own) = archives.archives.first_mut() {
            own.mode = descriptor_mode(unit, archive_version, ctx);
        }

        for path in unit.bundle_class_path()? {
            let Some(nested) = unit.nested(&path)? else {
                continue;
            };
            let mode = descriptor_mode(&nested, archive_version, ctx);
            let name = archive_name(&path, nested.version().as_deref());
            debug!("Archive {name}: discovery mode {mode}");
            if mode != Discover::None {
                archives.archives.push(BeanArchive {
                    path,
                    name,
                    mode,
                });
            }
        }

        Ok(archives)
    }

    /// Whether classes loaded from class-path entry `source` are analyzed.
    #[must_use]
    pub fn contains_source(&self, source: &str) -> bool {
        self.archives.iter().any(|archive| archive.path == source)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BeanArchive> {
        self.archives.iter()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.archives.iter().map(|archive| archive.name.as_str()).collect()
    }
}

fn descriptor_mode(archive: &dyn Archive, archive_version: &Version, ctx: &AnalysisContext) -> Discover {
    match find_discovery_mode(archive.resource(BEANS_DESCRIPTOR), archive_version) {
        Ok(mode) => mode,
        Err(e) => {
            ctx.error(None, None, format!("Invalid {BEANS_DESCRIPTOR} in {}: {e}", archive.name()));
            Discover::All
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn jar(entries: Vec<(&str, Vec<u8>)>) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (path, content) in entries {
            writer.start_file(path, SimpleFileOptions::default()).unwrap();
            writer.write_all(&content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_archive_name_defaults_version() {
        assert_eq!(archive_name("app.jar", Some("1.2.3")), "app.jar-1.2.3");
        assert_eq!(archive_name("app.jar", None), "app.jar-0.0.0");
    }

    #[test]
    fn test_jar_entries_and_version() {
        let bytes = jar(vec![
            (MANIFEST_PATH, b"Manifest-Version: 1.0\r\nBundle-Version: 2.1.0\r\n\r\n".to_vec()),
            ("com/acme/Greeter.class", b"\xca\xfe\xba\xbe".to_vec()),
        ]);
        let archive = JarArchive::from_bytes("app.jar", bytes).unwrap();
        assert_eq!(archive.version().as_deref(), Some("2.1.0"));
        assert!(archive.resource("com/acme/Greeter.class").is_some());
        assert_eq!(archive.bundle_class_path().unwrap(), vec!["."]);
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            JarArchive::from_bytes("broken.jar", b"not a zip".to_vec()),
            Err(CapgenError::ArchiveError { .. })
        ));
    }

    #[test]
    fn test_discover_nested_bean_archives() {
        let beans = jar(vec![(BEANS_DESCRIPTOR, br#"<beans version="1.1"/>"#.to_vec())]);
        let plain = jar(vec![("README", b"no descriptor".to_vec())]);
        let disabled = jar(vec![(
            BEANS_DESCRIPTOR,
            br#"<beans version="2.0" bean-discovery-mode="none"/>"#.to_vec(),
        )]);
        let unit = jar(vec![
            (
                MANIFEST_PATH,
                b"Manifest-Version: 1.0\r\nBundle-ClassPath: .,lib/beans.jar,lib/plain.jar,lib/disabled.jar,lib/missing.jar\r\n\r\n"
                    .to_vec(),
            ),
            ("lib/beans.jar", beans),
            ("lib/plain.jar", plain),
            ("lib/disabled.jar", disabled),
        ]);

        let unit = JarArchive::from_bytes("app.jar", unit).unwrap();
        let ctx = AnalysisContext::new();
        let archives = BeanArchives::discover(&unit, &Version::new(1, 1, 0), &ctx).unwrap();

        assert_eq!(archives.names(), vec!["app.jar-0.0.0", "lib/beans.jar-0.0.0"]);
        assert!(archives.contains_source("."));
        assert!(archives.contains_source("lib/beans.jar"));
        assert!(!archives.contains_source("lib/plain.jar"));
        assert!(!archives.contains_source("lib/disabled.jar"));
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_invalid_descriptor_is_reported_and_treated_as_all() {
        let broken = jar(vec![(
            BEANS_DESCRIPTOR,
            br#"<beans version="1.1" bean-discovery-mode="most"/>"#.to_vec(),
        )]);
        let unit = jar(vec![
            (
                MANIFEST_PATH,
                b"Manifest-Version: 1.0\r\nBundle-ClassPath: ., lib/broken.jar\r\n\r\n".to_vec(),
            ),
            ("lib/broken.jar", broken),
        ]);
        let unit = JarArchive::from_bytes("app.jar", unit).unwrap();
        let ctx = AnalysisContext::new();
        let archives = BeanArchives::discover(&unit, &Version::new(1, 1, 0), &ctx).unwrap();

        assert!(archives.contains_source("lib/broken.jar"));
        assert_eq!(ctx.error_count(), 1);
    }

    #[test]
    fn test_memory_archive() {
        let archive = MemoryArchive::new("mem").with_entry(BEANS_DESCRIPTOR, "<beans/>");
        assert_eq!(archive.paths().collect::<Vec<_>>(), vec![BEANS_DESCRIPTOR]);
        assert_eq!(archive.version(), None);
        assert_eq!(
            find_discovery_mode(archive.resource(BEANS_DESCRIPTOR), &Version::new(1, 1, 0)).unwrap(),
            Discover::All
        );
    }
}

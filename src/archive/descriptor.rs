//! Bean descriptor (`META-INF/beans.xml`) reading.
//!
//! The descriptor decides an archive's discovery mode:
//!
//! | Descriptor                                         | Mode               |
//! |----------------------------------------------------|--------------------|
//! | absent                                             | `none`             |
//! | empty or not well-formed                           | `all`              |
//! | `<beans>` without `version`, or below 1.1          | `all`              |
//! | `<beans version="1.1">` or later                   | `annotated`        |
//! | ... with `bean-discovery-mode="x"`                 | `x`                |
//!
//! Versions use OSGi syntax (`1.1`, `2.0.0.Final`) and are compared on their
//! numeric parts.

use crate::core::{CapgenError, Result};
use crate::discover::Discover;
use regex::Regex;
use roxmltree::Document;
use semver::Version;
use std::sync::LazyLock;
use tracing::{debug, trace};

const VERSION_ATTRIBUTE: &str = "version";
const MODE_ATTRIBUTE: &str = "bean-discovery-mode";

static OSGI_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)(?:\.(\d+)(?:\.(\d+)(?:\.[-\w]+)?)?)?$")
        .expect("OSGi version pattern is a valid regex")
});

/// Parse an OSGi version (`major[.minor[.micro[.qualifier]]]`) into its numeric
/// semver equivalent. The qualifier is dropped.
pub fn parse_osgi_version(text: &str) -> Result<Version> {
    let invalid = || CapgenError::DescriptorError {
        archive: String::new(),
        reason: format!("invalid version '{text}'"),
    };

    let captures = OSGI_VERSION.captures(text.trim()).ok_or_else(invalid)?;
    let part = |i: usize| -> Result<u64> {
        captures.get(i).map_or(Ok(0), |m| m.as_str().parse().map_err(|_| invalid()))
    };
    Ok(Version::new(part(1)?, part(2)?, part(3)?))
}

/// Discovery mode declared by a descriptor.
///
/// `content` is the descriptor, `None` when the archive has none;
/// `archive_version` is the first descriptor version whose
/// `bean-discovery-mode` is honoured.
///
/// # Errors
///
/// Returns [`CapgenError::DescriptorError`] when the `version` attribute is
/// not a version, and [`CapgenError::DiscoveryMode`] for an unknown
/// `bean-discovery-mode`.
pub fn find_discovery_mode(content: Option<&[u8]>, archive_version: &Version) -> Result<Discover> {
    let Some(content) = content else {
        return Ok(Discover::None);
    };

    let Ok(text) = std::str::from_utf8(content) else {
        debug!("Descriptor is not UTF-8, treating as 'all'");
        return Ok(Discover::All);
    };
    let document = match Document::parse(text) {
        Ok(document) => document,
        Err(e) => {
            debug!("Descriptor is not well-formed ({e}), treating as 'all'");
            return Ok(Discover::All);
        }
    };

    let root = document.root_element();
    if !root.has_tag_name("beans") {
        return Ok(Discover::All);
    }

    let Some(version) = root.attribute(VERSION_ATTRIBUTE) else {
        return Ok(Discover::All);
    };
    let version = parse_osgi_version(version)?;
    trace!("Descriptor version {version}");

    if version < *archive_version {
        return Ok(Discover::All);
    }

    match root.attribute(MODE_ATTRIBUTE) {
        Some(mode) => mode.trim().parse(),
        None => Ok(Discover::Annotated),
    }
}

//! cdi-capgen - OSGi capabilities from CDI bean annotations
//!
//! Reads the class model of a packaging unit, finds the CDI beans in it and
//! derives the OSGi service capabilities and requirements they imply, so that
//! the manifest of the unit states which services its beans publish and
//! consume, and that the unit needs the CDI extender.
//!
//! # Architecture Overview
//!
//! One analysis run flows through these stages:
//!
//! 1. [`archive`] decides which archives of the unit are bean archives,
//!    reading their `META-INF/beans.xml` descriptors
//! 2. [`synthesizer`] selects classes with bnd-style [`instruction`]s and
//!    parses their [`discover`] modes
//! 3. [`reader`] walks each selected class model ([`class`]), resolving
//!    generic types with [`signature`], and yields [`bean`] definitions
//! 4. [`synthesizer`] folds the definitions into [`header`] clauses and merges
//!    them into the [`manifest`]
//!
//! Problems found on the way never abort the run: they are recorded as
//! [`core::Diagnostic`]s in the [`core::AnalysisContext`] and only the affected
//! contribution is dropped.
//!
//! # Core Modules
//!
//! - [`archive`] - Packaging units, nested archives and bean descriptors
//! - [`bean`] - Bean, reference and package definitions
//! - [`class`] - Class model, JSON class index and the introspector trait
//! - [`cli`] - Command-line interface
//! - [`config`] - `cdi-capgen.toml` configuration
//! - [`constants`] - Annotation names, namespaces and header names
//! - [`core`] - Errors and the analysis context
//! - [`discover`] - Bean discovery modes
//! - [`header`] - OSGi header parsing and serialization
//! - [`instruction`] - Class selection patterns
//! - [`manifest`] - `MANIFEST.MF` reading and writing
//! - [`reader`] - Bean definitions from class models
//! - [`signature`] - JVM generic signatures and type resolution
//! - [`synthesizer`] - Capability and requirement synthesis
//!
//! # Generated Headers
//!
//! ```text
//! Provide-Capability: osgi.service;objectClass:List<String>="com.acme.Greeter"
//! Require-Capability: osgi.extender;filter:="(&(osgi.extender=osgi.cdi)(version>=1.0.0)(!(version>=2.0.0)))";beans:List<String>="com.acme.GreeterImpl",
//!  osgi.service;filter:="(objectClass=com.acme.Clock)";effective:=active
//! ```

pub mod archive;
pub mod bean;
pub mod class;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod discover;
pub mod header;
pub mod instruction;
pub mod manifest;
pub mod reader;
pub mod signature;
pub mod synthesizer;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

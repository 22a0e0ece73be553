//! Global constants used throughout the cdi-capgen codebase.
//!
//! This module holds the fixed vocabulary the analysis dispatches on: the
//! fully-qualified names of the CDI and OSGi annotations, the wrapper types
//! that references are unwrapped through, the capability namespaces and the
//! manifest header names. Dispatch is always by exact string equality against
//! these values, never by prefix.

/// Marks a class as a bean when the archive uses `annotated_by_bean` discovery.
pub const BEAN_ANNOTATION: &str = "org.osgi.service.cdi.annotations.Bean";

/// Package-level annotation naming the classes of a package that are beans.
pub const BEANS_ANNOTATION: &str = "org.osgi.service.cdi.annotations.Beans";

/// Publishes a bean (or a producer field/method) as an OSGi service.
pub const SERVICE_ANNOTATION: &str = "org.osgi.service.cdi.annotations.Service";

/// Injection point bound to an OSGi service.
pub const REFERENCE_ANNOTATION: &str = "org.osgi.service.cdi.annotations.Reference";

/// Raises the minimum number of services a multi-valued reference needs.
pub const MINIMUM_CARDINALITY_ANNOTATION: &str =
    "org.osgi.service.cdi.annotations.MinimumCardinality";

pub const COMPONENT_SCOPED_ANNOTATION: &str = "org.osgi.service.cdi.annotations.ComponentScoped";
pub const NORMAL_SCOPE_ANNOTATION: &str = "javax.enterprise.context.NormalScope";
pub const STEREOTYPE_ANNOTATION: &str = "javax.enterprise.inject.Stereotype";
pub const DEPENDENT_ANNOTATION: &str = "javax.enterprise.context.Dependent";
pub const INTERCEPTOR_ANNOTATION: &str = "javax.interceptor.Interceptor";
pub const VETOED_ANNOTATION: &str = "javax.enterprise.inject.Vetoed";

/// Portable extensions are never beans.
pub const EXTENSION_INTERFACE: &str = "javax.enterprise.inject.spi.Extension";

/// Parameter types of bind methods, matched on their binary (slash) names.
pub const BIND_PARAMETER_TYPES: [&str; 3] = [
    "org/osgi/service/cdi/reference/BindService",
    "org/osgi/service/cdi/reference/BindBeanServiceObjects",
    "org/osgi/service/cdi/reference/BindServiceReference",
];

pub const PROVIDER_TYPE: &str = "javax.inject.Provider";
pub const COLLECTION_TYPE: &str = "java.util.Collection";
pub const LIST_TYPE: &str = "java.util.List";
pub const OPTIONAL_TYPE: &str = "java.util.Optional";
pub const BEAN_SERVICE_OBJECTS_TYPE: &str = "org.osgi.service.cdi.reference.BeanServiceObjects";
pub const SERVICE_REFERENCE_TYPE: &str = "org.osgi.framework.ServiceReference";
pub const MAP_ENTRY_TYPE: &str = "java.util.Map$Entry";

pub const OBJECT_TYPE: &str = "java.lang.Object";

/// Type-use target type for annotations on a class `extends`/`implements` clause.
pub const TYPEUSE_CLASS_EXTENDS: u8 = 0x10;

/// Type-use target index selecting the superclass instead of an interface.
pub const TYPEUSE_TARGET_INDEX_EXTENDS: i32 = 65535;

/// No type-use target has been recorded.
pub const TYPEUSE_INDEX_NONE: i32 = -1;

pub const SERVICE_NAMESPACE: &str = "osgi.service";
pub const EXTENDER_NAMESPACE: &str = "osgi.extender";
pub const CDI_EXTENDER: &str = "osgi.cdi";

pub const REQUIRE_CAPABILITY: &str = "Require-Capability";
pub const PROVIDE_CAPABILITY: &str = "Provide-Capability";
pub const BUNDLE_CLASSPATH: &str = "Bundle-ClassPath";
pub const BUNDLE_VERSION: &str = "Bundle-Version";
pub const BUNDLE_SYMBOLICNAME: &str = "Bundle-SymbolicName";

/// Conventional location of the bean descriptor inside an archive.
pub const BEANS_DESCRIPTOR: &str = "META-INF/beans.xml";
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Version of the CDI extender the generated requirement asks for.
pub const DEFAULT_EXTENDER_VERSION: &str = "1.0.0";

/// Descriptor version from which `bean-discovery-mode` is honoured.
pub const DEFAULT_ARCHIVE_VERSION: &str = "1.1.0";

/// Version used for archives that declare none.
pub const UNVERSIONED: &str = "0.0.0";

/// Default name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "cdi-capgen.toml";

/// Environment variable overriding the configured instructions.
pub const INSTRUCTIONS_ENV: &str = "CDI_CAPGEN_INSTRUCTIONS";

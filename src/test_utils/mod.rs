//! Test utilities for cdi-capgen
//!
//! Shared helpers for unit and integration tests:
//!
//! - [`init_test_logging`] installs a tracing subscriber once per process
//! - [`ClassBuilder`] and the annotation helpers build class models in code
//!   instead of JSON fixtures
//!
//! # Example
//!
//! ```rust,no_run
//! use cdi_capgen::test_utils::{ClassBuilder, bean, reference};
//!
//! let class = ClassBuilder::new("com.acme.Greeter")
//!     .annotated(bean())
//!     .field("clock", "Lcom/acme/Clock;", vec![reference()])
//!     .build();
//! assert_eq!(class.fields.len(), 1);
//! ```

use crate::class::{
    ACC_ABSTRACT, ACC_PUBLIC, Annotation, AnnotationValue, ClassIndex, ClassModel, FieldModel,
    MethodModel, TypeUseTarget,
};
use crate::constants::{
    BEAN_ANNOTATION, BEANS_ANNOTATION, MINIMUM_CARDINALITY_ANNOTATION, REFERENCE_ANNOTATION,
    SERVICE_ANNOTATION, TYPEUSE_CLASS_EXTENDS,
};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, `RUST_LOG` otherwise; without either, tests run
/// without a subscriber.
///
/// ```bash
/// RUST_LOG=cdi_capgen=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

pub fn annotation(name: &str) -> Annotation {
    Annotation::new(name)
}

/// `@Bean`
pub fn bean() -> Annotation {
    Annotation::new(BEAN_ANNOTATION)
}

/// `@Service` without explicit types.
pub fn service() -> Annotation {
    Annotation::new(SERVICE_ANNOTATION)
}

/// `@Service({types})`
pub fn service_types(types: &[&str]) -> Annotation {
    with_value(
        Annotation::new(SERVICE_ANNOTATION),
        AnnotationValue::Array(types.iter().map(|t| AnnotationValue::String((*t).to_string())).collect()),
    )
}

/// `@Service` on the `extends` clause (`index` 65535) or interface `index`.
pub fn type_use_service(index: i32) -> Annotation {
    type_use(Annotation::new(SERVICE_ANNOTATION), TYPEUSE_CLASS_EXTENDS, index)
}

/// `annotation` placed on a type use with an arbitrary target.
pub fn type_use(mut annotation: Annotation, target_type: u8, index: i32) -> Annotation {
    annotation.type_use = Some(TypeUseTarget {
        target_type,
        target_index: index,
    });
    annotation
}

/// `@Reference` without an explicit service.
pub fn reference() -> Annotation {
    Annotation::new(REFERENCE_ANNOTATION)
}

/// `@Reference({service})`
pub fn reference_to(service: &str) -> Annotation {
    with_value(Annotation::new(REFERENCE_ANNOTATION), AnnotationValue::String(service.to_string()))
}

/// `@MinimumCardinality({value})`
pub fn minimum_cardinality(value: i64) -> Annotation {
    with_value(Annotation::new(MINIMUM_CARDINALITY_ANNOTATION), AnnotationValue::Int(value))
}

/// `@Beans({names})`
pub fn beans(names: &[&str]) -> Annotation {
    let annotation = Annotation::new(BEANS_ANNOTATION);
    if names.is_empty() {
        return annotation;
    }
    with_value(
        annotation,
        AnnotationValue::Array(names.iter().map(|n| AnnotationValue::String((*n).to_string())).collect()),
    )
}

fn with_value(mut annotation: Annotation, value: AnnotationValue) -> Annotation {
    annotation.values.insert("value".to_string(), value);
    annotation
}

/// Builder for [`ClassModel`]s.
#[derive(Debug, Clone)]
pub struct ClassBuilder {
    class: ClassModel,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            class: ClassModel::new(name),
        }
    }

    /// Replace the access flags.
    #[must_use]
    pub fn access(mut self, access: u16) -> Self {
        self.class.access = access;
        self
    }

    #[must_use]
    pub fn abstract_class(self) -> Self {
        self.access(ACC_PUBLIC | ACC_ABSTRACT)
    }

    #[must_use]
    pub fn signature(mut self, signature: &str) -> Self {
        self.class.signature = Some(signature.to_string());
        self
    }

    #[must_use]
    pub fn extends(mut self, super_class: &str) -> Self {
        self.class.super_class = Some(super_class.to_string());
        self
    }

    #[must_use]
    pub fn implements(mut self, interface: &str) -> Self {
        self.class.interfaces.push(interface.to_string());
        self
    }

    #[must_use]
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.class.annotations.push(annotation);
        self
    }

    /// Add a field; a generic `signature` is also recorded as the field's
    /// signature, its erasure being left to the analysis.
    #[must_use]
    pub fn field(mut self, name: &str, signature: &str, annotations: Vec<Annotation>) -> Self {
        let generic = signature.contains('<') || signature.starts_with('T');
        self.class.fields.push(FieldModel {
            name: name.to_string(),
            access: ACC_PUBLIC,
            descriptor: signature.to_string(),
            signature: generic.then(|| signature.to_string()),
            annotations,
        });
        self
    }

    /// Add a public method.
    #[must_use]
    pub fn method(
        self,
        name: &str,
        signature: &str,
        annotations: Vec<Annotation>,
        parameter_annotations: Vec<Vec<Annotation>>,
    ) -> Self {
        let generic = signature.contains('<') || signature.contains('T');
        self.method_model(MethodModel {
            name: name.to_string(),
            access: ACC_PUBLIC,
            descriptor: signature.to_string(),
            signature: generic.then(|| signature.to_string()),
            annotations,
            parameter_annotations,
        })
    }

    #[must_use]
    pub fn method_model(mut self, method: MethodModel) -> Self {
        self.class.methods.push(method);
        self
    }

    #[must_use]
    pub fn build(self) -> ClassModel {
        self.class
    }
}

/// A class index holding `classes`.
pub fn index_of(classes: impl IntoIterator<Item = ClassModel>) -> ClassIndex {
    let mut index = ClassIndex::new();
    for class in classes {
        index.insert(class);
    }
    index
}

//! Bean model produced by the [`reader`](crate::reader) for one class.
//!
//! A scanned class yields one *identity* [`BeanDef`] describing the class itself,
//! followed by one synthetic [`BeanDef`] per producer field or method annotated
//! with `@Service`. The structured lists here are kept in discovery order; the
//! [`synthesizer`](crate::synthesizer) flattens, sorts and deduplicates them.

use crate::instruction::Instructions;
use serde::Serialize;
use std::fmt;

/// How many services a reference binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cardinality {
    /// Exactly one service is required.
    Mandatory,
    /// Zero or one service.
    Optional,
    /// Zero or more services.
    Multiple,
    /// One or more services.
    AtLeastOne,
}

impl Cardinality {
    /// Whether the requirement may stay unsatisfied.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(self, Self::Optional | Self::Multiple)
    }

    /// Whether the requirement may bind to several services.
    #[must_use]
    pub const fn is_multiple(self) -> bool {
        matches!(self, Self::AtLeastOne | Self::Multiple)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mandatory => "MANDATORY",
            Self::Optional => "OPTIONAL",
            Self::Multiple => "MULTIPLE",
            Self::AtLeastOne => "AT_LEAST_ONE",
        })
    }
}

/// Annotation placement that declared a bean's services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceOrigin {
    /// `@Service` on the class declaration.
    Type,
    /// `@Service` on a type use in the `extends`/`implements` clause.
    TypeUse,
}

/// One resolved service dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReferenceDef {
    /// Fully-qualified name of the referenced service type, after unwrapping.
    pub service: String,
    pub cardinality: Cardinality,
}

impl ReferenceDef {
    pub fn new(service: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            service: service.into(),
            cardinality,
        }
    }
}

/// A bean, or a producer member publishing a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BeanDef {
    /// Owning class; `None` on synthetic producer definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    /// Recognized as a bean through `@Bean` or the package `@Beans`.
    pub marked: bool,
    pub references: Vec<ReferenceDef>,
    pub service: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_origin: Option<ServiceOrigin>,
}

impl BeanDef {
    /// A synthetic definition publishing exactly one service type.
    pub fn producer(service: impl Into<String>) -> Self {
        Self {
            service: vec![service.into()],
            ..Self::default()
        }
    }

    /// Record the service origin.
    ///
    /// Returns the origin already recorded when it differs from `origin`; the
    /// stored origin is left unchanged in that case.
    pub fn set_service_origin(&mut self, origin: ServiceOrigin) -> Result<(), ServiceOrigin> {
        match self.service_origin {
            Some(existing) if existing != origin => Err(existing),
            _ => {
                self.service_origin = Some(origin);
                Ok(())
            }
        }
    }
}

/// Package-level bean metadata, read from `package-info`.
#[derive(Debug, Clone, Default)]
pub struct PackageDef {
    /// Classes of the package declared as beans; `None` without `@Beans`.
    pub marked: Option<Instructions>,
}

impl PackageDef {
    /// Whether the package declaration marks `class_name` as a bean.
    ///
    /// `None` when the package makes no declaration at all.
    #[must_use]
    pub fn marks(&self, class_name: &str) -> Option<bool> {
        self.marked.as_ref().map(|matcher| matcher.matches(class_name))
    }
}

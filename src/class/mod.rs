//! Materialized class model and the queries the analysis runs against it.
//!
//! Classes reach the analyzer as [`ClassModel`] values: name, access flags,
//! generic signature, supertypes, annotations and members, in classfile order.
//! A [`ClassIntrospector`] owns the class space and answers the structural
//! questions bean discovery asks (is a class annotated, meta-annotated, does it
//! implement an interface). [`ClassIndex`] is the JSON-backed implementation
//! used by the CLI.
//!
//! # Access flags
//!
//! Flags use the JVM `ACC_*` bit values. In JSON they may be written either as
//! the numeric value or as a list of names:
//!
//! ```json
//! { "name": "com.acme.Base", "access": ["public", "abstract"] }
//! ```
//!
//! # Element types
//!
//! An annotation's element type follows from where it is attached (class,
//! field, method, parameter); a `type_use` target turns it into a type-use
//! annotation. It may also be given explicitly with `element_type`.

pub mod index;

pub use index::{ClassIndex, PackageSources};

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;
pub const ACC_MODULE: u16 = 0x8000;

const ACCESS_NAMES: [(&str, u16); 12] = [
    ("public", ACC_PUBLIC),
    ("private", ACC_PRIVATE),
    ("protected", ACC_PROTECTED),
    ("static", ACC_STATIC),
    ("final", ACC_FINAL),
    ("bridge", ACC_BRIDGE),
    ("interface", ACC_INTERFACE),
    ("abstract", ACC_ABSTRACT),
    ("synthetic", ACC_SYNTHETIC),
    ("annotation", ACC_ANNOTATION),
    ("enum", ACC_ENUM),
    ("module", ACC_MODULE),
];

fn deserialize_access<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Access {
        Bits(u16),
        Names(Vec<String>),
    }

    match Access::deserialize(deserializer)? {
        Access::Bits(bits) => Ok(bits),
        Access::Names(names) => names.iter().try_fold(0u16, |bits, name| {
            ACCESS_NAMES
                .iter()
                .find(|(known, _)| known == name)
                .map(|(_, bit)| bits | bit)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown access flag '{name}'")))
        }),
    }
}

const fn default_access() -> u16 {
    ACC_PUBLIC
}

/// Where an annotation is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Type,
    TypeUse,
    Field,
    Method,
    Parameter,
}

/// Target of a type-use annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeUseTarget {
    /// JVMS `target_type`; `0x10` is a class `extends`/`implements` clause.
    pub target_type: u8,
    /// Interface index, or `65535` for the superclass.
    #[serde(default)]
    pub target_index: i32,
}

/// An annotation element value. Class literals are given by their
/// fully-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    String(String),
    Array(Vec<AnnotationValue>),
}

impl AnnotationValue {
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// String elements; a single string counts as a one-element array.
    #[must_use]
    pub fn as_strings(&self) -> Vec<&str> {
        match self {
            Self::String(value) => vec![value.as_str()],
            Self::Array(values) => values.iter().filter_map(Self::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// One annotation occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Fully-qualified annotation type name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementType>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, AnnotationValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_use: Option<TypeUseTarget>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element_type: None,
            values: BTreeMap::new(),
            type_use: None,
        }
    }

    /// The element type, given the placement the annotation was found at.
    #[must_use]
    pub fn element_type_at(&self, placement: ElementType) -> ElementType {
        match (self.element_type, self.type_use) {
            (Some(explicit), _) => explicit,
            (None, Some(_)) => ElementType::TypeUse,
            (None, None) => placement,
        }
    }

    #[must_use]
    pub fn value(&self, key: &str) -> Option<&AnnotationValue> {
        self.values.get(key)
    }
}

/// A field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldModel {
    pub name: String,
    #[serde(default = "default_access", deserialize_with = "deserialize_access")]
    pub access: u16,
    /// Erased descriptor, e.g. `Ljava/util/List;`.
    pub descriptor: String,
    /// Generic signature, when the field has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl FieldModel {
    /// The generic signature, or the descriptor when there is none.
    #[must_use]
    pub fn type_signature(&self) -> &str {
        self.signature.as_deref().unwrap_or(&self.descriptor)
    }
}

/// A method or constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodModel {
    pub name: String,
    #[serde(default = "default_access", deserialize_with = "deserialize_access")]
    pub access: u16,
    pub descriptor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    /// Annotations per parameter, by parameter index.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter_annotations: Vec<Vec<Annotation>>,
}

impl MethodModel {
    /// The generic signature, or the descriptor when there is none.
    #[must_use]
    pub fn type_signature(&self) -> &str {
        self.signature.as_deref().unwrap_or(&self.descriptor)
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.access & ACC_ABSTRACT != 0
    }

    #[must_use]
    pub const fn is_bridge(&self) -> bool {
        self.access & ACC_BRIDGE != 0
    }

    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        self.access & ACC_SYNTHETIC != 0
    }

    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.access & ACC_PRIVATE != 0
    }
}

/// A class, interface, enum, annotation type or `package-info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassModel {
    /// Fully-qualified name, `$` separating nested classes.
    pub name: String,
    #[serde(default = "default_access", deserialize_with = "deserialize_access")]
    pub access: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_class: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldModel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodModel>,
}

impl ClassModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access: ACC_PUBLIC,
            signature: None,
            super_class: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Package name; empty for the default package.
    #[must_use]
    pub fn package(&self) -> &str {
        package_of(&self.name)
    }

    /// Superclass, `java.lang.Object` when not recorded.
    #[must_use]
    pub fn super_class_name(&self) -> &str {
        self.super_class.as_deref().unwrap_or(crate::constants::OBJECT_TYPE)
    }

    /// Whether the class itself carries annotation `name`.
    #[must_use]
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.name == name && a.type_use.is_none())
    }

    #[must_use]
    pub const fn is_interface(&self) -> bool {
        self.access & ACC_INTERFACE != 0
    }

    #[must_use]
    pub const fn is_annotation(&self) -> bool {
        self.access & ACC_ANNOTATION != 0
    }

    #[must_use]
    pub const fn is_enum(&self) -> bool {
        self.access & ACC_ENUM != 0
    }

    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        self.access & ACC_SYNTHETIC != 0
    }

    #[must_use]
    pub const fn is_module(&self) -> bool {
        self.access & ACC_MODULE != 0
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.access & ACC_ABSTRACT != 0
    }

    /// Neither abstract nor an interface.
    #[must_use]
    pub const fn is_concrete(&self) -> bool {
        !self.is_abstract() && !self.is_interface()
    }

    /// Nested class without `static`: an inner or anonymous class.
    #[must_use]
    pub fn is_inner_class(&self) -> bool {
        self.name.contains('$') && self.access & ACC_STATIC == 0
    }
}

/// Package part of a fully-qualified class name.
#[must_use]
pub fn package_of(name: &str) -> &str {
    name.rfind('.').map_or("", |idx| &name[..idx])
}

/// Access to a class space.
pub trait ClassIntrospector {
    /// All classes, ordered by name.
    fn classes(&self) -> Vec<&ClassModel>;

    fn lookup(&self, name: &str) -> Option<&ClassModel>;

    /// The `package-info` pseudo-class of `package`.
    fn package_info(&self, package: &str) -> Option<&ClassModel> {
        self.lookup(&format!("{package}.package-info"))
    }

    /// Whether `class` is annotated with `annotation`.
    fn is_annotated(&self, class: &ClassModel, annotation: &str) -> bool {
        class.has_annotation(annotation)
    }

    /// Whether `class` carries `annotation` directly or through one of its
    /// annotations' own (transitive) meta-annotations.
    fn is_indirectly_annotated(&self, class: &ClassModel, annotation: &str) -> bool {
        let mut visited = HashSet::new();
        let mut pending: Vec<&str> = class
            .annotations
            .iter()
            .filter(|a| a.type_use.is_none())
            .map(|a| a.name.as_str())
            .collect();

        while let Some(name) = pending.pop() {
            if name == annotation {
                return true;
            }
            if !visited.insert(name) {
                continue;
            }
            if let Some(annotation_type) = self.lookup(name) {
                pending.extend(
                    annotation_type
                        .annotations
                        .iter()
                        .filter(|a| a.type_use.is_none())
                        .map(|a| a.name.as_str()),
                );
            }
        }
        false
    }

    /// Whether `class`, a superclass, or any of their super-interfaces is
    /// `interface`.
    fn implements(&self, class: &ClassModel, interface: &str) -> bool {
        let mut visited = HashSet::new();
        let mut pending: Vec<&str> = class.interfaces.iter().map(String::as_str).collect();
        if let Some(super_class) = class.super_class.as_deref() {
            pending.push(super_class);
        }

        while let Some(name) = pending.pop() {
            if name == interface {
                return true;
            }
            if !visited.insert(name) {
                continue;
            }
            if let Some(supertype) = self.lookup(name) {
                pending.extend(supertype.interfaces.iter().map(String::as_str));
                if let Some(super_class) = supertype.super_class.as_deref() {
                    pending.push(super_class);
                }
            }
        }
        false
    }
}

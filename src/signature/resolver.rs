//! Binding of type variables to concrete types.
//!
//! A resolver knows the type parameters in scope for one member (method
//! parameters first, then the declaring class) and reduces a signature to a
//! [`ResolvedType`]: a type variable resolves to its first bound, a wildcard to
//! its bound or `java.lang.Object`.

use super::{
    ClassSignature, ClassTypeSignature, JavaTypeSignature, MethodSignature,
    ReferenceTypeSignature, ResultType, TypeArgument, TypeParameter, base_type_name,
};
use crate::constants::OBJECT_TYPE;
use std::fmt;

/// Bound on nested type-variable lookups (`<A extends B, B extends A>`).
const MAX_VARIABLE_DEPTH: usize = 16;

/// The shape a signature resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    /// A class type; its type arguments are still unresolved.
    Class(ClassTypeSignature),
    Array(Box<JavaTypeSignature>),
    Primitive(char),
    Void,
    /// A type variable with no usable declaration in scope.
    Unresolved(String),
}

impl ResolvedType {
    /// The class type, when class-shaped.
    #[must_use]
    pub const fn as_class(&self) -> Option<&ClassTypeSignature> {
        match self {
            Self::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Short description of the shape for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Class(_) => "class",
            Self::Array(_) => "array",
            Self::Primitive(_) => "primitive",
            Self::Void => "void",
            Self::Unresolved(_) => "type variable",
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => write!(f, "{class}"),
            Self::Array(component) => write!(f, "{component}[]"),
            Self::Primitive(c) => f.write_str(base_type_name(*c)),
            Self::Void => f.write_str("void"),
            Self::Unresolved(name) => f.write_str(name),
        }
    }
}

/// Resolution of signatures in a fixed type-parameter scope.
pub trait TypeResolver {
    /// Type-parameter scopes, innermost first.
    fn scopes(&self) -> Vec<&[TypeParameter]>;

    /// Resolve a type argument of a previously resolved class type.
    fn resolve_type(&self, argument: &TypeArgument) -> ResolvedType {
        match argument {
            TypeArgument::Any => ResolvedType::Class(ClassTypeSignature::of(OBJECT_TYPE)),
            TypeArgument::Exact(reference)
            | TypeArgument::Extends(reference)
            | TypeArgument::Super(reference) => self.resolve_reference(reference),
        }
    }

    fn resolve_reference(&self, reference: &ReferenceTypeSignature) -> ResolvedType {
        resolve_in(&self.scopes(), reference, 0)
    }

    fn resolve_java_type(&self, signature: &JavaTypeSignature) -> ResolvedType {
        match signature {
            JavaTypeSignature::Base(c) => ResolvedType::Primitive(*c),
            JavaTypeSignature::Reference(reference) => self.resolve_reference(reference),
        }
    }
}

fn resolve_in(
    scopes: &[&[TypeParameter]],
    reference: &ReferenceTypeSignature,
    depth: usize,
) -> ResolvedType {
    match reference {
        ReferenceTypeSignature::Class(class) => ResolvedType::Class(class.clone()),
        ReferenceTypeSignature::Array(component) => ResolvedType::Array(component.clone()),
        ReferenceTypeSignature::TypeVariable(name) => {
            if depth >= MAX_VARIABLE_DEPTH {
                return ResolvedType::Unresolved(name.clone());
            }
            let parameter = scopes
                .iter()
                .flat_map(|scope| scope.iter())
                .find(|parameter| &parameter.identifier == name);
            match parameter {
                None => ResolvedType::Unresolved(name.clone()),
                Some(parameter) => match parameter.first_bound() {
                    Some(bound) => resolve_in(scopes, bound, depth + 1),
                    None => ResolvedType::Class(ClassTypeSignature::of(OBJECT_TYPE)),
                },
            }
        }
    }
}

/// Resolver over the type parameters of a class.
#[derive(Debug, Clone)]
pub struct ClassResolver {
    signature: ClassSignature,
}

impl ClassResolver {
    #[must_use]
    pub const fn new(signature: ClassSignature) -> Self {
        Self {
            signature,
        }
    }

    #[must_use]
    pub const fn signature(&self) -> &ClassSignature {
        &self.signature
    }

    /// Resolver for a field of this class.
    #[must_use]
    pub fn field(&self, field: JavaTypeSignature) -> FieldResolver<'_> {
        FieldResolver {
            class: self,
            field,
        }
    }

    /// Resolver for a method of this class.
    #[must_use]
    pub fn method(&self, method: MethodSignature) -> MethodResolver<'_> {
        MethodResolver {
            class: self,
            method,
        }
    }
}

impl TypeResolver for ClassResolver {
    fn scopes(&self) -> Vec<&[TypeParameter]> {
        vec![self.signature.type_parameters.as_slice()]
    }
}

/// Resolver for one field.
#[derive(Debug, Clone)]
pub struct FieldResolver<'a> {
    class: &'a ClassResolver,
    field: JavaTypeSignature,
}

impl FieldResolver<'_> {
    /// The field's declared type.
    #[must_use]
    pub fn resolve_field(&self) -> ResolvedType {
        self.resolve_java_type(&self.field)
    }
}

impl TypeResolver for FieldResolver<'_> {
    fn scopes(&self) -> Vec<&[TypeParameter]> {
        self.class.scopes()
    }
}

/// Resolver for one method.
#[derive(Debug, Clone)]
pub struct MethodResolver<'a> {
    class: &'a ClassResolver,
    method: MethodSignature,
}

impl MethodResolver<'_> {
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.method.parameters.len()
    }

    /// The declared type of parameter `index`; `None` when out of range.
    #[must_use]
    pub fn resolve_parameter(&self, index: usize) -> Option<ResolvedType> {
        self.method.parameters.get(index).map(|parameter| self.resolve_java_type(parameter))
    }

    /// The return type.
    #[must_use]
    pub fn resolve_result(&self) -> ResolvedType {
        match &self.method.result {
            ResultType::Void => ResolvedType::Void,
            ResultType::Type(signature) => self.resolve_java_type(signature),
        }
    }
}

impl TypeResolver for MethodResolver<'_> {
    fn scopes(&self) -> Vec<&[TypeParameter]> {
        vec![
            self.method.type_parameters.as_slice(),
            self.class.signature.type_parameters.as_slice(),
        ]
    }
}

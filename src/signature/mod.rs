//! JVM generic signatures.
//!
//! This module parses the `Signature` strings the compiler records for
//! generic classes, fields and methods (JVMS 4.7.9.1) into typed trees. Plain
//! descriptors (`Ljava/lang/String;`, `(I)V`) are a subset of the signature
//! grammar and parse with the same functions, so callers can fall back to the
//! descriptor when a member has no generic signature.
//!
//! ```text
//! Ljava/util/List<Ljava/util/Map$Entry<Ljava/lang/String;Lcom/acme/Foo;>;>;
//! <T:Ljava/lang/Object;>(Ljavax/inject/Provider<TT;>;)V
//! ```
//!
//! Type variables are left as [`ReferenceTypeSignature::TypeVariable`]; the
//! [`resolver`] module binds them to their declared bounds.
//!
//! # Examples
//!
//! ```rust
//! use cdi_capgen::signature::{JavaTypeSignature, ReferenceTypeSignature};
//!
//! let sig = JavaTypeSignature::parse("Ljava/util/Optional<Lcom/acme/Foo;>;").unwrap();
//! let JavaTypeSignature::Reference(ReferenceTypeSignature::Class(class)) = sig else {
//!     panic!("expected a class type");
//! };
//! assert_eq!(class.fqn(), "java.util.Optional");
//! assert_eq!(class.type_arguments().len(), 1);
//! ```

pub mod resolver;

pub use resolver::{
    ClassResolver, FieldResolver, MethodResolver, ResolvedType, TypeResolver,
};

use crate::core::{CapgenError, Result};
use std::fmt;

/// A field type, parameter type or return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavaTypeSignature {
    /// Primitive type, by its descriptor character (`I`, `Z`, ...).
    Base(char),
    Reference(ReferenceTypeSignature),
}

/// A reference type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceTypeSignature {
    Class(ClassTypeSignature),
    /// Type variable by name (`T` in `TT;`).
    TypeVariable(String),
    /// Array of the component type.
    Array(Box<JavaTypeSignature>),
}

/// A class type with its type arguments and inner class suffixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    /// Package in binary form, with a trailing `/` (empty for the default package).
    pub package: String,
    pub class_type: SimpleClassTypeSignature,
    /// `.Inner<...>` suffixes, outermost first.
    pub inner_types: Vec<SimpleClassTypeSignature>,
}

/// One segment of a class type: an identifier and its type arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleClassTypeSignature {
    pub identifier: String,
    pub type_arguments: Vec<TypeArgument>,
}

/// A type argument of a parameterized class type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    /// `*`, the unbounded wildcard.
    Any,
    Exact(ReferenceTypeSignature),
    /// `? extends` bound (`+`).
    Extends(ReferenceTypeSignature),
    /// `? super` bound (`-`).
    Super(ReferenceTypeSignature),
}

/// A formal type parameter of a class or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub identifier: String,
    pub class_bound: Option<ReferenceTypeSignature>,
    pub interface_bounds: Vec<ReferenceTypeSignature>,
}

impl TypeParameter {
    /// The bound a use of this variable is erased to: the class bound, else
    /// the first interface bound.
    #[must_use]
    pub fn first_bound(&self) -> Option<&ReferenceTypeSignature> {
        self.class_bound.as_ref().or_else(|| self.interface_bounds.first())
    }
}

/// Generic signature of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

/// Return type of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultType {
    Void,
    Type(JavaTypeSignature),
}

/// Generic signature of a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<JavaTypeSignature>,
    pub result: ResultType,
    pub throws: Vec<ReferenceTypeSignature>,
}

impl ClassTypeSignature {
    /// A non-generic class type from a binary (`java/lang/Object`) or dotted name.
    #[must_use]
    pub fn of(name: &str) -> Self {
        let binary = name.replace('.', "/");
        let (package, identifier) = match binary.rfind('/') {
            Some(idx) => (binary[..=idx].to_string(), binary[idx + 1..].to_string()),
            None => (String::new(), binary),
        };
        Self {
            package,
            class_type: SimpleClassTypeSignature {
                identifier,
                type_arguments: Vec::new(),
            },
            inner_types: Vec::new(),
        }
    }

    /// Binary name, e.g. `java/util/Map$Entry`.
    #[must_use]
    pub fn binary(&self) -> String {
        let mut name = format!("{}{}", self.package, self.class_type.identifier);
        for inner in &self.inner_types {
            name.push('$');
            name.push_str(&inner.identifier);
        }
        name
    }

    /// Fully-qualified name, e.g. `java.util.Map$Entry`.
    #[must_use]
    pub fn fqn(&self) -> String {
        self.binary().replace('/', ".")
    }

    /// Type arguments of the innermost segment.
    #[must_use]
    pub fn type_arguments(&self) -> &[TypeArgument] {
        self.inner_types
            .last()
            .map_or(&self.class_type.type_arguments, |inner| &inner.type_arguments)
    }
}

impl JavaTypeSignature {
    /// Parse a field signature or descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CapgenError::SignatureParse`] when the input is malformed or has
    /// trailing characters.
    pub fn parse(signature: &str) -> Result<Self> {
        let mut cursor = Cursor::new(signature);
        let parsed = cursor.java_type()?;
        cursor.finish()?;
        Ok(parsed)
    }
}

impl MethodSignature {
    /// Parse a method signature or descriptor.
    pub fn parse(signature: &str) -> Result<Self> {
        let mut cursor = Cursor::new(signature);
        let type_parameters = cursor.type_parameters()?;
        cursor.expect('(')?;
        let mut parameters = Vec::new();
        while cursor.peek() != Some(')') {
            parameters.push(cursor.java_type()?);
        }
        cursor.expect(')')?;
        let result = if cursor.peek() == Some('V') {
            cursor.bump();
            ResultType::Void
        } else {
            ResultType::Type(cursor.java_type()?)
        };
        let mut throws = Vec::new();
        while cursor.peek() == Some('^') {
            cursor.bump();
            throws.push(cursor.reference_type()?);
        }
        cursor.finish()?;
        Ok(Self {
            type_parameters,
            parameters,
            result,
            throws,
        })
    }
}

impl ClassSignature {
    /// Parse a class signature.
    pub fn parse(signature: &str) -> Result<Self> {
        let mut cursor = Cursor::new(signature);
        let type_parameters = cursor.type_parameters()?;
        let super_class = cursor.class_type()?;
        let mut interfaces = Vec::new();
        while cursor.peek().is_some() {
            interfaces.push(cursor.class_type()?);
        }
        Ok(Self {
            type_parameters,
            super_class,
            interfaces,
        })
    }

    /// Signature of a non-generic class with the given (dotted or binary) names.
    #[must_use]
    pub fn erased(super_class: &str, interfaces: &[String]) -> Self {
        Self {
            type_parameters: Vec::new(),
            super_class: ClassTypeSignature::of(super_class),
            interfaces: interfaces.iter().map(|i| ClassTypeSignature::of(i)).collect(),
        }
    }
}

struct Cursor<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> CapgenError {
        CapgenError::SignatureParse {
            signature: self.input.to_string(),
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.bytes.get(self.pos).map(|b| char::from(*b))
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    fn finish(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(c) => Err(self.error(format!("unexpected trailing '{c}'"))),
        }
    }

    /// Identifier up to (not including) any of `stops`.
    fn identifier(&mut self, stops: &[u8]) -> Result<String> {
        let start = self.pos;
        while self.bytes.get(self.pos).is_some_and(|b| !stops.contains(b)) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("empty identifier"));
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn java_type(&mut self) -> Result<JavaTypeSignature> {
        match self.peek() {
            Some(c @ ('B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z')) => {
                self.bump();
                Ok(JavaTypeSignature::Base(c))
            }
            Some(_) => Ok(JavaTypeSignature::Reference(self.reference_type()?)),
            None => Err(self.error("expected a type, found end of input")),
        }
    }

    fn reference_type(&mut self) -> Result<ReferenceTypeSignature> {
        match self.peek() {
            Some('L') => Ok(ReferenceTypeSignature::Class(self.class_type()?)),
            Some('T') => {
                self.bump();
                let name = self.identifier(b";")?;
                self.expect(';')?;
                Ok(ReferenceTypeSignature::TypeVariable(name))
            }
            Some('[') => {
                self.bump();
                Ok(ReferenceTypeSignature::Array(Box::new(self.java_type()?)))
            }
            Some(c) => Err(self.error(format!("expected a reference type, found '{c}'"))),
            None => Err(self.error("expected a reference type, found end of input")),
        }
    }

    fn class_type(&mut self) -> Result<ClassTypeSignature> {
        self.expect('L')?;
        let qualified = self.identifier(b"<.;")?;
        let (package, identifier) = match qualified.rfind('/') {
            Some(idx) => (qualified[..=idx].to_string(), qualified[idx + 1..].to_string()),
            None => (String::new(), qualified),
        };
        let class_type = SimpleClassTypeSignature {
            identifier,
            type_arguments: self.type_arguments()?,
        };

        let mut inner_types = Vec::new();
        while self.peek() == Some('.') {
            self.bump();
            let identifier = self.identifier(b"<.;")?;
            inner_types.push(SimpleClassTypeSignature {
                identifier,
                type_arguments: self.type_arguments()?,
            });
        }
        self.expect(';')?;

        Ok(ClassTypeSignature {
            package,
            class_type,
            inner_types,
        })
    }

    fn type_arguments(&mut self) -> Result<Vec<TypeArgument>> {
        let mut arguments = Vec::new();
        if self.peek() != Some('<') {
            return Ok(arguments);
        }
        self.bump();
        while self.peek() != Some('>') {
            let argument = match self.peek() {
                Some('*') => {
                    self.bump();
                    TypeArgument::Any
                }
                Some('+') => {
                    self.bump();
                    TypeArgument::Extends(self.reference_type()?)
                }
                Some('-') => {
                    self.bump();
                    TypeArgument::Super(self.reference_type()?)
                }
                _ => TypeArgument::Exact(self.reference_type()?),
            };
            arguments.push(argument);
        }
        self.expect('>')?;
        if arguments.is_empty() {
            return Err(self.error("empty type argument list"));
        }
        Ok(arguments)
    }

    fn type_parameters(&mut self) -> Result<Vec<TypeParameter>> {
        let mut parameters = Vec::new();
        if self.peek() != Some('<') {
            return Ok(parameters);
        }
        self.bump();
        while self.peek() != Some('>') {
            let identifier = self.identifier(b":>")?;
            self.expect(':')?;
            let class_bound = match self.peek() {
                Some('L' | 'T' | '[') => Some(self.reference_type()?),
                _ => None,
            };
            let mut interface_bounds = Vec::new();
            while self.peek() == Some(':') {
                self.bump();
                interface_bounds.push(self.reference_type()?);
            }
            parameters.push(TypeParameter {
                identifier,
                class_bound,
                interface_bounds,
            });
        }
        self.expect('>')?;
        Ok(parameters)
    }
}

impl fmt::Display for JavaTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base(c) => f.write_str(base_type_name(*c)),
            Self::Reference(reference) => write!(f, "{reference}"),
        }
    }
}

impl fmt::Display for ReferenceTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => write!(f, "{class}"),
            Self::TypeVariable(name) => f.write_str(name),
            Self::Array(component) => write!(f, "{component}[]"),
        }
    }
}

impl fmt::Display for ClassTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.package.replace('/', "."), self.class_type)?;
        for inner in &self.inner_types {
            write!(f, "${inner}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SimpleClassTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)?;
        if !self.type_arguments.is_empty() {
            f.write_str("<")?;
            for (i, argument) in self.type_arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{argument}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("?"),
            Self::Exact(reference) => write!(f, "{reference}"),
            Self::Extends(reference) => write!(f, "? extends {reference}"),
            Self::Super(reference) => write!(f, "? super {reference}"),
        }
    }
}

/// Java name of a primitive descriptor character.
#[must_use]
pub fn base_type_name(c: char) -> &'static str {
    match c {
        'B' => "byte",
        'C' => "char",
        'D' => "double",
        'F' => "float",
        'I' => "int",
        'J' => "long",
        'S' => "short",
        'Z' => "boolean",
        _ => "?",
    }
}

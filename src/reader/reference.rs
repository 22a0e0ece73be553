//! Reference resolution: `@Reference` injection points and bind methods.
//!
//! A reference's declared type is unwrapped through the fixed wrapper table
//! until the service type is reached:
//!
//! 1. `javax.inject.Provider<T>`: unwrapped, cardinality unchanged
//! 2. `java.util.Collection<T>` / `java.util.List<T>`: `MULTIPLE`,
//!    or `java.util.Optional<T>`: `OPTIONAL`
//! 3. `BeanServiceObjects<T>` / `ServiceReference<T>`: unwrapped,
//!    or `java.util.Map$Entry<K, T>`: unwrapped through `T`
//!
//! so that `Provider<List<ServiceReference<Foo>>>` is a `MULTIPLE` reference
//! to `Foo`.

use super::scan::{ClassScan, Member};
use crate::bean::{Cardinality, ReferenceDef};
use crate::class::{Annotation, ElementType};
use crate::constants::{
    BEAN_SERVICE_OBJECTS_TYPE, BIND_PARAMETER_TYPES, COLLECTION_TYPE, LIST_TYPE, MAP_ENTRY_TYPE,
    OPTIONAL_TYPE, PROVIDER_TYPE, SERVICE_REFERENCE_TYPE,
};
use crate::signature::{
    ClassTypeSignature, JavaTypeSignature, MethodSignature, ResolvedType, TypeResolver,
};
use tracing::trace;

/// Resolve the service type and cardinality of an injection point whose
/// declared type resolved to `resolved`.
///
/// Returns a message describing the first step that failed.
pub fn unwrap_reference(
    resolver: &dyn TypeResolver,
    resolved: &ResolvedType,
) -> Result<ReferenceDef, String> {
    let Some(mut ty) = resolved.as_class().cloned() else {
        return Err(format!("unresolved type {resolved} ({})", resolved.kind()));
    };
    let mut cardinality = Cardinality::Mandatory;

    if ty.fqn() == PROVIDER_TYPE {
        ty = type_argument(resolver, &ty, 0, "Provider")?;
    }

    let fqn = ty.fqn();
    if fqn == COLLECTION_TYPE || fqn == LIST_TYPE {
        ty = type_argument(resolver, &ty, 0, "Collection or List")?;
        cardinality = Cardinality::Multiple;
    } else if fqn == OPTIONAL_TYPE {
        ty = type_argument(resolver, &ty, 0, "Optional")?;
        cardinality = Cardinality::Optional;
    }

    let fqn = ty.fqn();
    if fqn == BEAN_SERVICE_OBJECTS_TYPE || fqn == SERVICE_REFERENCE_TYPE {
        ty = type_argument(resolver, &ty, 0, "BeanServiceObjects or ServiceReference")?;
    } else if fqn == MAP_ENTRY_TYPE {
        ty = type_argument(resolver, &ty, 1, "Map.Entry")?;
    }

    Ok(ReferenceDef::new(ty.fqn(), cardinality))
}

fn type_argument(
    resolver: &dyn TypeResolver,
    ty: &ClassTypeSignature,
    index: usize,
    wrapper: &str,
) -> Result<ClassTypeSignature, String> {
    let position = if index == 0 { "the" } else { "the second" };
    let Some(argument) = ty.type_arguments().get(index) else {
        return Err(format!("{position} type argument of {wrapper} is missing: {ty}"));
    };
    match resolver.resolve_type(argument) {
        ResolvedType::Class(class) => Ok(class),
        other => Err(format!("{position} type argument of {wrapper} can not be resolved: {other}")),
    }
}

impl ClassScan<'_> {
    /// `@Reference` on the current field or parameter.
    pub(super) fn reference(&mut self, annotation: &Annotation, element_type: ElementType) {
        if let Some(service) = annotation.value("value").and_then(|v| v.as_str()) {
            trace!("{}: explicit reference to {service}", self.class.name);
            self.identity_mut().references.push(ReferenceDef::new(service, Cardinality::Mandatory));
            return;
        }

        let field_signature = match (element_type, self.member) {
            (ElementType::Parameter, Some(Member::Method(method))) => {
                let Some(index) = self.parameter else {
                    self.error("@Reference parameter without a parameter index".to_string());
                    return;
                };
                let signature = match MethodSignature::parse(method.type_signature()) {
                    Ok(signature) => signature,
                    Err(e) => {
                        self.error(format!("method signature can not be parsed: {e}"));
                        return;
                    }
                };
                let class_resolver = self.resolver;
                let resolver = class_resolver.method(signature);
                match resolver.resolve_parameter(index) {
                    Some(resolved) => self.finish_reference(&resolver, &resolved, Some(index)),
                    None => self.error(format!("parameter {index} with @Reference does not exist")),
                }
                return;
            }
            (ElementType::Field, Some(Member::Field(field))) => {
                match JavaTypeSignature::parse(field.type_signature()) {
                    Ok(signature) => signature,
                    Err(_) => {
                        self.error(format!(
                            "field has an incompatible type for @Reference: {}",
                            field.descriptor
                        ));
                        return;
                    }
                }
            }
            _ => {
                self.error("@Reference is only supported on fields and parameters".to_string());
                return;
            }
        };

        let class_resolver = self.resolver;
        let resolver = class_resolver.field(field_signature);
        let field_type = resolver.resolve_field();
        self.finish_reference(&resolver, &field_type, None);
    }

    fn finish_reference(
        &mut self,
        resolver: &dyn TypeResolver,
        resolved: &ResolvedType,
        parameter: Option<usize>,
    ) {
        match unwrap_reference(resolver, resolved) {
            Ok(mut reference) => {
                if self.minimum_cardinality {
                    reference.cardinality = Cardinality::AtLeastOne;
                }
                trace!(
                    "{}: reference to {} ({})",
                    self.class.name, reference.service, reference.cardinality
                );
                let references = &mut self.identity_mut().references;
                references.push(reference);
                let position = references.len() - 1;
                self.member_reference = Some(position);
            }
            Err(message) => match parameter {
                Some(index) => self.error(format!("parameter {index} with @Reference has {message}")),
                None => self.error(format!("@Reference has {message}")),
            },
        }
    }

    /// A positive `@MinimumCardinality` following `@Reference` on the same
    /// member.
    pub(super) fn upgrade_member_reference(&mut self) {
        let Some(position) = self.member_reference else {
            return;
        };
        if let Some(reference) = self.identity_mut().references.get_mut(position) {
            reference.cardinality = Cardinality::AtLeastOne;
        }
    }

    /// Reference implied by a single `Bind*<T>` parameter of the current method.
    pub(super) fn infer_bind_reference(&mut self) {
        let Some(Member::Method(method)) = self.member else {
            return;
        };
        let Ok(signature) = MethodSignature::parse(method.type_signature()) else {
            self.error(format!("method signature can not be parsed: {}", method.type_signature()));
            return;
        };
        if signature.parameters.len() != 1 {
            return;
        }

        let class_resolver = self.resolver;
        let resolver = class_resolver.method(signature);
        let Some(ResolvedType::Class(parameter)) = resolver.resolve_parameter(0) else {
            return;
        };
        if !BIND_PARAMETER_TYPES.contains(&parameter.binary().as_str()) {
            return;
        }

        let arguments = &parameter.class_type.type_arguments;
        if arguments.len() != 1 {
            self.error(format!("Bind parameter has wrong type arguments: {parameter}"));
            return;
        }
        match resolver.resolve_type(&arguments[0]) {
            ResolvedType::Class(service) => {
                trace!("{}: bind method {} for {service}", self.class.name, method.name);
                self.identity_mut()
                    .references
                    .push(ReferenceDef::new(service.fqn(), Cardinality::Multiple));
            }
            other => self.error(format!("Bind parameter has unresolvable type argument: {other}")),
        }
    }
}

//! `@Service` resolution.
//!
//! On a field or method the annotation publishes the member's type through a
//! new producer definition. On the class it publishes the bean itself, either
//! as the types listed in `value`, its interfaces, or its own class; on a type
//! use in the `extends`/`implements` clause it publishes that supertype. The
//! two class-level forms exclude each other.

use super::scan::{ClassScan, Member};
use crate::bean::{BeanDef, ServiceOrigin};
use crate::class::{Annotation, ElementType};
use crate::constants::{TYPEUSE_INDEX_NONE, TYPEUSE_TARGET_INDEX_EXTENDS};
use crate::signature::{JavaTypeSignature, MethodSignature, ResolvedType};
use tracing::trace;

impl ClassScan<'_> {
    pub(super) fn service(&mut self, annotation: &Annotation, element_type: ElementType) {
        match element_type {
            ElementType::Field => self.field_service(),
            ElementType::Method => self.method_service(),
            ElementType::TypeUse => self.type_use_service(),
            ElementType::Type => self.type_service(annotation),
            ElementType::Parameter => {
                self.error("@Service is not supported on parameters".to_string());
            }
        }
    }

    fn field_service(&mut self) {
        let Some(Member::Field(field)) = self.member else {
            self.error("@Service on a field outside of a field".to_string());
            return;
        };
        let class_resolver = self.resolver;
        let resolved = JavaTypeSignature::parse(field.type_signature())
            .ok()
            .map(|signature| class_resolver.field(signature).resolve_field());

        match resolved {
            Some(ResolvedType::Class(service)) => self.add_producer(service.fqn()),
            _ => self.error(format!(
                "field has an incompatible type for @Service: {}",
                field.descriptor
            )),
        }
    }

    fn method_service(&mut self) {
        let Some(Member::Method(method)) = self.member else {
            self.error("@Service on a method outside of a method".to_string());
            return;
        };
        let Ok(signature) = MethodSignature::parse(method.type_signature()) else {
            self.error(format!(
                "method has an incompatible type for @Service: {}",
                method.descriptor
            ));
            return;
        };

        let class_resolver = self.resolver;
        match class_resolver.method(signature).resolve_result() {
            ResolvedType::Class(service) => self.add_producer(service.fqn()),
            ResolvedType::Void => self.error(format!(
                "method has @Service and returns void: {}",
                method.descriptor
            )),
            _ => self.error(format!(
                "method has an incompatible return type for @Service: {}",
                method.descriptor
            )),
        }
    }

    fn add_producer(&mut self, service: String) {
        trace!("{}: producer of {service}", self.class.name);
        self.definitions.push(BeanDef::producer(service));
    }

    fn type_use_service(&mut self) {
        if let Err(existing) = self.identity_mut().set_service_origin(ServiceOrigin::TypeUse) {
            self.class_error(format!(
                "@Service cannot be used both on TYPE and TYPE_USE (already declared on {existing:?})"
            ));
            return;
        }

        let class = self.class;
        let service = match self.target_index {
            TYPEUSE_TARGET_INDEX_EXTENDS => Some(class.super_class_name().to_string()),
            TYPEUSE_INDEX_NONE => None,
            index => match usize::try_from(index).ok().and_then(|i| class.interfaces.get(i)) {
                Some(interface) => Some(interface.clone()),
                None => {
                    self.class_error(format!("@Service type use targets unknown interface {index}"));
                    None
                }
            },
        };
        if let Some(service) = service {
            trace!("{}: type-use service {service}", class.name);
            self.identity_mut().service.push(service);
        }
    }

    fn type_service(&mut self, annotation: &Annotation) {
        if let Err(existing) = self.identity_mut().set_service_origin(ServiceOrigin::Type) {
            self.class_error(format!(
                "@Service cannot be used both on TYPE and TYPE_USE (already declared on {existing:?})"
            ));
            return;
        }

        let class = self.class;
        let explicit: Vec<String> = annotation
            .value("value")
            .map(|value| value.as_strings().into_iter().map(str::to_string).collect())
            .unwrap_or_default();

        let services = if !explicit.is_empty() {
            explicit
        } else if !class.interfaces.is_empty() {
            class.interfaces.clone()
        } else {
            vec![class.name.clone()]
        };
        trace!("{}: type services {services:?}", class.name);
        self.identity_mut().service.extend(services);
    }
}

//! Per-class traversal state.
//!
//! A [`ClassScan`] is created for each class the reader walks and threads the
//! state that annotations depend on: the current member and parameter, the
//! last recorded type-use target and whether a positive `@MinimumCardinality`
//! was seen on the member. Member state is cleared between members; the
//! type-use target is not.

use crate::bean::BeanDef;
use crate::class::{Annotation, ClassModel, ElementType, FieldModel, MethodModel, TypeUseTarget};
use crate::constants::{
    BEAN_ANNOTATION, MINIMUM_CARDINALITY_ANNOTATION, REFERENCE_ANNOTATION, SERVICE_ANNOTATION,
    TYPEUSE_CLASS_EXTENDS, TYPEUSE_INDEX_NONE,
};
use crate::core::AnalysisContext;
use crate::signature::ClassResolver;
use tracing::trace;

/// The member being walked.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Member<'c> {
    Field(&'c FieldModel),
    Method(&'c MethodModel),
}

impl Member<'_> {
    pub(crate) fn name(&self) -> &str {
        match self {
            Self::Field(field) => &field.name,
            Self::Method(method) => &method.name,
        }
    }
}

pub(crate) struct ClassScan<'c> {
    pub(crate) class: &'c ClassModel,
    pub(crate) resolver: &'c ClassResolver,
    ctx: &'c AnalysisContext,
    /// The walked class is the class under analysis, not a supertype.
    pub(crate) base_class: bool,
    pub(crate) member: Option<Member<'c>>,
    pub(crate) parameter: Option<usize>,
    pub(crate) target_index: i32,
    pub(crate) minimum_cardinality: bool,
    /// Position in the identity references of the reference resolved for the
    /// current member or parameter.
    pub(crate) member_reference: Option<usize>,
    /// Identity bean first, then one definition per producer member.
    pub(crate) definitions: Vec<BeanDef>,
}

impl<'c> ClassScan<'c> {
    pub(crate) fn new(
        class: &'c ClassModel,
        resolver: &'c ClassResolver,
        ctx: &'c AnalysisContext,
    ) -> Self {
        Self {
            class,
            resolver,
            ctx,
            base_class: true,
            member: None,
            parameter: None,
            target_index: TYPEUSE_INDEX_NONE,
            minimum_cardinality: false,
            member_reference: None,
            definitions: vec![BeanDef::default()],
        }
    }

    pub(crate) fn identity_mut(&mut self) -> &mut BeanDef {
        if self.definitions.is_empty() {
            self.definitions.push(BeanDef::default());
        }
        &mut self.definitions[0]
    }

    pub(crate) fn identity(&self) -> Option<&BeanDef> {
        self.definitions.first()
    }

    /// Report an error against the current member (or the class).
    pub(crate) fn error(&self, message: String) {
        let member = self.member.as_ref().map(Member::name);
        self.ctx.error(Some(&self.class.name), member, message);
    }

    /// Report an error against the class itself.
    pub(crate) fn class_error(&self, message: String) {
        self.ctx.error(Some(&self.class.name), None, message);
    }

    pub(crate) fn begin_member(&mut self, member: Member<'c>) {
        trace!("{}: member {}", self.class.name, member.name());
        self.member = Some(member);
    }

    pub(crate) fn end_member(&mut self) {
        self.member = None;
        self.parameter = None;
        self.minimum_cardinality = false;
        self.member_reference = None;
    }

    pub(crate) fn begin_parameter(&mut self, index: usize) {
        self.parameter = Some(index);
        self.member_reference = None;
    }

    /// Record a type-use target. Only class `extends`/`implements` targets
    /// are recorded; any other target leaves the previous one in place.
    fn type_use(&mut self, target: TypeUseTarget) {
        if target.target_type != TYPEUSE_CLASS_EXTENDS {
            return;
        }
        self.target_index = target.target_index;
    }

    /// Dispatch every annotation of one placement, in order.
    pub(crate) fn annotations(&mut self, annotations: &[Annotation], placement: ElementType) {
        for annotation in annotations {
            if let Some(target) = annotation.type_use {
                self.type_use(target);
            }
            self.annotation(annotation, annotation.element_type_at(placement));
        }
    }

    fn annotation(&mut self, annotation: &Annotation, element_type: ElementType) {
        match annotation.name.as_str() {
            BEAN_ANNOTATION => self.identity_mut().marked = true,
            SERVICE_ANNOTATION => self.service(annotation, element_type),
            MINIMUM_CARDINALITY_ANNOTATION => {
                let value = annotation.value("value").and_then(|v| v.as_int()).unwrap_or(0);
                if value > 0 {
                    self.minimum_cardinality = true;
                    self.upgrade_member_reference();
                }
            }
            REFERENCE_ANNOTATION => self.reference(annotation, element_type),
            _ => {}
        }
    }

    pub(crate) fn into_definitions(self) -> Vec<BeanDef> {
        self.definitions
    }
}

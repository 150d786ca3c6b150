// src/core/extractor.rs
use tracing::{debug, info, warn};

use crate::error::{UmlError, Result};
use super::classifier::RelationshipClassifier;
use super::declaration::{
    CallExpression, FieldAccessExpression, FieldDeclaration, MethodDeclaration, Resolution,
    ResolutionError, ResolvedDeclaration, SupertypeKind,
};
use super::model::{Entity, Field, Method, Relative};

/// Turns resolved declarations into entities with filtered relationships
pub struct RelationshipExtractor {
    classifier: RelationshipClassifier,
}

impl RelationshipExtractor {
    pub fn new(classifier: RelationshipClassifier) -> Self {
        Self { classifier }
    }

    /// Build one entity per usable declaration. Only an empty input is an
    /// error; broken declarations and expressions are logged and skipped.
    pub fn extract_entities(&self, declarations: &[ResolvedDeclaration]) -> Result<Vec<Entity>> {
        if declarations.is_empty() {
            return Err(UmlError::EmptyInput);
        }

        let mut entities = Vec::with_capacity(declarations.len());
        for declaration in declarations {
            if !self.classifier.is_project_entity(&declaration.name) {
                debug!("Skipping declaration outside the include package: {}", declaration.name);
                continue;
            }

            match self.extract_entity(declaration) {
                Ok(entity) => {
                    for relative in entity.relatives() {
                        debug!("{}: {}", entity.name(), relative);
                    }
                    entities.push(entity);
                }
                Err(e) => warn!("Skipping declaration '{}': {}", declaration.name, e),
            }
        }

        info!("Extracted {} entities from {} declarations", entities.len(), declarations.len());
        Ok(entities)
    }

    /// Build the entity for a single declaration
    pub fn extract_entity(&self, declaration: &ResolvedDeclaration) -> Result<Entity> {
        let mut entity = Entity::new(declaration.name.clone())?.with_kind(declaration.kind);

        self.extract_supertypes(declaration, &mut entity);
        for method in &declaration.methods {
            self.extract_method(method, &mut entity);
        }
        for field in &declaration.fields {
            self.extract_field(field, &mut entity);
        }

        Ok(entity)
    }

    fn extract_supertypes(&self, declaration: &ResolvedDeclaration, entity: &mut Entity) {
        for supertype in &declaration.supertypes {
            let Some(target) = self.relevant_target(entity.name(), &supertype.resolved, &supertype.written) else {
                continue;
            };

            let relative = match supertype.kind {
                SupertypeKind::Extends => Relative::inheritance(target),
                SupertypeKind::Implements => Relative::implementation(target),
            };
            entity.add_relative(relative);
        }
    }

    fn extract_method(&self, method: &MethodDeclaration, entity: &mut Entity) {
        let model = method.parameter_types.iter().fold(
            Method::new(method.name.clone(), method.return_type.clone()).with_visibility(method.visibility),
            |model, param| model.with_parameter(param.clone()),
        );

        if let Err(e) = entity.add_method(model) {
            warn!("Skipping method on {}: {}", entity.name(), e);
            return;
        }

        for call in &method.calls {
            self.extract_call(&method.name, call, entity);
        }
        for access in &method.field_accesses {
            self.extract_field_access(&method.name, access, entity);
        }
    }

    fn extract_call(&self, caller: &str, call: &CallExpression, entity: &mut Entity) {
        let receiver = match &call.receiver {
            None => entity.name().to_string(),
            Some(Ok(name)) => name.clone(),
            Some(Err(e)) => {
                log_resolution_failure(entity.name(), &call.method, e);
                // an unresolved receiver counts as the entity itself
                entity.name().to_string()
            }
        };

        if !self.classifier.accepts(entity.name(), &receiver) {
            return;
        }
        entity.add_relative(Relative::caller_callee(receiver, caller, call.method.clone()));
    }

    fn extract_field_access(&self, method: &str, access: &FieldAccessExpression, entity: &mut Entity) {
        let Some(owner) = self.relevant_target(entity.name(), &access.owner, &access.field) else {
            return;
        };
        entity.add_relative(Relative::field_access(owner, method, access.field.clone()));
    }

    fn extract_field(&self, field: &FieldDeclaration, entity: &mut Entity) {
        let model = Field::new(field.name.clone(), field.type_name.clone())
            .with_visibility(field.visibility);
        if let Err(e) = entity.add_field(model) {
            warn!("Skipping field on {}: {}", entity.name(), e);
            return;
        }

        if let Some(target) = self.relevant_target(entity.name(), &field.resolved_type, &field.name) {
            entity.add_relative(Relative::association(target));
        }
    }

    /// The resolved target if it is relevant and not the owner itself
    fn relevant_target(&self, owner: &str, resolution: &Resolution, context: &str) -> Option<String> {
        match resolution {
            Ok(target) if self.classifier.accepts(owner, target) => Some(target.clone()),
            Ok(target) => {
                debug!("Skipping irrelevant or self reference from {} to {}", owner, target);
                None
            }
            Err(e) => {
                log_resolution_failure(owner, context, e);
                None
            }
        }
    }
}

fn log_resolution_failure(owner: &str, context: &str, error: &ResolutionError) {
    if error.is_benign() {
        debug!("{}: could not resolve '{}': {}", owner, context, error);
    } else {
        warn!("{}: could not resolve '{}': {}", owner, context, error);
    }
}

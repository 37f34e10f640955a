//! Reconciliation of one relationship record

use cmdb_expr::Evaluator;
use cmdb_model::{Model, ObjectRef, Subject, concept};
use serde_json::Value;

use super::attributes::{self, AttributeExprs};
use super::decision::{Action, decide_relationship};
use crate::config::{RELATIONS, RelationClass, RelationMapping};
use crate::report::BatchReport;
use crate::{Error, Result};

/// Catalog name of a relationship type, accepting the short form (`Serving`)
pub fn relationship_type(name: &str) -> Option<&'static str> {
    concept::canonical_type(name)
        .or_else(|| concept::canonical_type(&format!("{name}Relationship")))
        .filter(|t| concept::is_relationship_type(t))
}

/// Bring the model in line with one relationship record.
///
/// Records whose keyword is missing or not mapped are skipped.
pub fn reconcile_relationship(
    model: &mut Model,
    evaluator: &mut Evaluator<'_>,
    relations: &RelationMapping,
    record: &Value,
    report: &mut BatchReport,
) -> Result<()> {
    let keyword = evaluator.evaluate(&relations.type_expr, Some(record), Some(Subject::model(model)))?;
    let Some(class) = keyword.as_deref().and_then(|k| relations.class(k)) else {
        tracing::debug!(keyword = ?keyword, "Relationship keyword not mapped, record skipped");
        report.skipped += 1;
        return Ok(());
    };

    let key = format!("{RELATIONS}.{}.id", class.keyword);
    let id = attributes::mandatory(evaluator, &key, &class.id, record, Subject::model(model))?;

    match apply_record(model, evaluator, class, &id, record, report) {
        Err(e) if !e.aborts_batch() => {
            tracing::warn!(%id, error = %e, "Relationship skipped");
            report.record_error(id, e.to_string());
            Ok(())
        }
        other => other,
    }
}

fn apply_record(
    model: &mut Model,
    evaluator: &mut Evaluator<'_>,
    class: &RelationClass,
    id: &str,
    record: &Value,
    report: &mut BatchReport,
) -> Result<()> {
    let existing = match model.find_by_id(id) {
        None => None,
        Some(ObjectRef::Concept(concept)) if concept.is_relationship() => Some(concept),
        Some(other) => {
            return Err(Error::TypeMismatch {
                id: id.to_string(),
                expected: "relationship",
                found: other.kind(),
            });
        }
    };
    let subject = match existing {
        Some(concept) => Subject::concept(model, concept),
        None => Subject::model(model),
    };

    let class_key = format!("{RELATIONS}.{}.archi_class", class.keyword);
    let requested = attributes::mandatory(evaluator, &class_key, &class.archi_class, record, subject)?;
    let rel_type = relationship_type(&requested).ok_or_else(|| cmdb_model::Error::UnknownType {
        name: requested.clone(),
    })?;

    let action = decide_relationship(class.import_mode, existing.is_some());
    tracing::debug!(id, rel_type, mode = %class.import_mode, %action, "Relationship decision");

    match action {
        Action::Noop | Action::Remove => {
            report.skipped += 1;
            return Ok(());
        }
        Action::Create => {
            let (source, source_type) = endpoint(model, evaluator, id, "source", &class.source, record)?;
            let (target, target_type) = endpoint(model, evaluator, id, "target", &class.target, record)?;
            if !model.is_valid_relationship(&source_type, &target_type, rel_type) {
                return Err(Error::InvalidRelationship {
                    source_type,
                    target_type,
                    relationship: rel_type.to_string(),
                });
            }

            let relationship = model.create_relationship(rel_type, id, &source, &target)?;
            let folder = model
                .default_folder_for(&relationship)
                .map(|f| f.id.clone())
                .ok_or_else(|| cmdb_model::Error::NotFound("relations folder".to_string()))?;
            model.attach(&folder, relationship)?;
            tracing::debug!(id, rel_type, %source, %target, "Relationship created");
            report.created += 1;
        }
        Action::Update => {}
    }

    let exprs = AttributeExprs {
        name: class.name.as_deref(),
        documentation: class.documentation.as_deref(),
        folder: class.folder.as_deref(),
        properties: &class.properties,
    };
    let computed = attributes::compute(evaluator, model, id, exprs, record)?;
    let changed = attributes::apply(model, id, computed)?;

    if action == Action::Update {
        if changed {
            report.updated += 1;
        } else {
            report.unchanged += 1;
        }
    }
    Ok(())
}

/// Identifier and type of an endpoint, which must already be in the model
fn endpoint(
    model: &Model,
    evaluator: &mut Evaluator<'_>,
    id: &str,
    end: &'static str,
    expr: &str,
    record: &Value,
) -> Result<(String, String)> {
    let value = evaluator.evaluate(expr, Some(record), Some(Subject::model(model)))?;
    let class = value
        .as_deref()
        .and_then(|endpoint| model.concept(endpoint))
        .map(|concept| concept.class.clone());
    match (value, class) {
        (Some(endpoint), Some(class)) => Ok((endpoint, class)),
        (value, _) => Err(Error::UnresolvedEndpoint {
            id: id.to_string(),
            end,
            endpoint: value.unwrap_or_default(),
        }),
    }
}

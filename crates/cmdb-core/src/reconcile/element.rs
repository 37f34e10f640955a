//! Reconciliation of one element record

use cmdb_expr::Evaluator;
use cmdb_model::{Model, ObjectRef, Subject};
use serde_json::Value;

use super::attributes::{self, AttributeExprs};
use super::decision::{Action, decide};
use crate::config::{ELEMENTS, ElementMapping};
use crate::mode::ExternalStatus;
use crate::report::BatchReport;
use crate::{Error, Result};

/// Bring the model in line with one element record.
///
/// Errors confined to this record are logged and recorded in `report`;
/// anything returned stops the batch.
pub fn reconcile_element(
    model: &mut Model,
    evaluator: &mut Evaluator<'_>,
    mapping: &ElementMapping,
    record: &Value,
    report: &mut BatchReport,
) -> Result<()> {
    let key = format!("{ELEMENTS}.{}.id", mapping.table);
    let id = attributes::mandatory(evaluator, &key, &mapping.id, record, Subject::model(model))?;

    match apply_record(model, evaluator, mapping, &id, record, report) {
        Err(e) if !e.aborts_batch() => {
            tracing::warn!(%id, error = %e, "Element skipped");
            report.record_error(id, e.to_string());
            Ok(())
        }
        other => other,
    }
}

fn apply_record(
    model: &mut Model,
    evaluator: &mut Evaluator<'_>,
    mapping: &ElementMapping,
    id: &str,
    record: &Value,
    report: &mut BatchReport,
) -> Result<()> {
    let existing = match model.find_by_id(id) {
        None => None,
        Some(ObjectRef::Concept(concept)) if !concept.is_relationship() => Some(concept),
        Some(other) => {
            return Err(Error::TypeMismatch {
                id: id.to_string(),
                expected: "element",
                found: other.kind(),
            });
        }
    };
    let subject = match existing {
        Some(concept) => Subject::concept(model, concept),
        None => Subject::model(model),
    };

    let class_key = format!("{ELEMENTS}.{}.archi_class", mapping.table);
    let class = attributes::mandatory(evaluator, &class_key, &mapping.archi_class, record, subject)?;
    let status_value = evaluator.evaluate(&mapping.status, Some(record), Some(subject))?;
    let status = ExternalStatus::from_value(status_value.as_deref(), &mapping.operational_value);

    if let Some(concept) = existing {
        if !concept.class.eq_ignore_ascii_case(&class) {
            tracing::warn!(id, current = %concept.class, requested = %class, "Element type differs, kept as is");
        }
    }

    let action = decide(mapping.import_mode, existing.is_some(), status);
    tracing::debug!(id, %class, %status, mode = %mapping.import_mode, %action, "Element decision");

    match action {
        Action::Noop => {
            report.skipped += 1;
            return Ok(());
        }
        Action::Remove => {
            let views = model.detach_from_all_views(id);
            model.detach(id);
            tracing::debug!(id, views, "Element removed");
            report.removed += 1;
            return Ok(());
        }
        Action::Create => {
            let concept = model.create_typed(&class, id)?;
            let folder = model
                .default_folder_for(&concept)
                .map(|f| f.id.clone())
                .ok_or_else(|| cmdb_model::Error::NotFound(format!("default folder for {class}")))?;
            model.attach(&folder, concept)?;
            tracing::debug!(id, %class, "Element created");
            report.created += 1;
        }
        Action::Update => {}
    }

    let exprs = AttributeExprs {
        name: Some(&mapping.name),
        documentation: Some(&mapping.documentation),
        folder: mapping.folder.as_deref(),
        properties: &mapping.properties,
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

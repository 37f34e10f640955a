//! Idempotent attribute, property and folder synchronization

use std::collections::BTreeMap;

use cmdb_expr::Evaluator;
use cmdb_model::{Model, Subject};
use serde_json::Value;

use crate::{Error, Result};

/// Expressions describing the attributes of one object
#[derive(Debug, Clone, Copy)]
pub(crate) struct AttributeExprs<'a> {
    pub name: Option<&'a str>,
    pub documentation: Option<&'a str>,
    pub folder: Option<&'a str>,
    pub properties: &'a BTreeMap<String, String>,
}

/// Attribute values computed for one object, detached from the model borrow
#[derive(Debug, Default)]
pub(crate) struct Attributes {
    name: Option<String>,
    documentation: Option<String>,
    properties: Vec<(String, Option<String>)>,
    folder: Option<Vec<String>>,
}

/// Evaluate a mandatory expression, turning a null or empty value into the
/// right error
pub(crate) fn mandatory(
    evaluator: &mut Evaluator<'_>,
    key: &str,
    expr: &str,
    record: &Value,
    subject: Subject<'_>,
) -> Result<String> {
    evaluator.take_dereference_error();
    match evaluator.evaluate(expr, Some(record), Some(subject))? {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(match evaluator.take_dereference_error() {
            Some(source) => Error::Dereference {
                key: key.to_string(),
                source,
            },
            None => Error::configuration(key, format!("'{expr}' has no value in the record")),
        }),
    }
}

/// Evaluate every attribute expression against the object `id` already in the model
pub(crate) fn compute(
    evaluator: &mut Evaluator<'_>,
    model: &Model,
    id: &str,
    exprs: AttributeExprs<'_>,
    record: &Value,
) -> Result<Attributes> {
    let subject = Subject::by_id(model, id);
    let mut attributes = Attributes::default();

    if let Some(expr) = exprs.name {
        attributes.name = evaluator.evaluate(expr, Some(record), subject)?;
        if attributes.name.is_none() {
            tracing::warn!(id, name = expr, "Name has no value, left as is");
        }
    }
    if let Some(expr) = exprs.documentation {
        attributes.documentation = evaluator.evaluate(expr, Some(record), subject)?;
    }
    for (key, expr) in exprs.properties {
        let value = evaluator.evaluate(expr, Some(record), subject)?;
        attributes.properties.push((key.clone(), value));
    }
    if let Some(expr) = exprs.folder {
        attributes.folder = Some(evaluator.evaluate_path_segments(expr, Some(record), subject)?);
    }
    Ok(attributes)
}

/// Write the computed attributes that differ from the stored ones.
///
/// Returns whether anything was written.
pub(crate) fn apply(model: &mut Model, id: &str, attributes: Attributes) -> Result<bool> {
    let Some(concept) = model.concept(id) else {
        return Err(cmdb_model::Error::NotFound(format!("concept {id}")).into());
    };

    let name = attributes.name.filter(|name| *name != concept.name);
    let documentation = match attributes.documentation {
        Some(doc) if doc != concept.documentation => Some(doc),
        Some(_) => None,
        None => {
            tracing::debug!(id, "Documentation has no value, left as is");
            None
        }
    };
    let properties: Vec<(String, String)> = attributes
        .properties
        .into_iter()
        .filter_map(|(key, value)| match (concept.property(&key), value) {
            (None, value) => Some((key, value.unwrap_or_default())),
            (Some(current), Some(value)) if !value.is_empty() && value != current => {
                Some((key, value))
            }
            _ => None,
        })
        .collect();

    let mut changed = false;
    if let Some(name) = name {
        tracing::debug!(id, %name, "Updating name");
        model.set_name(id, &name)?;
        changed = true;
    }
    if let Some(documentation) = documentation {
        tracing::debug!(id, "Updating documentation");
        model.set_documentation(id, &documentation)?;
        changed = true;
    }
    for (key, value) in properties {
        tracing::debug!(id, %key, %value, "Updating property");
        model.set_property(id, &key, &value)?;
        changed = true;
    }
    if let Some(path) = attributes.folder {
        changed |= place(model, id, &path)?;
    }
    Ok(changed)
}

/// Move `id` into the folder chain `path` below its default folder.
///
/// Returns whether the object moved.
pub(crate) fn place(model: &mut Model, id: &str, path: &[String]) -> Result<bool> {
    if model.folder_path(id).as_deref() == Some(path) {
        return Ok(false);
    }

    let concept = model
        .concept(id)
        .ok_or_else(|| cmdb_model::Error::NotFound(format!("concept {id}")))?;
    let mut folder_id = model
        .default_folder_for(concept)
        .map(|f| f.id.clone())
        .ok_or_else(|| cmdb_model::Error::NotFound(format!("default folder for {id}")))?;

    for name in path {
        let existing = model
            .subfolders(&folder_id)
            .iter()
            .find(|f| f.name == *name)
            .map(|f| f.id.clone());
        folder_id = match existing {
            Some(existing) => existing,
            None => {
                tracing::debug!(folder = %name, "Creating folder");
                model.create_subfolder(&folder_id, name)?
            }
        };
    }

    tracing::debug!(id, path = %path.join("/"), "Moving to folder");
    let Some(concept) = model.detach(id) else {
        return Ok(false);
    };
    model.attach(&folder_id, concept)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdb_model::FolderType;
    use cmdb_test_utils::MockFetcher;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn model_with_node() -> Model {
        let mut model = Model::new("test");
        let mut node = model.create_typed("Node", "abc").unwrap();
        node.name = "web-01".to_string();
        node.properties.push(cmdb_model::Property::new("owner", "Alice"));
        let folder = model
            .top_level_folder(FolderType::Technology)
            .map(|f| f.id.clone())
            .unwrap();
        model.attach(&folder, node).unwrap();
        model
    }

    #[test]
    fn unchanged_values_are_not_written() {
        let mut model = model_with_node();
        let fetcher = MockFetcher::new();
        let mut evaluator = Evaluator::new(&fetcher);
        let properties = BTreeMap::from([("owner".to_string(), "owned_by".to_string())]);
        let exprs = AttributeExprs {
            name: Some("name"),
            documentation: None,
            folder: None,
            properties: &properties,
        };
        let record = json!({"name": "web-01", "owned_by": "Alice"});

        let revision = model.revision();
        let attributes = compute(&mut evaluator, &model, "abc", exprs, &record).unwrap();
        assert!(!apply(&mut model, "abc", attributes).unwrap());
        assert_eq!(model.revision(), revision);
    }

    #[test]
    fn properties_are_created_but_never_cleared() {
        let mut model = model_with_node();
        let fetcher = MockFetcher::new();
        let mut evaluator = Evaluator::new(&fetcher);
        let properties = BTreeMap::from([
            ("owner".to_string(), "owned_by".to_string()),
            ("cpu".to_string(), "cpu_count".to_string()),
        ]);
        let exprs = AttributeExprs {
            name: None,
            documentation: None,
            folder: None,
            properties: &properties,
        };
        let record = json!({"owned_by": ""});

        let attributes = compute(&mut evaluator, &model, "abc", exprs, &record).unwrap();
        assert!(apply(&mut model, "abc", attributes).unwrap());
        let node = model.concept("abc").unwrap();
        assert_eq!(node.property("owner"), Some("Alice"));
        assert_eq!(node.property("cpu"), Some(""));
    }

    #[test]
    fn missing_name_leaves_the_name_alone() {
        let mut model = model_with_node();
        let fetcher = MockFetcher::new();
        let mut evaluator = Evaluator::new(&fetcher);
        let properties = BTreeMap::new();
        let exprs = AttributeExprs {
            name: Some("host_name"),
            documentation: None,
            folder: None,
            properties: &properties,
        };
        let attributes = compute(&mut evaluator, &model, "abc", exprs, &json!({})).unwrap();
        assert!(!apply(&mut model, "abc", attributes).unwrap());
        assert_eq!(model.concept("abc").map(|c| c.name.as_str()), Some("web-01"));
    }

    #[test]
    fn mandatory_names_the_key() {
        let model = model_with_node();
        let fetcher = MockFetcher::new();
        let mut evaluator = Evaluator::new(&fetcher);
        let record = json!({"sys_id": ""});
        let err = mandatory(&mut evaluator, "archi.elements.t.id", "sys_id", &record, Subject::model(&model))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { ref key, .. } if key == "archi.elements.t.id"));

        let record = json!({"company": {"link": "https://x.local/company/1"}});
        let err = mandatory(&mut evaluator, "k", "company#name", &record, Subject::model(&model))
            .unwrap_err();
        assert!(matches!(err, Error::Dereference { ref key, .. } if key == "k"));
    }

    #[test]
    fn place_creates_the_chain_once() {
        let mut model = model_with_node();
        let path = vec!["Paris".to_string(), "Rack a/b".to_string()];

        assert!(place(&mut model, "abc", &path).unwrap());
        assert_eq!(model.folder_path("abc"), Some(path.clone()));
        let revision = model.revision();
        assert!(!place(&mut model, "abc", &path).unwrap());
        assert_eq!(model.revision(), revision);

        assert!(place(&mut model, "abc", &[]).unwrap());
        assert_eq!(model.folder_path("abc"), Some(vec![]));
        let technology = model
            .top_level_folder(FolderType::Technology)
            .map(|f| f.id.clone())
            .unwrap();
        assert_eq!(model.subfolders(&technology).len(), 1);
    }
}

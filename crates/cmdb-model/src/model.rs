//! The model root and its lookup/mutation interface
//!
//! Every concept and view lives in exactly one folder. Detaching a concept
//! from its folder takes it out of the model; attaching it to a folder puts
//! it back. Each mutation bumps [`Model::revision`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::concept::{self, Concept, ConceptKind, Property};
use crate::folder::{Folder, FolderType};
use crate::view::{DiagramConnection, DiagramNode, View};
use crate::{Error, Result};

/// Anything [`Model::find_by_id`] can return
#[derive(Debug, Clone, Copy)]
pub enum ObjectRef<'a> {
    Model(&'a Model),
    Concept(&'a Concept),
    View(&'a View),
    Folder(&'a Folder),
}

impl ObjectRef<'_> {
    /// Short name of the object's kind, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            ObjectRef::Model(_) => "model",
            ObjectRef::Concept(c) if c.is_relationship() => "relationship",
            ObjectRef::Concept(_) => "element",
            ObjectRef::View(_) => "view",
            ObjectRef::Folder(_) => "folder",
        }
    }
}

/// An architecture model: folders, concepts and views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    folders: Vec<Folder>,
    #[serde(default)]
    concepts: BTreeMap<String, Concept>,
    #[serde(default)]
    views: BTreeMap<String, View>,
    #[serde(skip)]
    revision: u64,
}

impl Model {
    /// Create an empty model with its top-level folders
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            purpose: String::new(),
            documentation: String::new(),
            properties: Vec::new(),
            folders: FolderType::TOP_LEVEL
                .iter()
                .map(|t| Folder::new(t.default_name(), *t))
                .collect(),
            concepts: BTreeMap::new(),
            views: BTreeMap::new(),
            revision: 0,
        }
    }

    /// Load a model from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut model: Model = serde_json::from_str(&content).map_err(|e| Error::InvalidModel {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        for folder_type in FolderType::TOP_LEVEL {
            if model.top_level_folder(folder_type).is_none() {
                tracing::debug!(?folder_type, "Adding missing top-level folder");
                model
                    .folders
                    .push(Folder::new(folder_type.default_name(), folder_type));
            }
        }
        Ok(model)
    }

    /// Save the model as pretty JSON, writing to a temporary file first
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Number of mutations applied since the model was created or loaded
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn top_level_folder(&self, folder_type: FolderType) -> Option<&Folder> {
        self.folders.iter().find(|f| f.folder_type == folder_type)
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find_map(|f| f.find(id))
    }

    fn folder_mut(&mut self, id: &str) -> Option<&mut Folder> {
        self.folders.iter_mut().find_map(|f| f.find_mut(id))
    }

    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.values()
    }

    pub fn concept(&self, id: &str) -> Option<&Concept> {
        self.concepts.get(id)
    }

    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.values()
    }

    pub fn view(&self, id: &str) -> Option<&View> {
        self.views.get(id)
    }

    /// Look up any object of the model by identifier
    pub fn find_by_id(&self, id: &str) -> Option<ObjectRef<'_>> {
        if self.id == id {
            return Some(ObjectRef::Model(self));
        }
        if let Some(concept) = self.concepts.get(id) {
            return Some(ObjectRef::Concept(concept));
        }
        if let Some(view) = self.views.get(id) {
            return Some(ObjectRef::View(view));
        }
        self.folder(id).map(ObjectRef::Folder)
    }

    fn ensure_free(&self, id: &str) -> Result<()> {
        if self.find_by_id(id).is_some() {
            return Err(Error::DuplicateId { id: id.to_string() });
        }
        Ok(())
    }

    /// Instantiate a new element of `type_name` with identifier `id`.
    ///
    /// The element is not part of the model until it is attached to a folder.
    pub fn create_typed(&self, type_name: &str, id: &str) -> Result<Concept> {
        let class = concept::canonical_type(type_name).ok_or_else(|| Error::UnknownType {
            name: type_name.to_string(),
        })?;
        if !concept::is_element_type(class) {
            return Err(Error::WrongKind {
                name: class.to_string(),
                expected: "an element",
            });
        }
        self.ensure_free(id)?;
        Ok(Concept {
            id: id.to_string(),
            class: class.to_string(),
            name: String::new(),
            documentation: String::new(),
            properties: Vec::new(),
            kind: ConceptKind::Element,
        })
    }

    /// Instantiate a new relationship of `type_name` between two concepts.
    pub fn create_relationship(
        &self,
        type_name: &str,
        id: &str,
        source: &str,
        target: &str,
    ) -> Result<Concept> {
        let class = concept::canonical_type(type_name).ok_or_else(|| Error::UnknownType {
            name: type_name.to_string(),
        })?;
        if !concept::is_relationship_type(class) {
            return Err(Error::WrongKind {
                name: class.to_string(),
                expected: "a relationship",
            });
        }
        self.ensure_free(id)?;
        for endpoint in [source, target] {
            if !self.concepts.contains_key(endpoint) {
                return Err(Error::NotFound(format!("concept {endpoint}")));
            }
        }
        Ok(Concept {
            id: id.to_string(),
            class: class.to_string(),
            name: String::new(),
            documentation: String::new(),
            properties: Vec::new(),
            kind: ConceptKind::Relationship {
                source: source.to_string(),
                target: target.to_string(),
            },
        })
    }

    /// Whether a relationship type may link the two given types
    pub fn is_valid_relationship(&self, source_type: &str, target_type: &str, rel_type: &str) -> bool {
        concept::is_valid_relationship(source_type, target_type, rel_type)
    }

    /// Identifier of the top-level folder that receives `concept`
    pub fn default_folder_for(&self, concept: &Concept) -> Option<&Folder> {
        let folder_type = FolderType::for_type(&concept.class)?;
        self.top_level_folder(folder_type)
    }

    /// Direct sub-folders of a folder
    pub fn subfolders(&self, folder_id: &str) -> &[Folder] {
        self.folder(folder_id).map(|f| f.folders.as_slice()).unwrap_or(&[])
    }

    /// Create a user folder below `parent_id`, returning its identifier
    pub fn create_subfolder(&mut self, parent_id: &str, name: &str) -> Result<String> {
        let parent = self
            .folder_mut(parent_id)
            .ok_or_else(|| Error::NotFound(format!("folder {parent_id}")))?;
        let folder = Folder::new(name, FolderType::User);
        let id = folder.id.clone();
        parent.folders.push(folder);
        self.touch();
        Ok(id)
    }

    /// Store `concept` in the folder `folder_id`
    pub fn attach(&mut self, folder_id: &str, concept: Concept) -> Result<()> {
        self.ensure_free(&concept.id)?;
        let folder = self
            .folder_mut(folder_id)
            .ok_or_else(|| Error::NotFound(format!("folder {folder_id}")))?;
        folder.members.push(concept.id.clone());
        self.concepts.insert(concept.id.clone(), concept);
        self.touch();
        Ok(())
    }

    /// Take a concept out of its folder, and therefore out of the model
    pub fn detach(&mut self, id: &str) -> Option<Concept> {
        let concept = self.concepts.remove(id)?;
        if self.folders.iter_mut().find_map(|f| f.remove_member(id)).is_none() {
            tracing::warn!(id, "Concept was not stored in any folder");
        }
        self.touch();
        Some(concept)
    }

    /// Remove every diagram component that shows `id`, returning how many were removed
    pub fn detach_from_all_views(&mut self, id: &str) -> usize {
        let removed: usize = self.views.values_mut().map(|v| v.detach(id)).sum();
        if removed > 0 {
            self.touch();
        }
        removed
    }

    /// Views showing the given concept
    pub fn views_referencing(&self, id: &str) -> Vec<&View> {
        self.views.values().filter(|v| v.references(id)).collect()
    }

    /// Names of the folders between the top-level folder (excluded) and the
    /// folder holding `id` (included). `None` when `id` is in no folder.
    pub fn folder_path(&self, id: &str) -> Option<Vec<String>> {
        let chain = self.folders.iter().find_map(|f| f.chain_to_member(id))?;
        Some(chain.iter().skip(1).map(|f| f.name.clone()).collect())
    }

    /// Identifier of the folder holding `id`
    pub fn folder_of(&self, id: &str) -> Option<&Folder> {
        let chain = self.folders.iter().find_map(|f| f.chain_to_member(id))?;
        chain.last().copied()
    }

    fn concept_mut(&mut self, id: &str) -> Result<&mut Concept> {
        self.concepts
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("concept {id}")))
    }

    pub fn set_name(&mut self, id: &str, name: &str) -> Result<()> {
        self.concept_mut(id)?.name = name.to_string();
        self.touch();
        Ok(())
    }

    pub fn set_documentation(&mut self, id: &str, documentation: &str) -> Result<()> {
        self.concept_mut(id)?.documentation = documentation.to_string();
        self.touch();
        Ok(())
    }

    /// Update the first property named `key`, or append it when absent
    pub fn set_property(&mut self, id: &str, key: &str, value: &str) -> Result<()> {
        let concept = self.concept_mut(id)?;
        match concept.properties.iter_mut().find(|p| p.key == key) {
            Some(property) => property.value = value.to_string(),
            None => concept.properties.push(Property::new(key, value)),
        }
        self.touch();
        Ok(())
    }

    /// Create an empty view in the top-level views folder
    pub fn add_view(&mut self, name: &str) -> Result<String> {
        let view = View::new(name);
        let id = view.id.clone();
        let folder = self
            .folders
            .iter_mut()
            .find(|f| f.folder_type == FolderType::Views)
            .ok_or_else(|| Error::NotFound("views folder".to_string()))?;
        folder.members.push(id.clone());
        self.views.insert(id.clone(), view);
        self.touch();
        Ok(id)
    }

    /// Add a node to a view, nested in `parent` when given
    pub fn add_node(
        &mut self,
        view_id: &str,
        parent: Option<&str>,
        element: Option<&str>,
        name: &str,
    ) -> Result<String> {
        let view = self
            .views
            .get_mut(view_id)
            .ok_or_else(|| Error::NotFound(format!("view {view_id}")))?;
        let node = DiagramNode::new(element.map(str::to_string), name);
        let id = node.id.clone();
        match parent {
            Some(parent_id) => view
                .node_mut(parent_id)
                .ok_or_else(|| Error::NotFound(format!("node {parent_id}")))?
                .children
                .push(node),
            None => view.children.push(node),
        }
        self.touch();
        Ok(id)
    }

    /// Connect two nodes of a view with a line showing `relationship`
    pub fn add_connection(
        &mut self,
        view_id: &str,
        relationship: &str,
        source_node: &str,
        target_node: &str,
    ) -> Result<String> {
        let view = self
            .views
            .get_mut(view_id)
            .ok_or_else(|| Error::NotFound(format!("view {view_id}")))?;
        for node in [source_node, target_node] {
            if view.node(node).is_none() {
                return Err(Error::NotFound(format!("node {node}")));
            }
        }
        let id = Uuid::new_v4().to_string();
        view.connections.push(DiagramConnection {
            id: id.clone(),
            relationship: relationship.to_string(),
            source: source_node.to_string(),
            target: target_node.to_string(),
        });
        self.touch();
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn model_with_node(id: &str) -> Model {
        let mut model = Model::new("test");
        let node = model.create_typed("Node", id).unwrap();
        let folder = model.default_folder_for(&node).unwrap().id.clone();
        model.attach(&folder, node).unwrap();
        model
    }

    #[test]
    fn new_model_has_top_level_folders() {
        let model = Model::new("m");
        assert_eq!(model.folders().len(), FolderType::TOP_LEVEL.len());
        assert_eq!(
            model.top_level_folder(FolderType::Technology).unwrap().name,
            "Technology & Physical"
        );
        assert_eq!(model.revision(), 0);
    }

    #[test]
    fn create_typed_is_not_attached_until_attach() {
        let mut model = Model::new("m");
        let node = model.create_typed("node", "abc").unwrap();
        assert_eq!(node.class, "Node");
        assert!(model.find_by_id("abc").is_none());

        let folder = model.default_folder_for(&node).unwrap().id.clone();
        model.attach(&folder, node).unwrap();
        assert_eq!(model.find_by_id("abc").unwrap().kind(), "element");
        assert_eq!(model.folder_path("abc"), Some(vec![]));
    }

    #[test]
    fn create_typed_rejects_duplicates_and_relationship_types() {
        let model = model_with_node("abc");
        assert!(matches!(
            model.create_typed("Device", "abc"),
            Err(Error::DuplicateId { .. })
        ));
        assert!(matches!(
            model.create_typed("ServingRelationship", "r1"),
            Err(Error::WrongKind { .. })
        ));
        assert!(matches!(
            model.create_typed("Mainframe", "x"),
            Err(Error::UnknownType { .. })
        ));
    }

    #[test]
    fn create_relationship_requires_endpoints() {
        let model = model_with_node("a");
        assert!(matches!(
            model.create_relationship("ServingRelationship", "r1", "a", "missing"),
            Err(Error::NotFound(_))
        ));
        let rel = model
            .create_relationship("ServingRelationship", "r1", "a", "a")
            .unwrap();
        assert_eq!(rel.endpoints(), Some(("a", "a")));
    }

    #[test]
    fn detach_takes_concept_out_of_model() {
        let mut model = model_with_node("abc");
        let before = model.revision();
        let concept = model.detach("abc").unwrap();
        assert_eq!(concept.id, "abc");
        assert!(model.find_by_id("abc").is_none());
        assert!(model.revision() > before);
        assert!(model.detach("abc").is_none());
    }

    #[test]
    fn folder_path_excludes_top_level_folder() {
        let mut model = model_with_node("abc");
        let concept = model.detach("abc").unwrap();
        let top = model.default_folder_for(&concept).unwrap().id.clone();
        let servers = model.create_subfolder(&top, "Servers").unwrap();
        let linux = model.create_subfolder(&servers, "Linux").unwrap();
        model.attach(&linux, concept).unwrap();

        assert_eq!(
            model.folder_path("abc"),
            Some(vec!["Servers".to_string(), "Linux".to_string()])
        );
        assert_eq!(model.folder_of("abc").unwrap().id, linux);
        assert_eq!(model.subfolders(&top).len(), 1);
    }

    #[test]
    fn setters_bump_revision() {
        let mut model = model_with_node("abc");
        let before = model.revision();
        model.set_name("abc", "srv01").unwrap();
        model.set_property("abc", "owner", "Alice").unwrap();
        model.set_property("abc", "owner", "Bob").unwrap();
        assert_eq!(model.revision(), before + 3);
        let concept = model.concept("abc").unwrap();
        assert_eq!(concept.name, "srv01");
        assert_eq!(concept.properties, vec![Property::new("owner", "Bob")]);
    }

    #[test]
    fn detach_from_all_views() {
        let mut model = model_with_node("abc");
        let view = model.add_view("Infra").unwrap();
        model.add_node(&view, None, Some("abc"), "").unwrap();
        assert_eq!(model.views_referencing("abc").len(), 1);
        assert_eq!(model.detach_from_all_views("abc"), 1);
        assert!(model.views_referencing("abc").is_empty());
        assert_eq!(model.detach_from_all_views("abc"), 0);
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model.json");
        let mut model = model_with_node("abc");
        model.set_name("abc", "srv01").unwrap();
        model.save(&path).unwrap();

        let loaded = Model::load(&path).unwrap();
        assert_eq!(loaded.concept("abc").unwrap().name, "srv01");
        assert_eq!(loaded.folder_path("abc"), Some(vec![]));
        assert_eq!(loaded.revision(), 0);
    }

    #[test]
    fn load_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(Model::load(&path), Err(Error::InvalidModel { .. })));
    }
}

//! Folder tree
//!
//! A model owns one top-level folder per [`FolderType`] (other than
//! [`FolderType::User`]). Imported objects are placed either directly in the
//! top-level folder for their kind or in a user sub-folder chain below it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::concept::{Layer, element_type, is_relationship_type};
use crate::concept::Property;

/// Kind of a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderType {
    Strategy,
    Business,
    Application,
    Technology,
    Motivation,
    Implementation,
    Other,
    Relations,
    Views,
    /// Folder created below a top-level folder
    User,
}

impl FolderType {
    /// Top-level folders, in display order
    pub const TOP_LEVEL: [FolderType; 9] = [
        FolderType::Strategy,
        FolderType::Business,
        FolderType::Application,
        FolderType::Technology,
        FolderType::Motivation,
        FolderType::Implementation,
        FolderType::Other,
        FolderType::Relations,
        FolderType::Views,
    ];

    /// Name given to the top-level folder of this type
    pub fn default_name(&self) -> &'static str {
        match self {
            FolderType::Strategy => "Strategy",
            FolderType::Business => "Business",
            FolderType::Application => "Application",
            FolderType::Technology => "Technology & Physical",
            FolderType::Motivation => "Motivation",
            FolderType::Implementation => "Implementation & Migration",
            FolderType::Other => "Other",
            FolderType::Relations => "Relations",
            FolderType::Views => "Views",
            FolderType::User => "New Folder",
        }
    }

    /// Top-level folder type that receives concepts of the given type name
    pub fn for_type(type_name: &str) -> Option<FolderType> {
        if is_relationship_type(type_name) {
            return Some(FolderType::Relations);
        }
        let (layer, _) = element_type(type_name)?;
        Some(match layer {
            Layer::Strategy => FolderType::Strategy,
            Layer::Business => FolderType::Business,
            Layer::Application => FolderType::Application,
            Layer::Technology => FolderType::Technology,
            Layer::Motivation => FolderType::Motivation,
            Layer::Implementation => FolderType::Implementation,
            Layer::Other => FolderType::Other,
        })
    }
}

/// A folder holding sub-folders and member object identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub folder_type: FolderType,
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub folders: Vec<Folder>,
    /// Identifiers of the concepts or views stored in this folder
    #[serde(default)]
    pub members: Vec<String>,
}

impl Folder {
    /// Create an empty folder with a fresh identifier
    pub fn new(name: impl Into<String>, folder_type: FolderType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            folder_type,
            documentation: String::new(),
            properties: Vec::new(),
            folders: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Find this folder or a descendant by identifier
    pub fn find(&self, id: &str) -> Option<&Folder> {
        if self.id == id {
            return Some(self);
        }
        self.folders.iter().find_map(|f| f.find(id))
    }

    /// Mutable variant of [`Folder::find`]
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Folder> {
        if self.id == id {
            return Some(self);
        }
        self.folders.iter_mut().find_map(|f| f.find_mut(id))
    }

    /// Chain of folders from `self` down to the folder holding `member`
    pub fn chain_to_member(&self, member: &str) -> Option<Vec<&Folder>> {
        if self.members.iter().any(|m| m == member) {
            return Some(vec![self]);
        }
        self.folders.iter().find_map(|f| {
            f.chain_to_member(member).map(|mut chain| {
                chain.insert(0, self);
                chain
            })
        })
    }

    /// Remove `member` from this folder or its descendants.
    ///
    /// Returns the identifier of the folder it was removed from.
    pub fn remove_member(&mut self, member: &str) -> Option<String> {
        if let Some(pos) = self.members.iter().position(|m| m == member) {
            self.members.remove(pos);
            return Some(self.id.clone());
        }
        self.folders.iter_mut().find_map(|f| f.remove_member(member))
    }
}

//! Architecture graph model for cmdb-sync.
//!
//! Concepts (elements and relationships), folders and diagram views, with the
//! small lookup/mutation interface the synchronizer works through.

pub mod concept;
pub mod error;
pub mod folder;
pub mod model;
pub mod subject;
pub mod view;

pub use concept::{Concept, ConceptKind, Property};
pub use error::{Error, Result};
pub use folder::{Folder, FolderType};
pub use model::{Model, ObjectRef};
pub use subject::{Subject, Target};
pub use view::{DiagramConnection, DiagramNode, View};

//! Objects that variable expressions are evaluated against
//!
//! A [`Subject`] pairs a model with one object of that model. The capability
//! accessors below answer `None` when the object kind lacks the capability,
//! e.g. [`Subject::purpose`] on anything other than the model root.

use crate::concept::{Concept, ConceptKind, Property};
use crate::model::Model;
use crate::view::{DiagramConnection, DiagramNode, View};

/// The object a [`Subject`] points at
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Model,
    Concept(&'a Concept),
    View(&'a View),
    Node {
        view: &'a View,
        node: &'a DiagramNode,
    },
    Connection {
        view: &'a View,
        connection: &'a DiagramConnection,
    },
}

/// A model object seen through the capabilities variables can query
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    model: &'a Model,
    target: Target<'a>,
}

impl<'a> Subject<'a> {
    pub fn model(model: &'a Model) -> Self {
        Self {
            model,
            target: Target::Model,
        }
    }

    pub fn concept(model: &'a Model, concept: &'a Concept) -> Self {
        Self {
            model,
            target: Target::Concept(concept),
        }
    }

    pub fn view(model: &'a Model, view: &'a View) -> Self {
        Self {
            model,
            target: Target::View(view),
        }
    }

    pub fn node(model: &'a Model, view: &'a View, node: &'a DiagramNode) -> Self {
        Self {
            model,
            target: Target::Node { view, node },
        }
    }

    pub fn connection(model: &'a Model, view: &'a View, connection: &'a DiagramConnection) -> Self {
        Self {
            model,
            target: Target::Connection { view, connection },
        }
    }

    /// Subject for the object with identifier `id`, searching concepts,
    /// views, then diagram nodes and connections of every view
    pub fn by_id(model: &'a Model, id: &str) -> Option<Self> {
        if model.id == id {
            return Some(Self::model(model));
        }
        if let Some(concept) = model.concept(id) {
            return Some(Self::concept(model, concept));
        }
        if let Some(view) = model.view(id) {
            return Some(Self::view(model, view));
        }
        model.views().find_map(|view| {
            view.node(id)
                .map(|node| Self::node(model, view, node))
                .or_else(|| {
                    view.connection(id)
                        .map(|connection| Self::connection(model, view, connection))
                })
        })
    }

    pub fn target(&self) -> Target<'a> {
        self.target
    }

    /// The concept shown by this subject, following diagram objects through
    /// to the element or relationship they reference
    pub fn underlying_concept(&self) -> Option<&'a Concept> {
        match self.target {
            Target::Concept(concept) => Some(concept),
            Target::Node { node, .. } => node.element.as_deref().and_then(|id| self.model.concept(id)),
            Target::Connection { connection, .. } => self.model.concept(&connection.relationship),
            Target::Model | Target::View(_) => None,
        }
    }

    /// Concrete type name of the subject
    pub fn class_name(&self) -> Option<&'a str> {
        match self.target {
            Target::Model => Some("ArchimateModel"),
            Target::Concept(concept) => Some(&concept.class),
            Target::View(_) => Some("ArchimateDiagramModel"),
            Target::Node { node, .. } => match &node.element {
                Some(_) => self.underlying_concept().map(|c| c.class.as_str()),
                None => Some("DiagramModelGroup"),
            },
            Target::Connection { .. } => self.underlying_concept().map(|c| c.class.as_str()),
        }
    }

    pub fn id(&self) -> Option<&'a str> {
        match self.target {
            Target::Model => Some(&self.model.id),
            Target::Concept(concept) => Some(&concept.id),
            Target::View(view) => Some(&view.id),
            Target::Node { node, .. } => Some(&node.id),
            Target::Connection { connection, .. } => Some(&connection.id),
        }
    }

    pub fn name(&self) -> Option<&'a str> {
        match self.target {
            Target::Model => Some(&self.model.name),
            Target::Concept(concept) => Some(&concept.name),
            Target::View(view) => Some(&view.name),
            Target::Node { node, .. } if node.element.is_none() => Some(&node.name),
            Target::Node { .. } | Target::Connection { .. } => {
                self.underlying_concept().map(|c| c.name.as_str())
            }
        }
    }

    pub fn documentation(&self) -> Option<&'a str> {
        match self.target {
            Target::Model => Some(&self.model.documentation),
            Target::Concept(concept) => Some(&concept.documentation),
            Target::View(view) => Some(&view.documentation),
            Target::Node { .. } | Target::Connection { .. } => {
                self.underlying_concept().map(|c| c.documentation.as_str())
            }
        }
    }

    /// Purpose text; only the model root has one
    pub fn purpose(&self) -> Option<&'a str> {
        match self.target {
            Target::Model => Some(&self.model.purpose),
            _ => None,
        }
    }

    pub fn properties(&self) -> Option<&'a [Property]> {
        match self.target {
            Target::Model => Some(&self.model.properties),
            Target::Concept(concept) => Some(&concept.properties),
            Target::View(view) => Some(&view.properties),
            Target::Node { .. } | Target::Connection { .. } => {
                self.underlying_concept().map(|c| c.properties.as_slice())
            }
        }
    }

    /// Value of the first property named `key`
    pub fn property(&self, key: &str) -> Option<&'a str> {
        self.properties()?
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// The view holding this subject, or the subject itself when it is a view
    pub fn containing_view(&self) -> Option<Subject<'a>> {
        match self.target {
            Target::View(view) | Target::Node { view, .. } | Target::Connection { view, .. } => {
                Some(Self::view(self.model, view))
            }
            Target::Model | Target::Concept(_) => None,
        }
    }

    pub fn owning_model(&self) -> Subject<'a> {
        Self::model(self.model)
    }

    /// Source end of a relationship or connection
    pub fn source(&self) -> Option<Subject<'a>> {
        self.endpoint(true)
    }

    /// Target end of a relationship or connection
    pub fn target_end(&self) -> Option<Subject<'a>> {
        self.endpoint(false)
    }

    fn endpoint(&self, source: bool) -> Option<Subject<'a>> {
        match self.target {
            Target::Concept(Concept {
                kind: ConceptKind::Relationship { source: s, target: t },
                ..
            }) => {
                let id = if source { s } else { t };
                self.model.concept(id).map(|c| Self::concept(self.model, c))
            }
            Target::Connection { view, connection } => {
                let id = if source {
                    &connection.source
                } else {
                    &connection.target
                };
                view.node(id).map(|node| Self::node(self.model, view, node))
            }
            _ => None,
        }
    }

    /// Direct children when the subject is a container (a view or a node)
    pub fn children(&self) -> Option<Vec<Subject<'a>>> {
        let (view, nodes) = match self.target {
            Target::View(view) => (view, &view.children),
            Target::Node { view, node } => (view, &node.children),
            _ => return None,
        };
        Some(
            nodes
                .iter()
                .map(|node| Self::node(self.model, view, node))
                .collect(),
        )
    }
}

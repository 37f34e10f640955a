//! Diagram views
//!
//! A view holds a tree of diagram nodes (each optionally referencing an
//! element) and a flat list of connections (each referencing a relationship
//! and linking two nodes).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::concept::Property;

/// A diagram view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub children: Vec<DiagramNode>,
    #[serde(default)]
    pub connections: Vec<DiagramConnection>,
}

/// A box on a diagram, possibly nesting other boxes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramNode {
    pub id: String,
    /// Element shown by this node; `None` for groups and notes
    #[serde(default)]
    pub element: Option<String>,
    /// Label of nodes that do not reference an element
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub children: Vec<DiagramNode>,
}

/// A line on a diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramConnection {
    pub id: String,
    pub relationship: String,
    /// Source node identifier
    pub source: String,
    /// Target node identifier
    pub target: String,
}

impl View {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            documentation: String::new(),
            properties: Vec::new(),
            children: Vec::new(),
            connections: Vec::new(),
        }
    }

    /// Find a node anywhere in the node tree
    pub fn node(&self, id: &str) -> Option<&DiagramNode> {
        self.children.iter().find_map(|n| n.find(id))
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut DiagramNode> {
        self.children.iter_mut().find_map(|n| n.find_mut(id))
    }

    pub fn connection(&self, id: &str) -> Option<&DiagramConnection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Whether any node or connection of this view shows `concept`
    pub fn references(&self, concept: &str) -> bool {
        self.children.iter().any(|n| n.references(concept))
            || self.connections.iter().any(|c| c.relationship == concept)
    }

    /// Remove every node showing `concept` (with its nested nodes) and every
    /// connection that shows `concept` or touches a removed node.
    ///
    /// Returns the number of diagram components removed.
    pub fn detach(&mut self, concept: &str) -> usize {
        let mut removed_nodes = Vec::new();
        prune(&mut self.children, concept, &mut removed_nodes);

        let before = self.connections.len();
        self.connections.retain(|c| {
            c.relationship != concept
                && !removed_nodes.contains(&c.source)
                && !removed_nodes.contains(&c.target)
        });
        removed_nodes.len() + (before - self.connections.len())
    }
}

fn prune(nodes: &mut Vec<DiagramNode>, concept: &str, removed: &mut Vec<String>) {
    nodes.retain(|n| {
        if n.element.as_deref() == Some(concept) {
            n.collect_ids(removed);
            false
        } else {
            true
        }
    });
    for node in nodes.iter_mut() {
        prune(&mut node.children, concept, removed);
    }
}

impl DiagramNode {
    pub fn new(element: Option<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            element,
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&DiagramNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|n| n.find(id))
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut DiagramNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|n| n.find_mut(id))
    }

    fn references(&self, concept: &str) -> bool {
        self.element.as_deref() == Some(concept) || self.children.iter().any(|n| n.references(concept))
    }

    fn collect_ids(&self, into: &mut Vec<String>) {
        into.push(self.id.clone());
        for child in &self.children {
            child.collect_ids(into);
        }
    }
}

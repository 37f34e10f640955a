//! Concepts (elements and relationships) and the type catalog
//!
//! Type names follow the ArchiMate 3.x class names (`Node`, `BusinessActor`,
//! `ServingRelationship`, ...). Lookups through [`canonical_type`] are
//! case-insensitive and always return the catalog spelling.

use serde::{Deserialize, Serialize};

/// Architecture layer an element type belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Strategy,
    Business,
    Application,
    Technology,
    Motivation,
    Implementation,
    Other,
}

/// Structural aspect of an element type, used by relationship validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aspect {
    ActiveStructure,
    Behavior,
    PassiveStructure,
    Motivation,
    Composite,
}

use Aspect::{ActiveStructure, Behavior, Composite, PassiveStructure};
use Layer::{Application, Business, Implementation, Other, Strategy, Technology};

const ELEMENT_TYPES: &[(&str, Layer, Aspect)] = &[
    ("Resource", Strategy, PassiveStructure),
    ("Capability", Strategy, Behavior),
    ("ValueStream", Strategy, Behavior),
    ("CourseOfAction", Strategy, Behavior),
    ("BusinessActor", Business, ActiveStructure),
    ("BusinessRole", Business, ActiveStructure),
    ("BusinessCollaboration", Business, ActiveStructure),
    ("BusinessInterface", Business, ActiveStructure),
    ("BusinessProcess", Business, Behavior),
    ("BusinessFunction", Business, Behavior),
    ("BusinessInteraction", Business, Behavior),
    ("BusinessEvent", Business, Behavior),
    ("BusinessService", Business, Behavior),
    ("BusinessObject", Business, PassiveStructure),
    ("Contract", Business, PassiveStructure),
    ("Representation", Business, PassiveStructure),
    ("Product", Business, Composite),
    ("ApplicationComponent", Application, ActiveStructure),
    ("ApplicationCollaboration", Application, ActiveStructure),
    ("ApplicationInterface", Application, ActiveStructure),
    ("ApplicationFunction", Application, Behavior),
    ("ApplicationInteraction", Application, Behavior),
    ("ApplicationProcess", Application, Behavior),
    ("ApplicationEvent", Application, Behavior),
    ("ApplicationService", Application, Behavior),
    ("DataObject", Application, PassiveStructure),
    ("Node", Technology, ActiveStructure),
    ("Device", Technology, ActiveStructure),
    ("SystemSoftware", Technology, ActiveStructure),
    ("TechnologyCollaboration", Technology, ActiveStructure),
    ("TechnologyInterface", Technology, ActiveStructure),
    ("Path", Technology, ActiveStructure),
    ("CommunicationNetwork", Technology, ActiveStructure),
    ("TechnologyFunction", Technology, Behavior),
    ("TechnologyProcess", Technology, Behavior),
    ("TechnologyInteraction", Technology, Behavior),
    ("TechnologyEvent", Technology, Behavior),
    ("TechnologyService", Technology, Behavior),
    ("Artifact", Technology, PassiveStructure),
    ("Equipment", Technology, ActiveStructure),
    ("Facility", Technology, ActiveStructure),
    ("DistributionNetwork", Technology, ActiveStructure),
    ("Material", Technology, PassiveStructure),
    ("Stakeholder", Layer::Motivation, Aspect::Motivation),
    ("Driver", Layer::Motivation, Aspect::Motivation),
    ("Assessment", Layer::Motivation, Aspect::Motivation),
    ("Goal", Layer::Motivation, Aspect::Motivation),
    ("Outcome", Layer::Motivation, Aspect::Motivation),
    ("Principle", Layer::Motivation, Aspect::Motivation),
    ("Requirement", Layer::Motivation, Aspect::Motivation),
    ("Constraint", Layer::Motivation, Aspect::Motivation),
    ("Meaning", Layer::Motivation, Aspect::Motivation),
    ("Value", Layer::Motivation, Aspect::Motivation),
    ("WorkPackage", Implementation, Behavior),
    ("Deliverable", Implementation, PassiveStructure),
    ("ImplementationEvent", Implementation, Behavior),
    ("Plateau", Implementation, Composite),
    ("Gap", Implementation, PassiveStructure),
    ("Location", Other, Composite),
    ("Grouping", Other, Composite),
    ("Junction", Other, Composite),
];

/// All relationship type names known to the catalog
pub const RELATIONSHIP_TYPES: &[&str] = &[
    "CompositionRelationship",
    "AggregationRelationship",
    "AssignmentRelationship",
    "RealizationRelationship",
    "ServingRelationship",
    "AccessRelationship",
    "InfluenceRelationship",
    "TriggeringRelationship",
    "FlowRelationship",
    "SpecializationRelationship",
    "AssociationRelationship",
];

/// Returns the catalog spelling of an element or relationship type name.
pub fn canonical_type(name: &str) -> Option<&'static str> {
    ELEMENT_TYPES
        .iter()
        .map(|(n, _, _)| *n)
        .chain(RELATIONSHIP_TYPES.iter().copied())
        .find(|n| n.eq_ignore_ascii_case(name))
}

/// Layer and aspect of an element type, `None` for relationships and unknown names.
pub fn element_type(name: &str) -> Option<(Layer, Aspect)> {
    ELEMENT_TYPES
        .iter()
        .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, layer, aspect)| (*layer, *aspect))
}

/// Whether `name` is a relationship type
pub fn is_relationship_type(name: &str) -> bool {
    RELATIONSHIP_TYPES.iter().any(|n| n.eq_ignore_ascii_case(name))
}

/// Whether `name` is an element type
pub fn is_element_type(name: &str) -> bool {
    element_type(name).is_some()
}

/// Checks that a relationship of type `relationship` may connect an element of
/// type `source` to an element of type `target`.
///
/// The rules are a condensed form of the ArchiMate relationship table, keyed
/// on the structural aspect of both ends.
pub fn is_valid_relationship(source: &str, target: &str, relationship: &str) -> bool {
    let Some(relationship) = canonical_type(relationship).filter(|r| is_relationship_type(r)) else {
        return false;
    };
    let (Some((_, s)), Some((_, t))) = (element_type(source), element_type(target)) else {
        // relationship-to-relationship links only allow associations
        return relationship == "AssociationRelationship"
            && canonical_type(source).is_some()
            && canonical_type(target).is_some();
    };
    let acting = |a: Aspect| matches!(a, ActiveStructure | Behavior);

    match relationship {
        "AssociationRelationship" => true,
        "SpecializationRelationship" => source.eq_ignore_ascii_case(target),
        "CompositionRelationship" | "AggregationRelationship" => s == t || s == Composite,
        "AssignmentRelationship" => s == ActiveStructure && acting(t),
        "RealizationRelationship" => {
            if s == Aspect::Motivation {
                t == Aspect::Motivation
            } else {
                matches!(t, Behavior | PassiveStructure | Aspect::Motivation | Composite)
            }
        }
        "ServingRelationship" | "TriggeringRelationship" | "FlowRelationship" => {
            acting(s) && acting(t)
        }
        "AccessRelationship" => acting(s) && t == PassiveStructure,
        "InfluenceRelationship" => t == Aspect::Motivation,
        _ => false,
    }
}

/// A key/value property attached to a concept, view, folder or model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: String,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Distinguishes elements from relationships
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptKind {
    Element,
    Relationship { source: String, target: String },
}

/// An element or relationship of the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub id: String,
    /// Catalog type name, e.g. `Node` or `ServingRelationship`
    pub class: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    pub kind: ConceptKind,
}

impl Concept {
    /// Whether this concept is a relationship
    pub fn is_relationship(&self) -> bool {
        matches!(self.kind, ConceptKind::Relationship { .. })
    }

    /// Value of the first property named `key`
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Source and target identifiers when this is a relationship
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        match &self.kind {
            ConceptKind::Element => None,
            ConceptKind::Relationship { source, target } => Some((source, target)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn canonical_type_ignores_case() {
        assert_eq!(canonical_type("node"), Some("Node"));
        assert_eq!(canonical_type("servingrelationship"), Some("ServingRelationship"));
        assert_eq!(canonical_type("Mainframe"), None);
    }

    #[rstest]
    #[case("Node", "SystemSoftware", "AssignmentRelationship", true)]
    #[case("Node", "TechnologyService", "AssignmentRelationship", true)]
    #[case("Artifact", "Node", "AssignmentRelationship", false)]
    #[case("ApplicationComponent", "DataObject", "AccessRelationship", true)]
    #[case("DataObject", "ApplicationComponent", "AccessRelationship", false)]
    #[case("Node", "Device", "CompositionRelationship", true)]
    #[case("Location", "Node", "AggregationRelationship", true)]
    #[case("Node", "Node", "SpecializationRelationship", true)]
    #[case("Node", "Device", "SpecializationRelationship", false)]
    #[case("Goal", "Node", "AssociationRelationship", true)]
    #[case("Requirement", "Goal", "InfluenceRelationship", true)]
    #[case("Node", "Goal", "RealizationRelationship", true)]
    #[case("Goal", "Node", "RealizationRelationship", false)]
    #[case("TechnologyService", "ApplicationComponent", "ServingRelationship", true)]
    #[case("Node", "Device", "NotARelationship", false)]
    fn relationship_rules(
        #[case] source: &str,
        #[case] target: &str,
        #[case] relationship: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_valid_relationship(source, target, relationship), expected);
    }

    #[test]
    fn relationship_to_relationship_only_allows_association() {
        assert!(is_valid_relationship(
            "Node",
            "ServingRelationship",
            "AssociationRelationship"
        ));
        assert!(!is_valid_relationship(
            "Node",
            "ServingRelationship",
            "ServingRelationship"
        ));
    }

    #[test]
    fn concept_property_lookup() {
        let concept = Concept {
            id: "a".into(),
            class: "Node".into(),
            name: "srv".into(),
            documentation: String::new(),
            properties: vec![Property::new("owner", "Alice")],
            kind: ConceptKind::Element,
        };
        assert_eq!(concept.property("owner"), Some("Alice"));
        assert_eq!(concept.property("cost"), None);
        assert!(!concept.is_relationship());
    }
}

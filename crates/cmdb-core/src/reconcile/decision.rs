//! Transition tables deciding what happens to one record

use std::fmt;

use crate::mode::{ExternalStatus, ImportMode};

/// Outcome of the transition table for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Remove,
    Noop,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Update => write!(f, "update"),
            Action::Remove => write!(f, "remove"),
            Action::Noop => write!(f, "noop"),
        }
    }
}

/// Element transition: existence and lifecycle status under an import mode
pub fn decide(mode: ImportMode, exists: bool, status: ExternalStatus) -> Action {
    match (status, exists) {
        (ExternalStatus::Operational, false) if mode.allows_create() => Action::Create,
        (ExternalStatus::Operational, true) if mode.allows_update() => Action::Update,
        (ExternalStatus::NonOperational, true) if mode.allows_remove() => Action::Remove,
        _ => Action::Noop,
    }
}

/// Relationship transition. Relationships are never removed.
pub fn decide_relationship(mode: ImportMode, exists: bool) -> Action {
    match mode {
        ImportMode::RemoveOnly => Action::Noop,
        _ if !exists && mode.allows_create() => Action::Create,
        _ if exists && mode.allows_update() => Action::Update,
        _ => Action::Noop,
    }
}

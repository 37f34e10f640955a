//! Reconciliation engine
//!
//! Each record is classified by the transition tables in [`decision`], then
//! the object's attributes, properties and folder are synchronized with
//! writes only where the computed value differs from the stored one.

mod attributes;
pub mod decision;
mod element;
mod relationship;

pub use decision::{Action, decide, decide_relationship};
pub use element::reconcile_element;
pub use relationship::{reconcile_relationship, relationship_type};

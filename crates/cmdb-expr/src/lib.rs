//! Expression language of cmdb-sync mappings.
//!
//! Mapping values are classified as constants, variables or remote field
//! paths ([`FieldExpression`]) and evaluated by an [`Evaluator`], which
//! follows reference links through a per-pass [`ReferenceCache`].
//! Variables (`${name:args}`) are resolved against a model
//! [`Subject`](cmdb_model::Subject) by the [`variable`] module.

pub mod deref;
pub mod error;
pub mod evaluator;
pub mod field;
pub mod scan;
pub mod variable;

pub use deref::ReferenceCache;
pub use error::{Error, Result};
pub use evaluator::Evaluator;
pub use field::{FieldExpression, PathSegment, split_path, static_field_names};
pub use variable::{Variable, expand, get_variable};

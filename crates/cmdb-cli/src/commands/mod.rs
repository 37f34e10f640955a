//! Command implementations

mod fields;
mod init_model;
mod sync;

pub use fields::run_fields;
pub use init_model::run_init_model;
pub use sync::run_sync;

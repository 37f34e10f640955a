//! Configuration and reconciliation engine of cmdb-sync
//!
//! This crate ties the expression language and the remote collaborator to
//! the target model:
//!
//! - **Configuration**: flat key lookup with keyword → `*` → built-in fallback,
//!   extracted into typed element and relationship mappings
//! - **Reconciliation**: transition tables over import mode, existence and
//!   lifecycle status, followed by write-if-different attribute sync
//! - **Importer**: the elements pass then the relations pass, one
//!   [`BatchReport`] per table
//!
//! ```text
//!                 cmdb-cli
//!                    |
//!                cmdb-core
//!                    |
//!      +-------------+-------------+
//!      |             |             |
//!  cmdb-model    cmdb-expr    cmdb-remote
//! ```

pub mod config;
pub mod error;
pub mod importer;
pub mod mode;
pub mod progress;
pub mod reconcile;
pub mod report;

pub use config::{
    ConfigLocator, ElementMapping, RelationClass, RelationMapping, ServiceSettings, Settings,
    SyncConfig,
};
pub use error::{Error, Result};
pub use importer::Importer;
pub use mode::{ExternalStatus, ImportMode};
pub use progress::{NoProgress, Progress};
pub use reconcile::{Action, decide, decide_relationship};
pub use report::{BatchReport, RecordError, SyncReport};

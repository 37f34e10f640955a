//! Shared test utilities for the cmdb-sync workspace.
//!
//! This crate is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`fetcher`]: [`MockFetcher`] serving canned payloads and counting calls
//! - [`records`]: builders for table API payloads
//! - [`workspace`]: [`TestWorkspace`] holding config and model files

pub mod fetcher;
pub mod records;
pub mod workspace;

pub use fetcher::MockFetcher;
pub use workspace::TestWorkspace;

//! Remote inventory access for cmdb-sync.
//!
//! Builds ServiceNow table API URLs, fetches them over blocking HTTP and
//! unwraps the JSON envelopes the service answers with.

pub mod envelope;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod url;

pub use envelope::{parse_batch, parse_record};
pub use error::{Error, Result};
pub use fetcher::Fetcher;
pub use http::{Credentials, HttpFetcher, ProxyConfig};
pub use url::{DEFAULT_TABLE_API, TableUrl};

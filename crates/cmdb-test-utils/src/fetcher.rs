//! [`MockFetcher`] for tests that must not touch the network.

use std::cell::RefCell;
use std::collections::HashMap;

use cmdb_remote::{Error, Fetcher, Result};

#[derive(Debug, Clone)]
enum Matcher {
    Exact(String),
    Prefix(String),
}

impl Matcher {
    fn matches(&self, url: &str) -> bool {
        match self {
            Matcher::Exact(expected) => url == expected,
            Matcher::Prefix(prefix) => url.starts_with(prefix),
        }
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Body(String),
    Status(u16),
}

/// A [`Fetcher`] answering from a routing table and counting every call.
///
/// Exact routes win over prefix routes; later routes replace earlier ones
/// with the same matcher. Unrouted URLs fail with HTTP 404.
///
/// ```rust
/// use cmdb_remote::Fetcher;
/// use cmdb_test_utils::MockFetcher;
///
/// let fetcher = MockFetcher::new()
///     .with_prefix_route("https://x/api/now/table/cmdb_ci_server", r#"{"result":[]}"#);
/// assert!(fetcher.fetch("https://x/api/now/table/cmdb_ci_server?sysparm_limit=0").is_ok());
/// assert_eq!(fetcher.total_calls(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockFetcher {
    routes: RefCell<Vec<(Matcher, Reply)>>,
    calls: RefCell<HashMap<String, usize>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` exactly with `body`
    pub fn with_route(self, url: &str, body: &str) -> Self {
        self.set_route(url, body);
        self
    }

    /// Answer every URL starting with `prefix` with `body`
    pub fn with_prefix_route(self, prefix: &str, body: &str) -> Self {
        self.set_prefix_route(prefix, body);
        self
    }

    /// Answer URLs starting with `prefix` with an HTTP error status
    pub fn with_status(self, prefix: &str, status: u16) -> Self {
        self.insert(Matcher::Prefix(prefix.to_string()), Reply::Status(status));
        self
    }

    /// Replace or add an exact route, e.g. between two synchronization runs
    pub fn set_route(&self, url: &str, body: &str) {
        self.insert(Matcher::Exact(url.to_string()), Reply::Body(body.to_string()));
    }

    pub fn set_prefix_route(&self, prefix: &str, body: &str) {
        self.insert(Matcher::Prefix(prefix.to_string()), Reply::Body(body.to_string()));
    }

    fn insert(&self, matcher: Matcher, reply: Reply) {
        let mut routes = self.routes.borrow_mut();
        routes.retain(|(m, _)| match (m, &matcher) {
            (Matcher::Exact(a), Matcher::Exact(b)) | (Matcher::Prefix(a), Matcher::Prefix(b)) => a != b,
            _ => true,
        });
        routes.push((matcher, reply));
    }

    /// Number of fetches of exactly `url`
    pub fn calls(&self, url: &str) -> usize {
        self.calls.borrow().get(url).copied().unwrap_or(0)
    }

    /// Number of fetches of URLs starting with `prefix`
    pub fn calls_with_prefix(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(url, _)| url.starts_with(prefix))
            .map(|(_, count)| count)
            .sum()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().values().sum()
    }

    /// Every URL fetched so far, sorted
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.calls.borrow().keys().cloned().collect();
        urls.sort();
        urls
    }

    fn reply_for(&self, url: &str) -> Option<Reply> {
        let routes = self.routes.borrow();
        routes
            .iter()
            .rev()
            .find(|(m, _)| matches!(m, Matcher::Exact(_)) && m.matches(url))
            .or_else(|| routes.iter().rev().find(|(m, _)| m.matches(url)))
            .map(|(_, reply)| reply.clone())
    }
}

impl Fetcher for MockFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        *self.calls.borrow_mut().entry(url.to_string()).or_default() += 1;
        match self.reply_for(url) {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Status(status)) => Err(Error::Status {
                status,
                url: url.to_string(),
                message: "mock status".to_string(),
            }),
            None => Err(Error::Status {
                status: 404,
                url: url.to_string(),
                message: "no route".to_string(),
            }),
        }
    }
}

//! Fetch abstraction
//!
//! Everything above this crate reads remote data through [`Fetcher`], so
//! tests can substitute canned payloads for the HTTP client.

use crate::Result;

/// Blocking fetch of a URL, returning the response body
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, url: &str) -> Result<String> {
        (**self).fetch(url)
    }
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn fetch(&self, url: &str) -> Result<String> {
        (**self).fetch(url)
    }
}

//! Blocking HTTP fetcher with basic authentication and optional proxy

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

use crate::envelope;
use crate::fetcher::Fetcher;
use crate::{Error, Result};

/// Service account used for basic authentication
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"********")
            .finish()
    }
}

/// HTTP proxy settings
#[derive(Clone, Default)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .finish()
    }
}

/// [`Fetcher`] backed by a blocking reqwest client
pub struct HttpFetcher {
    client: Client,
    credentials: Credentials,
}

impl HttpFetcher {
    pub fn new(credentials: Credentials, proxy: Option<&ProxyConfig>, timeout: Duration) -> Result<Self> {
        let mut builder = Client::builder().timeout(timeout);

        if let Some(proxy) = proxy {
            tracing::debug!(?proxy, "Using HTTP proxy");
            let mut p = reqwest::Proxy::all(proxy.url())?;
            if let (Some(user), Some(password)) = (&proxy.user, &proxy.password) {
                p = p.basic_auth(user, password);
            }
            builder = builder.proxy(p);
        }

        Ok(Self {
            client: builder.build()?,
            credentials,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .basic_auth(&self.credentials.user, Some(&self.credentials.password))
            .send()?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().unwrap_or_default();
            let message = envelope::error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }

        let body = response.text()?;
        tracing::trace!(url, bytes = body.len(), "Response received");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_masks_passwords() {
        let credentials = Credentials::new("admin", "s3cret");
        let proxy = ProxyConfig {
            host: "proxy.local".into(),
            port: 3128,
            user: Some("p".into()),
            password: Some("hidden".into()),
        };
        let rendered = format!("{credentials:?} {proxy:?}");
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("hidden"));
        assert_eq!(proxy.url(), "http://proxy.local:3128");
    }

    #[test]
    fn builds_client_with_proxy() {
        let proxy = ProxyConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            ..Default::default()
        };
        let fetcher = HttpFetcher::new(
            Credentials::new("u", "p"),
            Some(&proxy),
            Duration::from_secs(5),
        );
        assert!(fetcher.is_ok());
    }
}

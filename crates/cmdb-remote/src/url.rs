//! Table API URL construction

use std::collections::BTreeSet;

use reqwest::Url;

use crate::{Error, Result};

/// Default path of the table API below the instance URL
pub const DEFAULT_TABLE_API: &str = "/api/now/table/";

/// Builder for a table API query URL
///
/// The field list is sorted and de-duplicated so the same mapping always
/// produces the same URL.
#[derive(Debug, Clone)]
pub struct TableUrl {
    base: String,
    limit: String,
    fields: BTreeSet<String>,
    query: Option<String>,
}

impl TableUrl {
    pub fn new(site: &str, table_api: &str, table: &str) -> Self {
        let api = table_api.trim_matches('/');
        let base = if api.is_empty() {
            format!("{}/{}", site.trim_end_matches('/'), table)
        } else {
            format!("{}/{}/{}", site.trim_end_matches('/'), api, table)
        };
        Self {
            base,
            limit: "0".to_string(),
            fields: BTreeSet::new(),
            query: None,
        }
    }

    /// Row limit passed through to the service (`0` means no limit)
    pub fn limit(mut self, limit: impl Into<String>) -> Self {
        self.limit = limit.into();
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Encoded query filtering the returned rows
    pub fn query(mut self, query: Option<&str>) -> Self {
        self.query = query.filter(|q| !q.is_empty()).map(str::to_string);
        self
    }

    pub fn build(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base).map_err(|e| Error::InvalidUrl {
            url: self.base.clone(),
            message: e.to_string(),
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("sysparm_exclude_reference_link", "false");
            pairs.append_pair("sysparm_limit", &self.limit);
            if !self.fields.is_empty() {
                let fields: Vec<&str> = self.fields.iter().map(String::as_str).collect();
                pairs.append_pair("sysparm_fields", &fields.join(","));
            }
            if let Some(query) = &self.query {
                pairs.append_pair("sysparm_query", query);
            }
        }
        Ok(url)
    }
}

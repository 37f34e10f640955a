//! Evaluation of field and path expressions against a remote record

use cmdb_model::Subject;
use cmdb_remote::{Fetcher, envelope};
use serde_json::Value;

use crate::deref::{ReferenceCache, link_of, render};
use crate::field::{FieldExpression, split_path};
use crate::variable;
use crate::{Error, Result};

/// Evaluates mapping expressions for one pass.
///
/// The evaluator owns the pass's [`ReferenceCache`]; build a new one for
/// every pass so link targets never leak from one record class to another.
pub struct Evaluator<'f> {
    fetcher: &'f dyn Fetcher,
    cache: ReferenceCache,
    last_failure: Option<Error>,
}

impl<'f> Evaluator<'f> {
    pub fn new(fetcher: &'f dyn Fetcher) -> Self {
        Self {
            fetcher,
            cache: ReferenceCache::new(),
            last_failure: None,
        }
    }

    pub fn cache(&self) -> &ReferenceCache {
        &self.cache
    }

    /// The most recent link that could not be followed, cleared on read
    pub fn take_dereference_error(&mut self) -> Option<Error> {
        self.last_failure.take()
    }

    /// Classify and evaluate a mapping value
    pub fn evaluate(
        &mut self,
        expr: &str,
        record: Option<&Value>,
        subject: Option<Subject<'_>>,
    ) -> Result<Option<String>> {
        self.evaluate_expression(&FieldExpression::parse(expr), record, subject)
    }

    pub fn evaluate_expression(
        &mut self,
        expr: &FieldExpression,
        record: Option<&Value>,
        subject: Option<Subject<'_>>,
    ) -> Result<Option<String>> {
        match expr {
            FieldExpression::Constant(text) => Ok(Some(text.clone())),
            FieldExpression::Variable(text) => variable::get_variable(text, subject),
            FieldExpression::FieldPath(hops) => match record {
                Some(record) => Ok(self.get_field(record, hops)),
                None => {
                    tracing::debug!(field = %expr, "No record to read the field from");
                    Ok(None)
                }
            },
        }
    }

    /// Evaluate a `/`-separated path, dropping empty segments
    pub fn evaluate_path(
        &mut self,
        path: &str,
        record: Option<&Value>,
        subject: Option<Subject<'_>>,
    ) -> Result<String> {
        let segments: Vec<String> = self
            .evaluated_segments(path, record, subject)?
            .into_iter()
            .map(|(rooted, value)| if rooted { format!("/{value}") } else { value })
            .collect();
        Ok(segments.join("/"))
    }

    /// Evaluate a path into its non-empty component values
    pub fn evaluate_path_segments(
        &mut self,
        path: &str,
        record: Option<&Value>,
        subject: Option<Subject<'_>>,
    ) -> Result<Vec<String>> {
        Ok(self
            .evaluated_segments(path, record, subject)?
            .into_iter()
            .map(|(_, value)| value)
            .collect())
    }

    fn evaluated_segments(
        &mut self,
        path: &str,
        record: Option<&Value>,
        subject: Option<Subject<'_>>,
    ) -> Result<Vec<(bool, String)>> {
        let mut values = Vec::new();
        for segment in split_path(path) {
            match self.evaluate_expression(&segment.expr, record, subject)? {
                Some(value) if !value.is_empty() => values.push((segment.rooted, value)),
                _ => tracing::trace!(segment = %segment.expr, "Empty path segment dropped"),
            }
        }
        Ok(values)
    }

    /// Walk `hops` from `record`, following a reference link between hops
    pub fn get_field(&mut self, record: &Value, hops: &[String]) -> Option<String> {
        let (first, rest) = hops.split_first()?;
        let Some(mut current) = record.get(first).cloned() else {
            tracing::debug!(field = %first, "Field not present in record");
            return None;
        };

        for (i, hop) in rest.iter().enumerate() {
            if i + 1 == rest.len() && hop == "value" {
                if let Some(value) = current.get("value") {
                    return render(value);
                }
            }

            let Some(url) = link_of(&current).map(str::to_string) else {
                tracing::debug!(field = %hop, "No reference link to follow");
                return None;
            };
            if !self.follow(&url) {
                return None;
            }
            let Some(next) = self.cache.get(&url).and_then(|linked| linked.get(hop)) else {
                tracing::debug!(field = %hop, url = %url, "Field not present in linked record");
                return None;
            };
            current = next.clone();
        }
        render(&current)
    }

    /// Make sure the record behind `url` is cached
    fn follow(&mut self, url: &str) -> bool {
        if self.cache.contains(url) {
            tracing::trace!(url, "Reference served from cache");
            return true;
        }
        if let Some(message) = self.cache.failure(url) {
            tracing::trace!(url, "Reference failed earlier in this pass");
            self.last_failure = Some(Error::Dereference {
                url: url.to_string(),
                message: message.to_string(),
            });
            return false;
        }

        self.cache.record_fetch();
        match self
            .fetcher
            .fetch(url)
            .and_then(|body| envelope::parse_record(&body))
        {
            Ok(linked) => {
                self.cache.insert(url.to_string(), linked);
                true
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Cannot follow reference link");
                self.cache.insert_failure(url.to_string(), e.to_string());
                self.last_failure = Some(Error::Dereference {
                    url: url.to_string(),
                    message: e.to_string(),
                });
                false
            }
        }
    }
}

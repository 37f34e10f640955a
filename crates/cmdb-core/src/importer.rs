//! Two-pass import: every element table, then the relationship table

use cmdb_expr::Evaluator;
use cmdb_model::Model;
use cmdb_remote::{Fetcher, parse_batch};
use serde_json::Value;

use crate::config::SyncConfig;
use crate::progress::{NoProgress, Progress};
use crate::reconcile::{reconcile_element, reconcile_relationship};
use crate::report::{BatchReport, SyncReport};
use crate::{Error, Result};

/// Runs a synchronization of a model against the inventory service.
///
/// Tables are processed one after the other; each one is fetched in full
/// and reconciled before the next fetch. Reference links are cached for the
/// duration of a pass only.
pub struct Importer<'a> {
    config: &'a SyncConfig,
    fetcher: &'a dyn Fetcher,
    progress: &'a dyn Progress,
}

impl<'a> Importer<'a> {
    pub fn new(config: &'a SyncConfig, fetcher: &'a dyn Fetcher) -> Self {
        Self {
            config,
            fetcher,
            progress: &NoProgress,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Synchronize `model`.
    ///
    /// Batch failures are reported, not returned: a failed table leaves the
    /// counters gathered so far and the run moves on to the next table.
    /// Cancellation stops the run.
    pub fn run(&self, model: &mut Model) -> SyncReport {
        let mut report = SyncReport::default();

        let mut evaluator = Evaluator::new(self.fetcher);
        for mapping in &self.config.elements {
            let (batch, cancelled) =
                self.run_batch(&mapping.table, self.config.element_url(mapping), |record, batch| {
                    reconcile_element(model, &mut evaluator, mapping, record, batch)
                });
            report.batches.push(batch);
            if cancelled {
                report.cancelled = true;
                return report;
            }
        }
        tracing::debug!(
            fetches = evaluator.cache().fetch_count(),
            cached = evaluator.cache().len(),
            "Elements pass done"
        );
        drop(evaluator);

        if self.config.relations.is_empty() {
            tracing::debug!("No relationship mapping, relations pass skipped");
            return report;
        }

        let mut evaluator = Evaluator::new(self.fetcher);
        let relations = &self.config.relations;
        let (batch, cancelled) = self.run_batch(
            &self.config.service.relations_table,
            self.config.relations_url(),
            |record, batch| reconcile_relationship(model, &mut evaluator, relations, record, batch),
        );
        report.cancelled = cancelled;
        report.batches.push(batch);
        report
    }

    /// Fetch and reconcile one table, returning its report and whether the
    /// run was cancelled
    fn run_batch<F>(&self, label: &str, url: Result<String>, each: F) -> (BatchReport, bool)
    where
        F: FnMut(&Value, &mut BatchReport) -> Result<()>,
    {
        let mut batch = BatchReport::new(label);
        let mut cancelled = false;
        self.progress.set_label(label);

        if let Err(e) = self.fill_batch(url, &mut batch, each) {
            cancelled = matches!(e, Error::Cancelled);
            tracing::error!(batch = label, error = %e, "Batch aborted");
            batch.aborted = Some(e.to_string());
        }

        tracing::info!(
            batch = label,
            received = batch.received,
            created = batch.created,
            updated = batch.updated,
            removed = batch.removed,
            errors = batch.errors.len(),
            "Batch done"
        );
        (batch, cancelled)
    }

    fn fill_batch<F>(&self, url: Result<String>, batch: &mut BatchReport, mut each: F) -> Result<()>
    where
        F: FnMut(&Value, &mut BatchReport) -> Result<()>,
    {
        if self.progress.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let url = url?;
        tracing::debug!(%url, "Fetching batch");
        let body = self.fetcher.fetch(&url)?;
        let records = parse_batch(&body)?;

        batch.received = records.len();
        self.progress.set_total(records.len());
        for record in &records {
            if self.progress.is_cancelled() {
                return Err(Error::Cancelled);
            }
            each(record, batch)?;
            self.progress.advance();
        }
        Ok(())
    }
}

//! Per-batch results returned by the importer

use std::fmt;

/// A record that was skipped because of its own content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    pub id: String,
    pub message: String,
}

/// Counters and outcome of one batch (one element table or the relationship table)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub label: String,
    /// Records received from the service
    pub received: usize,
    pub created: usize,
    /// Existing objects that needed at least one write
    pub updated: usize,
    /// Existing objects already in sync
    pub unchanged: usize,
    pub removed: usize,
    /// Records the transition table or the mapping ignored
    pub skipped: usize,
    pub errors: Vec<RecordError>,
    /// Reason the batch stopped early
    pub aborted: Option<String>,
}

impl BatchReport {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub(crate) fn record_error(&mut self, id: impl Into<String>, message: impl Into<String>) {
        self.errors.push(RecordError {
            id: id.into(),
            message: message.into(),
        });
    }

    /// Number of model mutations caused by this batch
    pub fn changes(&self) -> usize {
        self.created + self.updated + self.removed
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} received, {} created, {} updated, {} unchanged, {} removed, {} skipped",
            self.label,
            self.received,
            self.created,
            self.updated,
            self.unchanged,
            self.removed,
            self.skipped
        )?;
        if !self.errors.is_empty() {
            write!(f, ", {} errors", self.errors.len())?;
        }
        if let Some(reason) = &self.aborted {
            write!(f, " (aborted: {reason})")?;
        }
        Ok(())
    }
}

/// Result of a whole synchronization run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub batches: Vec<BatchReport>,
    pub cancelled: bool,
}

impl SyncReport {
    pub fn created(&self) -> usize {
        self.batches.iter().map(|b| b.created).sum()
    }

    pub fn updated(&self) -> usize {
        self.batches.iter().map(|b| b.updated).sum()
    }

    pub fn removed(&self) -> usize {
        self.batches.iter().map(|b| b.removed).sum()
    }

    pub fn changes(&self) -> usize {
        self.batches.iter().map(BatchReport::changes).sum()
    }

    /// Whether any batch stopped early or any record failed
    pub fn has_failures(&self) -> bool {
        self.batches
            .iter()
            .any(|b| b.is_aborted() || !b.errors.is_empty())
    }

    pub fn batch(&self, label: &str) -> Option<&BatchReport> {
        self.batches.iter().find(|b| b.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_mentions_errors_and_abort() {
        let mut report = BatchReport::new("cmdb_ci_server");
        report.received = 3;
        report.created = 1;
        assert_eq!(
            report.to_string(),
            "cmdb_ci_server: 3 received, 1 created, 0 updated, 0 unchanged, 0 removed, 0 skipped"
        );

        report.record_error("abc", "bad");
        report.aborted = Some("Synchronization cancelled".to_string());
        assert!(report.to_string().ends_with(", 1 errors (aborted: Synchronization cancelled)"));
    }

    #[test]
    fn totals_add_up() {
        let mut a = BatchReport::new("a");
        a.created = 2;
        let mut b = BatchReport::new("b");
        b.updated = 1;
        b.removed = 1;
        let report = SyncReport {
            batches: vec![a, b],
            cancelled: false,
        };
        assert_eq!(report.changes(), 4);
        assert_eq!(report.created(), 2);
        assert!(!report.has_failures());
        assert_eq!(report.batch("b").map(|b| b.removed), Some(1));
    }
}

//! Progress reporting and cancellation

/// Receives progress updates from the importer.
///
/// Implementations use interior mutability; the importer only holds a
/// shared reference.
pub trait Progress {
    /// Describe the current step
    fn set_label(&self, label: &str);

    /// Number of records in the current batch
    fn set_total(&self, total: usize);

    /// One record processed
    fn advance(&self);

    /// Checked before every record
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Progress sink that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn set_label(&self, _label: &str) {}

    fn set_total(&self, _total: usize) {}

    fn advance(&self) {}
}

//! Progress reported through the log

use std::cell::{Cell, RefCell};

use cmdb_core::Progress;

/// Logs the current table and every tenth of its records
#[derive(Debug, Default)]
pub struct LogProgress {
    label: RefCell<String>,
    total: Cell<usize>,
    done: Cell<usize>,
}

impl LogProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Progress for LogProgress {
    fn set_label(&self, label: &str) {
        *self.label.borrow_mut() = label.to_string();
        self.done.set(0);
        self.total.set(0);
        tracing::info!(table = label, "Importing");
    }

    fn set_total(&self, total: usize) {
        self.total.set(total);
        tracing::debug!(table = %self.label.borrow(), total, "Records received");
    }

    fn advance(&self) {
        let done = self.done.get() + 1;
        self.done.set(done);
        let total = self.total.get();
        let step = (total / 10).max(1);
        if done % step == 0 || done == total {
            tracing::debug!(table = %self.label.borrow(), done, total, "Progress");
        }
    }
}

use crate::storage::utils::io::IoCallback;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A minimal progress reporter that prints percentage updates to stdout.
pub struct ConsoleProgressReporter {
    label: String,
    total_bytes: Option<u64>,
    step_bytes: u64,
    processed_bytes: AtomicU64,
}

impl ConsoleProgressReporter {
    pub fn new(label: impl Into<String>, total_bytes: Option<u64>, step_bytes: u64) -> Self {
        Self {
            label: label.into(),
            total_bytes,
            step_bytes: step_bytes.max(1),
            processed_bytes: AtomicU64::new(0),
        }
    }

    /// Account for `bytes` more and print when a reporting threshold was crossed.
    pub fn advance(&self, bytes: u64) {
        let before = self.processed_bytes.fetch_add(bytes, Ordering::Relaxed);
        let after = before + bytes;
        if before / self.step_bytes != after / self.step_bytes
            || self.total_bytes.is_some_and(|total| after >= total)
        {
            self.report(after);
        }
    }

    fn report(&self, processed_bytes: u64) {
        if let Some(total) = self.total_bytes {
            if total == 0 {
                return;
            }
            let progress = ((processed_bytes as f64 / total as f64) * 100.0) as u32;
            print!("\r {}: {}%", self.label, progress.min(100));
            let _ = io::stdout().flush();
        }
    }

    /// Hook this reporter into a read or write as its io callback.
    pub fn into_callback(self: Arc<Self>) -> IoCallback {
        Arc::new(move |bytes| self.advance(bytes as u64))
    }
}

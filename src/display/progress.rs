//! Console progress reporting

use std::io::{self, Write};

use crate::services::ProgressObserver;

/// Writes one line per processed month to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgress;

impl ConsoleProgress {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressObserver for ConsoleProgress {
    fn on_month_processed(&self, month_label: &str) {
        // A closed stderr must not stop the run
        let _ = writeln!(io::stderr(), "  processed {}", month_label);
    }
}

//! Progress notification and cooperative cancellation
//!
//! Observers are called synchronously from the pipeline thread, once per
//! processed month. Implementations must return promptly; anything slow
//! (rendering, network) belongs on the other side of a channel, which is
//! what [`ChannelObserver`] provides.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Receives one notification per processed month
pub trait ProgressObserver {
    /// Fire-and-forget; the pipeline ignores whatever happens here
    fn on_month_processed(&self, month_label: &str);
}

/// Discards notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_month_processed(&self, _month_label: &str) {}
}

/// Forwards notifications over an unbounded channel
///
/// Sending never blocks, and a dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: Sender<String>,
}

impl ChannelObserver {
    pub fn new(sender: Sender<String>) -> Self {
        Self { sender }
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_month_processed(&self, month_label: &str) {
        let _ = self.sender.send(month_label.to_string());
    }
}

/// Shared flag checked between months
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop before its next month
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

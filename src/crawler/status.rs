//! One-way status reporting
//!
//! The crawl engine reports human-readable progress through a [`StatusSink`]
//! and never waits for, or reads anything back from, the observer.

use tokio::sync::mpsc::UnboundedSender;

/// Receives status messages from a crawl run
///
/// Implementations must not block; the engine calls `status` inline from the
/// crawl loop.
pub trait StatusSink {
    fn status(&self, message: &str);
}

/// Default sink: forwards every message to `tracing` at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn status(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

impl<F> StatusSink for F
where
    F: Fn(&str),
{
    fn status(&self, message: &str) {
        self(message)
    }
}

/// Channel sink; a dropped receiver silently discards messages
impl StatusSink for UnboundedSender<String> {
    fn status(&self, message: &str) {
        let _ = self.send(message.to_string());
    }
}

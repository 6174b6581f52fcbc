//! Debounced search input.
//!
//! Every keystroke restarts the quiet period; only the value that survives
//! the full period is emitted.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::debug;

/// Input buffered between keystrokes and the debouncer.
const INPUT_CAPACITY: usize = 64;

/// Receiving half of a debounced channel.
#[derive(Debug)]
pub struct Debounced<T> {
    input: mpsc::Receiver<T>,
    delay: Duration,
}

/// Create a debounced channel: send raw values into the sender, receive
/// settled values from the [`Debounced`] half.
#[must_use]
pub fn debounce<T>(delay: Duration) -> (mpsc::Sender<T>, Debounced<T>) {
    let (tx, input) = mpsc::channel(INPUT_CAPACITY);
    (tx, Debounced { input, delay })
}

impl<T> Debounced<T> {
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait for the next settled value.
    ///
    /// Returns `None` once every sender is dropped and nothing is pending.
    /// A value still pending when the senders go away is emitted right away.
    pub async fn recv(&mut self) -> Option<T> {
        let mut latest = self.input.recv().await?;
        let mut superseded = 0u32;
        loop {
            match timeout(self.delay, self.input.recv()).await {
                Ok(Some(value)) => {
                    latest = value;
                    superseded += 1;
                }
                Ok(None) | Err(_) => {
                    debug!(superseded, "Search input settled");
                    return Some(latest);
                }
            }
        }
    }
}

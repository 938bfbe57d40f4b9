//! Sensor-to-indicator mailbox.
//!
//! Each sensor/indicator pair shares one result channel backed by a tokio
//! watch channel: capacity one, latest reading wins, and the indicator side
//! never blocks. A reading the indicator has not taken yet is replaced by a
//! newer one rather than queued behind it.

use tokio::sync::watch;

use crate::data::Reading;

/// Create a connected sender/receiver pair.
///
/// # Example
///
/// ```
/// use tinydash::data::{Reading, ValueType};
/// use tinydash::sensor::result_channel;
///
/// let (tx, mut rx) = result_channel();
/// assert!(rx.try_take().is_none());
///
/// tx.publish(Reading::new(ValueType::Status, 0));
/// assert_eq!(rx.try_take(), Some(Reading::new(ValueType::Status, 0)));
/// assert!(rx.try_take().is_none());
/// ```
pub fn result_channel() -> (ResultSender, ResultReceiver) {
    let (tx, rx) = watch::channel(None);
    (ResultSender { sender: tx }, ResultReceiver { receiver: rx })
}

/// Producing half, owned by a sensor.
#[derive(Debug)]
pub struct ResultSender {
    sender: watch::Sender<Option<Reading>>,
}

impl ResultSender {
    /// Replace the pending reading. Never fails, even with no receiver left.
    pub fn publish(&self, reading: Reading) {
        self.sender.send_replace(Some(reading));
    }
}

/// Consuming half, owned by an indicator.
#[derive(Debug)]
pub struct ResultReceiver {
    receiver: watch::Receiver<Option<Reading>>,
}

impl ResultReceiver {
    /// Take the pending reading, if one arrived since the last call.
    pub fn try_take(&mut self) -> Option<Reading> {
        // Check if there's a new value without blocking
        if self.receiver.has_changed().unwrap_or(false) {
            self.receiver.borrow_and_update().clone()
        } else {
            None
        }
    }
}

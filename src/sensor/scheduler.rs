//! Sensor timers.
//!
//! Sensors never sleep themselves. They ask a [`Scheduler`] to wake them
//! after a delay, and the controller's event loop pops due timers from a
//! [`TimerQueue`] and calls back into the sensor.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

use tokio::time::Instant;

use super::SensorId;

/// Deadline used when a delay does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// "Call this sensor back after `delay`."
pub trait Scheduler {
    fn call_later(&mut self, delay: Duration, sensor: SensorId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Timer {
    deadline: Instant,
    /// Insertion order, so equal deadlines fire first-in first-out
    seq: u64,
    sensor: SensorId,
}

/// Min-heap of pending sensor timers.
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: BinaryHeap<Reverse<Timer>>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer for an absolute deadline.
    pub fn schedule_at(&mut self, deadline: Instant, sensor: SensorId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Reverse(Timer {
            deadline,
            seq,
            sensor,
        }));
    }

    /// The earliest pending deadline, if any timer is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.peek().map(|Reverse(t)| t.deadline)
    }

    /// Remove and return every sensor whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Vec<SensorId> {
        let mut due = Vec::new();
        while let Some(Reverse(timer)) = self.timers.peek() {
            if timer.deadline > now {
                break;
            }
            due.push(timer.sensor);
            self.timers.pop();
        }
        due
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl Scheduler for TimerQueue {
    fn call_later(&mut self, delay: Duration, sensor: SensorId) {
        let now = Instant::now();
        let deadline = now
            .checked_add(delay)
            .unwrap_or_else(|| now + FAR_FUTURE);
        self.schedule_at(deadline, sensor);
    }
}

/// Scheduler that only records requests, for driving sensors by hand.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingScheduler {
    pub calls: Vec<(Duration, SensorId)>,
}

#[cfg(test)]
impl Scheduler for RecordingScheduler {
    fn call_later(&mut self, delay: Duration, sensor: SensorId) {
        self.calls.push((delay, sensor));
    }
}

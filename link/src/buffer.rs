use log::{debug, warn};
use std::{collections::VecDeque, fmt::Display};

/// Result of one [`OfflineBuffer::drain_all`] pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    pub delivered: usize,
    pub requeued: usize,
}

/// Unbounded FIFO of messages that could not be delivered when produced.
#[derive(Debug)]
pub struct OfflineBuffer<M> {
    queue: VecDeque<M>,
}

impl<M> Default for OfflineBuffer<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> OfflineBuffer<M> {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Appends to the tail. Never blocks, never drops.
    pub fn push(&mut self, message: M) {
        self.queue.push_back(message);
        debug!("Offline buffer holds {} messages", self.queue.len());
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = &M> {
        self.queue.iter()
    }

    /// Pops every message present when the pass starts and hands it to `sink`.
    ///
    /// Delivered messages are discarded. A message the sink rejects goes back
    /// to the **tail**, so under repeated failure the retry order rotates.
    /// Each message is attempted at most once per pass; messages pushed by the
    /// sink itself wait for the next pass.
    pub fn drain_all<E, F>(&mut self, mut sink: F) -> DrainReport
    where
        E: Display,
        F: FnMut(&M) -> Result<(), E>,
    {
        let mut report = DrainReport::default();
        let pending = self.queue.len();

        for _ in 0..pending {
            let Some(message) = self.queue.pop_front() else {
                break;
            };

            match sink(&message) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!("Failed to send buffered message: {}", e);
                    self.queue.push_back(message);
                    report.requeued += 1;
                }
            }
        }

        debug!(
            "Drained {} buffered messages, {} left",
            report.delivered,
            self.queue.len()
        );
        report
    }
}

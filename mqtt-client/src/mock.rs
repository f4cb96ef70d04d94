use crate::{Transport, TransportError};
use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// In-memory [`Transport`] that records every request.
#[derive(Default)]
pub struct MockTransport {
    connected: AtomicBool,
    failures: AtomicUsize,
    published: Mutex<Vec<(String, String)>>,
    subscriptions: Mutex<Vec<String>>,
    subscribe_calls: AtomicUsize,
    unsubscribe_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected() -> Self {
        let mock = Self::default();
        mock.set_connected(true);
        mock
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Makes the next `n` publishes fail with [`TransportError::Rejected`].
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }

    /// Returns and clears everything published so far.
    pub fn take_published(&self) -> Vec<(String, String)> {
        std::mem::take(&mut *self.published.lock().unwrap())
    }

    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.subscriptions.lock().unwrap().iter().any(|t| t == topic)
    }

    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.unsubscribe_calls.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        let pending = self.failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.failures.store(pending - 1, Ordering::SeqCst);
            return Err(TransportError::Rejected("mock failure".to_string()));
        }

        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.to_string()));
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> Result<(), TransportError> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let mut subs = self.subscriptions.lock().unwrap();
        if !subs.iter().any(|t| t == topic) {
            subs.push(topic.to_string());
        }
        Ok(())
    }

    fn unsubscribe(&self, topic: &str) -> Result<(), TransportError> {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        self.subscriptions.lock().unwrap().retain(|t| t != topic);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fails_requested_publishes() {
        let mock = MockTransport::connected();
        mock.fail_next(2);

        assert!(mock.publish("t", "a").is_err());
        assert!(mock.publish("t", "b").is_err());
        assert!(mock.publish("t", "c").is_ok());
        assert_eq!(mock.published(), vec![("t".to_string(), "c".to_string())]);
    }

    #[test]
    fn test_mock_disconnected() {
        let mock = MockTransport::new();
        assert_eq!(mock.publish("t", "a"), Err(TransportError::NotConnected));
    }
}

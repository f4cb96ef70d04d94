pub mod client;
pub mod mock;
pub mod pump;

use thiserror::Error;

/// Events produced by the broker connection, in the order they happen.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The broker accepted the connection.
    Connected,
    /// The broker answered the connect with a refusal code.
    ConnectionRefused { reason: String },
    /// The connection dropped or could not be established.
    Disconnected { reason: String },
    /// A QoS 1 publish was acknowledged by the broker.
    Acknowledged { pkid: u16 },
    /// A message arrived on one of the subscribed topics.
    Message { topic: String, payload: Vec<u8> },
}

#[derive(Debug, Error, PartialEq)]
pub enum TransportError {
    #[error("not connected to the broker")]
    NotConnected,
    #[error("request rejected by the client: {0}")]
    Rejected(String),
}

/// Minimal publish/subscribe surface used by the agents.
///
/// Every call is non-blocking: requests are queued for the event loop and a
/// successful return only means the request was accepted.
pub trait Transport: Send + Sync {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError>;

    fn subscribe(&self, topic: &str) -> Result<(), TransportError>;

    fn unsubscribe(&self, topic: &str) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool;
}

use crate::{Transport, TransportError, pump::EventPump};
use log::debug;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use uuid::Uuid;

/// Capacity of the request queue between the client and its event loop.
const REQUEST_CAPACITY: usize = 64;

/// [`Transport`] backed by a rumqttc client.
///
/// The connected flag is owned by the paired [`EventPump`], which is the only
/// place that sees connection state changes.
#[derive(Clone)]
pub struct MqttTransport {
    client: AsyncClient,
    connected: Arc<AtomicBool>,
}

impl MqttTransport {
    pub fn new(
        host: &str,
        port: u16,
        keep_alive: Duration,
        client_prefix: &str,
        reconnect_delay: Duration,
    ) -> (Self, EventPump) {
        let client_id = format!("{}-{}", client_prefix, Uuid::new_v4());
        let mut options = MqttOptions::new(client_id, host, port);
        options.set_keep_alive(keep_alive);

        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));

        let pump = EventPump::new(client.clone(), eventloop, connected.clone(), reconnect_delay);

        (Self { client, connected }, pump)
    }
}

impl Transport for MqttTransport {
    fn publish(&self, topic: &str, payload: &str) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }

        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload.as_bytes().to_vec())
            .map_err(|e| TransportError::Rejected(e.to_string()))?;

        debug!("Published message {} to topic: {}", payload, topic);
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> Result<(), TransportError> {
        self.client
            .try_subscribe(topic, QoS::AtLeastOnce)
            .map_err(|e| TransportError::Rejected(e.to_string()))
    }

    fn unsubscribe(&self, topic: &str) -> Result<(), TransportError> {
        self.client
            .try_unsubscribe(topic)
            .map_err(|e| TransportError::Rejected(e.to_string()))
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

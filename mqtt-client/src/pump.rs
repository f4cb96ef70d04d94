use crate::TransportEvent;
use log::{debug, info, warn};
use rumqttc::{
    AsyncClient, ConnectReturnCode, ConnectionError,
    Event::{self, Incoming, Outgoing},
    EventLoop, Packet,
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::{mpsc::UnboundedSender, watch};

/// Resolves once `shutdown` holds `true` or its sender has been dropped.
pub async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Drives the rumqttc event loop and turns its notifications into
/// [`TransportEvent`]s for the agent's handler task.
pub struct EventPump {
    client: AsyncClient,
    eventloop: EventLoop,
    connected: Arc<AtomicBool>,
    reconnect_delay: Duration,
}

impl EventPump {
    pub(crate) fn new(
        client: AsyncClient,
        eventloop: EventLoop,
        connected: Arc<AtomicBool>,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            client,
            eventloop,
            connected,
            reconnect_delay,
        }
    }

    /// Polls the connection until `shutdown` flips to true or its sender is
    /// dropped, then disconnects from the broker.
    pub async fn run(
        &mut self,
        events: UnboundedSender<TransportEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            let polled = tokio::select! {
                _ = shutdown_requested(&mut shutdown) => {
                    info!("EventPump: shutdown signal received");
                    break;
                }
                event = self.eventloop.poll() => event,
            };

            let (translated, failed) = match polled {
                Ok(notif) => (self.translate(notif), false),
                Err(e) => (self.translate_error(e), true),
            };

            if let Some(event) = translated {
                if events.send(event).is_err() {
                    warn!("EventPump: handler is gone, stopping");
                    break;
                }
            }

            if failed {
                // rumqttc reconnects on the next poll
                tokio::select! {
                    _ = shutdown_requested(&mut shutdown) => {
                        info!("EventPump: shutdown signal received during back-off");
                        break;
                    }
                    _ = tokio::time::sleep(self.reconnect_delay) => {}
                }
            }
        }

        self.connected.store(false, Ordering::Release);
        if let Err(e) = self.client.disconnect().await {
            warn!("Error disconnecting MQTT client: {:?}", e);
        }
    }

    fn translate(&self, event: Event) -> Option<TransportEvent> {
        match event {
            Incoming(Packet::ConnAck(ack)) => {
                if ack.code == ConnectReturnCode::Success {
                    info!("Connected to MQTT broker");
                    self.connected.store(true, Ordering::Release);
                    Some(TransportEvent::Connected)
                } else {
                    self.connected.store(false, Ordering::Release);
                    Some(TransportEvent::ConnectionRefused {
                        reason: format!("{:?}", ack.code),
                    })
                }
            }
            Incoming(Packet::Publish(msg)) => {
                debug!("Message received on {}", msg.topic);
                Some(TransportEvent::Message {
                    topic: msg.topic,
                    payload: msg.payload.to_vec(),
                })
            }
            Incoming(Packet::PubAck(ack)) => Some(TransportEvent::Acknowledged { pkid: ack.pkid }),
            Incoming(Packet::Disconnect) => {
                self.connected.store(false, Ordering::Release);
                Some(TransportEvent::Disconnected {
                    reason: "broker sent disconnect".to_string(),
                })
            }
            Incoming(pk) => {
                debug!("Incoming event: {:?}", pk);
                None
            }
            Outgoing(ev) => {
                debug!("Outgoing event: {:?}", ev);
                None
            }
        }
    }

    fn translate_error(&self, error: ConnectionError) -> Option<TransportEvent> {
        let was_connected = self.connected.swap(false, Ordering::AcqRel);

        match error {
            ConnectionError::ConnectionRefused(code) => {
                warn!("Broker refused connection: {:?}", code);
                Some(TransportEvent::ConnectionRefused {
                    reason: format!("{:?}", code),
                })
            }
            e if was_connected => Some(TransportEvent::Disconnected {
                reason: e.to_string(),
            }),
            e => {
                debug!("Connection error in poll: {:?}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Transport, client::MqttTransport};
    use rumqttc::{ConnAck, PubAck, Publish, QoS};
    use std::{io, time::Duration};

    fn pump_with_delay(reconnect_delay: Duration) -> (MqttTransport, EventPump) {
        MqttTransport::new("127.0.0.1", 1, Duration::from_secs(5), "test", reconnect_delay)
    }

    fn pump() -> (MqttTransport, EventPump) {
        pump_with_delay(Duration::from_millis(10))
    }

    fn connack(code: ConnectReturnCode) -> Event {
        Incoming(Packet::ConnAck(ConnAck::new(code, false)))
    }

    fn io_error() -> ConnectionError {
        ConnectionError::Io(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
    }

    #[tokio::test]
    async fn test_connack_success_marks_connected() {
        let (transport, pump) = pump();
        assert!(!transport.is_connected());

        let event = pump.translate(connack(ConnectReturnCode::Success));

        assert_eq!(event, Some(TransportEvent::Connected));
        assert!(transport.is_connected());
    }

    #[tokio::test]
    async fn test_connack_refusal_clears_connected() {
        let (transport, pump) = pump();
        pump.translate(connack(ConnectReturnCode::Success));

        let event = pump.translate(connack(ConnectReturnCode::NotAuthorized));

        assert_eq!(
            event,
            Some(TransportEvent::ConnectionRefused {
                reason: "NotAuthorized".to_string()
            })
        );
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_broker_disconnect_clears_connected() {
        let (transport, pump) = pump();
        pump.translate(connack(ConnectReturnCode::Success));

        let event = pump.translate(Incoming(Packet::Disconnect));

        assert!(matches!(event, Some(TransportEvent::Disconnected { .. })));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_publish_becomes_message() {
        let (transport, pump) = pump();
        let publish = Publish::new("edge/telemetry", QoS::AtLeastOnce, b"{\"cpu_temp\":1}".to_vec());

        let event = pump.translate(Incoming(Packet::Publish(publish)));

        assert_eq!(
            event,
            Some(TransportEvent::Message {
                topic: "edge/telemetry".to_string(),
                payload: b"{\"cpu_temp\":1}".to_vec(),
            })
        );
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_puback_and_other_packets() {
        let (_transport, pump) = pump();

        assert_eq!(
            pump.translate(Incoming(Packet::PubAck(PubAck::new(7)))),
            Some(TransportEvent::Acknowledged { pkid: 7 })
        );
        assert_eq!(pump.translate(Incoming(Packet::PingResp)), None);
    }

    #[tokio::test]
    async fn test_refused_error_is_reported() {
        let (transport, pump) = pump();

        let event = pump.translate_error(ConnectionError::ConnectionRefused(
            ConnectReturnCode::BadUserNamePassword,
        ));

        assert_eq!(
            event,
            Some(TransportEvent::ConnectionRefused {
                reason: "BadUserNamePassword".to_string()
            })
        );
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_io_error_while_connected_is_a_disconnect() {
        let (transport, pump) = pump();
        pump.translate(connack(ConnectReturnCode::Success));

        let event = pump.translate_error(io_error());

        assert!(matches!(event, Some(TransportEvent::Disconnected { .. })));
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_io_error_while_disconnected_is_silent() {
        let (transport, pump) = pump();

        assert_eq!(pump.translate_error(io_error()), None);
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_reconnect_backoff() {
        // nothing listens on port 1, so every poll fails and backs off
        let (transport, mut pump) = pump_with_delay(Duration::from_secs(600));
        let (events_tx, _events_rx) = tokio::sync::mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move { pump.run(events_tx, shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("pump kept sleeping after shutdown")
            .unwrap();
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_shutdown_on_signal() {
        let (tx, mut rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tx.send(true).unwrap();
            // keep the sender alive so only the value can wake the receiver
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        tokio::time::timeout(Duration::from_secs(5), shutdown_requested(&mut rx))
            .await
            .expect("shutdown was not observed");
    }

    #[tokio::test]
    async fn test_shutdown_when_sender_dropped() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);

        tokio::time::timeout(Duration::from_secs(5), shutdown_requested(&mut rx))
            .await
            .expect("closed channel should count as shutdown");
    }

    #[tokio::test]
    async fn test_no_shutdown_while_false() {
        let (_tx, mut rx) = watch::channel(false);

        let waited =
            tokio::time::timeout(Duration::from_millis(20), shutdown_requested(&mut rx)).await;
        assert!(waited.is_err());
    }
}

use std::time::Duration;

use mqtt_client::{Transport, TransportEvent, client::MqttTransport};
use tokio::sync::{mpsc, watch};

/// Subscribes to every agent topic on a local broker and prints what flows by.
#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("Running mqtt with broker localhost:1883");
    let (transport, mut pump) = MqttTransport::new(
        "127.0.0.1",
        1883,
        Duration::from_secs(30),
        "echo",
        Duration::from_secs(1),
    );

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move { pump.run(events_tx, shutdown_rx).await });

    while let Some(event) = events_rx.recv().await {
        match event {
            TransportEvent::Connected => {
                let _ = transport.subscribe("environment/#");
            }
            TransportEvent::Message { topic, payload } => {
                println!("{}: {}", topic, String::from_utf8_lossy(&payload));
            }
            other => println!("{:?}", other),
        }
    }
}

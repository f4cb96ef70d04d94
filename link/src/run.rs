//! The two execution contexts of an agent.

use crate::{link::Link, peer::Peer};
use log::{error, info};
use mqtt_client::{Transport, TransportEvent, pump::EventPump, pump::shutdown_requested};
use std::sync::Arc;
use telemetry::unix_now;
use tokio::{
    sync::{mpsc, watch},
    time::MissedTickBehavior,
};

/// Ticks the producer at a fixed rate until shutdown.
///
/// Ticks missed while a previous one overran are skipped, not caught up.
pub async fn run_cadence<P: Peer, T: Transport>(
    link: Arc<Link<P, T>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let cadence = link.config().cadence;
    if cadence.is_zero() {
        error!("Producer loop: cadence must be non-zero, not starting");
        return;
    }
    let mut interval = tokio::time::interval(cadence);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_requested(&mut shutdown) => {
                info!("Producer loop: shutdown signal received");
                break;
            }
            _ = interval.tick() => {
                let outcome = link.tick(unix_now());
                info!("Tick: {:?}, {} buffered", outcome, link.buffered());
            }
        }
    }
}

/// Feeds transport events to the link until shutdown or the pump goes away.
pub async fn run_handler<P: Peer, T: Transport>(
    link: Arc<Link<P, T>>,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown_requested(&mut shutdown) => {
                info!("Handler: shutdown signal received");
                break;
            }
            event = events.recv() => {
                match event {
                    Some(event) => link.handle(event, unix_now()),
                    None => break,
                }
            }
        }
    }
}

/// Runs the event pump, the handler and the producer loop of one agent until
/// `shutdown` fires.
pub async fn serve<P, T>(link: Arc<Link<P, T>>, mut pump: EventPump, shutdown: watch::Receiver<bool>)
where
    P: Peer + 'static,
    T: Transport + 'static,
{
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let pump_shutdown = shutdown.clone();
    let pump_handle = tokio::spawn(async move { pump.run(events_tx, pump_shutdown).await });
    let handler_handle = tokio::spawn(run_handler(link.clone(), events_rx, shutdown.clone()));
    let cadence_handle = tokio::spawn(run_cadence(link.clone(), shutdown));

    let (pump, handler, cadence) = tokio::join!(pump_handle, handler_handle, cadence_handle);
    for result in [pump, handler, cadence] {
        if let Err(e) = result {
            error!("Agent task failed: {}", e);
        }
    }

    if link.buffered() > 0 {
        info!("Stopping with {} undelivered messages", link.buffered());
    }
}

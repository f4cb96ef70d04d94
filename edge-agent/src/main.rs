use anyhow::Context;
use clap::Parser;
use edge_agent::{EdgePeer, config::Config};
use link::{Link, LinkConfig};
use log::{error, info};
use mqtt_client::client::MqttTransport;
use std::sync::Arc;
use tokio::sync::watch;

/// Edge agent: publishes telemetry and applies tuning recommendations
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file (TOML, extension optional)
    #[arg(short, long, default_value = "edge-agent/config")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();
    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config))?;

    info!("Loaded configuration:");
    info!("  MQTT: {}:{}", config.mqtt.host, config.mqtt.port);
    info!(
        "  Cadence: {}s, staleness multiplier {}",
        config.link.cadence_seconds, config.link.staleness_multiplier
    );

    let (transport, pump) = MqttTransport::new(
        &config.mqtt.host,
        config.mqtt.port,
        config.mqtt.keep_alive(),
        &config.mqtt.client_prefix,
        config.mqtt.reconnect_delay(),
    );

    let link = Arc::new(Link::new(
        EdgePeer::new(),
        Arc::new(transport),
        LinkConfig::try_from(&config.link)?,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Could not listen for ctrl-c: {}", e);
        }
        let _ = shutdown_tx.send(true);
    });

    link::run::serve(link, pump, shutdown_rx).await;
    info!("Edge agent stopped");
    Ok(())
}

//! # Catering Dispatch
//!
//! Interactive front end for the dispatch system. Reads one command per line:
//!
//! - `<order_name> <seconds>` queues an order that becomes ready after `seconds`
//! - `status` prints the provider counters and archive size
//! - `quit`, EOF or Ctrl-C shuts down
//!
//! Configuration comes from the TOML file named by `CATERING_CONFIG` (when it exists)
//! plus `CATERING_*` environment overrides.

use catering_dispatch::config::{load_config, load_config_from_env, DispatchConfig};
use catering_dispatch::events::DeliveryEvent;
use catering_dispatch::input::{parse_command, Command, InputError, USAGE_HINT};
use catering_dispatch::lifecycle::DispatchSystem;
use catering_dispatch::model::{DeliveryStatus, ProviderTag};
use chrono::Local;
use dispatch_framework::tracing::setup_tracing;
use dispatch_framework::EventEnvelope;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

const CONFIG_PATH_VAR: &str = "CATERING_CONFIG";

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = config()?;
    info!(?config, "Starting catering dispatch");

    let system = DispatchSystem::new(config).map_err(|e| e.to_string())?;
    let printer = tokio::spawn(print_deliveries(system.subscribe()));

    println!("{USAGE_HINT}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!(error = %e, "Failed to read stdin");
                break;
            }
        };

        match parse_command(&line) {
            Ok(Command::Submit { name, delay }) => {
                if let Err(e) = system.order_client.add_order(&name, delay) {
                    error!(error = %e, "Order rejected");
                }
            }
            Ok(Command::Status) => print_status(&system),
            Ok(Command::Quit) => break,
            Err(InputError::Empty) => continue,
            Err(e) => {
                warn!(error = %e, "Malformed input");
                println!("{USAGE_HINT}");
            }
        }
    }

    println!("Exiting...");
    let report = system.shutdown().await.map_err(|e| e.to_string())?;
    printer.abort();
    info!(?report, "Application completed successfully");
    Ok(())
}

fn config() -> Result<DispatchConfig, String> {
    let loaded = match std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from) {
        Some(path) if path.exists() => load_config(&path),
        _ => load_config_from_env(),
    };
    loaded.map_err(|e| e.to_string())
}

fn print_status(system: &DispatchSystem) {
    let snapshot = system.state().snapshot();
    let providers: Vec<String> = ProviderTag::ALL
        .iter()
        .map(|p| format!("{p}={}", snapshot.counter(*p)))
        .collect();
    println!(
        "pending={} ongoing=[{}] finished={} abandoned={} archived={}",
        system.order_client.pending(),
        providers.join(" "),
        snapshot.count_with_status(DeliveryStatus::Finished),
        snapshot.count_with_status(DeliveryStatus::Abandoned),
        snapshot.archive.len(),
    );
}

async fn print_deliveries(mut rx: broadcast::Receiver<EventEnvelope<DeliveryEvent>>) {
    loop {
        match rx.recv().await {
            Ok(envelope) => {
                let at = envelope
                    .timestamp
                    .with_timezone(&Local)
                    .format("%H:%M:%S%.3f");
                match envelope.event {
                    DeliveryEvent::ShippingStarted { name, provider, .. } => {
                        println!("[{at}] {name} shipped with {provider}");
                    }
                    DeliveryEvent::Delivered { name, provider, .. } => {
                        println!("[{at}] {name} delivered by {provider}");
                    }
                    _ => {}
                }
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Delivery printer lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}

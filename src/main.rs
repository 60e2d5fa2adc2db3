//! Impulse GW - Rust implementation
//!
//! Gateway reconciling momentary impulse relays with host-side virtual
//! toggles. The binary wires the reconciliation engine to the bundled
//! simulated host and exposes an interactive REPL for driving it.

use anyhow::Result;
use clap::Parser;
use colored::*;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use impulse_gw::cli;
use impulse_gw::config::AppConfig;
use impulse_gw::engine::Engine;
use impulse_gw::hosts::SimHost;
use impulse_gw::registry::ChannelRegistry;

/// Impulse Gateway - reconcile impulse relay channels with virtual toggles
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Print the channel table and exit
    #[arg(long)]
    list_channels: bool,

    /// Run the simulation without the REPL (until Ctrl+C)
    #[arg(long)]
    headless: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("Starting Impulse GW...");
    info!("Configuration file: {}", args.config);

    let config = AppConfig::load(&args.config).await?;
    let registry = Arc::new(ChannelRegistry::from_config(&config)?);
    info!("Configuration loaded successfully");

    if args.list_channels {
        list_channels(&registry);
        return Ok(());
    }

    // Wire the simulated device to the engine
    let host = Arc::new(SimHost::from_registry(&registry));
    let handle = Engine::spawn(registry.clone(), host.clone(), config.timing);
    host.set_event_sink(handle.clone());
    info!("Engine started");

    if args.headless {
        shutdown_signal().await;
    } else {
        cli::run_repl(registry, host, handle.clone()).await?;
    }

    handle.shutdown();
    info!("Impulse GW shutdown complete");
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Shutdown signal received");
}

fn list_channels(registry: &ChannelRegistry) {
    println!("\n{}", "=== Configured Channels ===".bold().cyan());
    for channel in registry.all_channels() {
        let state = if channel.enabled {
            "enabled".green()
        } else {
            "disabled".yellow()
        };
        println!(
            "  {} (input:{} <-> boolean:{}) [{}]",
            channel.name.bright_white(),
            channel.id,
            channel.toggle_id,
            state
        );
    }
    println!(
        "\n  Total: {} channels, {} enabled",
        registry.all_channels().len(),
        registry.enabled_channels().count().to_string().green()
    );
}

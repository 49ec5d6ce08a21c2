//! nanoKONTROL OSC - Rust implementation
//!
//! Bridges a Korg nanoKONTROL2 to a DAW or lighting desk over OSC.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nanokontrol_osc::aliases::AliasTable;
use nanokontrol_osc::bridge::Bridge;
use nanokontrol_osc::config::{AppConfig, EngineMode, PayloadFormat};
use nanokontrol_osc::drivers::{ConsoleDriver, OscDriver, OutputSink};
use nanokontrol_osc::engine::{EngineOptions, MappingEngine};
use nanokontrol_osc::sniffer;
use nanokontrol_osc::surface::SurfaceInput;

/// nanoKONTROL OSC - Control a DAW over OSC from a Korg nanoKONTROL2
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Group alias file (token=name per line)
    aliases: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Mapping mode, overrides the configuration file
    #[arg(short, long, value_enum)]
    mode: Option<EngineMode>,

    /// OSC argument type, overrides the configuration file
    #[arg(short, long, value_enum)]
    payload: Option<PayloadFormat>,

    /// List available MIDI ports
    #[arg(long)]
    list_ports: bool,

    /// Run in sniffer mode
    #[arg(long)]
    sniffer: bool,

    /// Print messages instead of sending them over UDP
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("Starting nanoKONTROL OSC...");
    info!("Configuration file: {}", args.config);

    let mut config = AppConfig::load_or_default(&args.config).await?;
    apply_overrides(&mut config, &args);

    if args.list_ports {
        sniffer::list_ports_formatted(&config);
        return Ok(());
    }

    if args.sniffer {
        sniffer::run_cli_sniffer(&config).await?;
        return Ok(());
    }

    run_app(config, args.dry_run).await?;

    info!("nanoKONTROL OSC shutdown complete");
    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(mode) = args.mode {
        config.engine.mode = mode;
    }
    if let Some(payload) = args.payload {
        config.osc.payload = payload;
    }
    if let Some(path) = &args.aliases {
        config.aliases.path = Some(path.clone());
    }
    debug!("Effective configuration: {:?}", config);
}

async fn run_app(config: AppConfig, dry_run: bool) -> Result<()> {
    let aliases = AliasTable::load(config.aliases.path.as_deref(), config.aliases.strict)
        .context("Failed to load group aliases")?;
    info!("Loaded {} group aliases", aliases.len());

    let options = EngineOptions::from_config(&config)?;
    let engine = MappingEngine::nano_kontrol2(options, aliases);

    let sink: Arc<dyn OutputSink> = if dry_run {
        info!("Dry run: OSC messages are printed, not sent");
        Arc::new(ConsoleDriver::new("dry-run"))
    } else {
        Arc::new(OscDriver::connect(&config.osc_target()).await?)
    };

    let bridge = Bridge::new(engine, sink);

    // A missing surface is fatal
    let mut surface = SurfaceInput::new(&config.midi);
    surface.connect()?;
    let mut surface_rx = surface
        .take_event_receiver()
        .context("Failed to get surface event receiver")?;

    println!("MIDI input connected.");
    bridge.print_status();

    info!("Ready to process MIDI events!");

    loop {
        tokio::select! {
            Some(event) = surface_rx.recv() => {
                debug!("Received surface event: raw={:02X?}", event.raw_data);
                bridge.on_message(&event.message).await;
            }

            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl+C")?;
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }
    }

    info!("Shutting down...");
    surface.disconnect();
    bridge.shutdown().await;

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            // stdout carries only the operator status lines
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

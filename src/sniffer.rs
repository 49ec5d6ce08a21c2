//! MIDI sniffer and port listing for setting up a surface
//!
//! The sniffer opens the configured device and prints every incoming message
//! with the element class it maps to, without sending anything.

use anyhow::{Context, Result};
use colored::*;

use crate::config::AppConfig;
use crate::layout::{ControllerLayout, ElementClass};
use crate::midi::format_hex;
use crate::surface::{discovery, port_matches, SurfaceEvent, SurfaceInput};

/// Run the CLI sniffer until Ctrl+C
pub async fn run_cli_sniffer(config: &AppConfig) -> Result<()> {
    println!("{}", "=== MIDI Sniffer ===".bold().cyan());
    println!("Press Ctrl+C to exit\n");

    let layout = ControllerLayout::nano_kontrol2();
    let mut surface = SurfaceInput::new(&config.midi);
    let port = surface.connect().context("Sniffer could not open the surface")?;
    let mut rx = surface
        .take_event_receiver()
        .context("Surface event receiver already taken")?;

    println!("{} {}", "Monitoring".green(), port.bright_white());
    println!(
        "{}",
        "Format: [elapsed] HEX => PARSED | ELEMENT CLASS".dimmed()
    );
    println!("{}\n", "─".repeat(80).dimmed());

    let start = std::time::Instant::now();

    loop {
        tokio::select! {
            Some(event) = rx.recv() => {
                let elapsed_ms = event.timestamp.duration_since(start).as_millis() as u64;
                println!("{}", format_event(&layout, elapsed_ms, &event));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    surface.disconnect();
    println!("\n{}", "Sniffer stopped".yellow());
    Ok(())
}

/// One sniffer output line
fn format_event(layout: &ControllerLayout, elapsed_ms: u64, event: &SurfaceEvent) -> String {
    let hex = format_hex(&event.raw_data);

    let class = match event.message.element_event() {
        Some(ev) => match layout.classify(ev.element) {
            ElementClass::Unmapped => "unmapped".dimmed(),
            class => class.to_string().bright_yellow(),
        },
        None => "-".dimmed(),
    };

    format!(
        "[{}ms] {} => {} | {}",
        format!("{:08}", elapsed_ms).dimmed(),
        hex.bright_green(),
        event.message.to_string().bright_blue(),
        class
    )
}

/// List input ports, marking the configured device
pub fn list_ports_formatted(config: &AppConfig) {
    println!("\n{}", "=== Available MIDI Input Ports ===".bold().cyan());

    match discovery::discover_input_ports() {
        Ok(ports) if ports.is_empty() => println!("  {}", "No input ports found".dimmed()),
        Ok(ports) => {
            for port in ports {
                let selected =
                    port_matches(&port.name, &config.midi.input_port, config.midi.port_match);
                let marker = if selected {
                    "[CONFIGURED]".green()
                } else {
                    "            ".normal()
                };
                println!("  {} {:>2}: {}", marker, port.index, port.name);
            }
        }
        Err(e) => println!("  {} {}", "Failed to list ports:".red(), e),
    }

    println!(
        "\n  Configured device: {} ({:?} match)\n",
        config.midi.input_port.bright_white(),
        config.midi.port_match
    );
}

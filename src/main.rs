//! MCU Surface - Mackie/Logic Control surface emulator
//!
//! Presents itself to a DAW as a Mackie Control surface, answers the
//! handshake and logs everything the host draws on the surface.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcu_surface::config::AppConfig;
use mcu_surface::midi::format_frame;
use mcu_surface::surface::{Session, SurfaceEvent};
use mcu_surface::transport::{discovery, InboundFrame, MidiTransport};

/// MCU Surface - emulate a Mackie/Logic Control surface over MIDI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long, env = "MCU_SURFACE_CONFIG")]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// List available MIDI ports
    #[arg(long)]
    list_ports: bool,

    /// Input port name or substring (overrides config)
    #[arg(long)]
    input: Option<String>,

    /// Output port name or substring (overrides config)
    #[arg(long)]
    output: Option<String>,

    /// Create virtual ports instead of opening existing ones
    #[arg(long)]
    virtual_ports: bool,

    /// Print every inbound frame
    #[arg(short, long)]
    monitor: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    if args.list_ports {
        list_ports_formatted();
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => {
            info!("Configuration file: {}", path);
            AppConfig::load(path).await?
        }
        None => AppConfig::default(),
    };

    if let Some(input) = args.input {
        config.midi.input_port = input;
    }
    if let Some(output) = args.output {
        config.midi.output_port = output;
    }
    config.midi.virtual_ports |= args.virtual_ports;
    config.validate()?;

    info!("Starting MCU Surface...");
    run(config, args.monitor, shutdown_signal()).await?;

    info!("MCU Surface shutdown complete");
    Ok(())
}

async fn run(
    config: AppConfig,
    monitor: bool,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    let identity = config.device.identity()?;

    let mut transport =
        MidiTransport::connect(&config.midi).context("Failed to open MIDI transport")?;
    let mut frames: mpsc::Receiver<InboundFrame> = transport
        .take_frame_receiver()
        .context("Frame receiver already taken")?;

    let (input, output) = transport.port_names();
    println!(
        "{} {} / {}",
        "Surface ports:".bold(),
        input.bright_white(),
        output.bright_white()
    );

    let mut session = Session::new(identity, transport, log_event);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            Some(frame) = frames.recv() => {
                if monitor {
                    println!("{}", format_frame(frame.timestamp_us, "IN ", &frame.data));
                }
                if let Err(e) = session.handle_frame(&frame.data) {
                    warn!("Failed to answer host: {}", e);
                }
            }
            _ = &mut shutdown => break,
            else => {
                warn!("MIDI input closed");
                break;
            }
        }
    }

    let mut transport = session.close();
    transport.disconnect();
    Ok(())
}

fn log_event(event: &SurfaceEvent) {
    match event {
        SurfaceEvent::Online => info!("{}", "Host connected".green()),
        SurfaceEvent::Offline => info!("{}", "Host went offline".yellow()),
        SurfaceEvent::Reset => info!("Surface reset"),
        SurfaceEvent::Lcd { top, bottom } => {
            info!("LCD |{}|", top);
            info!("    |{}|", bottom);
        }
        SurfaceEvent::Time(cells) => {
            info!("Time: {}", mcu_surface::surface::segment::render(cells));
        }
        SurfaceEvent::Mode(cells) => {
            info!("Mode: {}", mcu_surface::surface::segment::render(cells));
        }
        other => debug!("{:?}", other),
    }
}

fn list_ports_formatted() {
    println!("\n{}", "=== Available MIDI Ports ===".bold().cyan());

    match discovery::discover_input_ports() {
        Ok(inputs) => {
            println!("\n{}", "Input Ports:".bold());
            if inputs.is_empty() {
                println!("  {}", "No input ports found".dimmed());
            }
            for port in inputs {
                println!("  [{}] {}", port.index.to_string().green(), port.name);
            }
        }
        Err(e) => println!("  {} {}", "Error:".red(), e),
    }

    match discovery::discover_output_ports() {
        Ok(outputs) => {
            println!("\n{}", "Output Ports:".bold());
            if outputs.is_empty() {
                println!("  {}", "No output ports found".dimmed());
            }
            for port in outputs {
                println!("  [{}] {}", port.index.to_string().green(), port.name);
            }
        }
        Err(e) => println!("  {} {}", "Error:".red(), e),
    }

    println!();
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
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

//! Radar Capture - radiotap PHY error pulse decoder
//!
//! Reads radiotap frames from a capture file or a monitor-mode interface,
//! keeps the radar PHY errors and decodes the chipset status trailer into
//! normalized pulse records on stdout.

mod capture;
mod chip;
mod config;
mod error;
mod pipeline;
mod radiotap;
mod sink;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use capture::{CaptureError, CaptureSource, OfflineSource};
use chip::{ChipDecoder, ChipKind};
use config::{Config, OutputFormat};
use pipeline::Pipeline;
use sink::{JsonSink, RecordSink, TextSink};

/// Where frames come from
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum InputMode {
    /// Replay a pcap capture file
    File,
    /// Capture live from a monitor-mode interface
    #[value(name = "if")]
    Interface,
}

#[derive(Parser, Debug)]
#[command(name = "radar-capture", version, about = "Decode radar PHY errors from radiotap captures")]
struct Cli {
    /// Chipset that produced the frames (ar5416, ar9280)
    chip: ChipKind,

    /// Input mode
    #[arg(value_enum)]
    mode: InputMode,

    /// Capture file path or interface name
    target: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for records
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    info!("===========================================");
    info!("   Radar Capture - radiotap PHY errors");
    info!("===========================================");
    info!("Configuration:");
    info!("  Chip: {}", cli.chip);
    info!("  Input: {:?} {}", cli.mode, cli.target);
    info!("  Output: {:?}", config.output);

    let stop = Arc::new(AtomicBool::new(false));

    let source = open_source(&cli, &config, stop.clone())
        .with_context(|| format!("Failed to open capture source '{}'", cli.target))?;

    let decoder = ChipDecoder::new(cli.chip);
    let output = config.output;
    let pipeline_stop = stop.clone();

    let mut pipeline_task = tokio::task::spawn_blocking(move || {
        Pipeline::new(source, decoder, make_sink(output), pipeline_stop).run()
    });

    let joined = tokio::select! {
        joined = &mut pipeline_task => joined,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => {
                    info!("Interrupt received, stopping capture...");
                    stop.store(true, Ordering::SeqCst);
                }
                Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
            }
            pipeline_task.await
        }
    };

    let stats = joined.context("Pipeline task failed")??;

    info!("Shutdown complete. {}", stats);
    Ok(())
}

fn open_source(
    cli: &Cli,
    config: &Config,
    stop: Arc<AtomicBool>,
) -> Result<Box<dyn CaptureSource + Send>, CaptureError> {
    match cli.mode {
        InputMode::File => Ok(Box::new(OfflineSource::open(Path::new(&cli.target))?)),
        InputMode::Interface => open_live(&cli.target, config, stop),
    }
}

#[cfg(feature = "live")]
fn open_live(
    interface: &str,
    config: &Config,
    stop: Arc<AtomicBool>,
) -> Result<Box<dyn CaptureSource + Send>, CaptureError> {
    let live_config = capture::LiveConfig {
        interface: interface.to_string(),
        snaplen: config.snaplen,
        filter: config.filter.clone(),
        channel_capacity: config.channel_capacity,
    };
    Ok(Box::new(capture::LiveSource::open(live_config, stop)?))
}

#[cfg(not(feature = "live"))]
fn open_live(
    _interface: &str,
    _config: &Config,
    _stop: Arc<AtomicBool>,
) -> Result<Box<dyn CaptureSource + Send>, CaptureError> {
    Err(CaptureError::LiveUnsupported)
}

fn make_sink(format: OutputFormat) -> Box<dyn RecordSink> {
    let stdout = std::io::stdout();
    match format {
        OutputFormat::Text => Box::new(TextSink::new(stdout)),
        OutputFormat::Json => Box::new(JsonSink::new(stdout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_positionals() {
        let cli = Cli::try_parse_from(["radar-capture", "ar9280", "file", "radar.pcap"]).unwrap();
        assert_eq!(cli.chip, ChipKind::Ar9280);
        assert_eq!(cli.mode, InputMode::File);
        assert_eq!(cli.target, "radar.pcap");

        let cli = Cli::try_parse_from(["radar-capture", "ar5416", "if", "wlan0"]).unwrap();
        assert_eq!(cli.mode, InputMode::Interface);
    }

    #[test]
    fn test_cli_rejects_unknown_chip() {
        assert!(Cli::try_parse_from(["radar-capture", "ar9300", "file", "x.pcap"]).is_err());
        assert!(Cli::try_parse_from(["radar-capture", "ar5416", "tape", "x.pcap"]).is_err());
    }

    #[test]
    fn test_open_missing_file() {
        let cli = Cli::try_parse_from(["radar-capture", "ar5416", "file", "/nonexistent.pcap"]).unwrap();
        let result = open_source(&cli, &Config::default(), Arc::new(AtomicBool::new(false)));
        assert!(matches!(result, Err(CaptureError::Open { .. })));
    }
}

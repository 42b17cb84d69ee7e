//! CLI entry point for the station traffic tool.
//!
//! Provides subcommands for summarizing per-station traffic at a time of day,
//! exporting render-ready markers, and replaying slider movements through the
//! throttled recomputation pipeline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::io::BufRead;
use std::path::Path;
use station_traffic::{
    config::EngineConfig,
    engine::TrafficModel,
    output::{log_summary, write_csv, write_json},
    source::{DataSource, load_inputs},
    throttle::ThrottleHandle,
    time::TimeFilter,
};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "station_traffic")]
#[command(about = "Per-station bike-share traffic by time of day", long_about = None)]
struct Cli {
    /// Station catalog (GBFS station_information JSON), path or URL
    #[arg(long, global = true, default_value = "data/bluebikes-stations.json")]
    stations: String,

    /// Trip log CSV (optionally gzip-compressed), path or URL
    #[arg(long, global = true, default_value = "data/bluebikes-traffic.csv")]
    trips: String,

    /// Optional JSON engine config
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Log totals and the busiest stations for a time of day
    Summary {
        /// Minute of day (0-1439), or -1 for all times
        #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
        minute: i32,

        /// Number of stations to list
        #[arg(short, long, default_value_t = 10)]
        top: usize,
    },
    /// Write render-ready station markers for a time of day
    Export {
        /// Minute of day (0-1439), or -1 for all times
        #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
        minute: i32,

        /// File to write
        #[arg(short, long, default_value = "markers.csv")]
        output: String,

        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },
    /// Read slider positions from stdin (one per line) and recompute, throttled
    Scrub {
        /// Number of stations to list per recomputation
        #[arg(short, long, default_value_t = 3)]
        top: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/station_traffic.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("station_traffic.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let (stations, log) = load_inputs(
        &DataSource::parse(&cli.stations),
        &DataSource::parse(&cli.trips),
    )
    .await?;
    if log.rejected > 0 {
        warn!(
            rejected = log.rejected,
            "Malformed trips were skipped during ingestion"
        );
    }

    let model = TrafficModel::new(stations, log.trips, config)?;

    match cli.command {
        Commands::Summary { minute, top } => {
            let filter = TimeFilter::from_slider(minute)?;
            log_summary(&model.snapshot(filter), top);
        }
        Commands::Export {
            minute,
            output,
            format,
        } => {
            let filter = TimeFilter::from_slider(minute)?;
            let snapshot = model.snapshot(filter);
            let markers = model.markers(&snapshot);

            match format {
                Format::Csv => write_csv(&output, &markers)?,
                Format::Json => write_json(&output, &snapshot, &markers)?,
            }
            info!(
                output = %output,
                markers = markers.len(),
                filter = %filter.label(),
                "Markers exported"
            );
        }
        Commands::Scrub { top } => scrub(model, top).await?,
    }

    Ok(())
}

/// Feeds stdin slider positions through the throttle; only the latest
/// position within each interval is recomputed.
#[tracing::instrument(skip(model))]
async fn scrub(model: TrafficModel, top: usize) -> Result<()> {
    let interval = model.config().throttle_interval();
    let (handle, task) = ThrottleHandle::spawn(interval, move |filter: TimeFilter| {
        log_summary(&model.snapshot(filter), top);
    });

    let (lines_tx, mut lines_rx) = tokio::sync::mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if lines_tx.send(line).is_err() {
                break;
            }
        }
    });

    while let Some(line) = lines_rx.recv().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed = line
            .parse::<i32>()
            .map_err(anyhow::Error::from)
            .and_then(|value| Ok(TimeFilter::from_slider(value)?));
        match parsed {
            Ok(filter) => handle.send(filter).await?,
            Err(e) => error!(input = line, error = %e, "Ignoring invalid slider position"),
        }
    }

    drop(handle);
    task.await.context("Throttle task failed")?;
    info!("Scrub input exhausted");
    Ok(())
}

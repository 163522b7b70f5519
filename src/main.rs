//! Seismos workbench driver.
//!
//! Runs the full analysis pipeline against the built-in synthetic archive:
//! event selection, station search, waveform download with fail-forward,
//! conditioning, Ms estimation, wave-type classification and optional
//! workbook export. The UI shell consumes the same coordinator API this
//! binary exercises.
//!
//! # Usage
//!
//! ```bash
//! # Analyse a synthetic M8.1 at the default epicentre
//! cargo run --release -- --magnitude 8.1
//!
//! # Pick a wider ring and export the workbook
//! cargo run --release -- --min-km 1000 --max-km 8000 --export analysis.zip
//! ```
//!
//! # Environment Variables
//!
//! - `SEISMOS_CONFIG`: path to a workbench TOML
//! - `RUST_LOG`: logging filter (default: info)

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use clap::Parser;
use seismos::config::{self, WorkbenchConfig};
use seismos::fdsn::RawEvent;
use seismos::synthetic::{ScenarioConfig, SyntheticFdsnClient};
use seismos::types::{Filter, FilterPreset};
use seismos::{AnalysisCoordinator, EventSearch, ExportOptions, MsRequest};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "seismos")]
#[command(about = "Teleseismic analysis workbench (offline synthetic mode)")]
#[command(version)]
struct Args {
    /// Synthetic event magnitude
    #[arg(long, default_value = "8.1")]
    magnitude: f64,

    /// Synthetic event latitude (degrees)
    #[arg(long, default_value = "38.297")]
    latitude: f64,

    /// Synthetic event longitude (degrees)
    #[arg(long, default_value = "142.373")]
    longitude: f64,

    /// Synthetic event depth (km)
    #[arg(long, default_value = "29.0")]
    depth_km: f64,

    /// Minimum station distance (km)
    #[arg(long, default_value = "500.0")]
    min_km: f64,

    /// Maximum station distance (km)
    #[arg(long, default_value = "3000.0")]
    max_km: f64,

    /// Number of candidate stations
    #[arg(long, default_value = "3")]
    target: usize,

    /// Choose a specific station (NET.STA) instead of the top candidate
    #[arg(long)]
    station: Option<String>,

    /// Write the three-sheet workbook to this path
    #[arg(long)]
    export: Option<std::path::PathBuf>,

    /// Random seed for the synthetic archive
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json_logs);
    config::init(WorkbenchConfig::load());

    let origin = Utc
        .with_ymd_and_hms(2011, 3, 11, 5, 46, 23)
        .single()
        .context("building demo origin time")?;
    let raw_event = RawEvent {
        event_id: "synthetic-demo".into(),
        origin_time: origin,
        latitude: args.latitude,
        longitude: args.longitude,
        depth_m: Some(args.depth_km * 1000.0),
        magnitude: args.magnitude,
        magnitude_type: Some("Mw".into()),
        description: Some("Synthetic demonstration event".into()),
    };

    let client = Arc::new(
        SyntheticFdsnClient::new(ScenarioConfig { seed: args.seed, ..Default::default() })
            .with_catalog(vec![raw_event]),
    );
    let oracle = Arc::new(seismos::arrivals::StandardEarthOracle);
    let mut coordinator = AnalysisCoordinator::new(client, oracle);

    // Catalog search drives the same path a UI event picker would.
    let search = EventSearch {
        magnitude_range: (args.magnitude - 0.5, args.magnitude + 0.5),
        year_range: Some((2011, 2011)),
        ..Default::default()
    };
    let events = coordinator.search_earthquakes(&search).await?;
    let event = events.into_iter().next().context("catalog returned no events")?;
    println!("Event: {}", event);
    coordinator.select_event(event);

    let stations =
        coordinator.search_stations(args.min_km, args.max_km, args.target).await?;
    println!("Candidates ({}):", stations.len());
    for station in &stations {
        let p = station.p_arrival_s().map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".into());
        println!(
            "  {:10} {:7.0} km  az {:5.1}  P {:>7}s  NP {}",
            station.id(),
            station.distance_km,
            station.azimuth_deg,
            p,
            station.network_priority
        );
    }

    let chosen = match &args.station {
        Some(wanted) => stations
            .iter()
            .find(|s| s.id() == *wanted)
            .cloned()
            .with_context(|| format!("{} not among candidates", wanted))?,
        None => stations.first().cloned().context("no candidate stations")?,
    };
    info!(station = %chosen.id(), "Downloading waveform");
    let waveform = coordinator
        .choose_station(chosen, (args.min_km, args.max_km, args.target))
        .await?;
    println!(
        "Waveform: {} components, {} samples at {} Hz ({:?})",
        waveform.available_components.len(),
        waveform.len(),
        waveform.sampling_rate_hz,
        waveform.units
    );

    coordinator.process(Filter::Named { preset: FilterPreset::Surface }, true, true)?;
    if let Some(display) = coordinator.display() {
        if let Some(series) = display.snr.get(&seismos::Component::Vertical) {
            let peak_snr = series.snr_db.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            println!(
                "Vertical SNR peak: {:.1} dB ({:?})",
                peak_snr,
                seismos::signal::snr_quality(peak_snr)
            );
        }
    }

    let (magnitude, explanation) = coordinator.compute_ms_request(&MsRequest::default())?;
    match magnitude {
        Some(ms) => {
            println!("Ms = {:.1}  (A = {:.1} um on {} component, delta = {:.2} deg)",
                ms,
                explanation.amplitudes.used_um,
                explanation
                    .used_component
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "?".into()),
                explanation.parameters.distance_deg
            );
            for issue in &explanation.validation.issues {
                println!("  note: {}", issue.message);
            }
        }
        None => println!(
            "Ms unavailable: {}",
            explanation.failure_message.as_deref().unwrap_or("unknown reason")
        ),
    }

    let classification = coordinator.classify(None)?;
    println!(
        "Wave type: {} (confidence {:.2}, H/V energy ratio {:.2})",
        classification.dominant_type, classification.confidence, classification.love_rayleigh_ratio
    );
    println!("  {}", classification.interpretation);

    if let Ok(spectrum) = coordinator.surface_spectrum() {
        println!("Dominant surface-wave period: {:.1} s", spectrum.peak_period_s);
    }

    if let Some(path) = &args.export {
        let bytes = coordinator.export(&ExportOptions::default())?;
        std::fs::write(path, &bytes)
            .with_context(|| format!("writing workbook to {}", path.display()))?;
        println!("Workbook written: {} ({} bytes)", path.display(), bytes.len());
    }

    Ok(())
}

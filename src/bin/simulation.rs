//! Synthetic seismogram generator.
//!
//! Writes a three-component scenario record to stdout for testing the
//! workbench without network access. Scenarios cover the cases the
//! analysis pipeline has to distinguish:
//! - Shallow teleseism with a clean 20 s Rayleigh train
//! - Deep-focus event (weak surface waves, Ms penalty territory)
//! - Love-dominated record (horizontal energy excess)
//! - Noisy record with spikes (despiker and SNR exercise)
//!
//! # Usage
//! ```bash
//! ./simulation --scenario teleseism --format csv > record.csv
//! ```

use anyhow::{bail, Result};
use chrono::{TimeZone, Utc};
use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use seismos::synthetic::synthetic_displacement;
use seismos::types::Event;
use std::io::{self, Write};

// ============================================================================
// Scenario Constants
// ============================================================================

/// Station used for all scenarios (IU.MAJO).
const STATION_LAT: f64 = 36.545;
const STATION_LON: f64 = 138.204;
/// Record length, seconds (180 s pre-event + 1800 s post).
const PRE_EVENT_S: f64 = 180.0;
const DURATION_S: f64 = 1980.0;
/// Counts per metre for the synthetic digitiser.
const SENSITIVITY: f64 = 1.0e9;

#[derive(Parser, Debug)]
#[command(name = "seismos-simulation")]
#[command(about = "Synthetic three-component seismogram generator")]
#[command(version = "1.0")]
struct Args {
    /// Scenario: teleseism, deep, love, noisy
    #[arg(short, long, default_value = "teleseism")]
    scenario: String,

    /// Output format: json or csv
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Sample rate in Hz
    #[arg(long, default_value = "20.0")]
    sample_rate: f64,

    /// Event magnitude override
    #[arg(short, long)]
    magnitude: Option<f64>,

    /// Random seed for reproducibility
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Background noise RMS in counts
    #[arg(long, default_value = "50.0")]
    noise: f64,
}

#[derive(Debug, Clone, Copy)]
enum Scenario {
    Teleseism,
    Deep,
    Love,
    Noisy,
}

impl Scenario {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "teleseism" => Some(Scenario::Teleseism),
            "deep" => Some(Scenario::Deep),
            "love" => Some(Scenario::Love),
            "noisy" => Some(Scenario::Noisy),
            _ => None,
        }
    }

    fn event(&self, magnitude: Option<f64>) -> Event {
        let origin = Utc
            .with_ymd_and_hms(2011, 3, 11, 5, 46, 23)
            .single()
            .unwrap_or_else(Utc::now);
        let (depth_km, default_magnitude) = match self {
            Scenario::Teleseism => (29.0, 8.1),
            Scenario::Deep => (550.0, 7.4),
            Scenario::Love => (15.0, 7.0),
            Scenario::Noisy => (29.0, 6.6),
        };
        Event {
            id: "simulation".into(),
            origin_time: origin,
            latitude: 38.297,
            longitude: 142.373,
            depth_km,
            magnitude: magnitude.unwrap_or(default_magnitude),
            magnitude_type: "Mw".into(),
            region: "Synthetic scenario".into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Sample {
    time_s: f64,
    north: f64,
    east: f64,
    vertical: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let Some(scenario) = Scenario::parse(&args.scenario) else {
        bail!("unknown scenario '{}' (use teleseism, deep, love, noisy)", args.scenario);
    };

    let event = scenario.event(args.magnitude);
    let fs = args.sample_rate;
    let (mut north, mut east, mut vertical) = synthetic_displacement(
        &event,
        STATION_LAT,
        STATION_LON,
        fs,
        PRE_EVENT_S,
        DURATION_S,
    );

    // Scenario shaping on top of the base record.
    match scenario {
        Scenario::Love => {
            // Boost horizontals, damp the vertical.
            for value in north.iter_mut().chain(east.iter_mut()) {
                *value *= 3.0;
            }
            for value in vertical.iter_mut() {
                *value *= 0.1;
            }
        }
        Scenario::Deep | Scenario::Teleseism => {}
        Scenario::Noisy => {}
    }

    // Counts conversion with background noise; the noisy scenario also
    // gets telemetry spikes.
    let mut rng = StdRng::seed_from_u64(args.seed);
    let noise = Normal::new(0.0, args.noise.max(1e-9))?;
    let mut to_counts = |data: &[f64], rng: &mut StdRng| -> Vec<f64> {
        data.iter().map(|m| (m * SENSITIVITY + noise.sample(rng)).round()).collect()
    };
    let mut north = to_counts(&north, &mut rng);
    let mut east = to_counts(&east, &mut rng);
    let mut vertical = to_counts(&vertical, &mut rng);

    if matches!(scenario, Scenario::Noisy) {
        let spike_count = 12;
        for _ in 0..spike_count {
            let index = rng.gen_range(0..vertical.len());
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            let scale = rng.gen_range(50.0..200.0);
            vertical[index] += sign * args.noise * scale;
            let north_len = north.len();
            north[index % north_len] -= sign * args.noise * scale * 0.5;
            let east_len = east.len();
            east[index % east_len] += sign * args.noise * scale * 0.5;
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format.as_str() {
        "json" => {
            for i in 0..vertical.len() {
                let sample = Sample {
                    time_s: -PRE_EVENT_S + i as f64 / fs,
                    north: north[i],
                    east: east[i],
                    vertical: vertical[i],
                };
                serde_json::to_writer(&mut out, &sample)?;
                out.write_all(b"\n")?;
            }
        }
        "csv" => {
            writeln!(out, "time_s,north,east,vertical")?;
            for i in 0..vertical.len() {
                writeln!(
                    out,
                    "{:.4},{},{},{}",
                    -PRE_EVENT_S + i as f64 / fs,
                    north[i],
                    east[i],
                    vertical[i]
                )?;
            }
        }
        other => bail!("unknown format '{}' (use json or csv)", other),
    }

    Ok(())
}

//! StationXML to CSV converter.
//!
//! Flattens a StationXML subset document into one CSV row per station,
//! with the network/channel quality ranks the selector would assign.
//!
//! # Usage
//! ```bash
//! ./inventory-to-csv --input inventory.xml > stations.csv
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use seismos::inventory::{best_channel_priority, best_sample_rate, network_priority, stationxml};
use std::io;

#[derive(Parser, Debug)]
#[command(name = "inventory-to-csv")]
#[command(about = "Flatten a StationXML inventory to CSV")]
#[command(version = "1.0")]
struct Args {
    /// Path to the StationXML document
    #[arg(short, long)]
    input: std::path::PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let inventory = stationxml::read_file(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record([
        "network",
        "station",
        "latitude",
        "longitude",
        "elevation_m",
        "channels",
        "best_sample_rate_hz",
        "network_priority",
        "channel_priority",
    ])?;

    for (network, station) in inventory.stations() {
        let channels =
            station.channels.iter().map(|c| c.code.as_str()).collect::<Vec<_>>().join("|");
        let record = [
            network.to_string(),
            station.code.clone(),
            format!("{}", station.latitude),
            format!("{}", station.longitude),
            format!("{}", station.elevation_m),
            channels,
            format!("{}", best_sample_rate(station)),
            format!("{}", network_priority(network)),
            format!("{}", best_channel_priority(station)),
        ];
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

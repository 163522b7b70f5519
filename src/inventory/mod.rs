//! Inventory model and sources.
//!
//! Format-agnostic station inventory tree (network -> station -> channel)
//! plus the network/channel quality ranking used by the selector, a
//! StationXML subset reader for offline inventories, and the curated
//! fallback list used when the remote inventory service is unreachable.

mod fallback;
pub mod stationxml;

pub use fallback::curated_inventory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One channel as the inventory reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEntry {
    /// SEED channel code (BHZ, HHN, ...).
    pub code: String,
    pub location: String,
    pub sample_rate_hz: f64,
}

/// One station with its channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationEntry {
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: f64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub channels: Vec<ChannelEntry>,
}

/// One network subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub code: String,
    pub stations: Vec<StationEntry>,
}

/// The full inventory tree returned by a station query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub networks: Vec<NetworkEntry>,
}

impl Inventory {
    pub fn station_count(&self) -> usize {
        self.networks.iter().map(|n| n.stations.len()).sum()
    }

    /// Iterate `(network_code, station)` pairs.
    pub fn stations(&self) -> impl Iterator<Item = (&str, &StationEntry)> {
        self.networks
            .iter()
            .flat_map(|n| n.stations.iter().map(move |s| (n.code.as_str(), s)))
    }
}

/// Quality rank of a network. Lower is better; the global broadband
/// backbones rank first.
pub fn network_priority(code: &str) -> u8 {
    match code {
        "IU" | "II" => 1,
        "G" | "GE" => 2,
        "GT" => 3,
        "IC" => 4,
        "CU" => 5,
        "US" => 6,
        "TA" => 7,
        "N4" => 8,
        _ => 99,
    }
}

/// Quality rank of a channel code by its band/instrument prefix.
pub fn channel_priority(code: &str) -> u8 {
    if code.len() < 2 {
        return 99;
    }
    match &code[..2] {
        "BH" => 1,
        "HH" => 2,
        "SH" => 3,
        "LH" => 4,
        _ => 99,
    }
}

/// Best (lowest) channel priority present at a station.
pub fn best_channel_priority(station: &StationEntry) -> u8 {
    station.channels.iter().map(|c| channel_priority(&c.code)).min().unwrap_or(99)
}

/// Highest sample rate present at a station, Hz.
pub fn best_sample_rate(station: &StationEntry) -> f64 {
    station.channels.iter().map(|c| c.sample_rate_hz).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_priorities() {
        assert_eq!(network_priority("IU"), 1);
        assert_eq!(network_priority("II"), 1);
        assert_eq!(network_priority("G"), 2);
        assert_eq!(network_priority("GE"), 2);
        assert_eq!(network_priority("GT"), 3);
        assert_eq!(network_priority("IC"), 4);
        assert_eq!(network_priority("CU"), 5);
        assert_eq!(network_priority("US"), 6);
        assert_eq!(network_priority("TA"), 7);
        assert_eq!(network_priority("N4"), 8);
        assert_eq!(network_priority("ZZ"), 99);
    }

    #[test]
    fn test_channel_priorities() {
        assert_eq!(channel_priority("BHZ"), 1);
        assert_eq!(channel_priority("HHN"), 2);
        assert_eq!(channel_priority("SHE"), 3);
        assert_eq!(channel_priority("LHZ"), 4);
        assert_eq!(channel_priority("VMU"), 99);
        assert_eq!(channel_priority("B"), 99);
    }

    #[test]
    fn test_best_channel_priority() {
        let station = StationEntry {
            code: "TEST".into(),
            latitude: 0.0,
            longitude: 0.0,
            elevation_m: 0.0,
            start_date: None,
            end_date: None,
            channels: vec![
                ChannelEntry { code: "LHZ".into(), location: "00".into(), sample_rate_hz: 1.0 },
                ChannelEntry { code: "BHZ".into(), location: "00".into(), sample_rate_hz: 40.0 },
            ],
        };
        assert_eq!(best_channel_priority(&station), 1);
        assert_eq!(best_sample_rate(&station), 40.0);
    }
}

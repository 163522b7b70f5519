//! FDSN StationXML subset reader.
//!
//! Loads the parts of a StationXML 1.x document the selector needs
//! (network/station codes, coordinates, operating windows, channel codes
//! and sample rates) into the inventory tree. Used for offline inventories
//! and the `inventory-to-csv` converter; the full schema with responses
//! stays with the remote archive.

use super::{ChannelEntry, Inventory, NetworkEntry, StationEntry};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StationXmlError {
    #[error("cannot read {0}: {1}")]
    Io(String, String),

    #[error("XML parse error: {0}")]
    Parse(String),
}

// Serde structs mapping the FDSN schema. Attributes carry the `@` prefix,
// element text is `$text` (quick-xml serde convention).

#[derive(Debug, Deserialize)]
#[serde(rename = "FDSNStationXML")]
struct XmlRoot {
    #[serde(rename = "Network", default)]
    networks: Vec<XmlNetwork>,
}

#[derive(Debug, Deserialize)]
struct XmlNetwork {
    #[serde(rename = "@code")]
    code: String,
    #[serde(rename = "Station", default)]
    stations: Vec<XmlStation>,
}

#[derive(Debug, Deserialize)]
struct XmlStation {
    #[serde(rename = "@code")]
    code: String,
    #[serde(rename = "@startDate", default)]
    start_date: Option<String>,
    #[serde(rename = "@endDate", default)]
    end_date: Option<String>,
    #[serde(rename = "Latitude")]
    latitude: XmlFloat,
    #[serde(rename = "Longitude")]
    longitude: XmlFloat,
    #[serde(rename = "Elevation", default)]
    elevation: Option<XmlFloat>,
    #[serde(rename = "Channel", default)]
    channels: Vec<XmlChannel>,
}

#[derive(Debug, Deserialize)]
struct XmlChannel {
    #[serde(rename = "@code")]
    code: String,
    #[serde(rename = "@locationCode", default)]
    location_code: Option<String>,
    #[serde(rename = "SampleRate", default)]
    sample_rate: Option<XmlFloat>,
}

#[derive(Debug, Deserialize)]
struct XmlFloat {
    #[serde(rename = "$text")]
    value: f64,
}

fn parse_date(raw: &Option<String>) -> Option<DateTime<Utc>> {
    raw.as_deref().and_then(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|d| d.with_timezone(&Utc))
            .or_else(|_| format!("{}Z", s).parse::<DateTime<Utc>>())
            .ok()
    })
}

/// Parse a StationXML document from a string.
pub fn read_str(xml: &str) -> Result<Inventory, StationXmlError> {
    let root: XmlRoot =
        quick_xml::de::from_str(xml).map_err(|e| StationXmlError::Parse(e.to_string()))?;
    Ok(Inventory {
        networks: root
            .networks
            .into_iter()
            .map(|network| NetworkEntry {
                code: network.code,
                stations: network
                    .stations
                    .into_iter()
                    .map(|station| StationEntry {
                        code: station.code,
                        latitude: station.latitude.value,
                        longitude: station.longitude.value,
                        elevation_m: station.elevation.map(|e| e.value).unwrap_or(0.0),
                        start_date: parse_date(&station.start_date),
                        end_date: parse_date(&station.end_date),
                        channels: station
                            .channels
                            .into_iter()
                            .map(|channel| ChannelEntry {
                                code: channel.code,
                                location: channel.location_code.unwrap_or_default(),
                                sample_rate_hz: channel
                                    .sample_rate
                                    .map(|r| r.value)
                                    .unwrap_or(0.0),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect(),
    })
}

/// Parse a StationXML document from a file.
pub fn read_file(path: impl AsRef<std::path::Path>) -> Result<Inventory, StationXmlError> {
    let raw = std::fs::read_to_string(path.as_ref())
        .map_err(|e| StationXmlError::Io(path.as_ref().display().to_string(), e.to_string()))?;
    read_str(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<FDSNStationXML xmlns="http://www.fdsn.org/xml/station/1" schemaVersion="1.2">
  <Source>test</Source>
  <Created>2024-01-01T00:00:00Z</Created>
  <Network code="IU">
    <Station code="MAJO" startDate="1990-01-01T00:00:00Z">
      <Latitude>36.5457</Latitude>
      <Longitude>138.2041</Longitude>
      <Elevation>405.0</Elevation>
      <Channel code="BHZ" locationCode="00">
        <SampleRate>40.0</SampleRate>
      </Channel>
      <Channel code="BHN" locationCode="00">
        <SampleRate>40.0</SampleRate>
      </Channel>
    </Station>
  </Network>
  <Network code="GE">
    <Station code="STU">
      <Latitude>48.771</Latitude>
      <Longitude>9.194</Longitude>
      <Elevation>360.0</Elevation>
    </Station>
  </Network>
</FDSNStationXML>
"#;

    #[test]
    fn test_parse_sample_document() {
        let inventory = read_str(SAMPLE).expect("parse");
        assert_eq!(inventory.networks.len(), 2);
        assert_eq!(inventory.station_count(), 2);

        let (net, majo) = inventory.stations().next().expect("station");
        assert_eq!(net, "IU");
        assert_eq!(majo.code, "MAJO");
        assert!((majo.latitude - 36.5457).abs() < 1e-6);
        assert_eq!(majo.channels.len(), 2);
        assert_eq!(majo.channels[0].code, "BHZ");
        assert!((majo.channels[0].sample_rate_hz - 40.0).abs() < 1e-9);
        assert!(majo.start_date.is_some());
    }

    #[test]
    fn test_station_without_channels() {
        let inventory = read_str(SAMPLE).expect("parse");
        let stu = &inventory.networks[1].stations[0];
        assert!(stu.channels.is_empty());
        assert_eq!(super::super::best_channel_priority(stu), 99);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(read_str("<oops>").is_err());
    }
}

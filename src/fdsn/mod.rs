//! FDSN client seam.
//!
//! The workbench never speaks HTTP itself; it consumes an injected client
//! that exposes the three FDSN web-service surfaces (event, station,
//! dataselect) as plain data. Deployments wire a real transport behind this
//! trait; tests and the offline mode use the synthetic client.

use crate::inventory::Inventory;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by a client implementation.
#[derive(Debug, Error)]
pub enum FdsnError {
    #[error("No data available for request: {0}")]
    NoData(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Request rejected: {0}")]
    BadRequest(String),

    #[error("Request timed out after {0} s")]
    Timeout(u64),
}

/// Inventory detail level of a station query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryLevel {
    Station,
    Channel,
    Response,
}

/// Event-service query parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub min_magnitude: f64,
    pub max_magnitude: f64,
    pub min_depth_km: f64,
    pub max_depth_km: f64,
    /// Catalog ordering key; the service accepts time or magnitude.
    pub order: EventOrder,
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventOrder {
    Time,
    TimeAsc,
    Magnitude,
    MagnitudeAsc,
}

/// One catalog entry as the event service reports it (depth in metres).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub event_id: String,
    pub origin_time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Metres below the surface, as delivered by the service.
    pub depth_m: Option<f64>,
    pub magnitude: f64,
    pub magnitude_type: Option<String>,
    pub description: Option<String>,
}

/// Per-trace metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStats {
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
    pub starttime: DateTime<Utc>,
    pub sampling_rate: f64,
    pub npts: usize,
}

impl TraceStats {
    /// Fully qualified channel id `NET.STA.LOC.CHA`.
    pub fn channel_id(&self) -> String {
        format!("{}.{}.{}.{}", self.network, self.station, self.location, self.channel)
    }
}

/// Pole-zero stage response converting ground displacement to counts.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentResponse {
    /// Zeros of the transfer function, rad/s.
    pub zeros: Vec<Complex64>,
    /// Poles of the transfer function, rad/s.
    pub poles: Vec<Complex64>,
    /// Normalisation factor A0.
    pub normalization: f64,
    /// Overall sensitivity, counts per metre.
    pub sensitivity: f64,
}

/// One continuous segment of integer-valued count data.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub stats: TraceStats,
    /// Digitiser counts (integer-valued).
    pub data: Vec<f64>,
    /// Attached when the request asked for responses and the archive has
    /// one for this channel.
    pub response: Option<InstrumentResponse>,
}

/// The consumed FDSN surface: catalog, inventory and waveforms.
#[async_trait]
pub trait FdsnClient: Send + Sync {
    /// Query the event service.
    async fn get_events(&self, query: &EventQuery) -> Result<Vec<RawEvent>, FdsnError>;

    /// Query the station service for an inventory tree.
    async fn get_stations(
        &self,
        networks: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        level: QueryLevel,
    ) -> Result<Inventory, FdsnError>;

    /// Query the dataselect service. `chan` accepts `?`/`*` wildcards.
    #[allow(clippy::too_many_arguments)]
    async fn get_waveforms(
        &self,
        net: &str,
        sta: &str,
        loc: &str,
        chan: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        attach_response: bool,
    ) -> Result<Vec<Trace>, FdsnError>;
}

/// Match a SEED code against a `?`/`*` wildcard pattern.
pub fn channel_matches(pattern: &str, code: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if pattern.len() != code.len() {
        return false;
    }
    pattern
        .chars()
        .zip(code.chars())
        .all(|(p, c)| p == '?' || p.eq_ignore_ascii_case(&c))
}

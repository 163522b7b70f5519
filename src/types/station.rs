//! Candidate recording station with lazily attached arrivals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time span a station was (is) operational.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationalWindow {
    pub start: Option<DateTime<Utc>>,
    /// `None` means still operating.
    pub end: Option<DateTime<Utc>>,
}

impl OperationalWindow {
    /// Whether the station was operational at `t` (unknown bounds count as open).
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| s <= t) && self.end.map_or(true, |e| t <= e)
    }
}

/// Factors that went into the empirical surface-wave velocity estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceFactors {
    pub depth: f64,
    pub distance: f64,
    pub magnitude: f64,
    pub structural: f64,
    /// Crustal interpretation behind the structural factor.
    pub structural_interpretation: String,
}

impl Default for SurfaceFactors {
    fn default() -> Self {
        Self {
            depth: 1.0,
            distance: 1.0,
            magnitude: 1.0,
            structural: 1.0,
            structural_interpretation: "unknown".into(),
        }
    }
}

/// Arrival times in seconds relative to the event origin time.
///
/// P and S come from the travel-time oracle and are `None` when it could not
/// produce them; the surface-wave pair always exists (empirical model).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationArrivals {
    pub p_s: Option<f64>,
    pub s_s: Option<f64>,
    pub love_s: f64,
    pub rayleigh_s: f64,
    /// Alias for the Rayleigh arrival, the window anchor for Ms.
    pub surface_s: f64,
    pub love_velocity_kms: f64,
    pub rayleigh_velocity_kms: f64,
    pub factors: SurfaceFactors,
}

/// A ranked candidate station for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub network: String,
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: f64,
    /// Great-circle distance to the epicentre, km.
    pub distance_km: f64,
    /// Epicentral distance in degrees (display convention, km / 111.32).
    pub distance_deg: f64,
    /// Azimuth event -> station, degrees from north.
    pub azimuth_deg: f64,
    /// Channel codes visible in the inventory (BHZ, HHN, ...).
    pub channels: Vec<String>,
    /// Best sample rate seen in the inventory, Hz. 0 when unknown.
    pub sample_rate_hz: f64,
    /// Lower is better. 1..=8 for known networks, 99 otherwise.
    pub network_priority: u8,
    /// Lower is better. Derived from the best channel band present.
    pub channel_priority: u8,
    pub operational: OperationalWindow,
    /// Attached lazily by the arrival model.
    pub arrivals: Option<StationArrivals>,
    /// Result of the optional data-availability probe.
    pub data_verified: Option<bool>,
}

impl Station {
    /// Fully qualified `NET.STA` identifier used for failure tracking.
    pub fn id(&self) -> String {
        format!("{}.{}", self.network, self.code)
    }

    /// P arrival in seconds after origin, when computed.
    pub fn p_arrival_s(&self) -> Option<f64> {
        self.arrivals.as_ref().and_then(|a| a.p_s)
    }

    /// Rayleigh arrival in seconds after origin, when computed.
    pub fn rayleigh_arrival_s(&self) -> Option<f64> {
        self.arrivals.as_ref().map(|a| a.rayleigh_s)
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:.0} km)", self.id(), self.distance_km)
    }
}

//! Canonical three-component waveform record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Seismometer component identity.
///
/// SEED orientation codes map N/1 -> North, E/2 -> East, Z/3 -> Vertical.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Component {
    North,
    East,
    Vertical,
}

impl Component {
    pub const ALL: [Component; 3] = [Component::North, Component::East, Component::Vertical];

    /// Map a SEED channel code (`BHZ`, `HH1`, ...) to a component.
    pub fn from_channel_code(code: &str) -> Option<Self> {
        match code.chars().last()? {
            'N' | '1' => Some(Component::North),
            'E' | '2' => Some(Component::East),
            'Z' | '3' => Some(Component::Vertical),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Component::North => "north",
            Component::East => "east",
            Component::Vertical => "vertical",
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Physical units of the primary amplitude series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmplitudeUnits {
    /// Raw digitiser counts (response removal unavailable or failed).
    Counts,
    /// Ground displacement in millimetres.
    Millimetres,
}

/// One component's time series in both raw and calibrated form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSeries {
    /// Integer-valued digitiser counts, copied before response removal.
    pub raw_counts: Vec<f64>,
    /// Displacement in mm; `None` when response removal was not possible.
    pub displacement_mm: Option<Vec<f64>>,
    /// Sample times in seconds relative to the event origin (t=0).
    pub time_s: Vec<f64>,
    pub sampling_rate_hz: f64,
}

impl ComponentSeries {
    /// The series analyses should run on: displacement when available,
    /// raw counts otherwise.
    pub fn amplitude(&self) -> &[f64] {
        self.displacement_mm.as_deref().unwrap_or(&self.raw_counts)
    }

    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_s.is_empty()
    }
}

/// Outcome of the optional STA/LTA timing cross-check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingValidation {
    /// Theoretical P arrival, seconds after origin.
    pub expected_p_s: Option<f64>,
    /// STA/LTA-detected P onset, seconds after origin.
    pub detected_p_s: Option<f64>,
    pub trigger_ratio: f64,
    /// |detected - expected|, when both exist.
    pub difference_s: Option<f64>,
    pub corrected: bool,
    /// Shift applied to all time axes (0 when not corrected).
    pub correction_s: f64,
    /// distance_km / observed P time. Plausible range is 5.8..13.7 km/s.
    pub implicit_p_velocity_kms: Option<f64>,
    /// Non-fatal annotations (timing mismatch, implausible velocity).
    pub warnings: Vec<String>,
}

/// Canonical waveform record produced by the acquirer and shared read-only
/// downstream. Every component's series has the same length as its own
/// `time_s`; the top-level `time_s` aliases the vertical component (or the
/// first present one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waveform {
    pub network: String,
    pub station: String,
    /// Event origin time; t=0 of every time axis.
    pub earthquake_time: DateTime<Utc>,
    /// Maximum per-component sampling rate, Hz.
    pub sampling_rate_hz: f64,
    pub components: BTreeMap<Component, ComponentSeries>,
    /// Shared time axis alias (vertical component, or first present).
    pub time_s: Vec<f64>,
    pub available_components: Vec<Component>,
    pub units: AmplitudeUnits,
    /// First sample time minus origin time, seconds (normally -180).
    pub timing_offset_s: f64,
    pub timing_validation: Option<TimingValidation>,
}

impl Waveform {
    pub fn component(&self, c: Component) -> Option<&ComponentSeries> {
        self.components.get(&c)
    }

    /// Displacement series for a component when the record is calibrated.
    pub fn displacement_mm(&self, c: Component) -> Option<&[f64]> {
        self.components.get(&c).and_then(|s| s.displacement_mm.as_deref())
    }

    /// Sample count of the alias time axis.
    pub fn len(&self) -> usize {
        self.time_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_s.is_empty()
    }

    /// Check the structural invariant: every component series is internally
    /// consistent (series length == its time axis length).
    pub fn is_consistent(&self) -> bool {
        self.components.values().all(|s| {
            s.raw_counts.len() == s.time_s.len()
                && s.displacement_mm.as_ref().map_or(true, |d| d.len() == s.time_s.len())
        })
    }
}

//! Processing results: filter outcomes, noise statistics, SNR series.

use super::waveform::Component;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What kind of filter actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Bandpass,
    Highpass,
    Lowpass,
    /// Broadband request: nothing applied.
    None,
}

/// Effective filter parameters after validation and clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParameters {
    pub low_hz: Option<f64>,
    pub high_hz: Option<f64>,
    pub order: usize,
    pub sampling_rate_hz: f64,
}

/// In-band status of one filtering operation. Errors never panic; the
/// operation returns the input unchanged together with this record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOutcome {
    pub success: bool,
    pub filter_type: FilterKind,
    pub parameters: Option<FilterParameters>,
    /// Corner adjustments applied to keep the design stable.
    pub adjustments: Vec<String>,
    /// Machine-readable failure reason.
    pub reason: Option<String>,
    /// User-facing message (product language).
    pub message: Option<String>,
    pub suggestion: Option<String>,
}

impl FilterOutcome {
    pub fn success(filter_type: FilterKind, parameters: FilterParameters) -> Self {
        Self {
            success: true,
            filter_type,
            parameters: Some(parameters),
            adjustments: Vec::new(),
            reason: None,
            message: None,
            suggestion: None,
        }
    }

    pub fn skipped() -> Self {
        Self {
            success: true,
            filter_type: FilterKind::None,
            parameters: None,
            adjustments: Vec::new(),
            reason: None,
            message: None,
            suggestion: None,
        }
    }

    pub fn failure(reason: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            filter_type: FilterKind::None,
            parameters: None,
            adjustments: Vec::new(),
            reason: Some(reason.to_string()),
            message: Some(message.into()),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Pre-event noise statistics from the window before the P arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseStats {
    /// Root mean square, the standard reference for SNR.
    pub rms: f64,
    pub std: f64,
    /// Peak absolute amplitude.
    pub max: f64,
    /// Median absolute amplitude (robust).
    pub median: f64,
    /// Median absolute deviation (robust spread).
    pub mad: f64,
    pub n_samples: usize,
    pub duration_s: f64,
}

/// Sliding-window SNR trace (dB) with window-centre times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnrSeries {
    pub snr_db: Vec<f64>,
    pub t_center_s: Vec<f64>,
}

/// Per-component outcome of the processing pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComponentFilterStatus {
    Success,
    NoData,
    SkippedBroadband,
    Error { reason: String },
}

/// Description of the filter a processing run used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterInfo {
    pub name: String,
    pub low_hz: Option<f64>,
    pub high_hz: Option<f64>,
    pub sampling_rate_hz: f64,
}

/// Result of conditioning a waveform: originals kept, filtered series added,
/// together with spike counts, noise floors and SNR traces. Inputs are never
/// mutated; this is a fresh record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedWaveform {
    pub original: BTreeMap<Component, Vec<f64>>,
    pub filtered: BTreeMap<Component, Vec<f64>>,
    pub filter_info: FilterInfo,
    /// Number of samples replaced by the despiker, per component.
    pub spike_info: BTreeMap<Component, usize>,
    pub noise_stats: BTreeMap<Component, NoiseStats>,
    pub snr: BTreeMap<Component, SnrSeries>,
    pub filter_status: BTreeMap<Component, ComponentFilterStatus>,
}

impl ProcessedWaveform {
    /// Components that filtered successfully.
    pub fn successful_components(&self) -> Vec<Component> {
        self.filter_status
            .iter()
            .filter(|(_, s)| matches!(s, ComponentFilterStatus::Success | ComponentFilterStatus::SkippedBroadband))
            .map(|(c, _)| *c)
            .collect()
    }
}

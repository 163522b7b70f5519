//! Structured explanation record for the Ms estimate.
//!
//! Every intermediate term of the IASPEI formula is kept so the UI can walk
//! a reader through the arithmetic and the exporter can dump it verbatim.
//! User-facing validation strings keep the product's original wording.

use serde::{Deserialize, Serialize};

/// Which amplitude won the vertical-vs-horizontal comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsedComponent {
    Vertical,
    Horizontal,
}

impl std::fmt::Display for UsedComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsedComponent::Vertical => f.write_str("vertikal"),
            UsedComponent::Horizontal => f.write_str("horizontal"),
        }
    }
}

/// Why no magnitude could be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MsFailure {
    DistanceTooShort,
    SamplingRateTooLow,
    NoAmplitude,
}

/// Non-fatal validity concern category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssueKind {
    Distance,
    Depth,
}

/// One non-fatal validity concern attached to the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: ValidationIssueKind,
    pub message: String,
    pub detail: String,
}

/// Peak amplitudes in micrometres.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MsAmplitudes {
    pub north_um: f64,
    pub east_um: f64,
    pub vertical_um: f64,
    /// Peak of the horizontal vector sqrt(N^2 + E^2).
    pub horizontal_um: f64,
    /// The amplitude that entered the formula.
    pub used_um: f64,
}

/// Input parameters echoed back for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MsParameters {
    pub period_s: f64,
    pub period_is_standard: bool,
    pub distance_km: f64,
    /// distance_km / 111.195 (IASPEI convention).
    pub distance_deg: f64,
    pub sampling_rate_hz: f64,
}

/// The fixed surface-wave band-pass applied before amplitude picking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MsFilterInfo {
    pub applied: bool,
    pub low_hz: Option<f64>,
    pub high_hz: Option<f64>,
    pub nyquist_hz: Option<f64>,
    /// 1/T for reference; the band itself does not depend on T.
    pub center_frequency_hz: Option<f64>,
}

/// All arithmetic terms of the IASPEI 2013 formula.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MsCalculation {
    /// A/T in micrometres per second of period.
    pub amplitude_period_ratio: f64,
    pub log_amp_period: f64,
    pub log_distance: f64,
    /// 1.66 * log10(distance_deg).
    pub distance_term: f64,
    pub constant: f64,
    /// Before corrections and rounding.
    pub raw_result: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepthCorrection {
    pub applied: bool,
    pub depth_km: Option<f64>,
    pub correction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceCorrection {
    pub applied: bool,
    pub distance_km: f64,
    /// (2000 - distance_km) / 2000, clamped to [0, 1].
    pub factor: f64,
    pub correction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MsValidation {
    pub issues: Vec<ValidationIssue>,
    pub requires_correction: bool,
    pub is_standard_compliant: bool,
}

/// Full pedagogical explanation of one Ms computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MsExplanation {
    /// Rounded result; `None` when `failure` is set.
    pub magnitude: Option<f64>,
    pub used_component: Option<UsedComponent>,
    pub amplitudes: MsAmplitudes,
    pub parameters: MsParameters,
    pub filter: MsFilterInfo,
    pub calculation: MsCalculation,
    pub depth_correction: DepthCorrection,
    pub distance_correction: DistanceCorrection,
    pub validation: MsValidation,
    pub failure: Option<MsFailure>,
    /// User-facing failure message, when failed.
    pub failure_message: Option<String>,
}

impl MsExplanation {
    pub fn failed(failure: MsFailure, message: impl Into<String>) -> Self {
        Self { failure: Some(failure), failure_message: Some(message.into()), ..Self::default() }
    }
}

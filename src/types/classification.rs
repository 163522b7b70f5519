//! Wave-type classification result.

use super::waveform::Component;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DominantWaveType {
    Love,
    Rayleigh,
    Mixed,
}

impl std::fmt::Display for DominantWaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DominantWaveType::Love => f.write_str("Love"),
            DominantWaveType::Rayleigh => f.write_str("Rayleigh"),
            DominantWaveType::Mixed => f.write_str("Mixed"),
        }
    }
}

/// Energy-ratio classification of a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveClassification {
    pub dominant_type: DominantWaveType,
    /// 0..=1.
    pub confidence: f64,
    /// Horizontal energy over vertical energy.
    pub love_rayleigh_ratio: f64,
    /// E_H / (E_H + E_Z).
    pub horizontal_ratio: f64,
    /// E_Z / (E_H + E_Z).
    pub vertical_ratio: f64,
    /// Sum of squared amplitudes per component.
    pub component_energy: BTreeMap<Component, f64>,
    pub horizontal_energy: f64,
    pub rms_amplitudes: BTreeMap<Component, f64>,
    pub horizontal_rms: f64,
    /// Fixed interpretation text keyed by ratio bucket.
    pub interpretation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_type_display() {
        assert_eq!(format!("{}", DominantWaveType::Love), "Love");
        assert_eq!(format!("{}", DominantWaveType::Rayleigh), "Rayleigh");
        assert_eq!(format!("{}", DominantWaveType::Mixed), "Mixed");
    }
}

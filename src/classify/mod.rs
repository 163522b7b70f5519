//! Wave-type classification from component energy ratios.
//!
//! Love waves live on the horizontal components; Rayleigh waves put
//! comparable energy on the vertical. The ratio of horizontal to vertical
//! energy over a window therefore separates the two trains well enough for
//! interactive analysis.

use crate::types::{Component, DominantWaveType, WaveClassification, Waveform};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("No displacement data available for classification")]
    NoData,

    #[error("Selected window contains no samples")]
    EmptyWindow,
}

/// Guards the horizontal/vertical ratio against a silent vertical channel.
const ENERGY_FLOOR: f64 = 1e-10;

/// Fixed interpretation table keyed by the Love/Rayleigh ratio.
fn interpret_ratio(ratio: f64) -> &'static str {
    if ratio > 5.0 {
        "Stærk Love bølge dominans - primært horisontal bevægelse"
    } else if ratio > 3.0 {
        "Love bølger dominerer - mere horisontal end vertikal bevægelse"
    } else if ratio > 1.5 {
        "Blandet Love og Rayleigh - begge bølgetyper er til stede"
    } else if ratio > 0.5 {
        "Blandet signal med Rayleigh tendens"
    } else if ratio > 0.2 {
        "Rayleigh bølger dominerer - stærk vertikal komponent"
    } else {
        "Stærk Rayleigh bølge dominans - primært vertikal bevægelse"
    }
}

fn window_slice<'a>(data: &'a [f64], fs: f64, window: Option<(f64, f64)>) -> &'a [f64] {
    match window {
        None => data,
        Some((start_s, duration_s)) => {
            let start = ((start_s * fs) as usize).min(data.len());
            let end = (start + (duration_s * fs) as usize).min(data.len());
            &data[start..end]
        }
    }
}

fn energy(data: &[f64]) -> f64 {
    data.iter().map(|v| v * v).sum()
}

fn rms(data: &[f64]) -> f64 {
    if data.is_empty() {
        0.0
    } else {
        (energy(data) / data.len() as f64).sqrt()
    }
}

/// Classify the dominant surface-wave type inside a window.
///
/// `window` is `(start_s, duration_s)` relative to the first sample;
/// `None` classifies the whole record. Deterministic: equal inputs yield
/// equal outputs.
pub fn classify_wave_types(
    waveform: &Waveform,
    window: Option<(f64, f64)>,
) -> Result<WaveClassification, ClassifyError> {
    let series = |c: Component| waveform.component(c).map(|s| (s.amplitude(), s.sampling_rate_hz));

    let mut windows: BTreeMap<Component, &[f64]> = BTreeMap::new();
    for component in Component::ALL {
        if let Some((data, fs)) = series(component) {
            windows.insert(component, window_slice(data, fs, window));
        }
    }
    if windows.is_empty() {
        return Err(ClassifyError::NoData);
    }
    if windows.values().all(|w| w.is_empty()) {
        return Err(ClassifyError::EmptyWindow);
    }

    let mut component_energy = BTreeMap::new();
    let mut rms_amplitudes = BTreeMap::new();
    for component in Component::ALL {
        let data = windows.get(&component).copied().unwrap_or(&[]);
        component_energy.insert(component, energy(data));
        rms_amplitudes.insert(component, rms(data));
    }

    let north_energy = component_energy[&Component::North];
    let east_energy = component_energy[&Component::East];
    let vertical_energy = component_energy[&Component::Vertical];
    let horizontal_energy = north_energy + east_energy;
    let total_energy = horizontal_energy + vertical_energy;

    let (horizontal_ratio, vertical_ratio) = if total_energy > 0.0 {
        (horizontal_energy / total_energy, vertical_energy / total_energy)
    } else {
        (0.0, 0.0)
    };
    let love_rayleigh_ratio = horizontal_energy / (vertical_energy + ENERGY_FLOOR);

    let (dominant_type, confidence) = if love_rayleigh_ratio > 3.0 {
        (DominantWaveType::Love, (love_rayleigh_ratio / 5.0).min(1.0))
    } else if love_rayleigh_ratio < 0.5 {
        (DominantWaveType::Rayleigh, (2.0 / (love_rayleigh_ratio + 0.1)).min(1.0))
    } else {
        (
            DominantWaveType::Mixed,
            (1.0 - (love_rayleigh_ratio - 1.5).abs() / 1.5).clamp(0.0, 1.0),
        )
    };

    let north_rms = rms_amplitudes[&Component::North];
    let east_rms = rms_amplitudes[&Component::East];
    let horizontal_rms = ((north_rms * north_rms + east_rms * east_rms) / 2.0).sqrt();

    Ok(WaveClassification {
        dominant_type,
        confidence,
        love_rayleigh_ratio,
        horizontal_ratio,
        vertical_ratio,
        component_energy,
        horizontal_energy,
        rms_amplitudes,
        horizontal_rms,
        interpretation: interpret_ratio(love_rayleigh_ratio).to_string(),
    })
}

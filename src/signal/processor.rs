//! Preset-driven waveform conditioning.
//!
//! Runs the despiker, the requested filter and optional noise/SNR analysis
//! over every available component, producing a fresh [`ProcessedWaveform`]
//! without touching the input record.

use super::{bandpass, estimate_noise, remove_spikes, snr_series};
use crate::config::defaults;
use crate::types::{
    ComponentFilterStatus, Filter, FilterInfo, ProcessedWaveform, Waveform,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Options for one conditioning run.
#[derive(Debug, Clone)]
pub struct ProcessingOptions {
    pub filter: Filter,
    pub remove_spikes: bool,
    pub compute_snr: bool,
    /// Theoretical P arrival in seconds after origin; enables the noise and
    /// SNR stages.
    pub p_arrival_s: Option<f64>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            filter: Filter::default(),
            remove_spikes: true,
            compute_snr: false,
            p_arrival_s: None,
        }
    }
}

/// Condition a waveform: despike, filter, optionally derive noise floor and
/// SNR per component.
pub fn process_waveform(waveform: &Waveform, options: &ProcessingOptions) -> ProcessedWaveform {
    let band = options.filter.band();
    let mut result = ProcessedWaveform {
        original: BTreeMap::new(),
        filtered: BTreeMap::new(),
        filter_info: FilterInfo {
            name: options.filter.label(),
            low_hz: band.map(|b| b.0),
            high_hz: band.map(|b| b.1),
            sampling_rate_hz: waveform.sampling_rate_hz,
        },
        spike_info: BTreeMap::new(),
        noise_stats: BTreeMap::new(),
        snr: BTreeMap::new(),
        filter_status: BTreeMap::new(),
    };

    for (&component, series) in &waveform.components {
        if series.is_empty() {
            result.filter_status.insert(component, ComponentFilterStatus::NoData);
            continue;
        }
        let fs = series.sampling_rate_hz;
        let mut data = series.amplitude().to_vec();
        result.original.insert(component, data.clone());

        if options.remove_spikes {
            let (cleaned, count) =
                remove_spikes(&data, defaults::SPIKE_THRESHOLD, defaults::SPIKE_WINDOW);
            if count > 0 {
                debug!(component = %component, spikes = count, "Replaced spikes");
            }
            result.spike_info.insert(component, count);
            data = cleaned;
        }

        let filtered = match band {
            None => {
                result.filter_status.insert(component, ComponentFilterStatus::SkippedBroadband);
                data
            }
            Some((lo, hi)) => {
                let (filtered, outcome) =
                    bandpass(&data, fs, Some(lo), Some(hi), defaults::FILTER_ORDER);
                let status = if outcome.success {
                    ComponentFilterStatus::Success
                } else {
                    ComponentFilterStatus::Error {
                        reason: outcome.reason.unwrap_or_else(|| "error".into()),
                    }
                };
                result.filter_status.insert(component, status);
                filtered
            }
        };

        if options.compute_snr {
            if let Some(p_s) = options.p_arrival_s {
                // P arrival is origin-relative; the record starts at
                // timing_offset_s before/after the origin.
                let p_relative_s = p_s - waveform.timing_offset_s;
                if let Some(stats) =
                    estimate_noise(&filtered, p_relative_s, fs, defaults::NOISE_WINDOW_S)
                {
                    let series =
                        snr_series(&filtered, stats.rms, defaults::SNR_WINDOW_S, fs);
                    result.noise_stats.insert(component, stats);
                    result.snr.insert(component, series);
                }
            }
        }

        result.filtered.insert(component, filtered);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        AmplitudeUnits, Component, ComponentSeries, FilterPreset, Waveform,
    };
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn test_waveform(fs: f64, n: usize) -> Waveform {
        let mut components = BTreeMap::new();
        for component in Component::ALL {
            let data: Vec<f64> = (0..n)
                .map(|i| (2.0 * std::f64::consts::PI * i as f64 / fs).sin())
                .collect();
            components.insert(
                component,
                ComponentSeries {
                    raw_counts: data.clone(),
                    displacement_mm: Some(data),
                    time_s: (0..n).map(|i| -180.0 + i as f64 / fs).collect(),
                    sampling_rate_hz: fs,
                },
            );
        }
        Waveform {
            network: "IU".into(),
            station: "MAJO".into(),
            earthquake_time: Utc::now(),
            sampling_rate_hz: fs,
            time_s: (0..n).map(|i| -180.0 + i as f64 / fs).collect(),
            available_components: Component::ALL.to_vec(),
            units: AmplitudeUnits::Millimetres,
            timing_offset_s: -180.0,
            timing_validation: None,
            components,
        }
    }

    #[test]
    fn test_broadband_is_passthrough() {
        let wf = test_waveform(20.0, 4000);
        let options = ProcessingOptions {
            filter: Filter::Named { preset: FilterPreset::Broadband },
            remove_spikes: false,
            ..Default::default()
        };
        let processed = process_waveform(&wf, &options);
        for component in Component::ALL {
            assert_eq!(
                processed.filter_status.get(&component),
                Some(&ComponentFilterStatus::SkippedBroadband)
            );
            assert_eq!(processed.filtered[&component], processed.original[&component]);
        }
    }

    #[test]
    fn test_surface_filter_runs_on_all_components() {
        let wf = test_waveform(20.0, 4000);
        let options = ProcessingOptions {
            filter: Filter::Named { preset: FilterPreset::Surface },
            ..Default::default()
        };
        let processed = process_waveform(&wf, &options);
        for component in Component::ALL {
            assert_eq!(
                processed.filter_status.get(&component),
                Some(&ComponentFilterStatus::Success)
            );
            assert_eq!(processed.filtered[&component].len(), 4000);
        }
        assert_eq!(processed.filter_info.low_hz, Some(0.02));
        assert_eq!(processed.filter_info.high_hz, Some(0.5));
    }

    #[test]
    fn test_snr_stage_needs_p_arrival() {
        let wf = test_waveform(20.0, 8000);
        let without = process_waveform(
            &wf,
            &ProcessingOptions { compute_snr: true, p_arrival_s: None, ..Default::default() },
        );
        assert!(without.noise_stats.is_empty());

        let with = process_waveform(
            &wf,
            &ProcessingOptions {
                compute_snr: true,
                p_arrival_s: Some(60.0),
                ..Default::default()
            },
        );
        assert_eq!(with.noise_stats.len(), 3);
        assert_eq!(with.snr.len(), 3);
    }

    #[test]
    fn test_input_not_mutated() {
        let wf = test_waveform(20.0, 2000);
        let before = wf.clone();
        let _ = process_waveform(
            &wf,
            &ProcessingOptions {
                filter: Filter::Named { preset: FilterPreset::SWaves },
                ..Default::default()
            },
        );
        assert_eq!(wf, before);
    }
}

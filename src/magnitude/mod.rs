//! Surface-wave magnitude (Ms) estimation, IASPEI 2013.
//!
//! Ms = log10(A/T) + 1.66 * log10(delta) + 3.3, with A the peak ground
//! displacement in micrometres, T the reference period and delta the
//! epicentral distance in degrees. A depth correction kicks in below 50 km
//! and an empirical short-distance correction compensates underdeveloped
//! Rayleigh trains inside 2000 km. The estimator is deterministic,
//! side-effect free, and explains every term it used.

use crate::config::defaults;
use crate::geo::KM_PER_DEGREE_IASPEI;
use crate::signal;
use crate::types::{
    DepthCorrection, DistanceCorrection, MsAmplitudes, MsCalculation, MsExplanation, MsFailure,
    MsFilterInfo, MsParameters, MsValidation, UsedComponent, ValidationIssue, ValidationIssueKind,
};

/// Options for one Ms computation.
#[derive(Debug, Clone)]
pub struct MsOptions {
    /// Reference period T, seconds. Enters only the log10(A/T) term; the
    /// surface-wave band-pass is fixed.
    pub period_s: f64,
    pub depth_km: Option<f64>,
    /// Apply the fixed surface-wave band-pass before amplitude picking.
    pub apply_filter: bool,
}

impl Default for MsOptions {
    fn default() -> Self {
        Self { period_s: defaults::MS_PERIOD_S, depth_km: None, apply_filter: true }
    }
}

/// The fixed Ms band-pass for a given sampling rate: 0.02 Hz up to 0.5 Hz,
/// capped below Nyquist.
pub fn ms_filter_band(sampling_rate_hz: f64) -> (f64, f64) {
    let nyquist = sampling_rate_hz / 2.0;
    (0.02, (0.5_f64).min(nyquist * 0.9))
}

fn peak_abs(data: &[f64]) -> f64 {
    data.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

/// Compute Ms from three displacement components in millimetres.
///
/// Returns the rounded magnitude together with a fully populated
/// explanation record; on failure the magnitude is `None` and the
/// explanation carries the reason.
pub fn compute_ms(
    north_mm: &[f64],
    east_mm: &[f64],
    vertical_mm: &[f64],
    distance_km: f64,
    sampling_rate_hz: f64,
    options: &MsOptions,
) -> (Option<f64>, MsExplanation) {
    // Hard validity floor per IASPEI: Ms is meaningless close in.
    if distance_km < 200.0 {
        return (
            None,
            MsExplanation::failed(
                MsFailure::DistanceTooShort,
                "Ms magnitude kræver epicentral afstand > 200 km",
            ),
        );
    }

    let mut issues = Vec::new();
    let mut requires_correction = false;
    if distance_km < 2000.0 {
        issues.push(ValidationIssue {
            kind: ValidationIssueKind::Distance,
            message: format!("Afstand {:.0} km < 2000 km", distance_km),
            detail: "Rayleigh-bølger ikke fuldt udviklede - resultat kan undervurdere magnitude"
                .into(),
        });
        requires_correction = true;
    }
    if distance_km > 16000.0 {
        issues.push(ValidationIssue {
            kind: ValidationIssueKind::Distance,
            message: format!("Afstand {:.0} km > 16000 km (160°)", distance_km),
            detail: "Ms magnitude er upålidelig ved meget store afstande".into(),
        });
    }
    if let Some(depth) = options.depth_km {
        if depth > 60.0 {
            issues.push(ValidationIssue {
                kind: ValidationIssueKind::Depth,
                message: format!("Dybde {:.0} km > 60 km", depth),
                detail: "Ms er designet til overfladiske jordskælv - dybe jordskælv genererer \
                         svagere overfladebølger"
                    .into(),
            });
            requires_correction = true;
        }
    }

    // Fixed surface-wave band; the chosen period does not move it.
    let mut filter_info = MsFilterInfo::default();
    let (north, east, vertical): (Vec<f64>, Vec<f64>, Vec<f64>) = if options.apply_filter {
        let nyquist = sampling_rate_hz / 2.0;
        if nyquist < 0.5 {
            return (
                None,
                MsExplanation::failed(
                    MsFailure::SamplingRateTooLow,
                    format!("Sampling rate ({} Hz) for lav til Ms filter", sampling_rate_hz),
                ),
            );
        }
        let (low, high) = ms_filter_band(sampling_rate_hz);
        filter_info = MsFilterInfo {
            applied: true,
            low_hz: Some(low),
            high_hz: Some(high),
            nyquist_hz: Some(nyquist),
            center_frequency_hz: Some(1.0 / options.period_s),
        };
        let order = defaults::FILTER_ORDER;
        let (n, _) = signal::bandpass(north_mm, sampling_rate_hz, Some(low), Some(high), order);
        let (e, _) = signal::bandpass(east_mm, sampling_rate_hz, Some(low), Some(high), order);
        let (z, _) = signal::bandpass(vertical_mm, sampling_rate_hz, Some(low), Some(high), order);
        (n, e, z)
    } else {
        (north_mm.to_vec(), east_mm.to_vec(), vertical_mm.to_vec())
    };

    // Peak amplitudes in micrometres (input is mm).
    let max_north = peak_abs(&north) * 1000.0;
    let max_east = peak_abs(&east) * 1000.0;
    let max_vertical = peak_abs(&vertical) * 1000.0;
    let max_horizontal = if !north.is_empty() && !east.is_empty() {
        let len = north.len().min(east.len());
        (0..len)
            .map(|i| (north[i] * north[i] + east[i] * east[i]).sqrt())
            .fold(0.0_f64, f64::max)
            * 1000.0
    } else {
        max_north.max(max_east)
    };

    let (amplitude_um, used_component) = if max_vertical >= max_horizontal {
        (max_vertical, UsedComponent::Vertical)
    } else {
        (max_horizontal, UsedComponent::Horizontal)
    };
    if amplitude_um == 0.0 {
        return (
            None,
            MsExplanation::failed(MsFailure::NoAmplitude, "Ingen amplitude fundet - check data"),
        );
    }

    let period_s = options.period_s;
    let distance_deg = distance_km / KM_PER_DEGREE_IASPEI;

    let log_amp_period = (amplitude_um / period_s).log10();
    let log_distance = distance_deg.log10();
    let distance_term = 1.66 * log_distance;
    let raw_result = log_amp_period + distance_term + 3.3;
    let mut magnitude = raw_result;

    let mut depth_correction = DepthCorrection {
        applied: false,
        depth_km: options.depth_km,
        correction: 0.0,
    };
    if let Some(depth) = options.depth_km {
        if depth > 50.0 {
            let correction = -0.0035 * (depth - 50.0);
            depth_correction.applied = true;
            depth_correction.correction = correction;
            magnitude += correction;
        }
    }

    let mut distance_correction = DistanceCorrection {
        applied: false,
        distance_km,
        factor: 0.0,
        correction: 0.0,
    };
    if distance_km < 2000.0 {
        let factor = (2000.0 - distance_km) / 2000.0;
        let correction = 0.3 * factor;
        distance_correction.applied = true;
        distance_correction.factor = factor;
        distance_correction.correction = correction;
        magnitude += correction;
    }

    let rounded = (magnitude * 10.0).round() / 10.0;

    let explanation = MsExplanation {
        magnitude: Some(rounded),
        used_component: Some(used_component),
        amplitudes: MsAmplitudes {
            north_um: max_north,
            east_um: max_east,
            vertical_um: max_vertical,
            horizontal_um: max_horizontal,
            used_um: amplitude_um,
        },
        parameters: MsParameters {
            period_s,
            period_is_standard: period_s == defaults::MS_PERIOD_S,
            distance_km,
            distance_deg,
            sampling_rate_hz,
        },
        filter: filter_info,
        calculation: MsCalculation {
            amplitude_period_ratio: amplitude_um / period_s,
            log_amp_period,
            log_distance,
            distance_term,
            constant: 3.3,
            raw_result,
        },
        depth_correction,
        distance_correction,
        validation: MsValidation {
            is_standard_compliant: issues.is_empty(),
            requires_correction,
            issues,
        },
        failure: None,
        failure_message: None,
    };
    (Some(rounded), explanation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// 20 s sine with a given peak amplitude in mm.
    fn sine_mm(amplitude_mm: f64, fs: f64, duration_s: f64) -> Vec<f64> {
        let n = (duration_s * fs) as usize;
        (0..n).map(|i| amplitude_mm * (2.0 * PI * i as f64 / (20.0 * fs)).sin()).collect()
    }

    fn quiet(fs: f64, duration_s: f64) -> Vec<f64> {
        vec![0.0; (duration_s * fs) as usize]
    }

    #[test]
    fn test_formula_roundtrip_without_filter() {
        // A = 50 mm = 50_000 um on vertical, T = 20 s, 4000 km, shallow.
        let fs = 10.0;
        let vertical = sine_mm(50.0, fs, 700.0);
        let (ms, explanation) = compute_ms(
            &quiet(fs, 700.0),
            &quiet(fs, 700.0),
            &vertical,
            4000.0,
            fs,
            &MsOptions { apply_filter: false, depth_km: Some(10.0), ..Default::default() },
        );
        let delta = 4000.0 / KM_PER_DEGREE_IASPEI;
        let expected = (50_000.0_f64 / 20.0).log10() + 1.66 * delta.log10() + 3.3;
        let ms = ms.expect("magnitude");
        assert!((ms - expected).abs() <= 0.05, "ms {} expected {}", ms, expected);
        assert_eq!(explanation.used_component, Some(UsedComponent::Vertical));
        assert!(explanation.distance_correction.correction == 0.0);
    }

    #[test]
    fn test_filtered_20s_sine_passes_band() {
        // The Ms band 0.02-0.5 Hz contains 1/20 Hz, so filtering barely
        // changes the result.
        let fs = 10.0;
        let vertical = sine_mm(50.0, fs, 700.0);
        let (ms_raw, _) = compute_ms(
            &quiet(fs, 700.0),
            &quiet(fs, 700.0),
            &vertical,
            4000.0,
            fs,
            &MsOptions { apply_filter: false, ..Default::default() },
        );
        let (ms_filtered, explanation) = compute_ms(
            &quiet(fs, 700.0),
            &quiet(fs, 700.0),
            &vertical,
            4000.0,
            fs,
            &MsOptions { apply_filter: true, ..Default::default() },
        );
        assert!(explanation.filter.applied);
        assert_eq!(explanation.filter.low_hz, Some(0.02));
        assert_eq!(explanation.filter.high_hz, Some(0.5));
        let difference = (ms_raw.expect("raw") - ms_filtered.expect("filtered")).abs();
        assert!(difference <= 0.1, "filter shifted Ms by {}", difference);
    }

    #[test]
    fn test_short_distance_correction_scenario() {
        // 1000 km, shallow: factor 0.5, correction +0.15.
        let fs = 10.0;
        let vertical = sine_mm(50.0, fs, 700.0);
        let (_, explanation) = compute_ms(
            &quiet(fs, 700.0),
            &quiet(fs, 700.0),
            &vertical,
            1000.0,
            fs,
            &MsOptions { apply_filter: false, depth_km: Some(10.0), ..Default::default() },
        );
        assert!(explanation.distance_correction.applied);
        assert!((explanation.distance_correction.factor - 0.5).abs() < 1e-9);
        assert!((explanation.distance_correction.correction - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_deep_event_penalty_scenario() {
        // 4000 km, 300 km depth: correction -0.875 and the Danish depth
        // validity message.
        let fs = 10.0;
        let vertical = sine_mm(50.0, fs, 700.0);
        let (_, explanation) = compute_ms(
            &quiet(fs, 700.0),
            &quiet(fs, 700.0),
            &vertical,
            4000.0,
            fs,
            &MsOptions { apply_filter: false, depth_km: Some(300.0), ..Default::default() },
        );
        assert!(explanation.depth_correction.applied);
        assert!((explanation.depth_correction.correction - (-0.875)).abs() < 1e-9);
        let depth_issue = explanation
            .validation
            .issues
            .iter()
            .find(|i| i.kind == ValidationIssueKind::Depth)
            .expect("depth issue");
        assert_eq!(depth_issue.message, "Dybde 300 km > 60 km");
    }

    #[test]
    fn test_distance_too_short_fails() {
        let (ms, explanation) =
            compute_ms(&[], &[], &[1.0], 150.0, 10.0, &MsOptions::default());
        assert!(ms.is_none());
        assert_eq!(explanation.failure, Some(MsFailure::DistanceTooShort));
    }

    #[test]
    fn test_no_amplitude_fails() {
        let fs = 10.0;
        let zeros = quiet(fs, 100.0);
        let (ms, explanation) = compute_ms(
            &zeros,
            &zeros,
            &zeros,
            3000.0,
            fs,
            &MsOptions { apply_filter: false, ..Default::default() },
        );
        assert!(ms.is_none());
        assert_eq!(explanation.failure, Some(MsFailure::NoAmplitude));
    }

    #[test]
    fn test_sampling_rate_too_low_for_filter() {
        let (ms, explanation) =
            compute_ms(&[1.0; 100], &[1.0; 100], &[1.0; 100], 3000.0, 0.5, &MsOptions::default());
        assert!(ms.is_none());
        assert_eq!(explanation.failure, Some(MsFailure::SamplingRateTooLow));
    }

    #[test]
    fn test_depth_monotonicity_above_50km() {
        let fs = 10.0;
        let vertical = sine_mm(50.0, fs, 700.0);
        let mut last = f64::INFINITY;
        for depth in [60.0, 100.0, 200.0, 400.0, 600.0] {
            let (ms, _) = compute_ms(
                &quiet(fs, 700.0),
                &quiet(fs, 700.0),
                &vertical,
                4000.0,
                fs,
                &MsOptions { apply_filter: false, depth_km: Some(depth), ..Default::default() },
            );
            let ms = ms.expect("magnitude");
            assert!(ms <= last + 1e-9, "Ms increased with depth at {} km", depth);
            last = ms;
        }
    }

    #[test]
    fn test_distance_correction_monotonicity() {
        // The added correction shrinks as distance grows toward 2000 km.
        let fs = 10.0;
        let vertical = sine_mm(50.0, fs, 700.0);
        let mut last_correction = f64::INFINITY;
        for distance in [400.0, 800.0, 1200.0, 1600.0, 1999.0] {
            let (_, explanation) = compute_ms(
                &quiet(fs, 700.0),
                &quiet(fs, 700.0),
                &vertical,
                distance,
                fs,
                &MsOptions { apply_filter: false, ..Default::default() },
            );
            let correction = explanation.distance_correction.correction;
            assert!(correction < last_correction);
            last_correction = correction;
        }
    }

    #[test]
    fn test_horizontal_vector_wins_when_stronger() {
        let fs = 10.0;
        let north = sine_mm(30.0, fs, 700.0);
        let east = sine_mm(30.0, fs, 700.0);
        let vertical = sine_mm(5.0, fs, 700.0);
        let (_, explanation) = compute_ms(
            &north,
            &east,
            &vertical,
            4000.0,
            fs,
            &MsOptions { apply_filter: false, ..Default::default() },
        );
        assert_eq!(explanation.used_component, Some(UsedComponent::Horizontal));
        // In-phase N and E give a vector peak of sqrt(2) * 30 mm.
        let expected_um = 30.0 * std::f64::consts::SQRT_2 * 1000.0;
        assert!((explanation.amplitudes.horizontal_um - expected_um).abs() / expected_um < 0.01);
    }
}

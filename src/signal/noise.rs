//! Pre-event noise estimation and sliding SNR.

use crate::types::{NoiseStats, SnrSeries};
use statrs::statistics::{Data, Median};

/// Coarse data-quality grade derived from SNR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnrQuality {
    /// > 20 dB
    Excellent,
    /// 10 - 20 dB
    Good,
    /// < 10 dB
    Limited,
}

/// Grade a single SNR value in dB.
pub fn snr_quality(snr_db: f64) -> SnrQuality {
    if snr_db > 20.0 {
        SnrQuality::Excellent
    } else if snr_db >= 10.0 {
        SnrQuality::Good
    } else {
        SnrQuality::Limited
    }
}

/// Estimate the noise floor from the window before the P arrival.
///
/// The window is `[p_arrival_s - duration_s, p_arrival_s)`, shrunk when the
/// P arrival sits close to the start of the record. When the P arrival is at
/// (or before) the first sample, the first 10% of the record is used as a
/// last resort. Returns `None` when no window can be formed.
pub fn estimate_noise(
    signal: &[f64],
    p_arrival_s: f64,
    fs: f64,
    duration_s: f64,
) -> Option<NoiseStats> {
    if signal.is_empty() || fs <= 0.0 {
        return None;
    }
    let pre_event_samples = (duration_s * fs) as usize;
    let p_sample = ((p_arrival_s * fs) as isize).clamp(0, signal.len() as isize) as usize;

    let window: &[f64] = if p_sample == 0 {
        let fallback = signal.len() / 10;
        &signal[..fallback]
    } else if p_sample <= pre_event_samples {
        &signal[..p_sample]
    } else {
        &signal[p_sample - pre_event_samples..p_sample]
    };
    if window.is_empty() {
        return None;
    }

    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let rms = (window.iter().map(|v| v * v).sum::<f64>() / n).sqrt();
    let std = (window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    let max = window.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));

    let abs_values: Vec<f64> = window.iter().map(|v| v.abs()).collect();
    let median_abs = Data::new(abs_values).median();
    let median_signed = Data::new(window.to_vec()).median();
    let mad = Data::new(window.iter().map(|v| (v - median_signed).abs()).collect::<Vec<_>>())
        .median();

    Some(NoiseStats {
        rms,
        std,
        max,
        median: median_abs,
        mad,
        n_samples: window.len(),
        duration_s: window.len() as f64 / fs,
    })
}

/// Sliding-window SNR in dB with 50% overlap.
///
/// `snr_db = 10 * log10(mean(x^2) / noise_rms^2)`; windows with zero signal
/// power report -60 dB.
pub fn snr_series(signal: &[f64], noise_rms: f64, window_s: f64, fs: f64) -> SnrSeries {
    let window_samples = (window_s * fs) as usize;
    if window_samples == 0 || signal.len() < window_samples || noise_rms <= 0.0 {
        return SnrSeries::default();
    }
    let hop = (window_samples / 2).max(1);
    let noise_power = noise_rms * noise_rms;

    let mut snr_db = Vec::new();
    let mut t_center_s = Vec::new();
    let mut start = 0;
    while start + window_samples <= signal.len() {
        let window = &signal[start..start + window_samples];
        let power = window.iter().map(|v| v * v).sum::<f64>() / window_samples as f64;
        let db = if power > 0.0 { 10.0 * (power / noise_power).log10() } else { -60.0 };
        snr_db.push(db);
        t_center_s.push((start as f64 + window_samples as f64 / 2.0) / fs);
        start += hop;
    }
    SnrSeries { snr_db, t_center_s }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_stats_on_unit_sine() {
        // 60 s of a unit sine before a P arrival at 120 s, 10 Hz.
        let signal: Vec<f64> = (0..2000)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 20.0).sin())
            .collect();
        let stats = estimate_noise(&signal, 120.0, 10.0, 60.0).expect("stats");
        assert_eq!(stats.n_samples, 600);
        assert!((stats.duration_s - 60.0).abs() < 1e-9);
        // RMS of a sine is 1/sqrt(2)
        assert!((stats.rms - std::f64::consts::FRAC_1_SQRT_2).abs() < 0.01);
        assert!(stats.max <= 1.0 + 1e-9);
    }

    #[test]
    fn test_window_shrinks_near_start() {
        let signal = vec![1.0; 1000];
        let stats = estimate_noise(&signal, 20.0, 10.0, 60.0).expect("stats");
        // Only 20 s available before P.
        assert_eq!(stats.n_samples, 200);
    }

    #[test]
    fn test_p_at_start_uses_head_fraction() {
        let signal = vec![1.0; 1000];
        let stats = estimate_noise(&signal, 0.0, 10.0, 60.0).expect("stats");
        assert_eq!(stats.n_samples, 100);
    }

    #[test]
    fn test_empty_signal_is_none() {
        assert!(estimate_noise(&[], 10.0, 10.0, 60.0).is_none());
    }

    #[test]
    fn test_snr_series_levels() {
        // Quiet first half (amplitude 0.1), loud second half (amplitude 10).
        let fs = 10.0;
        let mut signal = Vec::new();
        for i in 0..600 {
            signal.push(0.1 * (i as f64 * 0.7).sin());
        }
        for i in 0..600 {
            signal.push(10.0 * (i as f64 * 0.7).sin());
        }
        let series = snr_series(&signal, 0.1, 10.0, fs);
        assert!(!series.snr_db.is_empty());
        assert_eq!(series.snr_db.len(), series.t_center_s.len());
        let first = series.snr_db.first().copied().unwrap_or(0.0);
        let last = series.snr_db.last().copied().unwrap_or(0.0);
        assert!(last > first + 20.0, "loud window should gain > 20 dB ({} -> {})", first, last);
    }

    #[test]
    fn test_zero_power_window_floors_at_minus_60() {
        let signal = vec![0.0; 200];
        let series = snr_series(&signal, 1.0, 10.0, 10.0);
        assert!(series.snr_db.iter().all(|db| (*db - -60.0).abs() < 1e-9));
    }

    #[test]
    fn test_quality_buckets() {
        assert_eq!(snr_quality(25.0), SnrQuality::Excellent);
        assert_eq!(snr_quality(15.0), SnrQuality::Good);
        assert_eq!(snr_quality(3.0), SnrQuality::Limited);
    }
}

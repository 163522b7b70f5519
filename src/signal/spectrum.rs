//! FFT period analysis of the surface-wave window.
//!
//! Identifies the dominant period of the surface-wave train, which should
//! sit near 20 s for a healthy Ms measurement. Uses a forward FFT of the
//! demeaned window and searches the amplitude peak in period space.

use rustfft::{num_complex::Complex, FftPlanner};

/// Period-domain spectrum of a surface-wave window.
#[derive(Debug, Clone)]
pub struct PeriodSpectrum {
    /// Periods in seconds, descending from the longest resolvable.
    pub periods: Vec<f64>,
    /// FFT amplitude per period.
    pub amplitudes: Vec<f64>,
    /// Dominant period inside the search band (20 s default fallback).
    pub peak_period_s: f64,
    pub peak_amplitude: f64,
}

/// Analyse the window `[t_start_s, t_start_s + duration_s)` of `signal`
/// (times relative to the first sample).
///
/// Searches the peak within `period_band` (seconds); when the band contains
/// no spectral estimate the peak defaults to 20 s with the global amplitude
/// maximum. Returns `None` when the window lies outside the signal or holds
/// fewer than 100 samples.
pub fn fft_periods(
    signal: &[f64],
    fs: f64,
    t_start_s: f64,
    duration_s: f64,
    period_band: (f64, f64),
) -> Option<PeriodSpectrum> {
    if fs <= 0.0 || t_start_s < 0.0 {
        return None;
    }
    let start = (t_start_s * fs) as usize;
    if start >= signal.len() {
        return None;
    }
    let end = (start + (duration_s * fs) as usize).min(signal.len());
    let window = &signal[start..end];
    if window.len() < 100 {
        return None;
    }

    let mean = window.iter().sum::<f64>() / window.len() as f64;
    let mut buffer: Vec<Complex<f64>> =
        window.iter().map(|v| Complex::new(v - mean, 0.0)).collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(&mut buffer);

    // Positive frequencies, skipping DC; convert to periods.
    let n = buffer.len();
    let freq_resolution = fs / n as f64;
    let mut periods = Vec::with_capacity(n / 2);
    let mut amplitudes = Vec::with_capacity(n / 2);
    for (k, value) in buffer.iter().enumerate().take(n / 2).skip(1) {
        let freq = k as f64 * freq_resolution;
        periods.push(1.0 / freq);
        amplitudes.push(value.norm());
    }
    if periods.is_empty() {
        return None;
    }

    let (lo, hi) = period_band;
    let in_band: Vec<usize> = periods
        .iter()
        .enumerate()
        .filter(|(_, p)| **p >= lo && **p <= hi)
        .map(|(i, _)| i)
        .collect();

    let (peak_period_s, peak_amplitude) = if in_band.is_empty() {
        let max_amp = amplitudes.iter().fold(0.0_f64, |a, b| a.max(*b));
        (20.0, if max_amp > 0.0 { max_amp } else { 1.0 })
    } else {
        let best = in_band
            .into_iter()
            .max_by(|a, b| {
                amplitudes[*a]
                    .partial_cmp(&amplitudes[*b])
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(0);
        (periods[best], amplitudes[best])
    };

    Some(PeriodSpectrum { periods, amplitudes, peak_period_s, peak_amplitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_finds_20s_period() {
        // 20 s sine sampled at 10 Hz for 1200 s, window covering 600 s.
        let fs = 10.0;
        let signal: Vec<f64> =
            (0..12000).map(|i| (2.0 * PI * i as f64 / (20.0 * fs)).sin()).collect();
        let spectrum = fft_periods(&signal, fs, 100.0, 600.0, (10.0, 40.0)).expect("spectrum");
        assert!(
            (spectrum.peak_period_s - 20.0).abs() < 2.0,
            "peak at {} s",
            spectrum.peak_period_s
        );
        assert!(spectrum.peak_amplitude > 0.0);
    }

    #[test]
    fn test_periods_and_amplitudes_aligned() {
        let fs = 10.0;
        let signal: Vec<f64> = (0..4000).map(|i| (i as f64 * 0.05).sin()).collect();
        let spectrum = fft_periods(&signal, fs, 0.0, 400.0, (10.0, 40.0)).expect("spectrum");
        assert_eq!(spectrum.periods.len(), spectrum.amplitudes.len());
    }

    #[test]
    fn test_window_outside_signal() {
        let signal = vec![0.0; 100];
        assert!(fft_periods(&signal, 10.0, 60.0, 600.0, (10.0, 40.0)).is_none());
    }

    #[test]
    fn test_short_window_rejected() {
        let signal = vec![1.0; 400];
        // Window only 50 samples long.
        assert!(fft_periods(&signal, 10.0, 35.0, 5.0, (10.0, 40.0)).is_none());
    }

    #[test]
    fn test_empty_band_defaults_to_20s() {
        // 1 Hz sine: nothing in 10-40 s; short window so that band is empty.
        let fs = 100.0;
        let signal: Vec<f64> = (0..1000).map(|i| (2.0 * PI * i as f64 / 100.0).sin()).collect();
        // 5 s window: longest resolvable period 5 s < 10 s band floor.
        let spectrum = fft_periods(&signal, fs, 0.0, 5.0, (10.0, 40.0)).expect("spectrum");
        assert_eq!(spectrum.peak_period_s, 20.0);
    }
}

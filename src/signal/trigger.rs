//! STA/LTA onset detection.
//!
//! Standard short-term / long-term average energy trigger used as an
//! automatic P-onset cross-check. The short window reacts to the onset, the
//! long window tracks the background level.

/// Trigger parameters. Defaults are tuned for teleseismic P onsets.
#[derive(Debug, Clone, Copy)]
pub struct StaLtaConfig {
    /// Short window, seconds.
    pub sta_s: f64,
    /// Long window, seconds.
    pub lta_s: f64,
    /// Detection threshold on the STA/LTA ratio.
    pub threshold: f64,
}

impl Default for StaLtaConfig {
    fn default() -> Self {
        Self { sta_s: 2.0, lta_s: 10.0, threshold: 3.0 }
    }
}

/// Run the trigger over a signal.
///
/// Returns `(max_ratio, trigger_time_s)` where the time is the first local
/// maximum of the ratio above the threshold, in seconds relative to the
/// first sample. When no excursion crosses the threshold the maximum ratio
/// is reported with `None`.
pub fn sta_lta(signal: &[f64], fs: f64, config: &StaLtaConfig) -> (f64, Option<f64>) {
    if fs <= 0.0 {
        return (1.0, None);
    }
    let sta_samples = (config.sta_s * fs) as usize;
    let lta_samples = (config.lta_s * fs) as usize;
    if sta_samples == 0 || lta_samples == 0 || signal.len() < lta_samples + sta_samples {
        return (1.0, None);
    }

    let power: Vec<f64> = signal.iter().map(|v| v * v).collect();

    // Prefix sums make each window average O(1).
    let mut prefix = Vec::with_capacity(power.len() + 1);
    prefix.push(0.0);
    let mut acc = 0.0;
    for p in &power {
        acc += p;
        prefix.push(acc);
    }
    let window_mean =
        |from: usize, to: usize| (prefix[to] - prefix[from]) / (to - from) as f64;

    let mut max_ratio: f64 = 1.0;
    let mut first_peak: Option<f64> = None;
    let mut prev_ratio: f64 = 0.0;
    let mut prev_above = false;

    for i in lta_samples..(signal.len() - sta_samples) {
        let lta = window_mean(i - lta_samples, i);
        let sta = window_mean(i, i + sta_samples);
        let ratio = if lta > 0.0 { sta / lta } else { 0.0 };

        if ratio > max_ratio {
            max_ratio = ratio;
        }
        // First local maximum above threshold: the ratio was above the
        // threshold and has just started to fall.
        if first_peak.is_none() && prev_above && ratio < prev_ratio {
            first_peak = Some((i - 1) as f64 / fs);
        }
        prev_above = ratio > config.threshold;
        prev_ratio = ratio;
    }

    if max_ratio > config.threshold {
        (max_ratio, first_peak)
    } else {
        (max_ratio, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Quiet noise with a sudden strong arrival at a known time.
    fn onset_signal(fs: f64, onset_s: f64, total_s: f64) -> Vec<f64> {
        let n = (total_s * fs) as usize;
        let onset = (onset_s * fs) as usize;
        (0..n)
            .map(|i| {
                let base = 0.01 * ((i as f64) * 0.37).sin();
                if i >= onset {
                    base + 5.0 * ((i - onset) as f64 * 0.9).sin()
                } else {
                    base
                }
            })
            .collect()
    }

    #[test]
    fn test_detects_onset_near_true_time() {
        let fs = 50.0;
        let signal = onset_signal(fs, 60.0, 120.0);
        let (ratio, time) = sta_lta(&signal, fs, &StaLtaConfig::default());
        assert!(ratio > 3.0, "ratio {}", ratio);
        let t = time.expect("trigger time");
        assert!((t - 60.0).abs() < 5.0, "trigger at {} s", t);
    }

    #[test]
    fn test_quiet_signal_no_trigger() {
        let fs = 50.0;
        let signal: Vec<f64> = (0..6000).map(|i| 0.01 * (i as f64 * 0.37).sin()).collect();
        let (ratio, time) = sta_lta(&signal, fs, &StaLtaConfig::default());
        assert!(time.is_none());
        assert!(ratio < 3.0, "ratio {}", ratio);
    }

    #[test]
    fn test_too_short_signal() {
        let signal = vec![1.0; 10];
        let (ratio, time) = sta_lta(&signal, 50.0, &StaLtaConfig::default());
        assert_eq!(ratio, 1.0);
        assert!(time.is_none());
    }
}

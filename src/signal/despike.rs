//! Robust spike removal.
//!
//! Spikes are flagged with a MAD-based z-score and replaced by the value a
//! short running median produces at the same index. Non-spike samples are
//! never touched, which makes a second pass a no-op on them.

use statrs::statistics::{Data, Median};

/// Consistency constant relating MAD to the standard deviation of a normal
/// distribution (1 / 0.6745).
const MAD_SCALE: f64 = 1.4826;

/// Running median of `window` samples, zero-padded at the edges.
fn median_filter(data: &[f64], window: usize) -> Vec<f64> {
    let half = window / 2;
    let n = data.len();
    let mut out = Vec::with_capacity(n);
    let mut buffer = Vec::with_capacity(window);
    for i in 0..n {
        buffer.clear();
        for offset in 0..window {
            let idx = i as i64 + offset as i64 - half as i64;
            if idx < 0 || idx >= n as i64 {
                buffer.push(0.0);
            } else {
                buffer.push(data[idx as usize]);
            }
        }
        buffer.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        out.push(buffer[half]);
    }
    out
}

/// Remove spikes from a seismogram.
///
/// A sample is a spike iff its robust z-score exceeds `threshold`. Returns
/// the cleaned copy and the number of samples replaced. Falls back to the
/// standard deviation when the MAD degenerates to zero; if that is also
/// zero the data is constant and returned unchanged.
pub fn remove_spikes(data: &[f64], threshold: f64, window: usize) -> (Vec<f64>, usize) {
    if data.len() < 3 || window == 0 {
        return (data.to_vec(), 0);
    }

    let median = Data::new(data.to_vec()).median();
    let deviations: Vec<f64> = data.iter().map(|v| (v - median).abs()).collect();
    let mad = Data::new(deviations.clone()).median();

    let scale = if mad > 0.0 {
        MAD_SCALE * mad
    } else {
        let mean = data.iter().sum::<f64>() / data.len() as f64;
        let var = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / data.len() as f64;
        var.sqrt()
    };
    if scale <= 0.0 {
        return (data.to_vec(), 0);
    }

    let spike_indices: Vec<usize> = deviations
        .iter()
        .enumerate()
        .filter(|(_, d)| **d / scale > threshold)
        .map(|(i, _)| i)
        .collect();
    if spike_indices.is_empty() {
        return (data.to_vec(), 0);
    }

    let replacement = median_filter(data, window);
    let mut cleaned = data.to_vec();
    for &i in &spike_indices {
        cleaned[i] = replacement[i];
    }
    (cleaned, spike_indices.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_sine_with_spikes() -> Vec<f64> {
        let mut data: Vec<f64> = (0..1000)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 100.0).sin())
            .collect();
        data[100] = 50.0;
        data[500] = -80.0;
        data[750] = 120.0;
        data
    }

    #[test]
    fn test_detects_obvious_spikes() {
        let data = noisy_sine_with_spikes();
        let (cleaned, count) = remove_spikes(&data, 5.0, 5);
        assert_eq!(count, 3);
        assert!(cleaned[100].abs() < 2.0);
        assert!(cleaned[500].abs() < 2.0);
        assert!(cleaned[750].abs() < 2.0);
    }

    #[test]
    fn test_non_spike_samples_untouched() {
        let data = noisy_sine_with_spikes();
        let (cleaned, _) = remove_spikes(&data, 5.0, 5);
        for i in 0..data.len() {
            if i != 100 && i != 500 && i != 750 {
                assert_eq!(cleaned[i], data[i], "sample {} was modified", i);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let data = noisy_sine_with_spikes();
        let (once, first_count) = remove_spikes(&data, 5.0, 5);
        let (twice, second_count) = remove_spikes(&once, 5.0, 5);
        assert!(first_count > 0);
        assert_eq!(second_count, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_signal_unchanged() {
        let data: Vec<f64> = (0..500)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 50.0).sin())
            .collect();
        let (cleaned, count) = remove_spikes(&data, 5.0, 5);
        assert_eq!(count, 0);
        assert_eq!(cleaned, data);
    }

    #[test]
    fn test_constant_signal_unchanged() {
        let data = vec![3.0; 100];
        let (cleaned, count) = remove_spikes(&data, 5.0, 5);
        assert_eq!(count, 0);
        assert_eq!(cleaned, data);
    }
}

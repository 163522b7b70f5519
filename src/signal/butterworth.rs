//! Zero-phase Butterworth filtering.
//!
//! The filter is designed from the analog prototype (poles on the unit
//! circle), transformed to the requested band, mapped to the digital domain
//! with the prewarped bilinear transform, and applied as a cascade of biquad
//! sections forward and backward over an odd-extension padded copy of the
//! signal. Forward-backward application cancels the phase response, which is
//! what keeps arrival times intact.

use crate::types::{FilterKind, FilterOutcome, FilterParameters};
use num_complex::Complex64;
use std::f64::consts::PI;

/// One second-order section, denominator normalised to a0 = 1.
#[derive(Debug, Clone, Copy)]
pub struct Biquad {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Biquad {
    /// Filter `data` in place, direct form II transposed.
    fn apply(&self, data: &mut [f64]) {
        let mut s1 = 0.0;
        let mut s2 = 0.0;
        for x in data.iter_mut() {
            let input = *x;
            let y = self.b0 * input + s1;
            s1 = self.b1 * input - self.a1 * y + s2;
            s2 = self.b2 * input - self.a2 * y;
            *x = y;
        }
    }

    /// Complex response at z = e^{j omega}.
    fn response(&self, omega: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -omega);
        let z2 = z1 * z1;
        let num = Complex64::new(self.b0, 0.0) + z1 * self.b1 + z2 * self.b2;
        let den = Complex64::new(1.0, 0.0) + z1 * self.a1 + z2 * self.a2;
        num / den
    }
}

/// Requested response shape.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Band {
    Lowpass { cut_hz: f64 },
    Highpass { cut_hz: f64 },
    Bandpass { low_hz: f64, high_hz: f64 },
}

/// Butterworth prototype poles: unit circle, left half plane.
fn prototype_poles(order: usize) -> Vec<Complex64> {
    (1..=order)
        .map(|k| {
            let theta = PI * (2 * k + order - 1) as f64 / (2 * order) as f64;
            Complex64::from_polar(1.0, theta)
        })
        .collect()
}

/// Prewarped analog frequency for the bilinear transform (rad/s).
fn prewarp(f_hz: f64, fs: f64) -> f64 {
    2.0 * fs * (PI * f_hz / fs).tan()
}

/// Map an analog pole to the z-plane, fs2 = 2 * fs.
fn bilinear(pole: Complex64, fs2: f64) -> Complex64 {
    (Complex64::new(fs2, 0.0) + pole) / (Complex64::new(fs2, 0.0) - pole)
}

/// Pair a pole set closed under conjugation into biquad pole pairs.
/// Real leftovers are paired among themselves (a lone real pole becomes a
/// first-order section paired with 0).
fn pair_poles(mut poles: Vec<Complex64>) -> Vec<(Complex64, Complex64)> {
    const IM_EPS: f64 = 1e-10;
    let mut pairs = Vec::new();
    while let Some(i) = poles.iter().position(|p| p.im.abs() > IM_EPS) {
        let p = poles.swap_remove(i);
        let conj = p.conj();
        let mate = poles
            .iter()
            .enumerate()
            .filter(|(_, q)| q.im * p.im < 0.0)
            .min_by(|(_, a), (_, b)| {
                let da = (*a - conj).norm();
                let db = (*b - conj).norm();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(j, _)| j);
        match mate {
            Some(j) => {
                let q = poles.swap_remove(j);
                pairs.push((p, q));
            }
            // Numerically lost its conjugate; synthesise it.
            None => pairs.push((p, conj)),
        }
    }
    // Remaining poles are real.
    poles.sort_by(|a, b| a.re.partial_cmp(&b.re).unwrap_or(std::cmp::Ordering::Equal));
    while poles.len() >= 2 {
        let a = poles.remove(0);
        let b = poles.remove(0);
        pairs.push((a, b));
    }
    if let Some(p) = poles.pop() {
        pairs.push((p, Complex64::new(0.0, 0.0)));
    }
    pairs
}

/// Design the digital biquad cascade for one band shape.
fn design(band: Band, order: usize, fs: f64) -> Result<Vec<Biquad>, String> {
    if order == 0 {
        return Err("filter order must be at least 1".into());
    }
    let fs2 = 2.0 * fs;
    let proto = prototype_poles(order);

    // Analog poles for the requested band, plus the digital zero pattern.
    let (analog_poles, zero_at_plus_one, zero_at_minus_one) = match band {
        Band::Lowpass { cut_hz } => {
            let wc = prewarp(cut_hz, fs);
            let poles: Vec<Complex64> = proto.iter().map(|p| p * wc).collect();
            (poles, 0usize, order)
        }
        Band::Highpass { cut_hz } => {
            let wc = prewarp(cut_hz, fs);
            let poles: Vec<Complex64> = proto.iter().map(|p| Complex64::new(wc, 0.0) / p).collect();
            (poles, order, 0)
        }
        Band::Bandpass { low_hz, high_hz } => {
            let wl = prewarp(low_hz, fs);
            let wh = prewarp(high_hz, fs);
            let bw = wh - wl;
            let w0_sq = wl * wh;
            let mut poles = Vec::with_capacity(2 * order);
            for p in &proto {
                let q = p * (bw / 2.0);
                let root = (q * q - w0_sq).sqrt();
                poles.push(q + root);
                poles.push(q - root);
            }
            (poles, order, order)
        }
    };

    let digital_poles: Vec<Complex64> = analog_poles.iter().map(|p| bilinear(*p, fs2)).collect();
    if digital_poles.iter().any(|p| !p.re.is_finite() || !p.im.is_finite() || p.norm() >= 1.0) {
        return Err("unstable pole placement for requested corner frequencies".into());
    }

    let pole_pairs = pair_poles(digital_poles);

    // Distribute the fixed real zeros over sections: bandpass sections get
    // one zero at +1 and one at -1 each, lowpass/highpass sections get a
    // double zero at -1/+1.
    let mut plus_remaining = zero_at_plus_one;
    let mut minus_remaining = zero_at_minus_one;
    let mut sections = Vec::with_capacity(pole_pairs.len());
    for (p1, p2) in pole_pairs {
        let first_order = p2.norm() == 0.0 && p2.im == 0.0 && p1.im.abs() < 1e-12;
        let slots = if first_order { 1 } else { 2 };
        let mut zeros = Vec::with_capacity(slots);
        for _ in 0..slots {
            if plus_remaining >= minus_remaining && plus_remaining > 0 {
                zeros.push(1.0);
                plus_remaining -= 1;
            } else if minus_remaining > 0 {
                zeros.push(-1.0);
                minus_remaining -= 1;
            }
        }
        let (b0, b1, b2) = match zeros.as_slice() {
            [z] => (1.0, -z, 0.0),
            [z1, z2] => (1.0, -(z1 + z2), z1 * z2),
            _ => (1.0, 0.0, 0.0),
        };
        let (a1, a2) = if first_order {
            (-p1.re, 0.0)
        } else {
            (-(p1 + p2).re, (p1 * p2).re)
        };
        sections.push(Biquad { b0, b1, b2, a1, a2 });
    }

    // Normalise passband gain to unity at a reference frequency.
    let f_ref = match band {
        Band::Lowpass { .. } => 0.0,
        Band::Highpass { .. } => fs / 2.0,
        Band::Bandpass { low_hz, high_hz } => (low_hz * high_hz).sqrt(),
    };
    let omega = 2.0 * PI * f_ref / fs;
    let gain: Complex64 = sections.iter().map(|s| s.response(omega)).product();
    let magnitude = gain.norm();
    if !magnitude.is_finite() || magnitude <= 0.0 {
        return Err("degenerate gain at reference frequency".into());
    }
    let scale = 1.0 / magnitude;
    if let Some(first) = sections.first_mut() {
        first.b0 *= scale;
        first.b1 *= scale;
        first.b2 *= scale;
    }

    Ok(sections)
}

/// Design a band-pass cascade directly, for embedders that want to reuse
/// one design across many records.
pub fn design_bandpass(low_hz: f64, high_hz: f64, order: usize, fs: f64) -> Result<Vec<Biquad>, String> {
    design(Band::Bandpass { low_hz, high_hz }, order, fs)
}

/// Apply a cascade forward and backward with odd-extension padding.
/// Output length equals input length; phase is cancelled exactly.
pub fn zero_phase(sections: &[Biquad], data: &[f64]) -> Vec<f64> {
    let n = data.len();
    if n < 2 || sections.is_empty() {
        return data.to_vec();
    }
    let pad = (3 * (2 * sections.len() + 1)).min(n - 1);

    let mut ext = Vec::with_capacity(n + 2 * pad);
    for i in (1..=pad).rev() {
        ext.push(2.0 * data[0] - data[i]);
    }
    ext.extend_from_slice(data);
    for i in 1..=pad {
        ext.push(2.0 * data[n - 1] - data[n - 1 - i]);
    }

    for s in sections {
        s.apply(&mut ext);
    }
    ext.reverse();
    for s in sections {
        s.apply(&mut ext);
    }
    ext.reverse();

    ext[pad..pad + n].to_vec()
}

/// Filter a seismogram with user-facing validation.
///
/// `low_hz` absent (or <= 0) selects a high-pass at `high_hz`; `high_hz`
/// absent selects a low-pass at `low_hz`. Corners too close to Nyquist are
/// clamped to 0.9 * Nyquist and the clamp is recorded; a band that is still
/// inverted after clamping fails with `invalid_band`. The input is returned
/// unchanged on failure.
pub fn bandpass(
    data: &[f64],
    fs: f64,
    low_hz: Option<f64>,
    high_hz: Option<f64>,
    order: usize,
) -> (Vec<f64>, FilterOutcome) {
    if data.is_empty() {
        return (Vec::new(), FilterOutcome::failure("empty_data", "Ingen data at filtrere"));
    }
    if fs <= 0.0 {
        return (
            data.to_vec(),
            FilterOutcome::failure("invalid_sampling_rate", format!("Ugyldig sampling rate: {} Hz", fs)),
        );
    }

    // Reject mostly-broken data; drop scattered non-finite samples.
    let finite_count = data.iter().filter(|v| v.is_finite()).count();
    if (finite_count as f64) < (data.len() as f64) * 0.5 {
        return (
            data.to_vec(),
            FilterOutcome::failure("invalid_data", "For mange ugyldige værdier i data"),
        );
    }
    let mut adjustments = Vec::new();
    let clean: Vec<f64> = if finite_count < data.len() {
        adjustments.push(format!("fjernede {} ikke-finite samples", data.len() - finite_count));
        data.iter().copied().filter(|v| v.is_finite()).collect()
    } else {
        data.to_vec()
    };

    let nyquist = fs / 2.0;
    let low = low_hz.filter(|v| *v > 0.0);
    let high = high_hz;

    let (band, effective_low, effective_high) = match (low, high) {
        (None, Some(hi)) => {
            if hi >= nyquist * 0.95 {
                return (
                    data.to_vec(),
                    FilterOutcome::failure(
                        "frequency_too_high",
                        format!("Høj frekvens ({:.1} Hz) for tæt på Nyquist ({:.1} Hz)", hi, nyquist),
                    )
                    .with_suggestion(format!("Prøv en frekvens under {:.1} Hz", nyquist * 0.8)),
                );
            }
            (Band::Highpass { cut_hz: hi }, None, Some(hi))
        }
        (Some(lo), None) => {
            if lo >= nyquist * 0.95 {
                return (
                    data.to_vec(),
                    FilterOutcome::failure(
                        "frequency_too_high",
                        format!("Lav frekvens ({:.1} Hz) for tæt på Nyquist ({:.1} Hz)", lo, nyquist),
                    ),
                );
            }
            (Band::Lowpass { cut_hz: lo }, Some(lo), None)
        }
        (None, None) => {
            return (clean, FilterOutcome::skipped());
        }
        (Some(mut lo), Some(mut hi)) => {
            if hi >= nyquist * 0.95 {
                let adjusted = nyquist * 0.9;
                adjustments.push(format!("høj frekvens justeret {:.3} -> {:.3} Hz (Nyquist grænse)", hi, adjusted));
                hi = adjusted;
            }
            if lo < 0.005 {
                adjustments.push(format!("lav frekvens justeret {:.4} -> 0.005 Hz (stabilitet)", lo));
                lo = 0.005;
            }
            if lo >= hi {
                return (
                    data.to_vec(),
                    FilterOutcome::failure(
                        "invalid_band",
                        format!(
                            "Lav frekvens ({:.2} Hz) skal være mindre end høj frekvens ({:.2} Hz)",
                            lo, hi
                        ),
                    ),
                );
            }
            (Band::Bandpass { low_hz: lo, high_hz: hi }, Some(lo), Some(hi))
        }
    };

    let sections = match design(band, order, fs) {
        Ok(s) => s,
        Err(e) => {
            return (
                data.to_vec(),
                FilterOutcome::failure("filter_error", format!("Filter fejl: {}", e))
                    .with_suggestion("Prøv et bredere frekvensbånd"),
            );
        }
    };

    let filtered = zero_phase(&sections, &clean);
    if filtered.iter().any(|v| !v.is_finite()) {
        return (
            data.to_vec(),
            FilterOutcome::failure("filter_produced_invalid", "Filter producerede ugyldige værdier")
                .with_suggestion("Prøv et andet filter eller lavere orden"),
        );
    }

    let kind = match band {
        Band::Lowpass { .. } => FilterKind::Lowpass,
        Band::Highpass { .. } => FilterKind::Highpass,
        Band::Bandpass { .. } => FilterKind::Bandpass,
    };
    let mut outcome = FilterOutcome::success(
        kind,
        FilterParameters {
            low_hz: effective_low,
            high_hz: effective_high,
            order,
            sampling_rate_hz: fs,
        },
    );
    outcome.adjustments = adjustments;
    (filtered, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FilterKind;

    fn sine(freq: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * freq * i as f64 / fs).sin()).collect()
    }

    fn rms(x: &[f64]) -> f64 {
        (x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64).sqrt()
    }

    #[test]
    fn test_length_preserved_and_finite() {
        let data = sine(1.0, 100.0, 4096);
        let (out, status) = bandpass(&data, 100.0, Some(0.5), Some(5.0), 4);
        assert!(status.success);
        assert_eq!(out.len(), data.len());
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_passband_sine_survives() {
        let data = sine(1.0, 100.0, 8192);
        let (out, status) = bandpass(&data, 100.0, Some(0.5), Some(5.0), 4);
        assert!(status.success);
        let ratio = rms(&out[1000..7000]) / rms(&data[1000..7000]);
        assert!(ratio > 0.9 && ratio < 1.1, "passband gain ratio {}", ratio);
    }

    #[test]
    fn test_stopband_sine_attenuated() {
        // 20 Hz sine through a 0.5-5 Hz bandpass: two octaves above the
        // upper corner of an order-4 design, squared by filtfilt.
        let data = sine(20.0, 100.0, 8192);
        let (out, status) = bandpass(&data, 100.0, Some(0.5), Some(5.0), 4);
        assert!(status.success);
        let ratio = rms(&out[1000..7000]) / rms(&data[1000..7000]);
        assert!(ratio < 0.01, "stopband leakage ratio {}", ratio);
    }

    #[test]
    fn test_highpass_when_low_absent() {
        let data = sine(1.0, 100.0, 2048);
        let (_, status) = bandpass(&data, 100.0, None, Some(5.0), 4);
        assert!(status.success);
        assert_eq!(status.filter_type, FilterKind::Highpass);
    }

    #[test]
    fn test_lowpass_when_high_absent() {
        let data = sine(1.0, 100.0, 2048);
        let (_, status) = bandpass(&data, 100.0, Some(5.0), None, 4);
        assert!(status.success);
        assert_eq!(status.filter_type, FilterKind::Lowpass);
    }

    #[test]
    fn test_nyquist_clamp_scenario() {
        // fs = 1 Hz, requested band 0.1-0.6: the upper corner is clamped to
        // 0.9 * Nyquist = 0.45 and the filter still succeeds as a bandpass.
        let data = sine(0.2, 1.0, 1024);
        let (_, status) = bandpass(&data, 1.0, Some(0.1), Some(0.6), 4);
        assert!(status.success, "status: {:?}", status);
        assert_eq!(status.filter_type, FilterKind::Bandpass);
        let params = status.parameters.expect("parameters");
        assert!((params.high_hz.expect("high") - 0.45).abs() < 1e-9);
        assert!(!status.adjustments.is_empty());
    }

    #[test]
    fn test_inverted_band_fails_in_band() {
        let data = sine(0.2, 100.0, 1024);
        let (out, status) = bandpass(&data, 100.0, Some(5.0), Some(1.0), 4);
        assert!(!status.success);
        assert_eq!(status.reason.as_deref(), Some("invalid_band"));
        assert_eq!(out, data);
    }

    #[test]
    fn test_empty_data_fails() {
        let (out, status) = bandpass(&[], 100.0, Some(0.5), Some(5.0), 4);
        assert!(!status.success);
        assert_eq!(status.reason.as_deref(), Some("empty_data"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_mostly_nan_rejected() {
        let mut data = vec![f64::NAN; 100];
        for v in data.iter_mut().take(20) {
            *v = 1.0;
        }
        let (_, status) = bandpass(&data, 100.0, Some(0.5), Some(5.0), 4);
        assert!(!status.success);
        assert_eq!(status.reason.as_deref(), Some("invalid_data"));
    }

    #[test]
    fn test_scattered_nan_dropped() {
        let mut data = sine(1.0, 100.0, 1000);
        data[10] = f64::NAN;
        data[500] = f64::INFINITY;
        let (out, status) = bandpass(&data, 100.0, Some(0.5), Some(5.0), 4);
        assert!(status.success);
        assert_eq!(out.len(), 998);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_zero_phase_preserves_peak_position() {
        // An impulse stays centred after forward-backward filtering.
        let mut data = vec![0.0; 2001];
        data[1000] = 1.0;
        let sections = design(Band::Bandpass { low_hz: 0.5, high_hz: 5.0 }, 4, 100.0)
            .expect("design");
        let out = zero_phase(&sections, &data);
        let peak = out
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.abs().partial_cmp(&b.abs()).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0);
        assert!((peak as i64 - 1000).abs() <= 2, "peak drifted to {}", peak);
    }

    #[test]
    fn test_broadband_passthrough() {
        let data = sine(1.0, 100.0, 256);
        let (out, status) = bandpass(&data, 100.0, None, None, 4);
        assert!(status.success);
        assert_eq!(status.filter_type, FilterKind::None);
        assert_eq!(out, data);
    }
}

//! Instrument response removal to displacement.
//!
//! Frequency-domain deconvolution of the pole-zero stage response with a
//! water-level floor and a cosine-taper pre-filter. The water level keeps
//! the division from blowing up noise where the instrument is deaf; the
//! taper confines the deconvolved output to the band the response model is
//! trusted in.

use super::AcquisitionError;
use crate::fdsn::InstrumentResponse;
use num_complex::Complex64;
use rustfft::{num_complex::Complex, FftPlanner};
use std::f64::consts::PI;

/// Water level below the response peak, dB.
pub const PRE_FILTER_WATER_LEVEL_DB: f64 = 60.0;

/// Evaluate the displacement response (counts per metre) at a signed
/// frequency in Hz.
pub fn evaluate_response(response: &InstrumentResponse, freq_hz: f64) -> Complex64 {
    let s = Complex64::new(0.0, 2.0 * PI * freq_hz);
    let mut numerator = Complex64::new(1.0, 0.0);
    for zero in &response.zeros {
        numerator *= s - zero;
    }
    let mut denominator = Complex64::new(1.0, 0.0);
    for pole in &response.poles {
        denominator *= s - pole;
    }
    if denominator.norm() == 0.0 {
        return Complex64::new(0.0, 0.0);
    }
    numerator / denominator * (response.normalization * response.sensitivity)
}

/// Cosine taper between the four pre-filter corners, evaluated at |f|.
fn cosine_taper(freq_hz: f64, corners: [f64; 4]) -> f64 {
    let f = freq_hz.abs();
    let [f1, f2, f3, f4] = corners;
    if f < f1 || f > f4 {
        0.0
    } else if f < f2 {
        0.5 * (1.0 - (PI * (f2 - f) / (f2 - f1)).cos())
    } else if f <= f3 {
        1.0
    } else {
        0.5 * (1.0 + (PI * (f4 - f) / (f4 - f3)).cos())
    }
}

/// Deconvolve the instrument response from a counts series, returning
/// ground displacement in metres.
pub fn remove_response(
    counts: &[f64],
    fs: f64,
    response: &InstrumentResponse,
    pre_filter: [f64; 4],
    water_level_db: f64,
) -> Result<Vec<f64>, AcquisitionError> {
    if counts.is_empty() {
        return Err(AcquisitionError::EmptyData);
    }
    if response.sensitivity == 0.0 {
        return Err(AcquisitionError::ResponseRemoval("zero sensitivity".into()));
    }
    let n = counts.len();
    let nfft = n.next_power_of_two();

    let mean = counts.iter().sum::<f64>() / n as f64;
    let mut buffer: Vec<Complex<f64>> = Vec::with_capacity(nfft);
    buffer.extend(counts.iter().map(|v| Complex::new(v - mean, 0.0)));
    buffer.resize(nfft, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(nfft).process(&mut buffer);

    let df = fs / nfft as f64;
    // Water level relative to the response peak inside the usable band.
    let mut peak = 0.0_f64;
    for k in 1..=nfft / 2 {
        peak = peak.max(evaluate_response(response, k as f64 * df).norm());
    }
    if peak == 0.0 {
        return Err(AcquisitionError::ResponseRemoval("response is identically zero".into()));
    }
    let floor = peak * 10.0_f64.powf(-water_level_db / 20.0);

    for (k, value) in buffer.iter_mut().enumerate() {
        if k == 0 {
            *value = Complex::new(0.0, 0.0);
            continue;
        }
        let freq = if k <= nfft / 2 {
            k as f64 * df
        } else {
            (k as f64 - nfft as f64) * df
        };
        let mut h = evaluate_response(response, freq);
        let magnitude = h.norm();
        if magnitude < floor {
            h = if magnitude > 0.0 {
                h / magnitude * floor
            } else {
                Complex64::new(floor, 0.0)
            };
        }
        let corrected = Complex64::new(value.re, value.im) / h * cosine_taper(freq, pre_filter);
        *value = Complex::new(corrected.re, corrected.im);
    }

    planner.plan_fft_inverse(nfft).process(&mut buffer);
    let scale = 1.0 / nfft as f64;
    let displacement: Vec<f64> = buffer.iter().take(n).map(|c| c.re * scale).collect();
    if displacement.iter().any(|v| !v.is_finite()) {
        return Err(AcquisitionError::ResponseRemoval("deconvolution produced non-finite output".into()));
    }
    Ok(displacement)
}

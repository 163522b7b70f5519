//! Signal Kernel
//!
//! Stateless numeric primitives on 1-D real-valued seismograms. All
//! operations are pure: they take slices, return fresh vectors, and report
//! problems in-band through status records instead of panicking.
//!
//! - `butterworth` - zero-phase Butterworth band/low/high-pass
//! - `despike` - robust MAD-based spike removal
//! - `noise` - pre-event noise statistics and sliding SNR
//! - `trigger` - STA/LTA onset detection
//! - `spectrum` - real-FFT period analysis of the surface-wave window
//! - `processor` - preset-driven per-component conditioning pipeline

mod butterworth;
mod despike;
mod noise;
mod processor;
mod spectrum;
mod trigger;

pub use butterworth::{bandpass, design_bandpass, zero_phase, Biquad};
pub use despike::remove_spikes;
pub use noise::{estimate_noise, snr_quality, snr_series, SnrQuality};
pub use processor::{process_waveform, ProcessingOptions};
pub use spectrum::{fft_periods, PeriodSpectrum};
pub use trigger::{sta_lta, StaLtaConfig};

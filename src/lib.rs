//! Seismos: teleseismic analysis workbench.
//!
//! Given a catalog earthquake and a candidate recording station, the
//! workbench retrieves three-component broadband seismograms from an FDSN
//! archive, conditions them, and computes the surface-wave magnitude Ms
//! with supporting diagnostics.
//!
//! ## Architecture
//!
//! - **Signal Kernel**: pure numeric primitives (zero-phase Butterworth,
//!   despiking, noise/SNR, STA/LTA, FFT period analysis)
//! - **Arrival Model**: travel-time oracle adapter plus the empirical
//!   surface-wave velocity model
//! - **Magnitude Estimator**: IASPEI 2013 Ms with corrections and a full
//!   explanation record
//! - **Wave Classifier**: Love/Rayleigh/Mixed energy-ratio classification
//! - **Station Selector / Waveform Acquirer**: inventory ranking, channel
//!   fallback downloads, response removal to displacement
//! - **Analysis Coordinator**: caches, failed-station tracking and the
//!   fail-forward orchestration

pub mod acquisition;
pub mod arrivals;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod export;
pub mod fdsn;
pub mod geo;
pub mod inventory;
pub mod magnitude;
pub mod pipeline;
pub mod selection;
pub mod signal;
pub mod synthetic;
pub mod types;

// Re-export the records most embedders touch.
pub use types::{
    AmplitudeUnits, Component, DominantWaveType, Event, Filter, FilterPreset, MsExplanation,
    ProcessedWaveform, Station, WaveClassification, Waveform,
};

// Re-export the operational surface.
pub use catalog::EventSearch;
pub use export::ExportOptions;
pub use magnitude::{compute_ms, MsOptions};
pub use pipeline::{AnalysisCoordinator, CoordinatorError, MsRequest, SessionPhase};
pub use signal::{process_waveform, ProcessingOptions};

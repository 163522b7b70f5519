//! Core data model for the analysis workbench.
//!
//! Every record that crosses a component boundary lives here: catalog
//! events, candidate stations with attached arrivals, canonical waveforms,
//! processing results, the Ms explanation record and the wave-type
//! classification. All records are serde-serialisable so they can be cached,
//! persisted and exported without a translation layer.

mod classification;
mod event;
mod filter;
mod magnitude;
mod processed;
mod station;
mod waveform;

pub use classification::{DominantWaveType, WaveClassification};
pub use event::Event;
pub use filter::{Filter, FilterPreset};
pub use magnitude::{
    DepthCorrection, DistanceCorrection, MsAmplitudes, MsCalculation, MsExplanation, MsFailure,
    MsFilterInfo, MsParameters, MsValidation, UsedComponent, ValidationIssue, ValidationIssueKind,
};
pub use processed::{
    ComponentFilterStatus, FilterInfo, FilterKind, FilterOutcome, FilterParameters, NoiseStats,
    ProcessedWaveform, SnrSeries,
};
pub use station::{OperationalWindow, Station, StationArrivals, SurfaceFactors};
pub use waveform::{AmplitudeUnits, Component, ComponentSeries, TimingValidation, Waveform};

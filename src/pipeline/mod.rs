//! Analysis Pipeline
//!
//! ```text
//! Event -> StationSelector -> chosen Station -> WaveformAcquirer
//!       -> SignalKernel (despike/filter) -> { ArrivalModel,
//!          MagnitudeEstimator, WaveClassifier } -> Export
//! ```
//!
//! The coordinator owns the caches and the failure policy; everything
//! below it is pure or capability-injected. For a given (event, station)
//! the ordering select -> acquire -> condition -> magnitude/classify is
//! strict; distinct stations may overlap.

mod cache;
mod coordinator;
mod persistence;
mod state;

pub use cache::TtlLruCache;
pub use coordinator::{AnalysisCoordinator, CoordinatorError, MsRequest};
pub use persistence::{StorageError, WaveformStore};
pub use state::{SessionPhase, SessionStats};

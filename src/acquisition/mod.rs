//! Waveform acquisition.
//!
//! Downloads three-component data through the injected FDSN client with a
//! channel-priority fallback chain, merges and deduplicates traces, removes
//! the instrument response to displacement and builds the canonical
//! [`crate::types::Waveform`] record.

mod acquirer;
mod response;

pub use acquirer::WaveformAcquirer;
pub use response::{evaluate_response, remove_response, PRE_FILTER_WATER_LEVEL_DB};

use thiserror::Error;

/// Errors during acquisition. A station simply having no data is not an
/// error; the acquirer reports that as `None`.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Response removal failed: {0}")]
    ResponseRemoval(String),

    #[error("Trace set is inconsistent: {0}")]
    InconsistentTraces(String),

    #[error("Empty trace data")]
    EmptyData,
}

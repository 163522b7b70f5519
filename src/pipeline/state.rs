//! Session state machine.
//!
//! The coordinator exposes its progress as an explicit state the UI shell
//! observes; the shell never mutates caches or state directly.

use serde::{Deserialize, Serialize};

/// Where the analysis session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Nothing selected yet.
    Idle,
    /// Station search in flight.
    Searching,
    /// Candidates ready, none chosen.
    StationsReady,
    /// Waveform download in flight.
    Downloading,
    /// Waveform loaded and analysable.
    WaveformReady,
    /// All candidates exhausted or a terminal error occurred.
    Failed,
}

impl SessionPhase {
    /// Valid transitions; anything else is a coordinator bug worth logging.
    pub fn can_transition_to(self, next: SessionPhase) -> bool {
        use SessionPhase::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (_, Idle)
                | (Idle, Searching)
                | (StationsReady, Searching)
                | (WaveformReady, Searching)
                | (Failed, Searching)
                | (Searching, StationsReady)
                | (Searching, Failed)
                | (StationsReady, Downloading)
                | (WaveformReady, Downloading)
                | (Downloading, WaveformReady)
                | (Downloading, StationsReady)
                | (Downloading, Failed)
        )
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "Idle"),
            SessionPhase::Searching => write!(f, "Searching"),
            SessionPhase::StationsReady => write!(f, "StationsReady"),
            SessionPhase::Downloading => write!(f, "Downloading"),
            SessionPhase::WaveformReady => write!(f, "WaveformReady"),
            SessionPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Counters the UI surfaces in a status footer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub searches_run: u64,
    pub waveforms_downloaded: u64,
    pub downloads_failed: u64,
    pub fallbacks_taken: u64,
    pub ms_computed: u64,
    pub cache_hits: u64,
}

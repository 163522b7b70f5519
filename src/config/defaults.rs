//! Built-in defaults shared by the config layer and tests.

/// Seconds of data requested before the origin time.
pub const ACQUISITION_PRE_EVENT_S: i64 = 180;

/// Seconds of data requested after the origin time.
pub const ACQUISITION_POST_EVENT_S: i64 = 1800;

/// Channel band patterns tried in priority order.
pub const CHANNEL_PATTERNS: [&str; 3] = ["BH?", "HH?", "SH?"];

/// Inventory query half-window around the origin time, seconds.
pub const INVENTORY_WINDOW_S: i64 = 86_400;

/// Inventory query timeout, seconds.
pub const INVENTORY_TIMEOUT_S: u64 = 30;

/// Per-station availability probe timeout, seconds.
pub const PROBE_TIMEOUT_S: u64 = 5;

/// Seconds of data requested by an availability probe.
pub const PROBE_WINDOW_S: i64 = 30;

/// Bounded worker pool size for probes and other fan-out work.
pub const MAX_WORKERS: usize = 10;

/// Cache time-to-live, hours.
pub const CACHE_TTL_HOURS: u64 = 24;

/// Cache LRU capacity, entries.
pub const CACHE_CAPACITY: usize = 50;

/// Preferred networks queried at station level.
pub const PREFERRED_NETWORKS: &str = "IU,II,G,GE,GT,IC";

/// Butterworth order used throughout.
pub const FILTER_ORDER: usize = 4;

/// Z-score threshold for spike detection.
pub const SPIKE_THRESHOLD: f64 = 5.0;

/// Median filter window for spike replacement, samples.
pub const SPIKE_WINDOW: usize = 5;

/// Pre-event noise window, seconds.
pub const NOISE_WINDOW_S: f64 = 60.0;

/// SNR sliding window, seconds.
pub const SNR_WINDOW_S: f64 = 10.0;

/// Reference period for Ms, seconds.
pub const MS_PERIOD_S: f64 = 20.0;

/// Surface-wave analysis window for the automatic first Ms, seconds.
pub const MS_WINDOW_DURATION_S: f64 = 600.0;

/// Maximum STA/LTA timing correction that will be applied, seconds.
pub const MAX_TIMING_CORRECTION_S: f64 = 10.0;

/// Plausible implicit P velocity bounds, km/s.
pub const P_VELOCITY_BOUNDS_KMS: (f64, f64) = (5.8, 13.7);

/// Export row cap before down-sampling.
pub const EXPORT_MAX_SAMPLES: usize = 7200;

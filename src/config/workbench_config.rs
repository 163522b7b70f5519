//! Workbench configuration loaded from TOML.

use super::defaults;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Station search defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub min_distance_km: f64,
    pub max_distance_km: f64,
    pub target_stations: usize,
    /// Comma-separated network list sent to the inventory service.
    pub preferred_networks: String,
    /// Run availability probes on ranked candidates.
    pub probe_enabled: bool,
    pub probe_timeout_s: u64,
    pub probe_window_s: i64,
    pub max_workers: usize,
    pub inventory_timeout_s: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_distance_km: 500.0,
            max_distance_km: 3000.0,
            target_stations: 3,
            preferred_networks: defaults::PREFERRED_NETWORKS.to_string(),
            probe_enabled: false,
            probe_timeout_s: defaults::PROBE_TIMEOUT_S,
            probe_window_s: defaults::PROBE_WINDOW_S,
            max_workers: defaults::MAX_WORKERS,
            inventory_timeout_s: defaults::INVENTORY_TIMEOUT_S,
        }
    }
}

/// Waveform download window and timing options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    pub pre_event_s: i64,
    pub post_event_s: i64,
    /// Apply the STA/LTA timing correction when a confident pick is found.
    pub timing_correction_enabled: bool,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            pre_event_s: defaults::ACQUISITION_PRE_EVENT_S,
            post_event_s: defaults::ACQUISITION_POST_EVENT_S,
            timing_correction_enabled: false,
        }
    }
}

/// Cache sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_hours: u64,
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_hours: defaults::CACHE_TTL_HOURS, capacity: defaults::CACHE_CAPACITY }
    }
}

/// Export sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub max_samples: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { max_samples: defaults::EXPORT_MAX_SAMPLES }
    }
}

/// Top-level workbench configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    pub search: SearchConfig,
    pub acquisition: AcquisitionConfig,
    pub cache: CacheConfig,
    pub export: ExportConfig,
}

impl WorkbenchConfig {
    /// Load from `SEISMOS_CONFIG`, then `workbench.toml` in the working
    /// directory, then built-in defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("SEISMOS_CONFIG") {
            match Self::from_file(&path) {
                Ok(cfg) => {
                    info!(path = %path, "Loaded workbench config from SEISMOS_CONFIG");
                    return cfg;
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "SEISMOS_CONFIG unreadable, falling back");
                }
            }
        }
        match Self::from_file("workbench.toml") {
            Ok(cfg) => {
                info!("Loaded workbench config from ./workbench.toml");
                cfg
            }
            Err(_) => {
                info!("Using built-in workbench defaults");
                Self::default()
            }
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e.to_string()))?;
        let cfg: Self = toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations that would make the pipeline misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.min_distance_km >= self.search.max_distance_km {
            return Err(ConfigError::Invalid(
                "search.min_distance_km must be below search.max_distance_km".into(),
            ));
        }
        if self.search.target_stations == 0 {
            return Err(ConfigError::Invalid("search.target_stations must be at least 1".into()));
        }
        if self.search.max_workers == 0 || self.search.max_workers > 10 {
            return Err(ConfigError::Invalid("search.max_workers must be in 1..=10".into()));
        }
        if self.cache.capacity == 0 {
            return Err(ConfigError::Invalid("cache.capacity must be at least 1".into()));
        }
        if self.acquisition.pre_event_s < 0 || self.acquisition.post_event_s <= 0 {
            return Err(ConfigError::Invalid("acquisition window must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {0}: {1}")]
    Io(String, String),
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(WorkbenchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: WorkbenchConfig = toml::from_str(
            r#"
            [search]
            target_stations = 5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.search.target_stations, 5);
        assert_eq!(cfg.search.min_distance_km, 500.0);
        assert_eq!(cfg.cache.capacity, 50);
    }

    #[test]
    fn test_inverted_distance_range_rejected() {
        let cfg: WorkbenchConfig = toml::from_str(
            r#"
            [search]
            min_distance_km = 4000.0
            max_distance_km = 1000.0
            "#,
        )
        .unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_worker_cap_enforced() {
        let cfg: WorkbenchConfig = toml::from_str(
            r#"
            [search]
            max_workers = 32
            "#,
        )
        .unwrap();
        assert!(cfg.validate().is_err());
    }
}

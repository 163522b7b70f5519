//! Workbench Configuration Module
//!
//! Per-deployment configuration loaded from TOML files, replacing hardcoded
//! search windows, cache sizes and acquisition parameters with tunable
//! values.
//!
//! ## Loading Order
//!
//! 1. `SEISMOS_CONFIG` environment variable (path to TOML file)
//! 2. `workbench.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(WorkbenchConfig::load());
//!
//! // Anywhere in the codebase:
//! let target = config::get().search.target_stations;
//! ```

pub mod defaults;
mod workbench_config;

pub use workbench_config::{
    AcquisitionConfig, CacheConfig, ConfigError, ExportConfig, SearchConfig, WorkbenchConfig,
};

use std::sync::OnceLock;

/// Global workbench configuration, initialized once at startup.
static WORKBENCH_CONFIG: OnceLock<WorkbenchConfig> = OnceLock::new();

/// Initialize the global configuration.
///
/// Later calls are ignored with a warning so tests that share a process
/// cannot clobber each other.
pub fn init(config: WorkbenchConfig) {
    if WORKBENCH_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once - ignoring");
    }
}

/// Get the global configuration, falling back to defaults when `init()` was
/// never called (library embedders and unit tests).
pub fn get() -> &'static WorkbenchConfig {
    WORKBENCH_CONFIG.get_or_init(WorkbenchConfig::default)
}

/// Whether `init()` has run.
pub fn is_initialized() -> bool {
    WORKBENCH_CONFIG.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_without_init_uses_defaults() {
        let cfg = get();
        assert!(cfg.search.max_workers <= 10);
    }
}

//! Filter selection: named presets or a custom band.

use serde::{Deserialize, Serialize};

/// Named band-pass presets, in Hz. `Broadband` applies no filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterPreset {
    /// No filtering, full bandwidth.
    Broadband,
    /// P waves: sharp high-frequency onsets, 1.0 - 10.0 Hz.
    PWaves,
    /// S waves: medium frequency, 0.5 - 5.0 Hz.
    SWaves,
    /// Surface waves: 2 - 50 s period, 0.02 - 0.5 Hz. The Ms band.
    Surface,
    /// Long period: 10 - 200 s, 0.005 - 0.1 Hz, for great earthquakes.
    LongPeriod,
}

impl FilterPreset {
    /// (low, high) corner frequencies in Hz; `None` for broadband.
    pub fn band(&self) -> Option<(f64, f64)> {
        match self {
            FilterPreset::Broadband => None,
            FilterPreset::PWaves => Some((1.0, 10.0)),
            FilterPreset::SWaves => Some((0.5, 5.0)),
            FilterPreset::Surface => Some((0.02, 0.5)),
            FilterPreset::LongPeriod => Some((0.005, 0.1)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterPreset::Broadband => "broadband",
            FilterPreset::PWaves => "p_waves",
            FilterPreset::SWaves => "s_waves",
            FilterPreset::Surface => "surface",
            FilterPreset::LongPeriod => "long_period",
        }
    }
}

/// A filter request from the caller: preset, custom band, or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    Named { preset: FilterPreset },
    Custom { low_hz: f64, high_hz: f64 },
    None,
}

impl Filter {
    /// Resolve to a concrete (low, high) band; `None` means no filtering.
    pub fn band(&self) -> Option<(f64, f64)> {
        match self {
            Filter::Named { preset } => preset.band(),
            Filter::Custom { low_hz, high_hz } => Some((*low_hz, *high_hz)),
            Filter::None => None,
        }
    }

    /// Human-readable name used in processing reports and export columns.
    pub fn label(&self) -> String {
        match self {
            Filter::Named { preset } => preset.label().to_string(),
            Filter::Custom { low_hz, high_hz } => format!("custom_{}-{}Hz", low_hz, high_hz),
            Filter::None => "broadband".to_string(),
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Filter::Named { preset: FilterPreset::Broadband }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_bands() {
        assert_eq!(FilterPreset::Broadband.band(), None);
        assert_eq!(FilterPreset::PWaves.band(), Some((1.0, 10.0)));
        assert_eq!(FilterPreset::SWaves.band(), Some((0.5, 5.0)));
        assert_eq!(FilterPreset::Surface.band(), Some((0.02, 0.5)));
        assert_eq!(FilterPreset::LongPeriod.band(), Some((0.005, 0.1)));
    }

    #[test]
    fn test_custom_band() {
        let filter = Filter::Custom { low_hz: 0.1, high_hz: 2.0 };
        assert_eq!(filter.band(), Some((0.1, 2.0)));
        assert_eq!(filter.label(), "custom_0.1-2Hz");
    }

    #[test]
    fn test_default_is_broadband() {
        assert_eq!(Filter::default().band(), None);
    }
}

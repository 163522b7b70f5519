//! Catalog event record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog-level earthquake. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Catalog identifier (last path segment of the FDSN resource id).
    pub id: String,
    /// Origin time, UTC. All arrival times are seconds relative to this.
    pub origin_time: DateTime<Utc>,
    /// Epicentre latitude in degrees.
    pub latitude: f64,
    /// Epicentre longitude in degrees.
    pub longitude: f64,
    /// Hypocentre depth in km, >= 0.
    pub depth_km: f64,
    /// Catalog magnitude.
    pub magnitude: f64,
    /// Magnitude type as reported by the catalog (Mw, mb, ...).
    pub magnitude_type: String,
    /// Flinn-Engdahl style region description.
    pub region: String,
}

impl Event {
    /// Stable cache key component for this event.
    pub fn key(&self) -> String {
        format!("{}@{}", self.id, self.origin_time.timestamp())
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "M{:.1} {} ({})",
            self.magnitude,
            self.region,
            self.origin_time.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tohoku() -> Event {
        Event {
            id: "official20110311054623".into(),
            origin_time: "2011-03-11T05:46:23Z".parse().unwrap(),
            latitude: 38.297,
            longitude: 142.373,
            depth_km: 29.0,
            magnitude: 9.1,
            magnitude_type: "Mw".into(),
            region: "Near the east coast of Honshu, Japan".into(),
        }
    }

    #[test]
    fn test_event_display() {
        let text = format!("{}", tohoku());
        assert!(text.starts_with("M9.1"));
        assert!(text.contains("Honshu"));
    }

    #[test]
    fn test_event_key_is_stable() {
        assert_eq!(tohoku().key(), tohoku().key());
    }

    #[test]
    fn test_event_roundtrips_through_json() {
        let event = tohoku();
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}

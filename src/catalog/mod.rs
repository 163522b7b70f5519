//! Earthquake catalog search.
//!
//! Thin layer over the FDSN event service: builds the query, converts raw
//! catalog entries into [`Event`] records (depth in km, newest first) and
//! produces the cache key the coordinator stores results under.

use crate::fdsn::{EventOrder, EventQuery, FdsnClient, FdsnError, RawEvent};
use chrono::{Datelike, TimeZone, Utc};
use thiserror::Error;
use tracing::info;

use crate::types::Event;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Event service failed: {0}")]
    Service(#[from] FdsnError),

    #[error("Invalid search parameters: {0}")]
    InvalidQuery(String),
}

/// User-level catalog search parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSearch {
    pub magnitude_range: (f64, f64),
    /// Inclusive year span; `None` uses a trailing window.
    pub year_range: Option<(i32, i32)>,
    pub depth_range_km: (f64, f64),
    /// Trailing window in days when no year range is given.
    pub days: Option<i64>,
    pub limit: usize,
}

impl Default for EventSearch {
    fn default() -> Self {
        Self {
            magnitude_range: (6.0, 10.0),
            year_range: None,
            depth_range_km: (0.0, 700.0),
            days: None,
            limit: 500,
        }
    }
}

impl EventSearch {
    /// Cache key covering every parameter of the query.
    pub fn cache_key(&self) -> String {
        format!(
            "events:{:.1}-{:.1}:{:?}:{:.0}-{:.0}:{:?}:{}",
            self.magnitude_range.0,
            self.magnitude_range.1,
            self.year_range,
            self.depth_range_km.0,
            self.depth_range_km.1,
            self.days,
            self.limit
        )
    }

    fn to_query(&self) -> Result<EventQuery, CatalogError> {
        if self.magnitude_range.0 > self.magnitude_range.1 {
            return Err(CatalogError::InvalidQuery("magnitude range inverted".into()));
        }
        let (start, end) = if let Some(days) = self.days {
            let end = Utc::now();
            (end - chrono::Duration::days(days), end)
        } else if let Some((from, to)) = self.year_range {
            let start = Utc
                .with_ymd_and_hms(from, 1, 1, 0, 0, 0)
                .single()
                .ok_or_else(|| CatalogError::InvalidQuery(format!("bad year {}", from)))?;
            let end = Utc
                .with_ymd_and_hms(to, 12, 31, 23, 59, 59)
                .single()
                .ok_or_else(|| CatalogError::InvalidQuery(format!("bad year {}", to)))?;
            (start, end)
        } else {
            let end = Utc::now();
            (end - chrono::Duration::days(180), end)
        };
        Ok(EventQuery {
            start,
            end,
            min_magnitude: self.magnitude_range.0,
            max_magnitude: self.magnitude_range.1,
            min_depth_km: self.depth_range_km.0,
            max_depth_km: self.depth_range_km.1,
            order: EventOrder::Time,
            limit: self.limit,
        })
    }
}

/// Convert one raw catalog entry; depth arrives in metres.
fn to_event(raw: RawEvent) -> Event {
    let region = raw
        .description
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format!("Lat: {:.2}, Lon: {:.2}", raw.latitude, raw.longitude));
    Event {
        id: raw.event_id,
        origin_time: raw.origin_time,
        latitude: raw.latitude,
        longitude: raw.longitude,
        depth_km: raw.depth_m.map(|m| m / 1000.0).unwrap_or(10.0),
        magnitude: raw.magnitude,
        magnitude_type: raw.magnitude_type.unwrap_or_else(|| "M".into()),
        region,
    }
}

/// Run a catalog search and return events newest first.
pub async fn search_earthquakes(
    client: &dyn FdsnClient,
    search: &EventSearch,
) -> Result<Vec<Event>, CatalogError> {
    let query = search.to_query()?;
    info!(
        min_mag = search.magnitude_range.0,
        max_mag = search.magnitude_range.1,
        from = %query.start.year(),
        to = %query.end.year(),
        limit = search.limit,
        "Searching earthquake catalog"
    );
    let raw = client.get_events(&query).await?;
    let mut events: Vec<Event> = raw.into_iter().map(to_event).collect();
    // The service orders oldest first for "time"; the workbench wants the
    // newest at the top.
    events.sort_by(|a, b| b.origin_time.cmp(&a.origin_time));
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_distinguishes_params() {
        let a = EventSearch::default();
        let mut b = EventSearch::default();
        b.magnitude_range = (6.5, 10.0);
        assert_ne!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), EventSearch::default().cache_key());
    }

    #[test]
    fn test_year_range_query_span() {
        let search = EventSearch { year_range: Some((2010, 2012)), ..Default::default() };
        let query = search.to_query().expect("query");
        assert_eq!(query.start.year(), 2010);
        assert_eq!(query.end.year(), 2012);
    }

    #[test]
    fn test_inverted_magnitude_rejected() {
        let search = EventSearch { magnitude_range: (8.0, 6.0), ..Default::default() };
        assert!(search.to_query().is_err());
    }

    #[test]
    fn test_raw_event_conversion() {
        let raw = RawEvent {
            event_id: "ev1".into(),
            origin_time: Utc::now(),
            latitude: 38.3,
            longitude: 142.4,
            depth_m: Some(29_000.0),
            magnitude: 9.1,
            magnitude_type: Some("Mw".into()),
            description: Some("Honshu".into()),
        };
        let event = to_event(raw);
        assert!((event.depth_km - 29.0).abs() < 1e-9);
        assert_eq!(event.region, "Honshu");
    }

    #[test]
    fn test_missing_depth_and_region_defaults() {
        let raw = RawEvent {
            event_id: "ev2".into(),
            origin_time: Utc::now(),
            latitude: -12.5,
            longitude: 166.4,
            depth_m: None,
            magnitude: 7.0,
            magnitude_type: None,
            description: None,
        };
        let event = to_event(raw);
        assert!((event.depth_km - 10.0).abs() < 1e-9);
        assert_eq!(event.magnitude_type, "M");
        assert!(event.region.starts_with("Lat: -12.50"));
    }
}

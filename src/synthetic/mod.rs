//! Synthetic teleseism generation and an offline FDSN client.
//!
//! Generates three-component seismograms with P, S, Love and Rayleigh wave
//! packets at their modelled arrival times, scaled so the Rayleigh train
//! reproduces the event magnitude through the Ms formula. The
//! [`SyntheticFdsnClient`] serves these records through the normal client
//! seam, which gives the workbench a fully offline mode and gives tests a
//! deterministic archive.

use crate::arrivals::ArrivalModel;
use crate::fdsn::{
    channel_matches, EventQuery, FdsnClient, FdsnError, InstrumentResponse, QueryLevel, RawEvent,
    Trace, TraceStats,
};
use crate::geo;
use crate::inventory::{curated_inventory, Inventory};
use crate::types::Event;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::collections::HashSet;
use std::f64::consts::PI;
use std::sync::Mutex;

/// Generator parameters.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub seed: u64,
    pub sampling_rate_hz: f64,
    /// Flat instrument sensitivity, counts per metre.
    pub sensitivity: f64,
    /// Background noise RMS in counts.
    pub noise_counts: f64,
    /// Attach a flat instrument response to generated traces.
    pub with_response: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            sampling_rate_hz: 20.0,
            sensitivity: 1.0e9,
            noise_counts: 50.0,
            with_response: true,
        }
    }
}

/// One wave packet: carrier period, arrival, duration, peak displacement.
struct Packet {
    arrival_s: f64,
    period_s: f64,
    duration_s: f64,
    amplitude_m: f64,
}

impl Packet {
    /// Hann-enveloped carrier evaluated at `t` seconds after origin.
    fn sample(&self, t: f64) -> f64 {
        let local = t - self.arrival_s;
        if local < 0.0 || local > self.duration_s {
            return 0.0;
        }
        let envelope = 0.5 * (1.0 - (2.0 * PI * local / self.duration_s).cos());
        self.amplitude_m * envelope * (2.0 * PI * local / self.period_s).sin()
    }
}

/// Peak Rayleigh displacement (metres) that makes the Ms formula return
/// the event magnitude at this distance with T = 20 s.
fn rayleigh_amplitude_m(magnitude: f64, distance_km: f64) -> f64 {
    let distance_deg = distance_km / geo::KM_PER_DEGREE_IASPEI;
    let log_amp_over_t = magnitude - 1.66 * distance_deg.log10() - 3.3;
    let amplitude_um = 20.0 * 10.0_f64.powf(log_amp_over_t);
    amplitude_um * 1.0e-6
}

/// Three-component displacement seismogram (metres) for one path.
///
/// `duration_s` covers the full record beginning `pre_event_s` before the
/// origin. Returns (north, east, vertical).
pub fn synthetic_displacement(
    event: &Event,
    station_lat: f64,
    station_lon: f64,
    fs: f64,
    pre_event_s: f64,
    duration_s: f64,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let (distance_km, _) =
        geo::distance_azimuth(event.latitude, event.longitude, station_lat, station_lon);
    let distance_deg = distance_km / geo::KM_PER_DEGREE_DISPLAY;
    let model = ArrivalModel::standard();
    let arrivals = model.arrivals(event, distance_km, distance_deg);

    let rayleigh_m = rayleigh_amplitude_m(event.magnitude, distance_km);
    let mut packets_vertical = vec![Packet {
        arrival_s: arrivals.rayleigh_s,
        period_s: 20.0,
        duration_s: 300.0,
        amplitude_m: rayleigh_m,
    }];
    let mut packets_horizontal = vec![
        Packet {
            arrival_s: arrivals.love_s,
            period_s: 15.0,
            duration_s: 240.0,
            amplitude_m: 0.7 * rayleigh_m,
        },
        Packet {
            arrival_s: arrivals.rayleigh_s,
            period_s: 20.0,
            duration_s: 300.0,
            amplitude_m: 0.5 * rayleigh_m,
        },
    ];
    if let Some(p_s) = arrivals.p_s {
        packets_vertical.push(Packet {
            arrival_s: p_s,
            period_s: 1.0,
            duration_s: 30.0,
            amplitude_m: 0.05 * rayleigh_m,
        });
    }
    if let Some(s_s) = arrivals.s_s {
        packets_horizontal.push(Packet {
            arrival_s: s_s,
            period_s: 2.0,
            duration_s: 60.0,
            amplitude_m: 0.15 * rayleigh_m,
        });
    }

    let n = (duration_s * fs) as usize;
    let sample_at = |packets: &[Packet], i: usize| -> f64 {
        let t = -pre_event_s + i as f64 / fs;
        packets.iter().map(|p| p.sample(t)).sum()
    };
    let north: Vec<f64> = (0..n).map(|i| sample_at(&packets_horizontal, i)).collect();
    let east = north.clone();
    let vertical: Vec<f64> = (0..n).map(|i| sample_at(&packets_vertical, i)).collect();
    (north, east, vertical)
}

/// Deterministic offline archive: serves the curated inventory, a fixed
/// catalog and synthetic waveforms. Stations listed in `missing` behave as
/// data-less (for exercising the fail-forward path).
pub struct SyntheticFdsnClient {
    config: ScenarioConfig,
    catalog: Vec<RawEvent>,
    inventory: Inventory,
    missing: HashSet<String>,
    /// Download log for assertions: `NET.STA` per get_waveforms call.
    requests: Mutex<Vec<String>>,
}

impl SyntheticFdsnClient {
    pub fn new(config: ScenarioConfig) -> Self {
        Self {
            config,
            catalog: Vec::new(),
            inventory: curated_inventory(),
            missing: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_catalog(mut self, events: Vec<RawEvent>) -> Self {
        self.catalog = events;
        self
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }

    /// Mark stations as having no data in the archive.
    pub fn with_missing(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.missing = ids.into_iter().collect();
        self
    }

    pub fn waveform_requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn flat_response(&self) -> InstrumentResponse {
        InstrumentResponse {
            zeros: Vec::new(),
            poles: Vec::new(),
            normalization: 1.0,
            sensitivity: self.config.sensitivity,
        }
    }

    /// The catalog event whose download window matches `start`.
    fn event_for_window(&self, start: DateTime<Utc>) -> Option<Event> {
        let pre = Duration::seconds(crate::config::get().acquisition.pre_event_s);
        self.catalog
            .iter()
            .find(|e| (e.origin_time - (start + pre)).num_seconds().abs() < 60)
            .map(|raw| Event {
                id: raw.event_id.clone(),
                origin_time: raw.origin_time,
                latitude: raw.latitude,
                longitude: raw.longitude,
                depth_km: raw.depth_m.map(|m| m / 1000.0).unwrap_or(10.0),
                magnitude: raw.magnitude,
                magnitude_type: raw.magnitude_type.clone().unwrap_or_else(|| "M".into()),
                region: raw.description.clone().unwrap_or_default(),
            })
    }
}

#[async_trait]
impl FdsnClient for SyntheticFdsnClient {
    async fn get_events(&self, query: &EventQuery) -> Result<Vec<RawEvent>, FdsnError> {
        Ok(self
            .catalog
            .iter()
            .filter(|e| {
                e.origin_time >= query.start
                    && e.origin_time <= query.end
                    && e.magnitude >= query.min_magnitude
                    && e.magnitude <= query.max_magnitude
            })
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn get_stations(
        &self,
        networks: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _level: QueryLevel,
    ) -> Result<Inventory, FdsnError> {
        let wanted: HashSet<&str> = networks.split(',').map(str::trim).collect();
        Ok(Inventory {
            networks: self
                .inventory
                .networks
                .iter()
                .filter(|n| wanted.contains(n.code.as_str()))
                .cloned()
                .collect(),
        })
    }

    async fn get_waveforms(
        &self,
        net: &str,
        sta: &str,
        _loc: &str,
        chan: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        attach_response: bool,
    ) -> Result<Vec<Trace>, FdsnError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(format!("{}.{}", net, sta));
        }
        let id = format!("{}.{}", net, sta);
        if self.missing.contains(&id) {
            return Ok(Vec::new());
        }
        let entry = self
            .inventory
            .stations()
            .find(|(code, s)| *code == net && s.code == sta)
            .map(|(_, s)| s.clone())
            .ok_or_else(|| FdsnError::NoData(id.clone()))?;
        let Some(event) = self.event_for_window(start) else {
            return Ok(Vec::new());
        };

        let fs = self.config.sampling_rate_hz;
        let pre = (event.origin_time - start).num_seconds() as f64;
        let duration = (end - start).num_seconds() as f64;
        let (north, east, vertical) =
            synthetic_displacement(&event, entry.latitude, entry.longitude, fs, pre, duration);

        let mut rng = StdRng::seed_from_u64(self.config.seed ^ hash_id(&id));
        let noise = Normal::new(0.0, self.config.noise_counts.max(1e-9))
            .map_err(|e| FdsnError::Transport(e.to_string()))?;
        let mut to_counts = |displacement: Vec<f64>| -> Vec<f64> {
            displacement
                .into_iter()
                .map(|m| (m * self.config.sensitivity + noise.sample(&mut rng)).round())
                .collect()
        };

        let mut traces = Vec::new();
        for (code, data) in [
            ("BHN", to_counts(north)),
            ("BHE", to_counts(east)),
            ("BHZ", to_counts(vertical)),
        ] {
            if !channel_matches(chan, code) {
                continue;
            }
            traces.push(Trace {
                stats: TraceStats {
                    network: net.to_string(),
                    station: sta.to_string(),
                    location: "00".to_string(),
                    channel: code.to_string(),
                    starttime: start,
                    sampling_rate: fs,
                    npts: (duration * fs) as usize,
                },
                data,
                response: (attach_response && self.config.with_response)
                    .then(|| self.flat_response()),
            });
        }
        Ok(traces)
    }
}

fn hash_id(id: &str) -> u64 {
    id.bytes().fold(1469598103934665603_u64, |h, b| (h ^ b as u64).wrapping_mul(1099511628211))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tohoku_raw() -> RawEvent {
        RawEvent {
            event_id: "tohoku".into(),
            origin_time: Utc.with_ymd_and_hms(2011, 3, 11, 5, 46, 23).single().expect("time"),
            latitude: 38.297,
            longitude: 142.373,
            depth_m: Some(29_000.0),
            magnitude: 9.1,
            magnitude_type: Some("Mw".into()),
            description: Some("Honshu".into()),
        }
    }

    #[test]
    fn test_rayleigh_amplitude_inverts_ms() {
        let amplitude_m = rayleigh_amplitude_m(7.0, 4000.0);
        let amplitude_um = amplitude_m * 1e6;
        let delta = 4000.0 / geo::KM_PER_DEGREE_IASPEI;
        let ms = (amplitude_um / 20.0).log10() + 1.66 * delta.log10() + 3.3;
        assert!((ms - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_packets_respect_arrivals() {
        let event = Event {
            id: "e".into(),
            origin_time: Utc::now(),
            latitude: 38.3,
            longitude: 142.4,
            depth_km: 29.0,
            magnitude: 8.0,
            magnitude_type: "Mw".into(),
            region: String::new(),
        };
        let fs = 20.0;
        let (_, _, vertical) =
            synthetic_displacement(&event, 36.5, 138.2, fs, 180.0, 1980.0);
        // Quiet before P: the first 180 s (pre-event) must be zero.
        let pre: f64 = vertical[..(170.0 * fs) as usize].iter().map(|v| v.abs()).sum();
        assert_eq!(pre, 0.0);
        // Energetic after the Rayleigh arrival.
        let max = vertical.iter().fold(0.0_f64, |a, v| a.max(v.abs()));
        assert!(max > 0.0);
    }

    #[tokio::test]
    async fn test_client_serves_three_components() {
        let client = SyntheticFdsnClient::new(ScenarioConfig::default())
            .with_catalog(vec![tohoku_raw()]);
        let raw = tohoku_raw();
        let start = raw.origin_time - Duration::seconds(180);
        let end = raw.origin_time + Duration::seconds(1800);
        let traces = client
            .get_waveforms("IU", "MAJO", "*", "BH?", start, end, true)
            .await
            .expect("traces");
        assert_eq!(traces.len(), 3);
        assert!(traces.iter().all(|t| t.response.is_some()));
        assert_eq!(client.waveform_requests(), vec!["IU.MAJO".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_station_returns_empty() {
        let client = SyntheticFdsnClient::new(ScenarioConfig::default())
            .with_catalog(vec![tohoku_raw()])
            .with_missing(["IU.MAJO".to_string()]);
        let raw = tohoku_raw();
        let traces = client
            .get_waveforms(
                "IU",
                "MAJO",
                "*",
                "BH?",
                raw.origin_time - Duration::seconds(180),
                raw.origin_time + Duration::seconds(1800),
                true,
            )
            .await
            .expect("ok");
        assert!(traces.is_empty());
    }

    #[tokio::test]
    async fn test_inventory_filtered_by_network() {
        let client = SyntheticFdsnClient::new(ScenarioConfig::default());
        let inventory = client
            .get_stations("IU,II", Utc::now(), Utc::now(), QueryLevel::Station)
            .await
            .expect("inventory");
        assert!(inventory.networks.iter().all(|n| n.code == "IU" || n.code == "II"));
        assert!(inventory.station_count() > 50);
    }

    #[test]
    fn test_deterministic_generation() {
        let a = SyntheticFdsnClient::new(ScenarioConfig::default())
            .with_catalog(vec![tohoku_raw()]);
        let b = SyntheticFdsnClient::new(ScenarioConfig::default())
            .with_catalog(vec![tohoku_raw()]);
        let raw = tohoku_raw();
        let start = raw.origin_time - Duration::seconds(180);
        let end = raw.origin_time + Duration::seconds(1800);
        let (first, second) = tokio_test::block_on(async {
            (
                a.get_waveforms("IU", "MAJO", "*", "BHZ", start, end, false).await,
                b.get_waveforms("IU", "MAJO", "*", "BHZ", start, end, false).await,
            )
        });
        assert_eq!(first.expect("a"), second.expect("b"));
    }
}

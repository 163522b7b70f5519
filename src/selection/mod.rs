//! Station Selection
//!
//! Finds candidate recording stations for an event: queries the inventory
//! service within a distance ring, ranks by network/channel quality, spreads
//! large candidate sets across distance bins, attaches arrivals, and can
//! probe data availability in a bounded worker pool. Falls back to the
//! curated station list when the inventory service is unreachable.

use crate::arrivals::ArrivalModel;
use crate::fdsn::{FdsnClient, QueryLevel};
use crate::geo;
use crate::inventory::{
    best_channel_priority, best_sample_rate, curated_inventory, network_priority, Inventory,
    StationEntry,
};
use crate::types::{Event, OperationalWindow, Station};
use chrono::Duration;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Station search produced no candidates in {min_km}-{max_km} km")]
    NoCandidates { min_km: f64, max_km: f64 },
}

/// Distance-bin width for non-premium networks, km.
const PRIORITY_BIN_KM: f64 = 500.0;

/// Candidate sets larger than this get the equal-width distance
/// distribution pass.
const DISTRIBUTION_THRESHOLD: usize = 100;

/// Station selector with injected capabilities.
#[derive(Clone)]
pub struct StationSelector {
    client: Arc<dyn FdsnClient>,
    arrival_model: ArrivalModel,
}

impl StationSelector {
    pub fn new(client: Arc<dyn FdsnClient>, arrival_model: ArrivalModel) -> Self {
        Self { client, arrival_model }
    }

    /// The shared FDSN client (the catalog layer reuses it).
    pub fn client(&self) -> &dyn FdsnClient {
        self.client.as_ref()
    }

    /// Search candidates in `[min_km, max_km]`, returning at most `target`
    /// stations with arrivals attached, best first.
    pub async fn search(
        &self,
        event: &Event,
        min_km: f64,
        max_km: f64,
        target: usize,
    ) -> Result<Vec<Station>, SelectionError> {
        let cfg = crate::config::get();
        let window = Duration::seconds(crate::config::defaults::INVENTORY_WINDOW_S);
        let inventory_result = tokio::time::timeout(
            std::time::Duration::from_secs(cfg.search.inventory_timeout_s),
            self.client.get_stations(
                &cfg.search.preferred_networks,
                event.origin_time - window,
                event.origin_time + window,
                QueryLevel::Station,
            ),
        )
        .await;

        let inventory = match inventory_result {
            Ok(Ok(inventory)) => inventory,
            Ok(Err(e)) => {
                warn!(error = %e, "Inventory service failed, using curated fallback list");
                curated_inventory()
            }
            Err(_) => {
                warn!(timeout_s = cfg.search.inventory_timeout_s, "Inventory query timed out, using curated fallback list");
                curated_inventory()
            }
        };

        let mut candidates = self.evaluate_inventory(&inventory, event, min_km, max_km);
        if candidates.is_empty() {
            return Err(SelectionError::NoCandidates { min_km, max_km });
        }
        rank(&mut candidates);

        let mut selected = if candidates.len() > DISTRIBUTION_THRESHOLD {
            distribute_by_distance(candidates, target)
        } else {
            candidates.truncate(target);
            candidates
        };

        if cfg.search.probe_enabled {
            selected = self.probe_availability(selected, event, target).await;
        }
        selected.truncate(target);

        info!(
            event = %event.id,
            candidates = selected.len(),
            min_km,
            max_km,
            "Station search complete"
        );
        Ok(selected)
    }

    /// Search while excluding stations already known to have no data.
    pub async fn search_excluding(
        &self,
        event: &Event,
        min_km: f64,
        max_km: f64,
        target: usize,
        failed: &HashSet<String>,
    ) -> Result<Vec<Station>, SelectionError> {
        let pool = self.search(event, min_km, max_km, target * 2).await?;
        let mut available: Vec<Station> =
            pool.into_iter().filter(|s| !failed.contains(&s.id())).collect();
        available.truncate(target);
        debug!(available = available.len(), excluded = failed.len(), "Filtered failed stations");
        Ok(available)
    }

    /// Distance-filter and score every inventory entry, attaching arrivals.
    fn evaluate_inventory(
        &self,
        inventory: &Inventory,
        event: &Event,
        min_km: f64,
        max_km: f64,
    ) -> Vec<Station> {
        let entries: Vec<(&str, &StationEntry)> = inventory.stations().collect();
        entries
            .par_iter()
            .filter_map(|(net, entry)| {
                let (distance_km, azimuth_deg) = geo::distance_azimuth(
                    event.latitude,
                    event.longitude,
                    entry.latitude,
                    entry.longitude,
                );
                if !(min_km..=max_km).contains(&distance_km) {
                    return None;
                }
                let operational =
                    OperationalWindow { start: entry.start_date, end: entry.end_date };
                if !operational.contains(event.origin_time) {
                    return None;
                }
                let distance_deg = distance_km / geo::KM_PER_DEGREE_DISPLAY;
                let arrivals = self.arrival_model.arrivals(event, distance_km, distance_deg);
                Some(Station {
                    network: (*net).to_string(),
                    code: entry.code.clone(),
                    latitude: entry.latitude,
                    longitude: entry.longitude,
                    elevation_m: entry.elevation_m,
                    distance_km,
                    distance_deg,
                    azimuth_deg,
                    channels: entry.channels.iter().map(|c| c.code.clone()).collect(),
                    sample_rate_hz: best_sample_rate(entry),
                    network_priority: network_priority(net),
                    channel_priority: best_channel_priority(entry),
                    operational,
                    arrivals: Some(arrivals),
                    data_verified: None,
                })
            })
            .collect()
    }

    /// Probe candidates for actual data availability in a bounded pool,
    /// stopping early once twice the target count verified. Verified
    /// stations sort ahead of unverified ones, rank preserved otherwise.
    async fn probe_availability(
        &self,
        stations: Vec<Station>,
        event: &Event,
        target: usize,
    ) -> Vec<Station> {
        let cfg = crate::config::get();
        let semaphore = Arc::new(Semaphore::new(cfg.search.max_workers));
        let probe_timeout = std::time::Duration::from_secs(cfg.search.probe_timeout_s);
        let window_s = cfg.search.probe_window_s;

        let mut tasks = JoinSet::new();
        for (index, station) in stations.iter().enumerate() {
            let client = Arc::clone(&self.client);
            let semaphore = Arc::clone(&semaphore);
            let net = station.network.clone();
            let sta = station.code.clone();
            let start = event.origin_time;
            let end = event.origin_time + Duration::seconds(window_s);
            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return (index, false);
                };
                for channels in ["HH?", "BH?"] {
                    let request =
                        client.get_waveforms(&net, &sta, "*", channels, start, end, false);
                    match tokio::time::timeout(probe_timeout, request).await {
                        Ok(Ok(traces)) if !traces.is_empty() => return (index, true),
                        _ => continue,
                    }
                }
                (index, false)
            });
        }

        let mut stations = stations;
        let mut verified_count = 0;
        while let Some(result) = tasks.join_next().await {
            if let Ok((index, verified)) = result {
                stations[index].data_verified = Some(verified);
                if verified {
                    verified_count += 1;
                    if verified_count >= target * 2 {
                        tasks.abort_all();
                        break;
                    }
                }
            }
        }
        stations.sort_by_key(|s| s.data_verified != Some(true));
        stations
    }
}

/// Rank candidates: premium networks purely nearest-first, lower-priority
/// networks binned by distance to keep geographic spread.
fn rank(stations: &mut [Station]) {
    stations.sort_by(|a, b| {
        let key = |s: &Station| {
            let bin = if s.network_priority > 2 {
                (s.distance_km / PRIORITY_BIN_KM) as u32
            } else {
                0
            };
            (s.network_priority, bin, s.channel_priority)
        };
        key(a).cmp(&key(b)).then(
            a.distance_km.partial_cmp(&b.distance_km).unwrap_or(std::cmp::Ordering::Equal),
        )
    });
}

/// Equal-width distance binning for large candidate sets: one bin per
/// requested station, each bin contributes the candidate closest to its
/// centre, leftovers fill from the nearest remaining.
fn distribute_by_distance(stations: Vec<Station>, target: usize) -> Vec<Station> {
    if stations.len() <= target || target == 0 {
        return stations;
    }

    // Dedup by identifier first.
    let mut seen = HashSet::new();
    let mut unique: Vec<Station> = Vec::with_capacity(stations.len());
    for station in stations {
        if seen.insert(station.id()) {
            unique.push(station);
        }
    }
    if unique.len() <= target {
        return unique;
    }

    let mut by_distance = unique;
    by_distance.sort_by(|a, b| {
        a.distance_km.partial_cmp(&b.distance_km).unwrap_or(std::cmp::Ordering::Equal)
    });
    let min_d = by_distance.first().map(|s| s.distance_km).unwrap_or(0.0);
    let max_d = by_distance.last().map(|s| s.distance_km).unwrap_or(0.0);
    let bin_width = (max_d - min_d) / target as f64;

    let mut picked_indices: HashSet<usize> = HashSet::new();
    let mut selected: Vec<Station> = Vec::with_capacity(target);
    for bin in 0..target {
        let bin_start = min_d + bin as f64 * bin_width;
        let bin_end = bin_start + bin_width;
        let bin_center = (bin_start + bin_end) / 2.0;
        let best = by_distance
            .iter()
            .enumerate()
            .filter(|(i, s)| {
                !picked_indices.contains(i)
                    && s.distance_km >= bin_start
                    && s.distance_km <= bin_end
            })
            .min_by(|(_, a), (_, b)| {
                (a.distance_km - bin_center)
                    .abs()
                    .partial_cmp(&(b.distance_km - bin_center).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i);
        if let Some(i) = best {
            picked_indices.insert(i);
            selected.push(by_distance[i].clone());
        }
    }
    // Empty bins: fill from the nearest remaining candidates.
    let mut index = 0;
    while selected.len() < target && index < by_distance.len() {
        if !picked_indices.contains(&index) {
            picked_indices.insert(index);
            selected.push(by_distance[index].clone());
        }
        index += 1;
    }
    selected
}

//! Analysis Coordinator
//!
//! Drives the end-to-end flow: event -> station search -> chosen station ->
//! waveform download -> conditioning -> magnitude/classification. Owns every
//! cache, the failed-station set and the session state machine; the UI
//! shell holds a handle and observes, it never mutates workbench state
//! directly.
//!
//! Failure policy is fail-forward: a station with no data is recorded and
//! the next-best candidate is proposed automatically until the candidate
//! pool is exhausted.

use super::cache::TtlLruCache;
use super::persistence::WaveformStore;
use super::state::{SessionPhase, SessionStats};
use crate::acquisition::WaveformAcquirer;
use crate::arrivals::{ArrivalModel, TravelTimeOracle};
use crate::catalog::{self, CatalogError, EventSearch};
use crate::classify::{classify_wave_types, ClassifyError};
use crate::config::defaults;
use crate::export::{export_workbook, ExportError, ExportOptions};
use crate::fdsn::FdsnClient;
use crate::magnitude::{compute_ms, MsOptions};
use crate::selection::{SelectionError, StationSelector};
use crate::signal::{fft_periods, process_waveform, PeriodSpectrum, ProcessingOptions};
use crate::types::{
    AmplitudeUnits, Component, Event, Filter, MsExplanation, ProcessedWaveform, Station,
    WaveClassification, Waveform,
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("No event selected")]
    NoEventSelected,

    #[error("No waveform loaded")]
    NoWaveform,

    #[error("Station search failed: {0}")]
    Search(#[from] SelectionError),

    #[error("Catalog search failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("All candidate stations failed ({attempted} tried)")]
    AllStationsFailed { attempted: usize },

    #[error("Waveform carries raw counts only; calibrated displacement required")]
    NoDisplacement,

    #[error("Surface-wave window lies outside the record")]
    SpectrumUnavailable,

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Parameters of one Ms request.
#[derive(Debug, Clone)]
pub struct MsRequest {
    pub period_s: f64,
    /// Window start in seconds after origin; `None` anchors at the
    /// expected Rayleigh arrival.
    pub window_start_s: Option<f64>,
    pub window_duration_s: f64,
    pub apply_filter: bool,
    /// Permit magnitude estimation on raw counts (uncalibrated; the
    /// result is only meaningful for demonstration).
    pub allow_counts: bool,
}

impl Default for MsRequest {
    fn default() -> Self {
        Self {
            period_s: defaults::MS_PERIOD_S,
            window_start_s: None,
            window_duration_s: defaults::MS_WINDOW_DURATION_S,
            apply_filter: true,
            allow_counts: false,
        }
    }
}

type SearchKey = (String, u64, u64, usize);

/// The pipeline orchestrator. One instance owns one analysis session.
pub struct AnalysisCoordinator {
    selector: StationSelector,
    acquirer: WaveformAcquirer,

    // Caches; only this struct mutates them.
    earthquake_cache: TtlLruCache<String, Vec<Event>>,
    station_cache: TtlLruCache<SearchKey, Vec<Station>>,
    waveform_cache: TtlLruCache<String, Arc<Waveform>>,

    /// Optional on-disk mirror of the waveform cache.
    store: Option<WaveformStore>,

    /// `NET.STA` ids with no data this session. Additive until reset.
    failed_stations: HashSet<String>,

    /// Re-entrancy guard for station searches.
    executing_searches: HashSet<SearchKey>,

    phase: SessionPhase,
    stats: SessionStats,

    selected_event: Option<Event>,
    selected_station: Option<Station>,
    waveform: Option<Arc<Waveform>>,

    // Per-(event, station) display caches, evicted on key change.
    display: Option<ProcessedWaveform>,
    selected_filter: Option<Filter>,
    ms_result: Option<(Option<f64>, MsExplanation)>,
    wave_analysis: Option<WaveClassification>,
}

impl AnalysisCoordinator {
    pub fn new(client: Arc<dyn FdsnClient>, oracle: Arc<dyn TravelTimeOracle>) -> Self {
        info!("Initializing analysis coordinator");
        let arrival_model = ArrivalModel::new(oracle);
        Self {
            selector: StationSelector::new(Arc::clone(&client), arrival_model),
            acquirer: WaveformAcquirer::new(client),
            earthquake_cache: TtlLruCache::with_defaults(),
            station_cache: TtlLruCache::with_defaults(),
            waveform_cache: TtlLruCache::with_defaults(),
            store: None,
            failed_stations: HashSet::new(),
            executing_searches: HashSet::new(),
            phase: SessionPhase::Idle,
            stats: SessionStats::default(),
            selected_event: None,
            selected_station: None,
            waveform: None,
            display: None,
            selected_filter: None,
            ms_result: None,
            wave_analysis: None,
        }
    }

    /// Attach an on-disk waveform store that survives the session.
    pub fn with_store(mut self, store: WaveformStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn selected_event(&self) -> Option<&Event> {
        self.selected_event.as_ref()
    }

    pub fn selected_station(&self) -> Option<&Station> {
        self.selected_station.as_ref()
    }

    pub fn waveform(&self) -> Option<&Arc<Waveform>> {
        self.waveform.as_ref()
    }

    pub fn display(&self) -> Option<&ProcessedWaveform> {
        self.display.as_ref()
    }

    pub fn ms_result(&self) -> Option<&(Option<f64>, MsExplanation)> {
        self.ms_result.as_ref()
    }

    pub fn wave_analysis(&self) -> Option<&WaveClassification> {
        self.wave_analysis.as_ref()
    }

    pub fn failed_stations(&self) -> &HashSet<String> {
        &self.failed_stations
    }

    fn transition(&mut self, next: SessionPhase) {
        if !self.phase.can_transition_to(next) {
            warn!(from = %self.phase, to = %next, "Unexpected session transition");
        }
        debug!(from = %self.phase, to = %next, "Session transition");
        self.phase = next;
    }

    /// Evict everything derived from the previous (event, station) key.
    fn evict_display_state(&mut self) {
        self.display = None;
        self.selected_filter = None;
        self.ms_result = None;
        self.wave_analysis = None;
    }

    /// Search the catalog, cached by the full parameter tuple.
    pub async fn search_earthquakes(
        &mut self,
        search: &EventSearch,
    ) -> Result<Vec<Event>, CoordinatorError> {
        let key = search.cache_key();
        if let Some(events) = self.earthquake_cache.get(&key) {
            self.stats.cache_hits += 1;
            return Ok(events);
        }
        let events = catalog::search_earthquakes(self.selector_client(), search).await?;
        if !events.is_empty() {
            self.earthquake_cache.insert(key, events.clone());
        }
        Ok(events)
    }

    fn selector_client(&self) -> &dyn FdsnClient {
        // The selector and acquirer share one client; borrow it for
        // catalog queries through the acquirer-independent path.
        self.selector.client()
    }

    /// Select a new event: drops the waveform, the chosen station and all
    /// display state from any previous selection.
    pub fn select_event(&mut self, event: Event) {
        info!(event = %event, "Event selected");
        self.selected_event = Some(event);
        self.selected_station = None;
        self.waveform = None;
        self.evict_display_state();
        self.transition(SessionPhase::Idle);
    }

    /// Station search with cache and duplicate-suppression. Two calls with
    /// identical keys return equal results; a re-entrant duplicate observes
    /// the cached result or an empty set.
    pub async fn search_stations(
        &mut self,
        min_km: f64,
        max_km: f64,
        target: usize,
    ) -> Result<Vec<Station>, CoordinatorError> {
        let event = self.selected_event.clone().ok_or(CoordinatorError::NoEventSelected)?;
        let key: SearchKey = (event.key(), min_km as u64, max_km as u64, target);

        if let Some(cached) = self.station_cache.get(&key) {
            self.stats.cache_hits += 1;
            debug!(count = cached.len(), "Returning cached station search");
            return Ok(cached);
        }
        if self.executing_searches.contains(&key) {
            debug!("Duplicate concurrent search suppressed");
            return Ok(Vec::new());
        }

        self.executing_searches.insert(key.clone());
        self.transition(SessionPhase::Searching);
        let result = self.selector.search(&event, min_km, max_km, target).await;
        self.executing_searches.remove(&key);
        self.stats.searches_run += 1;

        match result {
            Ok(stations) => {
                self.station_cache.insert(key, stations.clone());
                self.transition(SessionPhase::StationsReady);
                Ok(stations)
            }
            Err(e) => {
                self.transition(SessionPhase::Failed);
                Err(e.into())
            }
        }
    }

    /// Station search that skips every station already marked dataless
    /// this session.
    pub async fn search_stations_excluding_failed(
        &mut self,
        min_km: f64,
        max_km: f64,
        target: usize,
    ) -> Result<Vec<Station>, CoordinatorError> {
        let event = self.selected_event.clone().ok_or(CoordinatorError::NoEventSelected)?;
        let stations = self
            .selector
            .search_excluding(&event, min_km, max_km, target, &self.failed_stations)
            .await?;
        Ok(stations)
    }

    /// Choose a station and load its waveform, falling forward through the
    /// remaining candidates when the archive has nothing for it.
    pub async fn choose_station(
        &mut self,
        station: Station,
        search_ring: (f64, f64, usize),
    ) -> Result<Arc<Waveform>, CoordinatorError> {
        let event = self.selected_event.clone().ok_or(CoordinatorError::NoEventSelected)?;
        let (min_km, max_km, target) = search_ring;
        let mut candidate = station;
        let mut attempted = 0;

        loop {
            let cache_key =
                format!("{}_{}_{}", event.origin_time.timestamp(), candidate.network, candidate.code);

            if let Some(waveform) = self.waveform_cache.get(&cache_key) {
                self.stats.cache_hits += 1;
                info!(station = %candidate.id(), "Waveform cache hit");
                self.install_waveform(candidate, waveform.clone());
                return Ok(waveform);
            }
            if let Some(store) = &self.store {
                let cfg = crate::config::get();
                if let Ok(Some(stored)) = store.load(&cache_key, cfg.cache.ttl_hours as i64) {
                    let waveform = Arc::new(stored);
                    self.waveform_cache.insert(cache_key, waveform.clone());
                    self.stats.cache_hits += 1;
                    self.install_waveform(candidate, waveform.clone());
                    return Ok(waveform);
                }
            }

            self.transition(SessionPhase::Downloading);
            attempted += 1;
            match self.acquirer.download(&event, &candidate).await {
                Some(waveform) => {
                    let waveform = Arc::new(waveform);
                    self.waveform_cache.insert(cache_key.clone(), waveform.clone());
                    if let Some(store) = &self.store {
                        if let Err(e) = store.store(&cache_key, &waveform) {
                            warn!(error = %e, "Could not persist waveform");
                        }
                    }
                    self.stats.waveforms_downloaded += 1;
                    self.install_waveform(candidate, waveform.clone());
                    return Ok(waveform);
                }
                None => {
                    warn!(station = %candidate.id(), "Download failed, marking station");
                    self.failed_stations.insert(candidate.id());
                    self.stats.downloads_failed += 1;

                    let replacement = self
                        .selector
                        .search_excluding(&event, min_km, max_km, target, &self.failed_stations)
                        .await
                        .ok()
                        .and_then(|candidates| candidates.into_iter().next());
                    match replacement {
                        Some(next) => {
                            info!(station = %next.id(), "Falling forward to next candidate");
                            self.stats.fallbacks_taken += 1;
                            candidate = next;
                        }
                        None => {
                            self.transition(SessionPhase::Failed);
                            return Err(CoordinatorError::AllStationsFailed { attempted });
                        }
                    }
                }
            }
        }
    }

    /// Install a freshly loaded waveform, evicting stale display state and
    /// computing the automatic first Ms.
    fn install_waveform(&mut self, station: Station, waveform: Arc<Waveform>) {
        let key_changed = self
            .selected_station
            .as_ref()
            .map(|previous| previous.id() != station.id())
            .unwrap_or(true);
        if key_changed {
            self.evict_display_state();
        }
        self.selected_station = Some(station);
        self.waveform = Some(waveform);
        self.transition(SessionPhase::WaveformReady);

        if self.ms_result.is_none() {
            if let Err(e) = self.compute_ms_request(&MsRequest::default()) {
                debug!(error = %e, "Automatic first Ms unavailable");
            } else {
                info!("Automatic first Ms computed");
            }
        }
    }

    /// Condition the loaded waveform with a filter selection.
    pub fn process(
        &mut self,
        filter: Filter,
        remove_spikes: bool,
        compute_snr: bool,
    ) -> Result<&ProcessedWaveform, CoordinatorError> {
        let waveform = self.waveform.clone().ok_or(CoordinatorError::NoWaveform)?;
        let p_arrival_s = self.selected_station.as_ref().and_then(|s| s.p_arrival_s());
        let options = ProcessingOptions {
            filter,
            remove_spikes,
            compute_snr,
            p_arrival_s,
        };
        let processed = process_waveform(&waveform, &options);
        self.selected_filter = Some(filter);
        Ok(self.display.insert(processed))
    }

    /// Compute Ms over the requested window and remember the result.
    pub fn compute_ms_request(
        &mut self,
        request: &MsRequest,
    ) -> Result<(Option<f64>, MsExplanation), CoordinatorError> {
        let event = self.selected_event.clone().ok_or(CoordinatorError::NoEventSelected)?;
        let station = self.selected_station.clone().ok_or(CoordinatorError::NoWaveform)?;
        let waveform = self.waveform.clone().ok_or(CoordinatorError::NoWaveform)?;

        if waveform.units == AmplitudeUnits::Counts && !request.allow_counts {
            return Err(CoordinatorError::NoDisplacement);
        }

        let window_start_s = request
            .window_start_s
            .or_else(|| station.rayleigh_arrival_s())
            .unwrap_or(0.0);

        let slice = |component: Component| -> Vec<f64> {
            waveform
                .component(component)
                .map(|series| {
                    let fs = series.sampling_rate_hz;
                    let relative = window_start_s - waveform.timing_offset_s;
                    let start = ((relative * fs).max(0.0) as usize).min(series.len());
                    let end =
                        (start + (request.window_duration_s * fs) as usize).min(series.len());
                    series.amplitude()[start..end].to_vec()
                })
                .unwrap_or_default()
        };

        let north = slice(Component::North);
        let east = slice(Component::East);
        let vertical = slice(Component::Vertical);

        let options = MsOptions {
            period_s: request.period_s,
            depth_km: Some(event.depth_km),
            apply_filter: request.apply_filter,
        };
        let (magnitude, explanation) = compute_ms(
            &north,
            &east,
            &vertical,
            station.distance_km,
            waveform.sampling_rate_hz,
            &options,
        );
        self.stats.ms_computed += 1;
        self.ms_result = Some((magnitude, explanation.clone()));
        Ok((magnitude, explanation))
    }

    /// FFT period diagnostic of the surface-wave window on the vertical
    /// component: the dominant period should sit near 20 s for a sound Ms
    /// measurement.
    pub fn surface_spectrum(&self) -> Result<PeriodSpectrum, CoordinatorError> {
        let station = self.selected_station.as_ref().ok_or(CoordinatorError::NoWaveform)?;
        let waveform = self.waveform.as_ref().ok_or(CoordinatorError::NoWaveform)?;
        let series = waveform
            .component(Component::Vertical)
            .or_else(|| waveform.components.values().next())
            .ok_or(CoordinatorError::NoWaveform)?;
        let start_s =
            (station.rayleigh_arrival_s().unwrap_or(0.0) - waveform.timing_offset_s).max(0.0);
        fft_periods(
            series.amplitude(),
            series.sampling_rate_hz,
            start_s,
            defaults::MS_WINDOW_DURATION_S,
            (10.0, 40.0),
        )
        .ok_or(CoordinatorError::SpectrumUnavailable)
    }

    /// Classify the dominant wave type in a window (seconds relative to
    /// the first sample).
    pub fn classify(
        &mut self,
        window: Option<(f64, f64)>,
    ) -> Result<WaveClassification, CoordinatorError> {
        let waveform = self.waveform.clone().ok_or(CoordinatorError::NoWaveform)?;
        let classification = classify_wave_types(&waveform, window)?;
        self.wave_analysis = Some(classification.clone());
        Ok(classification)
    }

    /// Export the current analysis as a three-sheet workbook.
    pub fn export(&self, options: &ExportOptions) -> Result<Vec<u8>, CoordinatorError> {
        let event = self.selected_event.as_ref().ok_or(CoordinatorError::NoEventSelected)?;
        let station = self.selected_station.as_ref().ok_or(CoordinatorError::NoWaveform)?;
        let waveform = self.waveform.as_ref().ok_or(CoordinatorError::NoWaveform)?;
        let ms = self.ms_result.as_ref();
        Ok(export_workbook(
            event,
            station,
            waveform,
            self.display.as_ref(),
            ms.and_then(|(magnitude, explanation)| magnitude.map(|m| (m, explanation))),
            options,
        )?)
    }

    /// Forget which stations failed; the next fallback loop starts fresh.
    pub fn reset_failed_stations(&mut self) {
        let count = self.failed_stations.len();
        self.failed_stations.clear();
        info!(cleared = count, "Failed-station set reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_request_defaults() {
        let request = MsRequest::default();
        assert_eq!(request.period_s, 20.0);
        assert_eq!(request.window_duration_s, 600.0);
        assert!(request.apply_filter);
        assert!(request.window_start_s.is_none());
        assert!(!request.allow_counts);
    }
}

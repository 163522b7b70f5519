//! Waveform download and canonical record assembly.

use super::response::{remove_response, PRE_FILTER_WATER_LEVEL_DB};
use crate::config::defaults;
use crate::fdsn::{FdsnClient, InstrumentResponse, Trace};
use crate::signal::{sta_lta, StaLtaConfig};
use crate::types::{
    AmplitudeUnits, Component, ComponentSeries, Event, Station, TimingValidation, Waveform,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Downloads three-component data and builds the canonical waveform.
#[derive(Clone)]
pub struct WaveformAcquirer {
    client: Arc<dyn FdsnClient>,
}

/// One merged channel: counts on a gap-filled grid.
struct MergedChannel {
    channel: String,
    starttime: DateTime<Utc>,
    sampling_rate: f64,
    data: Vec<f64>,
    response: Option<InstrumentResponse>,
}

impl WaveformAcquirer {
    pub fn new(client: Arc<dyn FdsnClient>) -> Self {
        Self { client }
    }

    /// Download and assemble a waveform, or `None` when the archive has no
    /// usable data for this station. Errors are downgraded to `None` with a
    /// log line; the coordinator drives the fallback policy.
    pub async fn download(&self, event: &Event, station: &Station) -> Option<Waveform> {
        let cfg = crate::config::get();
        let start = event.origin_time - Duration::seconds(cfg.acquisition.pre_event_s);
        let end = event.origin_time + Duration::seconds(cfg.acquisition.post_event_s);

        let mut traces: Vec<Trace> = Vec::new();
        for pattern in defaults::CHANNEL_PATTERNS {
            match self
                .client
                .get_waveforms(&station.network, &station.code, "*", pattern, start, end, true)
                .await
            {
                Ok(batch) if batch.len() >= 2 => {
                    info!(station = %station.id(), pattern, traces = batch.len(), "Waveform download succeeded");
                    traces = batch;
                    break;
                }
                Ok(batch) => {
                    debug!(station = %station.id(), pattern, traces = batch.len(), "Too few traces, trying next pattern");
                }
                Err(e) => {
                    debug!(station = %station.id(), pattern, error = %e, "Channel pattern failed");
                }
            }
        }

        if traces.is_empty() {
            // Broad fallback: any channel at all.
            match self
                .client
                .get_waveforms(&station.network, &station.code, "*", "*", start, end, true)
                .await
            {
                Ok(batch) if !batch.is_empty() => {
                    info!(station = %station.id(), traces = batch.len(), "Broad fallback succeeded");
                    traces = batch;
                }
                Ok(_) | Err(_) => {
                    warn!(station = %station.id(), "No waveform data available");
                    return None;
                }
            }
        }

        let mut waveform = build_waveform(traces, event, station)?;
        validate_timing(
            &mut waveform,
            station,
            cfg.acquisition.timing_correction_enabled,
        );
        Some(waveform)
    }
}

/// Merge all traces sharing a fully qualified channel id onto one
/// zero-filled grid. Later ids for an already-covered id are dropped.
fn merge_traces(traces: Vec<Trace>) -> Vec<MergedChannel> {
    let mut groups: Vec<(String, Vec<Trace>)> = Vec::new();
    for trace in traces {
        let id = trace.stats.channel_id();
        match groups.iter_mut().find(|(key, _)| *key == id) {
            Some((_, list)) => list.push(trace),
            None => groups.push((id, vec![trace])),
        }
    }

    let mut merged = Vec::with_capacity(groups.len());
    for (id, mut list) in groups {
        list.sort_by_key(|t| t.stats.starttime);
        let fs = list[0].stats.sampling_rate;
        if fs <= 0.0 {
            warn!(channel = %id, "Dropping channel with invalid sampling rate");
            continue;
        }
        let start = list[0].stats.starttime;
        let mut total_end = start;
        for trace in &list {
            let trace_end = trace.stats.starttime
                + Duration::milliseconds((trace.data.len() as f64 / fs * 1000.0) as i64);
            if trace_end > total_end {
                total_end = trace_end;
            }
        }
        let n = (((total_end - start).num_milliseconds() as f64 / 1000.0) * fs).round() as usize;
        let mut grid = vec![0.0; n.max(list[0].data.len())];
        let mut response = None;
        for trace in &list {
            let offset_s = (trace.stats.starttime - start).num_milliseconds() as f64 / 1000.0;
            let offset = (offset_s * fs).round() as usize;
            for (i, value) in trace.data.iter().enumerate() {
                if offset + i < grid.len() {
                    grid[offset + i] = *value;
                }
            }
            if response.is_none() {
                response = trace.response.clone();
            }
        }
        let channel = list[0].stats.channel.clone();
        if list.len() > 1 {
            debug!(channel = %id, segments = list.len(), "Merged with zero gap-fill");
        }
        merged.push(MergedChannel { channel, starttime: start, sampling_rate: fs, data: grid, response });
    }
    merged
}

/// Assemble the canonical record from merged channels.
fn build_waveform(traces: Vec<Trace>, event: &Event, station: &Station) -> Option<Waveform> {
    let merged = merge_traces(traces);
    if merged.is_empty() {
        return None;
    }

    // First channel per component wins (dedup across locations).
    let mut per_component: BTreeMap<Component, &MergedChannel> = BTreeMap::new();
    for channel in &merged {
        if let Some(component) = Component::from_channel_code(&channel.channel) {
            per_component.entry(component).or_insert(channel);
        }
    }
    if per_component.is_empty() {
        warn!(station = %station.id(), "No recognisable components in download");
        return None;
    }

    // Response removal to displacement; one failure reverts the whole
    // record to counts so the two forms stay comparable.
    let mut displacements: BTreeMap<Component, Vec<f64>> = BTreeMap::new();
    let mut units = AmplitudeUnits::Millimetres;
    for (&component, channel) in &per_component {
        match &channel.response {
            Some(response) => {
                let nyquist = channel.sampling_rate / 2.0;
                let pre_filter = [0.005, 0.01, 0.8 * nyquist, 0.9 * nyquist];
                match remove_response(
                    &channel.data,
                    channel.sampling_rate,
                    response,
                    pre_filter,
                    PRE_FILTER_WATER_LEVEL_DB,
                ) {
                    Ok(metres) => {
                        displacements
                            .insert(component, metres.into_iter().map(|v| v * 1000.0).collect());
                    }
                    Err(e) => {
                        warn!(component = %component, error = %e, "Response removal failed, keeping counts");
                        units = AmplitudeUnits::Counts;
                        break;
                    }
                }
            }
            None => {
                debug!(component = %component, "No response attached, keeping counts");
                units = AmplitudeUnits::Counts;
                break;
            }
        }
    }
    if units == AmplitudeUnits::Counts {
        displacements.clear();
    }

    let mut components = BTreeMap::new();
    for (&component, channel) in &per_component {
        let offset_s =
            (channel.starttime - event.origin_time).num_milliseconds() as f64 / 1000.0;
        let time_s: Vec<f64> =
            (0..channel.data.len()).map(|i| offset_s + i as f64 / channel.sampling_rate).collect();
        components.insert(
            component,
            ComponentSeries {
                raw_counts: channel.data.clone(),
                displacement_mm: displacements.remove(&component),
                time_s,
                sampling_rate_hz: channel.sampling_rate,
            },
        );
    }

    let sampling_rate_hz =
        components.values().map(|s| s.sampling_rate_hz).fold(0.0, f64::max);
    let alias = components
        .get(&Component::Vertical)
        .or_else(|| components.values().next())
        .map(|s| s.time_s.clone())
        .unwrap_or_default();
    let timing_offset_s = alias.first().copied().unwrap_or(0.0);
    let available_components: Vec<Component> = components.keys().copied().collect();

    info!(
        station = %station.id(),
        components = available_components.len(),
        fs = sampling_rate_hz,
        units = ?units,
        "Waveform assembled"
    );

    Some(Waveform {
        network: station.network.clone(),
        station: station.code.clone(),
        earthquake_time: event.origin_time,
        sampling_rate_hz,
        components,
        time_s: alias,
        available_components,
        units,
        timing_offset_s,
        timing_validation: None,
    })
}

/// Cross-check the record's timing with an STA/LTA pick on the vertical
/// component, optionally shifting the time axes when a confident pick lands
/// within the correction limit. Always attaches the validation record.
fn validate_timing(waveform: &mut Waveform, station: &Station, apply_correction: bool) {
    // Fall back to a plain-velocity estimate when the oracle produced no
    // P pick, so the cross-check still runs.
    let expected_p_s = station
        .p_arrival_s()
        .or_else(|| Some(crate::arrivals::fallback::p_time_s(station.distance_deg)));
    let mut validation = TimingValidation {
        expected_p_s,
        ..TimingValidation::default()
    };

    let vertical = waveform
        .component(Component::Vertical)
        .or_else(|| waveform.components.values().next());
    let Some(series) = vertical else {
        waveform.timing_validation = Some(validation);
        return;
    };

    let (ratio, trigger_relative_s) =
        sta_lta(series.amplitude(), series.sampling_rate_hz, &StaLtaConfig::default());
    validation.trigger_ratio = ratio;
    let detected_p_s = trigger_relative_s.map(|t| t + waveform.timing_offset_s);
    validation.detected_p_s = detected_p_s;

    if let (Some(expected), Some(detected)) = (expected_p_s, detected_p_s) {
        let difference = detected - expected;
        validation.difference_s = Some(difference.abs());
        if difference.abs() <= defaults::MAX_TIMING_CORRECTION_S && ratio > 3.0 {
            if apply_correction && difference.abs() > 0.0 {
                for series in waveform.components.values_mut() {
                    for t in series.time_s.iter_mut() {
                        *t -= difference;
                    }
                }
                for t in waveform.time_s.iter_mut() {
                    *t -= difference;
                }
                waveform.timing_offset_s -= difference;
                validation.corrected = true;
                validation.correction_s = difference;
                info!(correction_s = difference, "Timing corrected from STA/LTA pick");
            }
        } else if difference.abs() > defaults::MAX_TIMING_CORRECTION_S {
            validation.warnings.push(format!(
                "STA/LTA pick afviger {:.1} s fra teoretisk P - ingen korrektion",
                difference.abs()
            ));
        }
    }

    // Physical sanity: the implied average P velocity must be plausible.
    let observed_p = expected_p_s.or(detected_p_s);
    if let Some(p_s) = observed_p {
        if p_s > 0.0 {
            let velocity = station.distance_km / p_s;
            validation.implicit_p_velocity_kms = Some(velocity);
            let (lower, upper) = defaults::P_VELOCITY_BOUNDS_KMS;
            if velocity < lower || velocity > upper {
                validation.warnings.push(format!(
                    "Implicit P-hastighed {:.1} km/s udenfor [{:.1}, {:.1}] - data kan være fra andet jordskælv",
                    velocity, lower, upper
                ));
            }
        }
    }

    waveform.timing_validation = Some(validation);
}

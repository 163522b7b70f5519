//! Tabular export of one analysis.
//!
//! Produces a workbook as bytes: a zip archive with three CSV sheets
//! (`Metadata`, `Time_Series_Data`, `Ms_Calculation`). Time-series data is
//! down-sampled to a bounded row count; columns are selectable over raw
//! counts, displacement and any filtered series of the current processing
//! run.

use crate::types::{
    Component, Event, MsExplanation, ProcessedWaveform, Station, Waveform,
};
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::write::FileOptions;
use zip::ZipWriter;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Sheet serialization failed: {0}")]
    Sheet(String),

    #[error("Archive write failed: {0}")]
    Archive(String),
}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        ExportError::Sheet(e.to_string())
    }
}

impl From<zip::result::ZipError> for ExportError {
    fn from(e: zip::result::ZipError) -> Self {
        ExportError::Archive(e.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Archive(e.to_string())
    }
}

/// Column and sizing options.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Row cap for the time-series sheet; longer records are strided.
    pub max_samples: usize,
    pub include_raw: bool,
    pub include_displacement: bool,
    /// Include the filtered series of the current processing run.
    pub include_filtered: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            max_samples: crate::config::defaults::EXPORT_MAX_SAMPLES,
            include_raw: true,
            include_displacement: true,
            include_filtered: false,
        }
    }
}

fn metadata_sheet(
    event: &Event,
    station: &Station,
    waveform: &Waveform,
    ms: Option<f64>,
) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Parameter", "Value"])?;

    let mut row = |name: &str, value: String| writer.write_record([name, value.as_str()]);
    row("Earthquake Magnitude", format!("{}", event.magnitude))?;
    row("Earthquake Magnitude Type", event.magnitude_type.clone())?;
    row("Earthquake Latitude", format!("{}", event.latitude))?;
    row("Earthquake Longitude", format!("{}", event.longitude))?;
    row("Earthquake Depth (km)", format!("{}", event.depth_km))?;
    row("Earthquake Time", event.origin_time.format("%Y-%m-%d %H:%M:%S").to_string())?;
    row("Region", event.region.clone())?;
    row("Station Network", station.network.clone())?;
    row("Station Code", station.code.clone())?;
    row("Station Latitude", format!("{}", station.latitude))?;
    row("Station Longitude", format!("{}", station.longitude))?;
    row("Distance (km)", format!("{:.1}", station.distance_km))?;
    row("Distance (degrees)", format!("{:.2}", station.distance_deg))?;
    row("Azimuth (degrees)", format!("{:.1}", station.azimuth_deg))?;

    let format_arrival = |value: Option<f64>| {
        value.map(|v| format!("{:.3}", v)).unwrap_or_else(|| "N/A".to_string())
    };
    if let Some(arrivals) = &station.arrivals {
        row("P Arrival (s)", format_arrival(arrivals.p_s))?;
        row("S Arrival (s)", format_arrival(arrivals.s_s))?;
        row("Love Arrival (s)", format!("{:.3}", arrivals.love_s))?;
        row("Rayleigh Arrival (s)", format!("{:.3}", arrivals.rayleigh_s))?;
        row("Surface Arrival (s)", format!("{:.3}", arrivals.surface_s))?;
    }

    row("Timing Offset (s)", format!("{:.3}", waveform.timing_offset_s))?;
    if let Some(validation) = &waveform.timing_validation {
        row("Timing Corrected", if validation.corrected { "Yes" } else { "No" }.to_string())?;
        if let Some(velocity) = validation.implicit_p_velocity_kms {
            row("P-wave Velocity (km/s)", format!("{:.2}", velocity))?;
        }
        for (index, warning) in validation.warnings.iter().enumerate() {
            row(&format!("Timing Warning {}", index + 1), warning.clone())?;
        }
    }
    if let Some(ms) = ms {
        row("Ms Magnitude", format!("{:.1}", ms))?;
    }
    row("Sampling Rate (Hz)", format!("{}", waveform.sampling_rate_hz))?;
    row("Units", format!("{:?}", waveform.units))?;
    row(
        "Available Components",
        waveform
            .available_components
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", "),
    )?;

    writer.into_inner().map_err(|e| ExportError::Sheet(e.to_string()))
}

fn timeseries_sheet(
    waveform: &Waveform,
    processed: Option<&ProcessedWaveform>,
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Time (s)".to_string()];
    let components = [Component::North, Component::East, Component::Vertical];
    if options.include_raw {
        for component in components {
            header.push(format!("{}_Raw (counts)", capitalised(component)));
        }
    }
    if options.include_displacement {
        for component in components {
            header.push(format!("{}_Disp (mm)", capitalised(component)));
        }
    }
    let filtered = options.include_filtered.then_some(processed).flatten();
    if let Some(processed) = filtered {
        for component in components {
            if processed.filtered.contains_key(&component) {
                header.push(format!("{}_{}", capitalised(component), processed.filter_info.name));
            }
        }
    }
    writer.write_record(&header)?;

    let n = waveform.time_s.len();
    if n == 0 {
        return writer.into_inner().map_err(|e| ExportError::Sheet(e.to_string()));
    }
    let stride = n.div_ceil(options.max_samples.max(1));

    let value_at = |data: Option<&[f64]>, index: usize| -> String {
        data.and_then(|d| d.get(index)).map(|v| format!("{}", v)).unwrap_or_default()
    };

    for index in (0..n).step_by(stride) {
        let mut record = vec![format!("{:.4}", waveform.time_s[index])];
        if options.include_raw {
            for component in components {
                record.push(value_at(
                    waveform.component(component).map(|s| s.raw_counts.as_slice()),
                    index,
                ));
            }
        }
        if options.include_displacement {
            for component in components {
                record.push(value_at(waveform.displacement_mm(component), index));
            }
        }
        if let Some(processed) = filtered {
            for component in components {
                if let Some(series) = processed.filtered.get(&component) {
                    record.push(value_at(Some(series.as_slice()), index));
                }
            }
        }
        writer.write_record(&record)?;
    }
    writer.into_inner().map_err(|e| ExportError::Sheet(e.to_string()))
}

fn ms_sheet(ms: Option<(f64, &MsExplanation)>) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Parameter", "Value"])?;
    let Some((magnitude, explanation)) = ms else {
        writer.write_record(["Ms Magnitude", "not computed"])?;
        return writer.into_inner().map_err(|e| ExportError::Sheet(e.to_string()));
    };

    let mut row = |name: &str, value: String| writer.write_record([name, value.as_str()]);
    row("Ms Magnitude", format!("{:.1}", magnitude))?;
    if let Some(component) = explanation.used_component {
        row("Used Component", component.to_string())?;
    }
    row("Amplitude North (um)", format!("{:.3}", explanation.amplitudes.north_um))?;
    row("Amplitude East (um)", format!("{:.3}", explanation.amplitudes.east_um))?;
    row("Amplitude Vertical (um)", format!("{:.3}", explanation.amplitudes.vertical_um))?;
    row("Amplitude Horizontal (um)", format!("{:.3}", explanation.amplitudes.horizontal_um))?;
    row("Amplitude Used (um)", format!("{:.3}", explanation.amplitudes.used_um))?;
    row("Period (s)", format!("{}", explanation.parameters.period_s))?;
    row("Distance (km)", format!("{:.1}", explanation.parameters.distance_km))?;
    row("Distance (deg)", format!("{:.3}", explanation.parameters.distance_deg))?;
    row("Filter Applied", format!("{}", explanation.filter.applied))?;
    if let (Some(low), Some(high)) = (explanation.filter.low_hz, explanation.filter.high_hz) {
        row("Filter Band (Hz)", format!("{} - {}", low, high))?;
    }
    row("A/T", format!("{:.4}", explanation.calculation.amplitude_period_ratio))?;
    row("log10(A/T)", format!("{:.4}", explanation.calculation.log_amp_period))?;
    row("log10(delta)", format!("{:.4}", explanation.calculation.log_distance))?;
    row("1.66*log10(delta)", format!("{:.4}", explanation.calculation.distance_term))?;
    row("Constant", format!("{}", explanation.calculation.constant))?;
    row("Raw Result", format!("{:.4}", explanation.calculation.raw_result))?;
    row("Depth Correction", format!("{:.4}", explanation.depth_correction.correction))?;
    row("Distance Correction", format!("{:.4}", explanation.distance_correction.correction))?;
    for issue in &explanation.validation.issues {
        row("Validation Issue", format!("{} ({})", issue.message, issue.detail))?;
    }
    writer.into_inner().map_err(|e| ExportError::Sheet(e.to_string()))
}

fn capitalised(component: Component) -> &'static str {
    match component {
        Component::North => "North",
        Component::East => "East",
        Component::Vertical => "Vertical",
    }
}

/// Build the workbook archive.
pub fn export_workbook(
    event: &Event,
    station: &Station,
    waveform: &Waveform,
    processed: Option<&ProcessedWaveform>,
    ms: Option<(f64, &MsExplanation)>,
    options: &ExportOptions,
) -> Result<Vec<u8>, ExportError> {
    let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options = FileOptions::default();

    archive.start_file("Metadata.csv", file_options)?;
    archive.write_all(&metadata_sheet(event, station, waveform, ms.map(|(m, _)| m))?)?;

    archive.start_file("Time_Series_Data.csv", file_options)?;
    archive.write_all(&timeseries_sheet(waveform, processed, options)?)?;

    archive.start_file("Ms_Calculation.csv", file_options)?;
    archive.write_all(&ms_sheet(ms)?)?;

    let cursor = archive.finish()?;
    Ok(cursor.into_inner())
}

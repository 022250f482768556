use std::io::Write;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{DailyData, Resident};

#[derive(Debug, Serialize)]
struct SeriesRow<'a> {
    resident_id: u32,
    resident_name: &'a str,
    day: u32,
    date: NaiveDate,
    stability: f64,
    pink_noise_usage: f64,
    fall_occurred: bool,
    fall_severity: Option<&'static str>,
    fall_location: Option<&'static str>,
    fall_time_of_day: Option<&'static str>,
    health_metrics: String,
}

fn metrics_cell(day: &DailyData) -> String {
    day.health_metrics
        .iter()
        .map(|metric| format!("{}={:.1} {}", metric.name, metric.value, metric.unit))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Writes one CSV row per day and returns the number of rows written.
pub fn write_series_csv<W: Write>(
    writer: W,
    resident: &Resident,
    series: &[DailyData],
) -> anyhow::Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for day in series.iter() {
        csv_writer.serialize(SeriesRow {
            resident_id: resident.id,
            resident_name: &resident.name,
            day: day.day,
            date: day.date,
            stability: day.stability,
            pink_noise_usage: day.pink_noise_usage,
            fall_occurred: day.fall_data.occurred,
            fall_severity: day.fall_data.severity.map(|s| s.as_str()),
            fall_location: day.fall_data.location.map(|l| l.as_str()),
            fall_time_of_day: day.fall_data.time_of_day.map(|t| t.as_str()),
            health_metrics: metrics_cell(day),
        })?;
    }

    csv_writer.flush()?;
    Ok(series.len())
}

pub fn write_series_csv_path(
    path: &Path,
    resident: &Resident,
    series: &[DailyData],
) -> anyhow::Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_series_csv(file, resident, series)
}

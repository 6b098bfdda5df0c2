use std::borrow::Cow;

use chrono::NaiveDate;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::{project_name, Project, TimeEntry};

pub const NO_ENTRIES: &str = "No entries";

/// Aggregated totals over a set of entries.
///
/// `projects` maps project name to hours and keeps first-seen order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub total_entries: usize,
    pub total_hours: f64,
    pub total_minutes: u64,
    pub date_range: String,
    pub projects: IndexMap<String, f64>,
}

/// Keeps entries whose date lies within the inclusive bounds.
///
/// Without any bound the input is handed back as is.
pub fn filter_by_date_range(
    entries: &[TimeEntry],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Cow<'_, [TimeEntry]> {
    if start.is_none() && end.is_none() {
        return Cow::Borrowed(entries);
    }

    let filtered: Vec<TimeEntry> = entries
        .iter()
        .filter(|entry| start.is_none_or(|start| entry.date >= start))
        .filter(|entry| end.is_none_or(|end| entry.date <= end))
        .cloned()
        .collect();
    debug!(
        "Kept {} of {} entries for range {:?} to {:?}",
        filtered.len(),
        entries.len(),
        start,
        end
    );
    Cow::Owned(filtered)
}

/// Summarizes entries in the order given.
///
/// The date range label is taken from the first and last entry of the slice,
/// so unsorted input yields a label that does not reflect the actual span.
/// See [`summarize_sorted`] for a chronological label.
pub fn summarize(entries: &[TimeEntry], projects: &[Project]) -> ExportSummary {
    let date_range = match (entries.first(), entries.last()) {
        (Some(first), Some(last)) => range_label(first.date, last.date),
        _ => NO_ENTRIES.to_string(),
    };
    build_summary(entries, projects, date_range)
}

/// Same totals as [`summarize`], with the date range spanning the earliest
/// and latest entry date.
pub fn summarize_sorted(entries: &[TimeEntry], projects: &[Project]) -> ExportSummary {
    let earliest = entries.iter().map(|entry| entry.date).min();
    let latest = entries.iter().map(|entry| entry.date).max();
    let date_range = match (earliest, latest) {
        (Some(first), Some(last)) => range_label(first, last),
        _ => NO_ENTRIES.to_string(),
    };
    build_summary(entries, projects, date_range)
}

/// Rounds to two decimal places, the precision of every reported hour value.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

pub fn minutes_to_hours(minutes: u64) -> f64 {
    minutes as f64 / 60.0
}

fn build_summary(entries: &[TimeEntry], projects: &[Project], date_range: String) -> ExportSummary {
    let mut total_minutes: u64 = 0;
    let mut project_hours: IndexMap<String, f64> = IndexMap::new();

    for entry in entries {
        let minutes = entry.duration_minutes();
        total_minutes += u64::from(minutes);
        let name = project_name(entry.project_id.as_deref(), projects);
        *project_hours.entry(name.to_string()).or_insert(0.0) += f64::from(minutes) / 60.0;
    }

    for hours in project_hours.values_mut() {
        *hours = round_hours(*hours);
    }

    ExportSummary {
        total_entries: entries.len(),
        total_hours: round_hours(minutes_to_hours(total_minutes)),
        total_minutes,
        date_range,
        projects: project_hours,
    }
}

fn range_label(first: NaiveDate, last: NaiveDate) -> String {
    format!(
        "{} to {}",
        first.format("%Y-%m-%d"),
        last.format("%Y-%m-%d")
    )
}

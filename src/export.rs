use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{project_name, Project, ProjectStatus, TimeEntry};
use crate::summary::{filter_by_date_range, minutes_to_hours, round_hours, summarize, ExportSummary};

pub const CSV_HEADERS: [&str; 10] = [
    "Date",
    "Start Time",
    "End Time",
    "Duration(Hours)",
    "Duration(Minutes)",
    "Project",
    "Description",
    "Status",
    "CreatedAt",
    "UpdatedAt",
];

const REPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Inclusive date bounds requested for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A rendered report, ready to be written or downloaded.
#[derive(Debug, Clone)]
pub struct Export {
    pub filename: String,
    pub content: String,
    pub summary: ExportSummary,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: ReportMetadata<'a>,
    projects: Vec<ProjectRecord<'a>>,
    entries: Vec<EntryRecord<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportMetadata<'a> {
    export_date: String,
    format: &'static str,
    version: &'static str,
    summary: &'a ExportSummary,
}

#[derive(Serialize)]
struct ProjectRecord<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryRecord<'a> {
    #[serde(flatten)]
    entry: &'a TimeEntry,
    project_name: &'a str,
    duration_hours: f64,
    duration_minutes: u32,
}

/// Filters, summarizes and renders entries in one go.
pub fn build_export(
    entries: &[TimeEntry],
    projects: &[Project],
    format: ExportFormat,
    range: Option<ExportRange>,
) -> Result<Export> {
    let filtered = filter_by_date_range(
        entries,
        range.map(|range| range.start_date),
        range.map(|range| range.end_date),
    );
    let summary = summarize(&filtered, projects);
    let content = match format {
        ExportFormat::Csv => to_csv(&filtered, projects, &summary),
        ExportFormat::Json => to_json(&filtered, projects, &summary)?,
    };
    let filename = generate_filename(format, range.as_ref());
    info!(
        "Rendered {} with {} entries ({} minutes)",
        filename, summary.total_entries, summary.total_minutes
    );

    Ok(Export {
        filename,
        content,
        summary,
    })
}

pub fn to_csv(entries: &[TimeEntry], projects: &[Project], summary: &ExportSummary) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(entries.len() + summary.projects.len() + 11);
    lines.push(CSV_HEADERS.join(","));

    for entry in entries {
        let minutes = entry.duration_minutes();
        let row = [
            entry.date.format("%Y-%m-%d").to_string(),
            entry.start_time.clone(),
            entry.end_time.clone().unwrap_or_default(),
            format!("{:.2}", f64::from(minutes) / 60.0),
            minutes.to_string(),
            project_name(entry.project_id.as_deref(), projects).to_string(),
            quote(&entry.description),
            entry.status.as_str().to_string(),
            entry.created_at.clone(),
            entry.updated_at.clone(),
        ];
        lines.push(row.join(","));
    }

    lines.push(String::new());
    lines.push("SUMMARY".to_string());
    lines.push(format!("Total Entries,{}", summary.total_entries));
    // Recomputed from minutes rather than taken from `summary.total_hours`.
    lines.push(format!(
        "Total Hours,{:.2}",
        minutes_to_hours(summary.total_minutes)
    ));
    lines.push(format!("Total Minutes,{}", summary.total_minutes));
    lines.push(format!("Date Range,{}", summary.date_range));
    lines.push(String::new());
    lines.push("PROJECT BREAKDOWN".to_string());
    lines.push("Project,Hours".to_string());
    for (name, hours) in &summary.projects {
        lines.push(format!("{name},{hours:.2} hours"));
    }
    lines.push(String::new());

    lines.join("\n")
}

pub fn to_json(
    entries: &[TimeEntry],
    projects: &[Project],
    summary: &ExportSummary,
) -> Result<String> {
    to_json_at(entries, projects, summary, Utc::now())
}

/// Renders the JSON report stamped with `exported_at`.
///
/// Project records carry display fields only; company ownership is left out.
pub fn to_json_at(
    entries: &[TimeEntry],
    projects: &[Project],
    summary: &ExportSummary,
    exported_at: DateTime<Utc>,
) -> Result<String> {
    let report = JsonReport {
        metadata: ReportMetadata {
            export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            format: ExportFormat::Json.extension(),
            version: REPORT_VERSION,
            summary,
        },
        projects: projects
            .iter()
            .map(|project| ProjectRecord {
                id: &project.id,
                name: &project.name,
                description: project.description.as_deref(),
                status: project.status,
                color: project.color.as_deref(),
            })
            .collect(),
        entries: entries
            .iter()
            .map(|entry| EntryRecord {
                entry,
                project_name: project_name(entry.project_id.as_deref(), projects),
                duration_hours: round_hours(f64::from(entry.duration_minutes()) / 60.0),
                duration_minutes: entry.duration_minutes(),
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn generate_filename(format: ExportFormat, range: Option<&ExportRange>) -> String {
    generate_filename_on(format, range, Local::now().date_naive())
}

/// `timesheet_report_<start>_to_<end>.<ext>`, or `timesheet_report_<today>.<ext>`
/// when no range was requested.
pub fn generate_filename_on(
    format: ExportFormat,
    range: Option<&ExportRange>,
    today: NaiveDate,
) -> String {
    let suffix = match range {
        Some(range) => format!(
            "{}_to_{}",
            range.start_date.format("%Y-%m-%d"),
            range.end_date.format("%Y-%m-%d")
        ),
        None => today.format("%Y-%m-%d").to_string(),
    };
    format!("timesheet_report_{suffix}.{}", format.extension())
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::fixtures::{entry, project};
    use chrono::TimeZone;

    fn day(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    fn sample() -> (Vec<TimeEntry>, Vec<Project>) {
        let projects = vec![project("p1", "Alpha"), project("p2", "Beta")];
        let mut running = entry("3", "2024-01-03", Some(0), None);
        running.end_time = None;
        let entries = vec![
            entry("1", "2024-01-01", Some(90), Some("p1")),
            entry("2", "2024-01-02", Some(30), Some("p2")),
            running,
        ];
        (entries, projects)
    }

    #[test]
    fn csv_starts_with_fixed_header() {
        let (entries, projects) = sample();
        let summary = summarize(&entries, &projects);
        let csv = to_csv(&entries, &projects, &summary);
        assert_eq!(
            csv.lines().next().unwrap(),
            "Date,Start Time,End Time,Duration(Hours),Duration(Minutes),Project,Description,Status,CreatedAt,UpdatedAt"
        );
    }

    #[test]
    fn csv_rows_and_summary_block() {
        let (entries, projects) = sample();
        let summary = summarize(&entries, &projects);
        let csv = to_csv(&entries, &projects, &summary);
        let lines: Vec<&str> = csv.split('\n').collect();

        assert_eq!(
            lines[1],
            "2024-01-01,09:00,10:00,1.50,90,Alpha,\"Entry 1\",submitted,2024-01-01T09:00:00Z,2024-01-01T10:00:00Z"
        );
        assert_eq!(
            lines[3],
            "2024-01-03,09:00,,0.00,0,No Project,\"Entry 3\",submitted,2024-01-03T09:00:00Z,2024-01-03T10:00:00Z"
        );
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "SUMMARY");
        assert_eq!(lines[6], "Total Entries,3");
        assert_eq!(lines[7], "Total Hours,2.00");
        assert_eq!(lines[8], "Total Minutes,120");
        assert_eq!(lines[9], "Date Range,2024-01-01 to 2024-01-03");
        assert_eq!(lines[11], "PROJECT BREAKDOWN");
        assert_eq!(lines[13], "Alpha,1.50 hours");
        assert_eq!(lines[14], "Beta,0.50 hours");
        assert_eq!(lines[15], "No Project,0.00 hours");
        assert!(csv.ends_with('\n'));
    }

    #[test]
    fn csv_line_count_matches_layout() {
        let (entries, projects) = sample();
        let summary = summarize(&entries, &projects);
        let csv = to_csv(&entries, &projects, &summary);
        let expected = 1 + entries.len() + 10 + summary.projects.len();
        assert_eq!(csv.split('\n').count(), expected);
    }

    #[test]
    fn csv_quotes_description() {
        let mut quoted = entry("1", "2024-01-01", Some(60), None);
        quoted.description = "Fix \"login\", again".to_string();
        let summary = summarize(std::slice::from_ref(&quoted), &[]);
        let csv = to_csv(&[quoted], &[], &summary);
        assert!(csv.contains(",\"Fix \"\"login\"\", again\","));
    }

    #[test]
    fn csv_total_hours_ignores_summary_field() {
        let (entries, projects) = sample();
        let mut summary = summarize(&entries, &projects);
        summary.total_hours = 99.0;
        let csv = to_csv(&entries, &projects, &summary);
        assert!(csv.contains("\nTotal Hours,2.00\n"));
    }

    #[test]
    fn json_report_layout() {
        let (entries, projects) = sample();
        let summary = summarize(&entries, &projects);
        let exported_at = Utc.with_ymd_and_hms(2024, 1, 4, 12, 0, 0).unwrap();
        let json = to_json_at(&entries, &projects, &summary, exported_at).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["exportDate"], "2024-01-04T12:00:00.000Z");
        assert_eq!(value["metadata"]["format"], "json");
        assert_eq!(value["metadata"]["version"], "1.0");
        assert_eq!(value["metadata"]["summary"]["totalMinutes"], 120);

        let first_project = &value["projects"][0];
        assert_eq!(first_project["name"], "Alpha");
        assert_eq!(first_project["status"], "active");
        assert_eq!(first_project["color"], "#3366ff");
        assert!(first_project.get("companyId").is_none());
        assert!(first_project.get("startDate").is_none());

        let first_entry = &value["entries"][0];
        assert_eq!(first_entry["id"], "1");
        assert_eq!(first_entry["projectName"], "Alpha");
        assert_eq!(first_entry["durationHours"], 1.5);
        assert_eq!(first_entry["durationMinutes"], 90);
        assert_eq!(value["entries"][2]["projectName"], "No Project");
    }

    #[test]
    fn json_is_indented_with_two_spaces() {
        let summary = summarize(&[], &[]);
        let json = to_json(&[], &[], &summary).unwrap();
        assert!(json.starts_with("{\n  \"metadata\": {\n    \"exportDate\""));
    }

    #[test]
    fn filename_with_range() {
        let range = ExportRange {
            start_date: day("2024-01-01"),
            end_date: day("2024-01-15"),
        };
        assert_eq!(
            generate_filename(ExportFormat::Json, Some(&range)),
            "timesheet_report_2024-01-01_to_2024-01-15.json"
        );
    }

    #[test]
    fn filename_without_range_uses_today() {
        assert_eq!(
            generate_filename_on(ExportFormat::Csv, None, day("2024-03-05")),
            "timesheet_report_2024-03-05.csv"
        );

        let name = generate_filename(ExportFormat::Csv, None);
        let date = name
            .strip_prefix("timesheet_report_")
            .and_then(|rest| rest.strip_suffix(".csv"))
            .unwrap();
        assert_eq!(date.len(), 10);
        assert!(NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn build_export_filters_before_summarizing() {
        let (entries, projects) = sample();
        let range = ExportRange {
            start_date: day("2024-01-02"),
            end_date: day("2024-01-03"),
        };
        let export = build_export(&entries, &projects, ExportFormat::Csv, Some(range)).unwrap();
        assert_eq!(export.filename, "timesheet_report_2024-01-02_to_2024-01-03.csv");
        assert_eq!(export.summary.total_entries, 2);
        assert_eq!(export.summary.total_minutes, 30);
        assert!(!export.content.contains("Entry 1"));
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::durations::elapsed_minutes;

pub const NO_PROJECT: &str = "No Project";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Submitted => "submitted",
            EntryStatus::Approved => "approved",
            EntryStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}

/// A single timesheet row as handed over by the application layer.
///
/// `duration` is in minutes. It may be missing on partially filled rows, in
/// which case every aggregate treats it as zero.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub date: NaiveDate,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub description: String,
    pub status: EntryStatus,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}

impl TimeEntry {
    pub fn duration_minutes(&self) -> u32 {
        self.duration.unwrap_or(0)
    }

    /// Entries without an end time are still being tracked.
    pub fn is_running(&self) -> bool {
        self.end_time.is_none()
    }

    /// Minutes between `start_time` and `end_time`, when both parse.
    pub fn elapsed_minutes(&self) -> Option<u32> {
        let end_time = self.end_time.as_deref()?;
        elapsed_minutes(&self.start_time, end_time)
    }
}

/// Resolves the display name for a project reference, falling back to
/// [`NO_PROJECT`] for absent or dangling ids.
pub fn project_name<'a>(project_id: Option<&str>, projects: &'a [Project]) -> &'a str {
    project_id
        .and_then(|id| projects.iter().find(|project| project.id == id))
        .map(|project| project.name.as_str())
        .unwrap_or(NO_PROJECT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, name: &str) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
            status: ProjectStatus::Active,
            color: None,
            company_id: None,
        }
    }

    #[test]
    fn project_name_resolves_known_id() {
        let projects = vec![project("p1", "Alpha"), project("p2", "Beta")];
        assert_eq!(project_name(Some("p2"), &projects), "Beta");
    }

    #[test]
    fn project_name_falls_back_for_missing_and_dangling() {
        let projects = vec![project("p1", "Alpha")];
        assert_eq!(project_name(None, &projects), NO_PROJECT);
        assert_eq!(project_name(Some("gone"), &projects), NO_PROJECT);
    }

    #[test]
    fn entry_deserializes_without_duration() {
        let json = r#"{
            "id": "e1",
            "userId": "u1",
            "date": "2024-01-20",
            "startTime": "09:00",
            "description": "Standup",
            "status": "draft",
            "createdAt": "2024-01-20T09:00:00Z",
            "updatedAt": "2024-01-20T09:00:00Z"
        }"#;
        let entry: TimeEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.duration, None);
        assert_eq!(entry.duration_minutes(), 0);
        assert!(entry.is_running());
        assert_eq!(entry.project_id, None);
    }

    #[test]
    fn elapsed_minutes_needs_end_time() {
        let mut entry: TimeEntry = serde_json::from_str(
            r#"{
                "id": "e2",
                "userId": "u1",
                "date": "2024-01-20",
                "startTime": "09:15",
                "endTime": "11:00",
                "duration": 105,
                "status": "approved",
                "createdAt": "2024-01-20T09:15:00Z",
                "updatedAt": "2024-01-20T11:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(entry.elapsed_minutes(), Some(105));
        assert_eq!(entry.description, "");
        entry.end_time = None;
        assert_eq!(entry.elapsed_minutes(), None);
    }

    #[test]
    fn project_status_uses_kebab_case() {
        let status: ProjectStatus = serde_json::from_str("\"on-hold\"").unwrap();
        assert_eq!(status, ProjectStatus::OnHold);
        assert_eq!(
            serde_json::to_string(&ProjectStatus::OnHold).unwrap(),
            "\"on-hold\""
        );
    }
}

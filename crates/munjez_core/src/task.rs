use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(u64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{}", n),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        TaskId::Number(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        TaskId::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
    Archived,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Archived,
    ];
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Med,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Urgent, Priority::High, Priority::Med, Priority::Low];
}

/// A to-do/calendar item. Placement on the calendar uses only the calendar date of `due_date`,
/// read as local wall-clock time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    pub due_date: NaiveDateTime,
    #[serde(default)]
    pub project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub is_prayer: bool,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>, due_date: NaiveDateTime) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: Priority::default(),
            due_date,
            project: String::new(),
            color: None,
            is_prayer: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn as_prayer(mut self) -> Self {
        self.is_prayer = true;
        self
    }

    pub fn calendar_date(&self) -> NaiveDate {
        self.due_date.date()
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

/// Wire shape of a task before its due date is resolved.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    pub due_date: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_prayer: bool,
}

impl TryFrom<TaskRecord> for Task {
    type Error = CalendarError;

    fn try_from(record: TaskRecord) -> Result<Self> {
        Ok(Self {
            due_date: parse_due_date(&record.due_date)?,
            id: record.id,
            title: record.title,
            description: record.description,
            status: record.status,
            priority: record.priority,
            project: record.project,
            color: record.color,
            is_prayer: record.is_prayer,
        })
    }
}

const DATE_TIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses a local timestamp. A bare `YYYY-MM-DD` resolves to midnight.
pub fn parse_due_date(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    parse_calendar_date(trimmed).map(|date| date.and_time(NaiveTime::MIN))
}

pub fn parse_calendar_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| CalendarError::invalid(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_timestamp_shapes() {
        let expected = NaiveDate::from_ymd_opt(2025, 9, 10)
            .unwrap()
            .and_hms_opt(17, 0, 0)
            .unwrap();
        assert_eq!(parse_due_date("2025-09-10T17:00").unwrap(), expected);
        assert_eq!(parse_due_date("2025-09-10T17:00:00").unwrap(), expected);
        assert_eq!(parse_due_date(" 2025-09-10 17:00 ").unwrap(), expected);

        let midnight = parse_due_date("2025-09-10").expect("date only");
        assert_eq!(midnight.time(), NaiveTime::MIN);
    }

    #[test]
    fn rejects_unresolvable_dates() {
        let err = parse_due_date("2025-02-30T10:00").expect_err("no such day");
        assert!(err.is_invalid_date());
        assert!(matches!(
            parse_calendar_date("tomorrow"),
            Err(CalendarError::InvalidDate { .. })
        ));
    }

    #[test]
    fn deserializes_source_shaped_json() {
        let raw = r##"{
            "id": 7,
            "title": "Fajr",
            "status": "in_progress",
            "priority": "urgent",
            "dueDate": "2025-09-10T04:15:00",
            "project": "prayer",
            "isPrayer": true
        }"##;
        let task: Task = serde_json::from_str(raw).expect("task json");
        assert_eq!(task.id, TaskId::Number(7));
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, Priority::Urgent);
        assert!(task.is_prayer);
        assert!(task.color.is_none());
        assert_eq!(task.calendar_date(), NaiveDate::from_ymd_opt(2025, 9, 10).unwrap());
    }

    #[test]
    fn accepts_every_parseable_due_date_shape() {
        for raw in ["2025-09-10", "2025-09-10T10:00", "2025-09-10 10:00:30"] {
            let json = format!(r#"{{"id": 1, "title": "t", "dueDate": "{}"}}"#, raw);
            let task: Task = serde_json::from_str(&json).expect("task json");
            assert_eq!(task.calendar_date(), NaiveDate::from_ymd_opt(2025, 9, 10).unwrap());
        }
    }

    #[test]
    fn record_with_impossible_day_converts_to_invalid_date() {
        let record: TaskRecord =
            serde_json::from_str(r#"{"id": 2, "title": "t", "dueDate": "2025-02-30T10:00:00"}"#)
                .expect("record json");
        let err = Task::try_from(record).expect_err("no such day");
        assert!(matches!(&err, CalendarError::InvalidDate { input } if input == "2025-02-30T10:00:00"));
    }

    #[test]
    fn text_ids_round_trip_through_display() {
        let task = Task::new("a1b2", "Review", parse_due_date("2025-09-10").unwrap());
        assert_eq!(task.id.to_string(), "a1b2");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Med);
    }
}

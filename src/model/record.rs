//! Raw records handed over by the document-parsing front end.
//!
//! These mirror the fields of a Microsoft Project XML export one-to-one and
//! keep values as the parser found them, mostly as text. All fields are
//! optional on the wire; [`crate::model::Project::from_records`] turns them
//! into canonical [`crate::model::Task`] entities.

use serde::{Deserialize, Serialize};

use super::project::parse_duration_hours;

/// The complete hand-off from the parser: one project, in document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSet {
    pub project: ProjectRecord,
    pub tasks: Vec<TaskRecord>,
    pub resources: Vec<ResourceRecord>,
    pub assignments: Vec<AssignmentRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectRecord {
    pub name: String,
    pub title: String,
    pub author: String,
    pub manager: String,
    pub company: String,
    pub start_date: String,
    pub finish_date: String,
    pub last_saved: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskRecord {
    pub uid: String,
    pub id: String,
    pub name: String,
    pub start: String,
    pub finish: String,
    pub duration: DurationValue,
    pub outline_level: Option<i64>,
    pub summary: bool,
    pub milestone: bool,
    pub percent_complete: Option<i64>,
    pub priority: Option<i64>,
    pub notes: String,
    pub wbs: String,
    pub predecessor_uids: Vec<String>,
}

/// A task duration on the wire: a number of hours (`40`), or text holding
/// plain hours (`"16"`) or an ISO-8601 duration (`"PT16H0M0S"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Hours(f64),
    Text(String),
}

impl Default for DurationValue {
    fn default() -> Self {
        DurationValue::Text(String::new())
    }
}

impl DurationValue {
    /// Work hours; anything unreadable is zero.
    pub fn hours(&self) -> f64 {
        match self {
            DurationValue::Hours(h) if h.is_finite() => *h,
            DurationValue::Hours(_) => 0.0,
            DurationValue::Text(s) => parse_duration_hours(s),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceRecord {
    pub uid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub initials: String,
    pub email_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub uid: String,
    pub task_uid: String,
    pub resource_uid: String,
    /// Allocation fraction; 1.0 is full time.
    pub units: f64,
}

impl Default for AssignmentRecord {
    fn default() -> Self {
        Self {
            uid: String::new(),
            task_uid: String::new(),
            resource_uid: String::new(),
            units: 1.0,
        }
    }
}

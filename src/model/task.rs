use std::fmt;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Days a finished task keeps counting as "just finished".
pub const JUST_FINISHED_WINDOW_DAYS: i64 = 14;
/// Days ahead a task start counts as "upcoming".
pub const UPCOMING_WINDOW_DAYS: i64 = 21;

/// Stable task identity as carried by the source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskUid(pub String);

impl TaskUid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskUid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TaskUid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A named resource that can be assigned to tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub uid: String,
    pub name: String,
    pub kind: String,
    pub initials: String,
    pub email: String,
}

/// A single schedule entry. Built once by the normalizer and never mutated
/// by the view pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub uid: TaskUid,
    /// Display id (row number in the source tool).
    pub id: String,
    pub name: String,
    pub wbs: String,
    pub notes: String,
    pub priority: u32,
    /// 1-based depth in the work-breakdown structure.
    pub outline_level: u32,
    pub parent: Option<TaskUid>,
    pub children: Vec<TaskUid>,
    pub start: Option<NaiveDateTime>,
    pub finish: Option<NaiveDateTime>,
    pub duration_hours: f64,
    /// 0 – 100.
    pub percent_complete: u8,
    pub is_summary: bool,
    pub is_milestone: bool,
    pub predecessors: Vec<TaskUid>,
    pub resources: Vec<String>,
}

/// Where a task sits relative to "now", as shown in the navigation banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Completed,
    InProgress,
    Upcoming,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Completed => "Completed",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Upcoming => "Upcoming",
        }
    }
}

/// Membership reason in the near-today set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearToday {
    InProgress,
    JustFinished,
    Upcoming,
}

/// Windows used to classify tasks as near today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearTodayWindows {
    pub just_finished_days: i64,
    pub upcoming_days: i64,
}

impl Default for NearTodayWindows {
    fn default() -> Self {
        Self {
            just_finished_days: JUST_FINISHED_WINDOW_DAYS,
            upcoming_days: UPCOMING_WINDOW_DAYS,
        }
    }
}

impl Task {
    /// Create a plain leaf task with no dates. Mostly useful for tests and
    /// for the CSV importer, which fills the rest in afterwards.
    pub fn new(uid: impl Into<TaskUid>, name: impl Into<String>) -> Self {
        let uid = uid.into();
        Self {
            id: uid.0.clone(),
            uid,
            name: name.into(),
            wbs: String::new(),
            notes: String::new(),
            priority: 500,
            outline_level: 1,
            parent: None,
            children: Vec::new(),
            start: None,
            finish: None,
            duration_hours: 0.0,
            percent_complete: 0,
            is_summary: false,
            is_milestone: false,
            predecessors: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn is_done_at(&self, now: NaiveDateTime) -> bool {
        self.finish.is_some_and(|f| f < now)
    }

    /// The instant used to order this task chronologically: its finish once
    /// that lies in the past, otherwise its start, otherwise its finish.
    pub fn key_instant(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        if self.is_done_at(now) {
            return self.finish;
        }
        self.start.or(self.finish)
    }

    pub fn status_at(&self, now: NaiveDateTime) -> TaskStatus {
        if self.is_done_at(now) {
            return TaskStatus::Completed;
        }
        match (self.start, self.finish) {
            (Some(s), Some(f)) if s <= now && f >= now => TaskStatus::InProgress,
            _ => TaskStatus::Upcoming,
        }
    }

    /// Classify against the near-today windows. Summaries and milestones are
    /// never part of the set.
    pub fn near_today(&self, now: NaiveDateTime, windows: NearTodayWindows) -> Option<NearToday> {
        if self.is_summary || self.is_milestone {
            return None;
        }
        let in_progress = matches!(
            (self.start, self.finish),
            (Some(s), Some(f)) if s <= now && f >= now
        );
        if in_progress {
            return Some(NearToday::InProgress);
        }
        let finished_after = now - Duration::days(windows.just_finished_days);
        if self.finish.is_some_and(|f| f >= finished_after && f <= now) {
            return Some(NearToday::JustFinished);
        }
        let upcoming_before = now + Duration::days(windows.upcoming_days);
        if self.start.is_some_and(|s| s >= now && s <= upcoming_before) {
            return Some(NearToday::Upcoming);
        }
        None
    }

    pub fn matches_filter(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty() || self.name.to_lowercase().contains(needle_lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn dated(start: Option<NaiveDateTime>, finish: Option<NaiveDateTime>) -> Task {
        let mut t = Task::new("1", "Work");
        t.start = start;
        t.finish = finish;
        t
    }

    #[test]
    fn key_instant_prefers_finish_once_done() {
        let now = at(2024, 3, 1);
        let done = dated(Some(at(2024, 1, 1)), Some(at(2024, 2, 1)));
        assert_eq!(done.key_instant(now), Some(at(2024, 2, 1)));

        let running = dated(Some(at(2024, 2, 20)), Some(at(2024, 3, 20)));
        assert_eq!(running.key_instant(now), Some(at(2024, 2, 20)));

        let finish_only = dated(None, Some(at(2024, 4, 1)));
        assert_eq!(finish_only.key_instant(now), Some(at(2024, 4, 1)));

        assert_eq!(dated(None, None).key_instant(now), None);
    }

    #[test]
    fn near_today_classification() {
        let now = at(2024, 3, 1);
        let w = NearTodayWindows::default();

        let running = dated(Some(at(2024, 2, 20)), Some(at(2024, 3, 20)));
        assert_eq!(running.near_today(now, w), Some(NearToday::InProgress));

        let recent = dated(Some(at(2024, 2, 1)), Some(at(2024, 2, 20)));
        assert_eq!(recent.near_today(now, w), Some(NearToday::JustFinished));

        let old = dated(Some(at(2024, 1, 1)), Some(at(2024, 2, 1)));
        assert_eq!(old.near_today(now, w), None);

        let soon = dated(Some(at(2024, 3, 15)), Some(at(2024, 4, 15)));
        assert_eq!(soon.near_today(now, w), Some(NearToday::Upcoming));

        let far = dated(Some(at(2024, 5, 1)), Some(at(2024, 6, 1)));
        assert_eq!(far.near_today(now, w), None);

        let mut summary = running.clone();
        summary.is_summary = true;
        assert_eq!(summary.near_today(now, w), None);
    }

    #[test]
    fn status_labels() {
        let now = at(2024, 3, 1);
        assert_eq!(
            dated(Some(at(2024, 1, 1)), Some(at(2024, 2, 1))).status_at(now),
            TaskStatus::Completed
        );
        assert_eq!(
            dated(Some(at(2024, 2, 1)), Some(at(2024, 4, 1))).status_at(now),
            TaskStatus::InProgress
        );
        assert_eq!(
            dated(Some(at(2024, 4, 1)), None).status_at(now),
            TaskStatus::Upcoming
        );
    }

    #[test]
    fn filter_is_case_insensitive() {
        let t = Task::new("7", "Design Review");
        assert!(t.matches_filter("design"));
        assert!(t.matches_filter(""));
        assert!(!t.matches_filter("procure"));
    }
}

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::record::RecordSet;
use super::task::{Resource, Task, TaskUid};
use crate::engine::hierarchy::Hierarchy;

/// Uid the source tool reserves for its implicit project-root task/resource.
const ROOT_UID: &str = "0";
/// Work hours in one scheduled day.
const HOURS_PER_DAY: f64 = 8.0;

/// Header information shown above the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    pub author: String,
    pub company: String,
    pub last_saved: String,
    pub start: Option<NaiveDateTime>,
    pub finish: Option<NaiveDateTime>,
    pub resource_count: usize,
}

impl Default for ProjectSummary {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
            author: String::new(),
            company: String::new(),
            last_saved: String::new(),
            start: None,
            finish: None,
            resource_count: 0,
        }
    }
}

/// Counts shown in the footer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectStats {
    pub tasks: usize,
    pub milestones: usize,
    pub summaries: usize,
    pub complete: usize,
    pub resources: usize,
}

/// An immutable, normalized schedule: tasks in document order plus a
/// uid index into them.
#[derive(Debug, Clone, Default)]
pub struct Project {
    pub summary: ProjectSummary,
    pub tasks: Vec<Task>,
    pub resources: Vec<Resource>,
    /// Earliest start and latest finish over tasks carrying both dates.
    pub date_range: Option<(NaiveDateTime, NaiveDateTime)>,
    index: HashMap<TaskUid, usize>,
    hierarchy: Hierarchy,
}

impl Project {
    /// Build a project from already-typed tasks in document order. Parent and
    /// child links are (re)derived from the outline levels.
    pub fn from_tasks(summary: ProjectSummary, mut tasks: Vec<Task>, resources: Vec<Resource>) -> Self {
        let hierarchy = Hierarchy::from_outline(&tasks);
        hierarchy.apply(&mut tasks);

        let mut index = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if index.contains_key(&task.uid) {
                warn!("duplicate task uid {} at row {}; first occurrence wins", task.uid, i);
                continue;
            }
            index.insert(task.uid.clone(), i);
        }

        let date_range = compute_date_range(&tasks);
        let mut summary = summary;
        summary.resource_count = resources.len();
        if summary.start.is_none() {
            summary.start = date_range.map(|(min, _)| min);
        }
        if summary.finish.is_none() {
            summary.finish = date_range.map(|(_, max)| max);
        }

        Self {
            summary,
            tasks,
            resources,
            date_range,
            index,
            hierarchy,
        }
    }

    /// Normalize a raw record set into canonical tasks.
    ///
    /// Never fails: records that cannot be used (root task, nameless tasks,
    /// dangling assignments) are skipped and malformed optional values
    /// degrade to absent.
    pub fn from_records(records: RecordSet) -> Self {
        let p = &records.project;
        let summary = ProjectSummary {
            name: first_non_empty(&[&p.name, &p.title]).unwrap_or("Untitled Project").to_string(),
            author: first_non_empty(&[&p.author, &p.manager]).unwrap_or_default().to_string(),
            company: p.company.trim().to_string(),
            last_saved: p.last_saved.trim().to_string(),
            start: parse_instant(&p.start_date),
            finish: parse_instant(&p.finish_date),
            resource_count: 0,
        };

        let resources: Vec<Resource> = records
            .resources
            .iter()
            .filter(|r| r.uid.trim() != ROOT_UID && !r.name.trim().is_empty())
            .map(|r| Resource {
                uid: r.uid.trim().to_string(),
                name: r.name.trim().to_string(),
                kind: r.kind.trim().to_string(),
                initials: r.initials.trim().to_string(),
                email: r.email_address.trim().to_string(),
            })
            .collect();
        let resource_names: HashMap<&str, &str> = resources
            .iter()
            .map(|r| (r.uid.as_str(), r.name.as_str()))
            .collect();

        let mut assigned: HashMap<&str, Vec<String>> = HashMap::new();
        for a in &records.assignments {
            match resource_names.get(a.resource_uid.trim()) {
                Some(name) => assigned
                    .entry(a.task_uid.trim())
                    .or_default()
                    .push((*name).to_string()),
                None => debug!(
                    "assignment {} references unknown resource {}",
                    a.uid, a.resource_uid
                ),
            }
        }

        let mut tasks = Vec::with_capacity(records.tasks.len());
        for rec in &records.tasks {
            let uid = rec.uid.trim();
            let name = rec.name.trim();
            if uid == ROOT_UID || name.is_empty() {
                continue;
            }
            let mut task = Task::new(uid, name);
            if !rec.id.trim().is_empty() {
                task.id = rec.id.trim().to_string();
            }
            task.wbs = rec.wbs.trim().to_string();
            task.notes = rec.notes.clone();
            task.priority = rec.priority.map_or(500, |p| p.clamp(0, 1000) as u32);
            task.outline_level = rec.outline_level.map_or(1, |l| l.max(1) as u32);
            task.start = parse_instant(&rec.start);
            task.finish = parse_instant(&rec.finish);
            task.duration_hours = rec.duration.hours();
            task.percent_complete = rec.percent_complete.map_or(0, |p| p.clamp(0, 100) as u8);
            task.is_summary = rec.summary;
            task.is_milestone = rec.milestone;
            task.predecessors = rec
                .predecessor_uids
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(TaskUid::from)
                .collect();
            task.resources = assigned.get(uid).cloned().unwrap_or_default();
            tasks.push(task);
        }

        Self::from_tasks(summary, tasks, resources)
    }

    pub fn task(&self, uid: &TaskUid) -> Option<&Task> {
        self.index.get(uid).map(|&i| &self.tasks[i])
    }

    /// Arena position of the task owning `uid`.
    pub fn position(&self, uid: &TaskUid) -> Option<usize> {
        self.index.get(uid).copied()
    }

    /// Arena positions of the children of the task at `pos`. Unlike
    /// [`Task::children`] this keeps rows whose uid is duplicated.
    pub fn child_positions(&self, pos: usize) -> &[usize] {
        self.hierarchy.children_of(pos)
    }

    /// Tasks without a parent, in document order.
    pub fn roots(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.parent.is_none())
    }

    pub fn stats(&self) -> ProjectStats {
        ProjectStats {
            tasks: self
                .tasks
                .iter()
                .filter(|t| !t.is_summary && !t.is_milestone)
                .count(),
            milestones: self.tasks.iter().filter(|t| t.is_milestone).count(),
            summaries: self.tasks.iter().filter(|t| t.is_summary).count(),
            complete: self.tasks.iter().filter(|t| t.percent_complete == 100).count(),
            resources: self.resources.len(),
        }
    }
}

fn first_non_empty<'a>(candidates: &[&'a String]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
}

fn compute_date_range(tasks: &[Task]) -> Option<(NaiveDateTime, NaiveDateTime)> {
    tasks
        .iter()
        .filter_map(|t| Some((t.start?, t.finish?)))
        .fold(None, |acc, (s, f)| {
            let lo = s.min(f);
            let hi = s.max(f);
            Some(match acc {
                None => (lo, hi),
                Some((min, max)) => (min.min(lo), max.max(hi)),
            })
        })
}

/// Parse a document date-time. Accepts local ISO date-times, RFC 3339 with
/// a zone (converted to UTC), and bare dates (midnight).
pub fn parse_instant(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse a duration into work hours. ISO-8601 durations count a day as
/// eight hours; anything else is read as a plain number of hours.
pub fn parse_duration_hours(s: &str) -> f64 {
    static ISO: OnceLock<Option<Regex>> = OnceLock::new();
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    let iso = ISO.get_or_init(|| Regex::new(r"P(?:(\d+)D)?T?(?:(\d+)H)?(?:(\d+)M)?").ok());
    if let Some(caps) = iso.as_ref().and_then(|re| re.captures(s)) {
        let part = |i: usize| -> f64 {
            caps.get(i)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(0.0)
        };
        return part(1) * HOURS_PER_DAY + part(2) + part(3) / 60.0;
    }
    s.parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::{AssignmentRecord, ResourceRecord, TaskRecord};

    fn rec(uid: &str, name: &str, level: i64, summary: bool) -> TaskRecord {
        TaskRecord {
            uid: uid.into(),
            name: name.into(),
            outline_level: Some(level),
            summary,
            start: "2024-01-01T08:00:00".into(),
            finish: "2024-01-05T17:00:00".into(),
            ..Default::default()
        }
    }

    #[test]
    fn parses_document_dates() {
        let dt = parse_instant("2024-01-15T08:00:00").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 08:00:00");
        assert_eq!(
            parse_instant("2024-01-15T08:00:00Z").unwrap().to_string(),
            "2024-01-15 08:00:00"
        );
        assert_eq!(
            parse_instant("2024-01-15").unwrap().to_string(),
            "2024-01-15 00:00:00"
        );
        assert_eq!(parse_instant(""), None);
        assert_eq!(parse_instant("not a date"), None);
    }

    #[test]
    fn parses_durations_as_work_hours() {
        assert_eq!(parse_duration_hours("PT40H0M0S"), 40.0);
        assert_eq!(parse_duration_hours("P2DT4H"), 20.0);
        assert_eq!(parse_duration_hours("PT0H30M0S"), 0.5);
        assert_eq!(parse_duration_hours("16"), 16.0);
        assert_eq!(parse_duration_hours("garbage"), 0.0);
        assert_eq!(parse_duration_hours(""), 0.0);
    }

    #[test]
    fn skips_root_and_nameless_tasks() {
        let records = RecordSet {
            tasks: vec![
                rec("0", "Project root", 0, true),
                rec("1", "Phase", 1, true),
                rec("2", "", 2, false),
                rec("3", "Build", 2, false),
            ],
            ..Default::default()
        };
        let project = Project::from_records(records);
        let uids: Vec<&str> = project.tasks.iter().map(|t| t.uid.as_str()).collect();
        assert_eq!(uids, vec!["1", "3"]);
        assert_eq!(project.tasks[1].parent, Some(TaskUid::from("1")));
    }

    #[test]
    fn resolves_assignments_to_resource_names() {
        let records = RecordSet {
            tasks: vec![rec("1", "Build", 1, false)],
            resources: vec![
                ResourceRecord { uid: "0".into(), name: "Unassigned".into(), ..Default::default() },
                ResourceRecord { uid: "5".into(), name: "Ada".into(), ..Default::default() },
            ],
            assignments: vec![
                AssignmentRecord { task_uid: "1".into(), resource_uid: "5".into(), ..Default::default() },
                AssignmentRecord { task_uid: "1".into(), resource_uid: "99".into(), ..Default::default() },
            ],
            ..Default::default()
        };
        let project = Project::from_records(records);
        assert_eq!(project.tasks[0].resources, vec!["Ada".to_string()]);
        assert_eq!(project.summary.resource_count, 1);
    }

    #[test]
    fn summary_falls_back_to_title_and_computed_range() {
        let mut records = RecordSet {
            tasks: vec![rec("1", "Build", 1, false)],
            ..Default::default()
        };
        records.project.title = "Bridge".into();
        records.project.manager = "Grace".into();
        let project = Project::from_records(records);
        assert_eq!(project.summary.name, "Bridge");
        assert_eq!(project.summary.author, "Grace");
        assert_eq!(project.summary.start, parse_instant("2024-01-01T08:00:00"));
        assert_eq!(project.summary.finish, parse_instant("2024-01-05T17:00:00"));
    }

    #[test]
    fn undated_project_has_no_range() {
        let mut task = rec("1", "Someday", 1, false);
        task.start.clear();
        let project = Project::from_records(RecordSet {
            tasks: vec![task],
            ..Default::default()
        });
        assert_eq!(project.date_range, None);
        assert_eq!(project.summary.name, "Untitled Project");
    }

    #[test]
    fn clamps_levels_and_percent() {
        let mut r = rec("1", "Odd", -3, false);
        r.percent_complete = Some(140);
        let project = Project::from_records(RecordSet {
            tasks: vec![r],
            ..Default::default()
        });
        assert_eq!(project.tasks[0].outline_level, 1);
        assert_eq!(project.tasks[0].percent_complete, 100);
    }
}

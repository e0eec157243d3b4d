//! The visible row list: filter, collapse and sort applied to the arena.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::hierarchy::hidden_by_collapse;
use crate::model::{Project, Task, TaskUid};

/// Row ordering of the visible task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Work-breakdown order, walking the hierarchy.
    #[default]
    Outline,
    /// Raw order of the source document.
    Document,
    /// Outline order, stably re-sorted by start.
    Date,
}

impl SortMode {
    pub const ALL: [SortMode; 3] = [SortMode::Outline, SortMode::Document, SortMode::Date];

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Outline => "Outline",
            SortMode::Document => "Document",
            SortMode::Date => "Date",
        }
    }
}

/// The ordered visible rows plus a uid → row index lookup.
///
/// Rows hold arena positions into [`Project::tasks`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleRows {
    positions: Vec<usize>,
    index: HashMap<TaskUid, usize>,
}

impl VisibleRows {
    fn from_positions(project: &Project, positions: Vec<usize>) -> Self {
        let mut index = HashMap::with_capacity(positions.len());
        for (row, &pos) in positions.iter().enumerate() {
            index.entry(project.tasks[pos].uid.clone()).or_insert(row);
        }
        Self { positions, index }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn row_of(&self, uid: &TaskUid) -> Option<usize> {
        self.index.get(uid).copied()
    }

    pub fn contains(&self, uid: &TaskUid) -> bool {
        self.index.contains_key(uid)
    }

    /// Visible tasks in row order.
    pub fn tasks<'a>(&'a self, project: &'a Project) -> impl Iterator<Item = &'a Task> + 'a {
        self.positions.iter().map(move |&pos| &project.tasks[pos])
    }

    pub fn uids<'a>(&'a self, project: &'a Project) -> impl Iterator<Item = &'a TaskUid> + 'a {
        self.tasks(project).map(|t| &t.uid)
    }
}

/// Derive the visible rows for a filter, collapse set and sort mode.
///
/// Summary tasks are always kept when filtering, whether or not any of
/// their descendants match. Descendants of a collapsed summary are removed.
pub fn project_rows(
    project: &Project,
    filter: &str,
    collapsed: &BTreeSet<TaskUid>,
    sort: SortMode,
) -> VisibleRows {
    let needle = filter.to_lowercase();
    let positions = match sort {
        SortMode::Outline => outline_positions(project, &needle, collapsed),
        SortMode::Document => document_positions(project, &needle, collapsed),
        SortMode::Date => {
            let mut positions = outline_positions(project, &needle, collapsed);
            // sort_by is stable, so equal or missing starts keep outline order.
            positions.sort_by(|&a, &b| {
                match (project.tasks[a].start, project.tasks[b].start) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                }
            });
            positions
        }
    };
    VisibleRows::from_positions(project, positions)
}

fn keeps(task: &Task, needle: &str) -> bool {
    task.is_summary || task.matches_filter(needle)
}

fn outline_positions(project: &Project, needle: &str, collapsed: &BTreeSet<TaskUid>) -> Vec<usize> {
    let mut out = Vec::with_capacity(project.tasks.len());
    let mut seen = HashSet::new();
    for (pos, task) in project.tasks.iter().enumerate() {
        if task.parent.is_none() {
            walk(project, pos, needle, collapsed, &mut seen, &mut out);
        }
    }
    out
}

fn walk(
    project: &Project,
    pos: usize,
    needle: &str,
    collapsed: &BTreeSet<TaskUid>,
    seen: &mut HashSet<usize>,
    out: &mut Vec<usize>,
) {
    if !seen.insert(pos) {
        return;
    }
    let task = &project.tasks[pos];
    if !keeps(task, needle) {
        return;
    }
    out.push(pos);
    if task.is_summary && collapsed.contains(&task.uid) {
        return;
    }
    for &child_pos in project.child_positions(pos) {
        walk(project, child_pos, needle, collapsed, seen, out);
    }
}

fn document_positions(project: &Project, needle: &str, collapsed: &BTreeSet<TaskUid>) -> Vec<usize> {
    let hidden = hidden_by_collapse(project, collapsed);
    project
        .tasks
        .iter()
        .enumerate()
        .filter(|(pos, t)| !hidden.contains(pos) && keeps(t, needle))
        .map(|(pos, _)| pos)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProjectSummary;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, d)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn task(uid: &str, name: &str, level: u32, summary: bool, start: Option<u32>) -> Task {
        let mut t = Task::new(uid, name);
        t.outline_level = level;
        t.is_summary = summary;
        t.start = start.map(day);
        t
    }

    fn sample() -> Project {
        Project::from_tasks(
            ProjectSummary::default(),
            vec![
                task("1", "Phase 1", 1, true, Some(1)),
                task("2", "Design Review", 2, false, Some(5)),
                task("3", "Procurement", 2, false, Some(2)),
                task("4", "Phase 2", 1, true, None),
                task("5", "Build", 2, false, None),
                task("6", "Test", 2, false, Some(3)),
            ],
            Vec::new(),
        )
    }

    fn names(p: &Project, rows: &VisibleRows) -> Vec<String> {
        rows.tasks(p).map(|t| t.name.clone()).collect()
    }

    #[test]
    fn filter_keeps_every_summary() {
        let p = sample();
        let rows = project_rows(&p, "design", &BTreeSet::new(), SortMode::Outline);
        assert_eq!(names(&p, &rows), vec!["Phase 1", "Design Review", "Phase 2"]);
    }

    #[test]
    fn collapse_hides_descendants_and_restores_order() {
        let p = sample();
        let open = project_rows(&p, "", &BTreeSet::new(), SortMode::Outline);

        let mut collapsed = BTreeSet::new();
        collapsed.insert(TaskUid::from("1"));
        let closed = project_rows(&p, "", &collapsed, SortMode::Outline);
        assert_eq!(names(&p, &closed), vec!["Phase 1", "Phase 2", "Build", "Test"]);

        collapsed.clear();
        assert_eq!(project_rows(&p, "", &collapsed, SortMode::Outline), open);
    }

    #[test]
    fn document_mode_applies_same_rules() {
        let p = sample();
        let mut collapsed = BTreeSet::new();
        collapsed.insert(TaskUid::from("4"));
        let rows = project_rows(&p, "e", &collapsed, SortMode::Document);
        // "Procurement" matches "e"; Phase 2's children are collapsed away.
        assert_eq!(
            names(&p, &rows),
            vec!["Phase 1", "Design Review", "Procurement", "Phase 2"]
        );
    }

    #[test]
    fn date_mode_is_stable_with_undated_last() {
        let p = sample();
        let rows = project_rows(&p, "", &BTreeSet::new(), SortMode::Date);
        assert_eq!(
            names(&p, &rows),
            vec!["Phase 1", "Procurement", "Test", "Design Review", "Phase 2", "Build"]
        );
        assert_eq!(rows.row_of(&"6".into()), Some(2));
    }

    #[test]
    fn index_matches_row_order() {
        let p = sample();
        let rows = project_rows(&p, "", &BTreeSet::new(), SortMode::Outline);
        for (i, uid) in rows.uids(&p).enumerate() {
            assert_eq!(rows.row_of(uid), Some(i));
        }
        assert!(!rows.contains(&"42".into()));
    }

    #[test]
    fn duplicate_uid_rows_stay_visible_in_every_mode() {
        let p = Project::from_tasks(
            ProjectSummary::default(),
            vec![
                task("1", "Phase", 1, true, Some(1)),
                task("2", "A", 2, false, Some(2)),
                task("2", "A again", 2, false, Some(3)),
            ],
            Vec::new(),
        );
        for sort in SortMode::ALL {
            let rows = project_rows(&p, "", &BTreeSet::new(), sort);
            assert_eq!(names(&p, &rows), vec!["Phase", "A", "A again"], "{sort:?}");
        }

        let collapsed = BTreeSet::from([TaskUid::from("1")]);
        for sort in SortMode::ALL {
            let rows = project_rows(&p, "", &collapsed, sort);
            assert_eq!(names(&p, &rows), vec!["Phase"], "{sort:?}");
        }
    }
}

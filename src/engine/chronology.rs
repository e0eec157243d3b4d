//! Chronological navigation over visible tasks and the near-today set.

use std::time::{Duration, Instant};

use chrono::NaiveDateTime;

use super::visibility::VisibleRows;
use crate::model::{NearToday, NearTodayWindows, Project, TaskUid};

/// How long the near-today emphasis stays on after jumping to today.
pub const TODAY_FOCUS_DURATION: Duration = Duration::from_secs(3);

/// One navigable point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct ChronoEvent {
    pub uid: TaskUid,
    pub key: NaiveDateTime,
}

/// Visible, dated, non-summary tasks in ascending key-instant order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chronology {
    events: Vec<ChronoEvent>,
}

impl Chronology {
    pub fn build(project: &Project, rows: &VisibleRows, now: NaiveDateTime) -> Self {
        let mut events: Vec<ChronoEvent> = rows
            .tasks(project)
            .filter(|t| !t.is_summary)
            .filter_map(|t| {
                Some(ChronoEvent {
                    uid: t.uid.clone(),
                    key: t.key_instant(now)?,
                })
            })
            .collect();
        events.sort_by_key(|e| e.key);
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ChronoEvent> {
        self.events.get(index)
    }

    pub fn events(&self) -> &[ChronoEvent] {
        &self.events
    }

    pub fn position_of(&self, uid: &TaskUid) -> Option<usize> {
        self.events.iter().position(|e| &e.uid == uid)
    }

    /// Where `next` moves the cursor. From an unset cursor this is the first
    /// event at or after `now`, or the last event when everything is past.
    pub fn next_index(&self, cursor: Option<usize>, now: NaiveDateTime) -> Option<usize> {
        let last = self.events.len().checked_sub(1)?;
        Some(match cursor {
            None => self
                .events
                .iter()
                .position(|e| e.key >= now)
                .unwrap_or(last),
            Some(i) => (i + 1).min(last),
        })
    }

    /// Where `prev` moves the cursor. From an unset cursor this is the last
    /// event before `now`, or the first event when nothing is past.
    pub fn prev_index(&self, cursor: Option<usize>, now: NaiveDateTime) -> Option<usize> {
        if self.events.is_empty() {
            return None;
        }
        Some(match cursor {
            None => self
                .events
                .iter()
                .rposition(|e| e.key < now)
                .unwrap_or(0),
            Some(i) => i.saturating_sub(1).min(self.events.len() - 1),
        })
    }

    pub fn can_next(&self, cursor: Option<usize>) -> bool {
        match cursor {
            None => !self.events.is_empty(),
            Some(i) => i + 1 < self.events.len(),
        }
    }

    pub fn can_prev(&self, cursor: Option<usize>) -> bool {
        match cursor {
            None => !self.events.is_empty(),
            Some(i) => i > 0,
        }
    }
}

/// Visible tasks classified near today, in row order.
pub fn near_today(
    project: &Project,
    rows: &VisibleRows,
    now: NaiveDateTime,
    windows: NearTodayWindows,
) -> Vec<(TaskUid, NearToday)> {
    rows.tasks(project)
        .filter_map(|t| Some((t.uid.clone(), t.near_today(now, windows)?)))
        .collect()
}

/// Near-today emphasis that switches itself off after a fixed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodayFocus {
    since: Instant,
    duration: Duration,
}

impl TodayFocus {
    pub fn start(at: Instant, duration: Duration) -> Self {
        Self { since: at, duration }
    }

    pub fn is_active(&self, at: Instant) -> bool {
        at.saturating_duration_since(self.since) < self.duration
    }

    /// Time left before the emphasis decays, for scheduling a repaint.
    pub fn remaining(&self, at: Instant) -> Duration {
        self.duration
            .saturating_sub(at.saturating_duration_since(self.since))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::visibility::{project_rows, SortMode};
    use crate::model::{ProjectSummary, Task};
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn at(m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, m, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn task(uid: &str, start: Option<NaiveDateTime>, finish: Option<NaiveDateTime>) -> Task {
        let mut t = Task::new(uid, format!("Task {uid}"));
        t.start = start;
        t.finish = finish;
        t
    }

    fn chronology(now: NaiveDateTime) -> (Project, Chronology) {
        let mut summary = task("0s", Some(at(1, 1)), Some(at(6, 1)));
        summary.is_summary = true;
        let mut children = vec![
            task("a", Some(at(1, 10)), Some(at(1, 20))), // done → key Jan 20
            task("b", Some(at(2, 1)), Some(at(3, 1))),   // running → key Feb 1
            task("c", Some(at(4, 1)), Some(at(4, 10))),  // upcoming → Apr 1
            task("d", None, None),                       // undated
        ];
        for c in &mut children {
            c.outline_level = 2;
        }
        let mut tasks = vec![summary];
        tasks.extend(children);
        let project = Project::from_tasks(ProjectSummary::default(), tasks, Vec::new());
        let rows = project_rows(&project, "", &BTreeSet::new(), SortMode::Outline);
        let chrono = Chronology::build(&project, &rows, now);
        (project, chrono)
    }

    #[test]
    fn builds_ascending_events_without_summaries() {
        let (_, c) = chronology(at(2, 15));
        let uids: Vec<&str> = c.events().iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, vec!["a", "b", "c"]);
        assert_eq!(c.get(0).unwrap().key, at(1, 20));
    }

    #[test]
    fn next_from_unset_jumps_to_first_upcoming() {
        let now = at(2, 15);
        let (_, c) = chronology(now);
        assert_eq!(c.next_index(None, now), Some(2));
        assert_eq!(c.next_index(Some(1), now), Some(2));
        assert_eq!(c.next_index(Some(2), now), Some(2));
    }

    #[test]
    fn next_from_unset_falls_back_to_last() {
        let now = at(12, 1);
        let (_, c) = chronology(now);
        assert_eq!(c.next_index(None, now), Some(c.len() - 1));
    }

    #[test]
    fn prev_from_unset_jumps_to_last_past() {
        let now = at(2, 15);
        let (_, c) = chronology(now);
        assert_eq!(c.prev_index(None, now), Some(1));
        assert_eq!(c.prev_index(Some(1), now), Some(0));
        assert_eq!(c.prev_index(Some(0), now), Some(0));

        let early = at(1, 1);
        let (_, c) = chronology(early);
        assert_eq!(c.prev_index(None, early), Some(0));
    }

    #[test]
    fn boundaries_disable_movement() {
        let (_, c) = chronology(at(2, 15));
        assert!(c.can_next(None));
        assert!(c.can_prev(None));
        assert!(!c.can_prev(Some(0)));
        assert!(!c.can_next(Some(2)));
        assert!(c.can_next(Some(1)));

        let empty = Chronology::default();
        assert_eq!(empty.next_index(None, at(1, 1)), None);
        assert_eq!(empty.prev_index(None, at(1, 1)), None);
        assert!(!empty.can_next(None));
    }

    #[test]
    fn near_today_skips_summaries() {
        let now = at(2, 15);
        let (project, _) = chronology(now);
        let rows = project_rows(&project, "", &BTreeSet::new(), SortMode::Outline);
        let set = near_today(&project, &rows, now, NearTodayWindows::default());
        let uids: Vec<&str> = set.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(uids, vec!["b"]);
        assert_eq!(set[0].1, NearToday::InProgress);
    }

    #[test]
    fn today_focus_decays() {
        let t0 = Instant::now();
        let focus = TodayFocus::start(t0, TODAY_FOCUS_DURATION);
        assert!(focus.is_active(t0));
        assert!(focus.is_active(t0 + Duration::from_millis(2999)));
        assert!(!focus.is_active(t0 + Duration::from_secs(3)));
        assert_eq!(focus.remaining(t0 + Duration::from_secs(5)), Duration::ZERO);
    }
}

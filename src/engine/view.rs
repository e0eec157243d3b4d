//! The view context: one immutable project, one explicit view state, and
//! the derived pipeline output recomputed after every mutation.
//!
//! hierarchy → visibility → scale → bars → arrows → chronology, all
//! synchronous, all run to completion before a mutator returns.

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use log::debug;

use super::chronology::{near_today, Chronology, ChronoEvent, TodayFocus, TODAY_FOCUS_DURATION};
use super::hierarchy::group_indices;
use super::layout::{layout_bar, row_top, BarShape};
use super::routing::{route_arrows, Arrow};
use super::scroll::ScrollSync;
use super::visibility::{project_rows, SortMode, VisibleRows};
use crate::model::timeline::{clamp_zoom, zoom_in, zoom_out};
use crate::model::{
    Granularity, NearToday, NearTodayWindows, Project, ProjectStats, ProjectSummary, Task,
    TaskUid, TimelineScale,
};

/// Space left above a navigated-to row.
pub const NAV_TOP_MARGIN: f32 = 120.0;
/// Space left above the first near-today row.
pub const TODAY_TOP_MARGIN: f32 = 80.0;

/// Transient, user-driven view state. Never written back onto tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub filter: String,
    pub collapsed: BTreeSet<TaskUid>,
    pub sort: SortMode,
    pub zoom: f32,
    pub granularity: Granularity,
    pub highlighted: Option<TaskUid>,
    /// Index into the chronology, if navigating.
    pub cursor: Option<usize>,
    pub show_arrows: bool,
    pub windows: NearTodayWindows,
    pub today_focus_duration: Duration,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filter: String::new(),
            collapsed: BTreeSet::new(),
            sort: SortMode::Outline,
            zoom: 1.0,
            granularity: Granularity::Week,
            highlighted: None,
            cursor: None,
            show_arrows: true,
            windows: NearTodayWindows::default(),
            today_focus_duration: TODAY_FOCUS_DURATION,
        }
    }
}

/// Everything derived from (project, state, now).
#[derive(Debug, Clone)]
struct Derived {
    rows: VisibleRows,
    scale: TimelineScale,
    bars: Vec<Option<BarShape>>,
    arrows: Vec<Arrow>,
    chronology: Chronology,
    near_today: Vec<(TaskUid, NearToday)>,
    near_today_map: HashMap<TaskUid, NearToday>,
    groups: HashMap<TaskUid, usize>,
}

impl Derived {
    fn compute(project: &Project, state: &ViewState, now: NaiveDateTime) -> Self {
        let rows = project_rows(project, &state.filter, &state.collapsed, state.sort);
        let (min, max) = project.date_range.unwrap_or((now, now));
        let scale = TimelineScale::new(min, max, state.granularity, state.zoom);
        let bars = rows.tasks(project).map(|t| layout_bar(t, &scale)).collect();
        let arrows = if state.show_arrows {
            route_arrows(project, &rows, &scale, state.highlighted.as_ref())
        } else {
            Vec::new()
        };
        let chronology = Chronology::build(project, &rows, now);
        let near_today = near_today(project, &rows, now, state.windows);
        let near_today_map = near_today.iter().cloned().collect();
        Self {
            rows,
            scale,
            bars,
            arrows,
            chronology,
            near_today,
            near_today_map,
            groups: group_indices(project),
        }
    }
}

/// Per-row data handed to the shell.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    pub row: usize,
    pub task: &'a Task,
    pub bar: Option<BarShape>,
    pub near_today: Option<NearToday>,
    pub highlighted: bool,
    pub nav_focused: bool,
    pub collapsed: bool,
    pub group: usize,
}

pub struct TimelineView {
    project: Project,
    state: ViewState,
    now: NaiveDateTime,
    today_focus: Option<TodayFocus>,
    scroll: ScrollSync,
    horizontal_target: Option<f32>,
    derived: Derived,
}

impl TimelineView {
    pub fn new(project: Project, state: ViewState, now: NaiveDateTime) -> Self {
        let mut state = state;
        state.zoom = clamp_zoom(state.zoom);
        let derived = Derived::compute(&project, &state, now);
        Self {
            project,
            state,
            now,
            today_focus: None,
            scroll: ScrollSync::default(),
            horizontal_target: None,
            derived,
        }
    }

    // --- Derived output ---

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn summary(&self) -> &ProjectSummary {
        &self.project.summary
    }

    pub fn stats(&self) -> ProjectStats {
        self.project.stats()
    }

    pub fn rows(&self) -> &VisibleRows {
        &self.derived.rows
    }

    pub fn scale(&self) -> &TimelineScale {
        &self.derived.scale
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.derived.arrows
    }

    /// Number of successfully routed dependency edges.
    pub fn link_count(&self) -> usize {
        self.derived.arrows.len()
    }

    pub fn chronology(&self) -> &Chronology {
        &self.derived.chronology
    }

    pub fn near_today(&self) -> &[(TaskUid, NearToday)] {
        &self.derived.near_today
    }

    pub fn today_x(&self) -> f32 {
        self.derived.scale.date_to_x(self.now)
    }

    /// Visible rows with their render geometry, in row order.
    pub fn row_views(&self) -> impl Iterator<Item = RowView<'_>> + '_ {
        let nav_uid = self.cursor_event().map(|e| &e.uid);
        self.derived
            .rows
            .tasks(&self.project)
            .zip(self.derived.bars.iter())
            .enumerate()
            .map(move |(row, (task, bar))| RowView {
                row,
                task,
                bar: *bar,
                near_today: self.derived.near_today_map.get(&task.uid).copied(),
                highlighted: self.state.highlighted.as_ref() == Some(&task.uid),
                nav_focused: nav_uid == Some(&task.uid),
                collapsed: self.state.collapsed.contains(&task.uid),
                group: self.derived.groups.get(&task.uid).copied().unwrap_or(0),
            })
    }

    pub fn cursor(&self) -> Option<usize> {
        self.state.cursor
    }

    pub fn cursor_event(&self) -> Option<&ChronoEvent> {
        self.state.cursor.and_then(|i| self.derived.chronology.get(i))
    }

    /// The task under the navigation cursor.
    pub fn cursor_task(&self) -> Option<&Task> {
        self.cursor_event().and_then(|e| self.project.task(&e.uid))
    }

    pub fn can_navigate_next(&self) -> bool {
        self.derived.chronology.can_next(self.state.cursor)
    }

    pub fn can_navigate_prev(&self) -> bool {
        self.derived.chronology.can_prev(self.state.cursor)
    }

    pub fn today_focus_active(&self, at: Instant) -> bool {
        self.today_focus.is_some_and(|f| f.is_active(at))
    }

    /// Time until today-focus decays, if it is still on.
    pub fn today_focus_remaining(&self, at: Instant) -> Option<Duration> {
        self.today_focus
            .filter(|f| f.is_active(at))
            .map(|f| f.remaining(at))
    }

    pub fn scroll(&self) -> &ScrollSync {
        &self.scroll
    }

    pub fn scroll_mut(&mut self) -> &mut ScrollSync {
        &mut self.scroll
    }

    /// Horizontal position the shell should smoothly centre on, once.
    pub fn take_horizontal_target(&mut self) -> Option<f32> {
        self.horizontal_target.take()
    }

    // --- Mutators ---

    pub fn set_filter(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.state.filter {
            return;
        }
        self.state.filter = text;
        self.rederive();
    }

    /// Open or close a summary. Non-summary uids are ignored.
    pub fn toggle_collapse(&mut self, uid: &TaskUid) {
        if !self.project.task(uid).is_some_and(|t| t.is_summary) {
            debug!("ignoring collapse toggle on non-summary {uid}");
            return;
        }
        if !self.state.collapsed.remove(uid) {
            self.state.collapsed.insert(uid.clone());
        }
        self.rederive();
    }

    pub fn is_collapsed(&self, uid: &TaskUid) -> bool {
        self.state.collapsed.contains(uid)
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        if mode == self.state.sort {
            return;
        }
        self.state.sort = mode;
        self.rederive();
    }

    pub fn set_zoom(&mut self, factor: f32) {
        let zoom = clamp_zoom(factor);
        if zoom == self.state.zoom {
            return;
        }
        self.state.zoom = zoom;
        self.rederive();
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(zoom_in(self.state.zoom));
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(zoom_out(self.state.zoom));
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        if granularity == self.state.granularity {
            return;
        }
        self.state.granularity = granularity;
        self.rederive();
    }

    pub fn set_highlighted(&mut self, uid: Option<TaskUid>) {
        if uid == self.state.highlighted {
            return;
        }
        self.state.highlighted = uid;
        self.rederive();
    }

    /// Click behaviour: highlight a task, or clear it when already highlighted.
    pub fn toggle_highlighted(&mut self, uid: &TaskUid) {
        let next = if self.state.highlighted.as_ref() == Some(uid) {
            None
        } else {
            Some(uid.clone())
        };
        self.set_highlighted(next);
    }

    pub fn toggle_arrows(&mut self, show: bool) {
        if show == self.state.show_arrows {
            return;
        }
        self.state.show_arrows = show;
        self.rederive();
    }

    /// Move "now" forward; every time-relative derivation follows.
    pub fn set_now(&mut self, now: NaiveDateTime) {
        if now == self.now {
            return;
        }
        self.now = now;
        self.rederive();
    }

    pub fn navigate_next(&mut self) {
        if !self.can_navigate_next() {
            return;
        }
        if let Some(index) = self.derived.chronology.next_index(self.state.cursor, self.now) {
            self.focus_event(index);
        }
    }

    pub fn navigate_prev(&mut self) {
        if !self.can_navigate_prev() {
            return;
        }
        if let Some(index) = self.derived.chronology.prev_index(self.state.cursor, self.now) {
            self.focus_event(index);
        }
    }

    /// Clear the cursor, emphasise near-today rows for a few seconds and
    /// bring today and the first near-today row into view.
    pub fn navigate_today(&mut self, at: Instant) {
        self.state.cursor = None;
        self.state.highlighted = None;
        self.today_focus = Some(TodayFocus::start(at, self.state.today_focus_duration));
        self.rederive();

        self.horizontal_target = Some(self.today_x());
        let first_row = self
            .derived
            .near_today
            .first()
            .and_then(|(uid, _)| self.derived.rows.row_of(uid));
        if let Some(row) = first_row {
            self.scroll.scroll_both_to(row_top(row) - TODAY_TOP_MARGIN);
        }
    }

    fn focus_event(&mut self, index: usize) {
        let Some(event) = self.derived.chronology.get(index).cloned() else {
            return;
        };
        self.state.cursor = Some(index);
        self.state.highlighted = Some(event.uid.clone());
        self.today_focus = None;
        self.rederive();

        if let Some(row) = self.derived.rows.row_of(&event.uid) {
            self.scroll.scroll_both_to(row_top(row) - NAV_TOP_MARGIN);
        }
        self.horizontal_target = Some(self.derived.scale.date_to_x(event.key));
    }

    fn rederive(&mut self) {
        let anchor = self
            .state
            .cursor
            .and_then(|i| self.derived.chronology.get(i))
            .map(|e| e.uid.clone());
        self.derived = Derived::compute(&self.project, &self.state, self.now);
        self.state.cursor = anchor.and_then(|uid| self.derived.chronology.position_of(&uid));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scroll::Panel;
    use chrono::NaiveDate;

    fn at(m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, m, d)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn task(uid: &str, level: u32, summary: bool, start: u32, finish: u32) -> Task {
        let mut t = Task::new(uid, format!("Task {uid}"));
        t.outline_level = level;
        t.is_summary = summary;
        t.start = Some(at(2, start));
        t.finish = Some(at(2, finish));
        t
    }

    fn view(now: NaiveDateTime) -> TimelineView {
        let mut b = task("b", 2, false, 5, 8);
        b.predecessors = vec!["a".into()];
        let mut d = task("d", 2, false, 20, 25);
        d.predecessors = vec!["b".into()];
        let tasks = vec![
            task("s1", 1, true, 1, 8),
            task("a", 2, false, 1, 4),
            b,
            task("s2", 1, true, 10, 25),
            task("c", 2, false, 10, 15),
            d,
        ];
        let project = Project::from_tasks(ProjectSummary::default(), tasks, Vec::new());
        TimelineView::new(project, ViewState::default(), now)
    }

    fn uids(v: &TimelineView) -> Vec<String> {
        v.row_views().map(|r| r.task.uid.0.clone()).collect()
    }

    #[test]
    fn double_toggle_restores_rows_and_arrows() {
        let mut v = view(at(2, 12));
        v.set_highlighted(Some("b".into()));
        let rows = uids(&v);
        let arrows = v.arrows().to_vec();

        v.toggle_collapse(&"s1".into());
        assert_eq!(uids(&v), vec!["s1", "s2", "c", "d"]);
        // a→b is inside the collapsed group, b→d loses its predecessor.
        assert_eq!(v.link_count(), 0);

        v.toggle_collapse(&"s1".into());
        assert_eq!(uids(&v), rows);
        assert_eq!(v.arrows(), arrows.as_slice());
    }

    #[test]
    fn collapse_ignores_leaves() {
        let mut v = view(at(2, 12));
        v.toggle_collapse(&"a".into());
        assert!(!v.is_collapsed(&"a".into()));
        assert_eq!(v.rows().len(), 6);
    }

    #[test]
    fn arrows_only_connect_visible_rows() {
        let mut v = view(at(2, 12));
        v.set_filter("task d");
        for arrow in v.arrows() {
            assert!(v.rows().contains(&arrow.predecessor));
            assert!(v.rows().contains(&arrow.successor));
        }
        assert_eq!(v.link_count(), 0);
    }

    #[test]
    fn links_can_be_switched_off() {
        let mut v = view(at(2, 12));
        assert_eq!(v.link_count(), 2);
        v.toggle_arrows(false);
        assert_eq!(v.link_count(), 0);
        v.toggle_arrows(true);
        assert_eq!(v.link_count(), 2);
    }

    #[test]
    fn next_highlights_and_scrolls_both_panels() {
        let now = at(2, 12);
        let mut v = view(now);
        // Keys: a Feb 4 (done), b Feb 8 (done), c Feb 10 (running), d Feb 20.
        v.navigate_next();
        assert_eq!(v.cursor(), Some(3));
        assert_eq!(v.cursor_task().map(|t| t.uid.as_str()), Some("d"));
        assert_eq!(v.state().highlighted, Some("d".into()));
        let row = v.rows().row_of(&"d".into()).unwrap();
        let expected = row_top(row) - NAV_TOP_MARGIN;
        assert_eq!(v.scroll_mut().take_pending(Panel::Labels), Some(expected));
        assert_eq!(v.scroll_mut().take_pending(Panel::Grid), Some(expected));
        assert!(v.take_horizontal_target().is_some());

        assert!(!v.can_navigate_next());
        v.navigate_next();
        assert_eq!(v.cursor(), Some(3));

        v.navigate_prev();
        v.navigate_prev();
        v.navigate_prev();
        assert_eq!(v.cursor(), Some(0));
        assert!(!v.can_navigate_prev());
    }

    #[test]
    fn prev_from_unset_lands_on_last_past_event() {
        let mut v = view(at(2, 12));
        v.navigate_prev();
        assert_eq!(v.cursor_task().map(|t| t.uid.as_str()), Some("c"));
    }

    #[test]
    fn today_clears_cursor_and_decays() {
        let now = at(2, 12);
        let mut v = view(now);
        v.navigate_prev();
        assert_eq!(v.cursor(), Some(2));

        let t0 = Instant::now();
        v.navigate_today(t0);
        assert_eq!(v.cursor(), None);
        assert_eq!(v.state().highlighted, None);
        assert!(v.today_focus_active(t0));
        assert!(!v.today_focus_active(t0 + Duration::from_secs(4)));
        assert_eq!(v.take_horizontal_target(), Some(v.today_x()));
    }

    #[test]
    fn cursor_follows_its_task_across_filters() {
        let mut v = view(at(2, 12));
        v.navigate_next(); // d
        v.set_filter("task d");
        assert_eq!(v.cursor_task().map(|t| t.uid.as_str()), Some("d"));
        assert_eq!(v.cursor(), Some(0));
        v.set_filter("task c");
        assert_eq!(v.cursor(), None);
    }

    #[test]
    fn zoom_and_granularity_rescale() {
        let mut v = view(at(2, 12));
        let w = v.scale().column_width;
        v.zoom_in();
        assert!(v.scale().column_width > w);
        v.set_granularity(Granularity::Day);
        assert!((v.scale().column_width - 48.0).abs() < 1e-3);
        v.set_zoom(100.0);
        assert_eq!(v.state().zoom, 4.0);
    }

    #[test]
    fn date_sort_reorders_rows() {
        let mut v = view(at(2, 12));
        v.set_sort_mode(SortMode::Date);
        assert_eq!(uids(&v), vec!["s1", "a", "b", "s2", "c", "d"]);
        v.set_sort_mode(SortMode::Document);
        assert_eq!(v.rows().len(), 6);
    }
}

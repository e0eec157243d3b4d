//! Orthogonal dependency arrows between visible rows.
//!
//! Each edge runs from the predecessor's finish to the successor's start.
//! When the successor starts comfortably to the right, a three-segment elbow
//! is enough. Otherwise the path steps out to the right, detours vertically
//! past the predecessor's row edge, doubles back left of the successor and
//! enters it from the left, so it never runs back through the predecessor's
//! own bar.

use egui::{pos2, Pos2};
use log::debug;

use super::layout::{row_center_y, ROW_HEIGHT};
use super::visibility::VisibleRows;
use crate::model::{Project, TaskUid, TimelineScale};

/// Horizontal elbow offset.
pub const STEP: f32 = 8.0;
/// The path stops this far short of the target so the arrowhead tip lands on it.
pub const ARROWHEAD_OFFSET: f32 = 6.0;
/// Vertical detour of a backward path, as a fraction of the row height.
pub const DETOUR_FACTOR: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arrow {
    pub predecessor: TaskUid,
    pub successor: TaskUid,
    pub kind: RouteKind,
    /// Polyline vertices, first is the predecessor's finish.
    pub points: Vec<Pos2>,
    /// Styling only; never affects `points`.
    pub highlighted: bool,
}

impl Arrow {
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}

/// Route a single edge from predecessor end `p` to successor start `s`.
pub fn route(p: Pos2, s: Pos2, row_height: f32) -> (RouteKind, Vec<Pos2>) {
    let elbow_x = p.x + STEP;
    let tip_x = s.x - ARROWHEAD_OFFSET;

    if s.x > elbow_x {
        let points = vec![p, pos2(elbow_x, p.y), pos2(elbow_x, s.y), pos2(tip_x, s.y)];
        return (RouteKind::Forward, points);
    }

    let back_x = s.x - STEP - ARROWHEAD_OFFSET;
    let detour_y = if s.y > p.y {
        p.y + row_height * DETOUR_FACTOR
    } else {
        p.y - row_height * DETOUR_FACTOR
    };
    let points = vec![
        p,
        pos2(elbow_x, p.y),
        pos2(elbow_x, detour_y),
        pos2(back_x, detour_y),
        pos2(back_x, s.y),
        pos2(tip_x, s.y),
    ];
    (RouteKind::Backward, points)
}

/// Route every predecessor → successor edge whose endpoints are both visible
/// and dated. Everything else is dropped without error.
pub fn route_arrows(
    project: &Project,
    rows: &VisibleRows,
    scale: &TimelineScale,
    highlighted: Option<&TaskUid>,
) -> Vec<Arrow> {
    let mut arrows = Vec::new();

    for (succ_row, succ) in rows.tasks(project).enumerate() {
        if succ.predecessors.is_empty() {
            continue;
        }
        let Some(succ_start) = succ.start else {
            debug!("task {} has predecessors but no start; links skipped", succ.uid);
            continue;
        };

        for pred_uid in &succ.predecessors {
            let Some(pred_row) = rows.row_of(pred_uid) else {
                debug!("predecessor {} of {} is not visible", pred_uid, succ.uid);
                continue;
            };
            let Some(pred_finish) = project.task(pred_uid).and_then(|t| t.finish) else {
                continue;
            };

            let p = pos2(scale.date_to_x(pred_finish), row_center_y(pred_row));
            let s = pos2(scale.date_to_x(succ_start), row_center_y(succ_row));
            let (kind, points) = route(p, s, ROW_HEIGHT);
            let highlighted = highlighted.is_some_and(|h| h == &succ.uid || h == pred_uid);

            arrows.push(Arrow {
                predecessor: pred_uid.clone(),
                successor: succ.uid.clone(),
                kind,
                points,
                highlighted,
            });
        }
    }
    arrows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::visibility::{project_rows, SortMode};
    use crate::model::{Granularity, ProjectSummary, Task};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::collections::BTreeSet;

    fn at(m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn pair(pred_finish: NaiveDateTime, succ_start: NaiveDateTime) -> Project {
        let mut pred = Task::new("1", "Pred");
        pred.start = Some(at(1, 20));
        pred.finish = Some(pred_finish);
        let mut succ = Task::new("2", "Succ");
        succ.start = Some(succ_start);
        succ.finish = Some(at(3, 1));
        succ.predecessors = vec!["1".into()];
        Project::from_tasks(ProjectSummary::default(), vec![pred, succ], Vec::new())
    }

    fn arrows_for(project: &Project, highlighted: Option<&TaskUid>) -> Vec<Arrow> {
        let rows = project_rows(project, "", &BTreeSet::new(), SortMode::Outline);
        let (min, max) = project.date_range.unwrap();
        let scale = TimelineScale::new(min, max, Granularity::Day, 1.0);
        route_arrows(project, &rows, &scale, highlighted)
    }

    #[test]
    fn forward_edge_has_three_segments() {
        let project = pair(at(2, 1), at(2, 5));
        let arrows = arrows_for(&project, None);
        assert_eq!(arrows.len(), 1);
        assert_eq!(arrows[0].kind, RouteKind::Forward);
        assert_eq!(arrows[0].segment_count(), 3);
    }

    #[test]
    fn overlapping_edge_detours_with_five_segments() {
        let project = pair(at(2, 10), at(2, 5));
        let arrows = arrows_for(&project, None);
        assert_eq!(arrows[0].kind, RouteKind::Backward);
        assert_eq!(arrows[0].segment_count(), 5);
    }

    #[test]
    fn backward_detour_heads_toward_successor() {
        let (_, down) = route(pos2(100.0, 18.0), pos2(50.0, 54.0), ROW_HEIGHT);
        assert!((down[2].y - (18.0 + 0.6 * ROW_HEIGHT)).abs() < 1e-4);
        assert_eq!(down[3].x, 50.0 - STEP - ARROWHEAD_OFFSET);
        assert_eq!(down.last().copied(), Some(pos2(44.0, 54.0)));

        let (_, up) = route(pos2(100.0, 54.0), pos2(50.0, 18.0), ROW_HEIGHT);
        assert!((up[2].y - (54.0 - 0.6 * ROW_HEIGHT)).abs() < 1e-4);
    }

    #[test]
    fn edge_exactly_one_step_away_is_backward() {
        let (kind, _) = route(pos2(100.0, 18.0), pos2(108.0, 54.0), ROW_HEIGHT);
        assert_eq!(kind, RouteKind::Backward);
        let (kind, _) = route(pos2(100.0, 18.0), pos2(108.5, 54.0), ROW_HEIGHT);
        assert_eq!(kind, RouteKind::Forward);
    }

    #[test]
    fn paths_are_orthogonal() {
        for (p, s) in [
            (pos2(10.0, 18.0), pos2(200.0, 90.0)),
            (pos2(200.0, 90.0), pos2(10.0, 18.0)),
        ] {
            let (_, pts) = route(p, s, ROW_HEIGHT);
            for w in pts.windows(2) {
                assert!(w[0].x == w[1].x || w[0].y == w[1].y);
            }
        }
    }

    #[test]
    fn highlight_changes_style_not_geometry() {
        let project = pair(at(2, 1), at(2, 5));
        let plain = arrows_for(&project, None);
        let lit = arrows_for(&project, Some(&"2".into()));
        assert!(!plain[0].highlighted);
        assert!(lit[0].highlighted);
        assert_eq!(plain[0].points, lit[0].points);
    }

    #[test]
    fn hidden_or_undated_predecessors_are_dropped() {
        let mut project = pair(at(2, 1), at(2, 5));
        let rows = VisibleRows::default();
        let scale = TimelineScale::new(at(1, 1), at(3, 1), Granularity::Day, 1.0);
        assert!(route_arrows(&project, &rows, &scale, None).is_empty());

        project.tasks[0].finish = None;
        let project = Project::from_tasks(ProjectSummary::default(), project.tasks, Vec::new());
        let rows = project_rows(&project, "", &BTreeSet::new(), SortMode::Outline);
        assert!(route_arrows(&project, &rows, &scale, None).is_empty());
    }
}

//! Bar geometry for a single row, relative to the row top and the timeline
//! origin.

use crate::model::{Task, TimelineScale};

pub const ROW_HEIGHT: f32 = 36.0;
/// Vertical gap above and below a leaf bar.
pub const BAR_PADDING_V: f32 = 8.0;
/// Edge length of the milestone diamond's bounding square.
pub const MILESTONE_SIZE: f32 = 14.0;

/// Leaf vs. summary styling of a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarKind {
    Leaf,
    Summary,
}

/// Geometry of one row's primitive, relative to the row's top edge and the
/// timeline origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarShape {
    Bar {
        kind: BarKind,
        x: f32,
        width: f32,
        top: f32,
        height: f32,
        progress_width: f32,
        /// Track fill opacity.
        fill_opacity: f32,
        /// Opacity of the progress portion.
        progress_opacity: f32,
    },
    Milestone {
        center_x: f32,
        center_y: f32,
        size: f32,
    },
}

/// Compute the primitive for one task, or `None` when there is nothing to
/// draw (no start, or a non-milestone without a finish).
pub fn layout_bar(task: &Task, scale: &TimelineScale) -> Option<BarShape> {
    let start = task.start?;
    if task.is_milestone {
        return Some(BarShape::Milestone {
            center_x: scale.date_to_x(start),
            center_y: ROW_HEIGHT / 2.0,
            size: MILESTONE_SIZE,
        });
    }
    let finish = task.finish?;
    let width = scale.bar_width(start, finish);
    let (kind, top, height, fill_opacity, progress_opacity) = if task.is_summary {
        (BarKind::Summary, ROW_HEIGHT * 0.33, ROW_HEIGHT * 0.28, 0.1, 0.5)
    } else {
        (
            BarKind::Leaf,
            BAR_PADDING_V,
            ROW_HEIGHT - BAR_PADDING_V * 2.0,
            0.18,
            0.85,
        )
    };
    Some(BarShape::Bar {
        kind,
        x: scale.date_to_x(start),
        width,
        top,
        height,
        progress_width: width * f32::from(task.percent_complete.min(100)) / 100.0,
        fill_opacity,
        progress_opacity,
    })
}

/// Vertical centre of a row in body coordinates.
pub fn row_center_y(row: usize) -> f32 {
    row as f32 * ROW_HEIGHT + ROW_HEIGHT / 2.0
}

/// Top edge of a row in body coordinates.
pub fn row_top(row: usize) -> f32 {
    row as f32 * ROW_HEIGHT
}

use egui::{Align2, Pos2, Rect, Sense, Stroke, Ui, Vec2};
use egui_phosphor::regular as icon;

use crate::ui::theme;
use msp_timeline::engine::{SortMode, TimelineView, ROW_HEIGHT};
use msp_timeline::model::TaskUid;

/// Actions that the label panel can request.
pub enum LabelAction {
    None,
    ToggleCollapse(TaskUid),
    ToggleHighlight(TaskUid),
}

pub struct LabelPanelOutput {
    pub action: LabelAction,
    /// Vertical offset the panel ended up at this frame.
    pub offset: f32,
}

/// Render the left-side label panel, one row per visible task.
pub fn show_label_panel(
    view: &TimelineView,
    pending_offset: Option<f32>,
    today_focus: bool,
    ui: &mut Ui,
) -> LabelPanelOutput {
    let mut action = LabelAction::None;
    let indented = view.state().sort == SortMode::Outline;

    let mut scroll = egui::ScrollArea::vertical()
        .id_salt("label_panel")
        .auto_shrink([false, false]);
    if let Some(offset) = pending_offset {
        scroll = scroll.vertical_scroll_offset(offset);
    }

    let output = scroll.show(ui, |ui| {
        ui.spacing_mut().item_spacing = Vec2::ZERO;
        let width = ui.available_width();

        // Column header, same height as the time-grid header
        let (header, _) = ui.allocate_exact_size(Vec2::new(width, theme::HEADER_HEIGHT), Sense::hover());
        let painter = ui.painter();
        painter.rect_filled(header, 0.0, theme::BG_HEADER);
        painter.text(
            Pos2::new(header.left() + 10.0, header.center().y),
            Align2::LEFT_CENTER,
            format!("TASKS ({})", view.rows().len()),
            theme::font_small(),
            theme::TEXT_DIM,
        );
        painter.text(
            Pos2::new(header.right() - 10.0, header.center().y),
            Align2::RIGHT_CENTER,
            "DONE",
            theme::font_small(),
            theme::TEXT_DIM,
        );

        for row in view.row_views() {
            let task = row.task;
            let (rect, response) = ui.allocate_exact_size(Vec2::new(width, ROW_HEIGHT), Sense::click());
            let painter = ui.painter();

            let bg = if row.nav_focused {
                Some(theme::BG_NAV_FOCUS)
            } else if row.highlighted {
                Some(theme::BG_HIGHLIGHT)
            } else if row.row % 2 == 1 {
                Some(theme::BG_ROW_ODD)
            } else {
                None
            };
            if let Some(bg) = bg {
                painter.rect_filled(rect, 0.0, bg);
            }
            painter.line_segment(
                [rect.left_bottom(), rect.right_bottom()],
                Stroke::new(0.5, theme::BORDER_SUBTLE),
            );

            // Near-today accent strip
            if let Some(kind) = row.near_today {
                let alpha = if today_focus { 255 } else { 110 };
                let color = theme::near_today_color(kind).gamma_multiply(alpha as f32 / 255.0);
                painter.rect_filled(
                    Rect::from_min_size(rect.min, Vec2::new(3.0, rect.height())),
                    0.0,
                    color,
                );
            }

            let indent = if indented {
                (task.outline_level.saturating_sub(1)) as f32 * theme::INDENT_STEP
            } else {
                0.0
            };
            let mut x = rect.left() + 10.0 + indent;

            if task.is_summary {
                let caret = if row.collapsed { icon::CARET_RIGHT } else { icon::CARET_DOWN };
                let caret_rect = Rect::from_center_size(
                    Pos2::new(x + 6.0, rect.center().y),
                    Vec2::splat(16.0),
                );
                let caret_response = ui.interact(
                    caret_rect,
                    ui.make_persistent_id(("collapse", &task.uid)),
                    Sense::click(),
                );
                ui.painter().text(
                    caret_rect.center(),
                    Align2::CENTER_CENTER,
                    caret,
                    theme::font_bar(),
                    if caret_response.hovered() { theme::ACCENT } else { theme::TEXT_SECONDARY },
                );
                if caret_response.clicked() {
                    action = LabelAction::ToggleCollapse(task.uid.clone());
                }
            } else if task.is_milestone {
                ui.painter().text(
                    Pos2::new(x + 6.0, rect.center().y),
                    Align2::CENTER_CENTER,
                    icon::DIAMOND,
                    theme::font_small(),
                    theme::MILESTONE,
                );
            } else {
                ui.painter().circle_filled(
                    Pos2::new(x + 6.0, rect.center().y),
                    3.0,
                    theme::group_color(row.group),
                );
            }
            x += 18.0;

            let name_color = if task.is_summary {
                theme::TEXT_PRIMARY
            } else {
                theme::TEXT_SECONDARY
            };
            let name_font = if task.is_summary { theme::font_header() } else { theme::font_bar() };
            let name_clip = Rect::from_min_max(
                Pos2::new(x, rect.top()),
                Pos2::new(rect.right() - 44.0, rect.bottom()),
            );
            ui.painter().with_clip_rect(name_clip).text(
                Pos2::new(x, rect.center().y),
                Align2::LEFT_CENTER,
                &task.name,
                name_font,
                name_color,
            );

            ui.painter().text(
                Pos2::new(rect.right() - 10.0, rect.center().y),
                Align2::RIGHT_CENTER,
                format!("{}%", task.percent_complete),
                theme::font_small(),
                if task.percent_complete == 100 { theme::NEAR_IN_PROGRESS } else { theme::TEXT_DIM },
            );

            if response.clicked() && matches!(action, LabelAction::None) {
                action = LabelAction::ToggleHighlight(task.uid.clone());
            }
        }
    });

    LabelPanelOutput {
        action,
        offset: output.state.offset.y,
    }
}

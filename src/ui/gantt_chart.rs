use egui::{Align2, Color32, Painter, Pos2, Rect, Rounding, Sense, Shape, Stroke, Ui, Vec2};

use crate::ui::theme;
use msp_timeline::engine::routing::ARROWHEAD_OFFSET;
use msp_timeline::engine::{Arrow, BarKind, BarShape, RowView, TimelineView, ROW_HEIGHT};
use msp_timeline::model::{Granularity, TaskUid, TimelineScale};

const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;

/// Requests coming out of the chart this frame.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    pub toggle_highlight: Option<TaskUid>,
    pub clear_highlight: bool,
    /// +1 zoom in, -1 zoom out.
    pub zoom_steps: i32,
    /// Vertical offset the grid ended up at this frame.
    pub offset: f32,
}

/// Render the time grid (right panel).
pub fn show_gantt_chart(
    view: &TimelineView,
    pending_offset: Option<f32>,
    center_on_x: Option<f32>,
    today_focus: bool,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();
    let available = ui.available_size();
    let scale = view.scale();
    let chart_width = scale.total_width().max(available.x);
    let chart_height = HEADER_HEIGHT + view.rows().len() as f32 * ROW_HEIGHT + 40.0;

    // Ctrl + wheel zooms
    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta);
        if scroll_delta.y > 0.0 {
            interaction.zoom_steps = 1;
        } else if scroll_delta.y < 0.0 {
            interaction.zoom_steps = -1;
        }
    }

    let mut scroll = egui::ScrollArea::both()
        .id_salt("time_grid")
        .auto_shrink([false, false]);
    if let Some(offset) = pending_offset {
        scroll = scroll.vertical_scroll_offset(offset);
    }

    let output = scroll.show(ui, |ui| {
        let (response, painter) = ui.allocate_painter(
            Vec2::new(chart_width, chart_height.max(available.y)),
            Sense::click(),
        );
        let origin = response.rect.min;
        let body = Pos2::new(origin.x, origin.y + HEADER_HEIGHT);
        let mut consumed_click = false;

        painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

        // Animated by the scroll area; nothing waits for it to finish.
        if let Some(x) = center_on_x {
            let target_x = origin.x + x;
            let target = Rect::from_x_y_ranges(target_x..=target_x + 1.0, ui.clip_rect().y_range());
            ui.scroll_to_rect(target, Some(egui::Align::Center));
        }

        draw_columns(&painter, body, scale, response.rect.bottom());
        for row in view.row_views() {
            draw_row_background(&painter, body, chart_width, &row);
        }
        draw_today_line(&painter, body, view.today_x(), response.rect.bottom());

        for arrow in view.arrows() {
            draw_arrow(&painter, body, arrow);
        }

        for row in view.row_views() {
            let Some(bar) = row.bar else { continue };
            let rect = draw_bar(&painter, body, &row, bar, today_focus);

            let bar_response = ui.interact(
                rect.expand(2.0),
                ui.make_persistent_id(("bar", &row.task.uid)),
                Sense::click(),
            );
            if bar_response.clicked() {
                interaction.toggle_highlight = Some(row.task.uid.clone());
                consumed_click = true;
            }
            if bar_response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                egui::show_tooltip_at_pointer(
                    ui.ctx(),
                    ui.layer_id(),
                    egui::Id::new(("bar-tip", &row.task.uid)),
                    |ui| show_tooltip(ui, &row, view),
                );
            }
        }

        // Header last so it stays on top of the grid lines
        draw_header(&painter, origin, scale, chart_width);

        if let Some(pointer) = response.hover_pos().filter(|p| p.y > body.y) {
            let date = scale.x_to_date(pointer.x - body.x);
            painter.text(
                Pos2::new(pointer.x, origin.y + HEADER_HEIGHT - 4.0),
                Align2::CENTER_BOTTOM,
                date.format("%a %-d %b").to_string(),
                theme::font_small(),
                theme::ACCENT,
            );
        }

        if response.clicked() && !consumed_click {
            interaction.clear_highlight = true;
        }
    });

    interaction.offset = output.state.offset.y;
    interaction
}

fn show_tooltip(ui: &mut Ui, row: &RowView<'_>, view: &TimelineView) {
    let task = row.task;
    ui.strong(&task.name);
    match (task.start, task.finish) {
        (Some(s), _) if task.is_milestone => {
            ui.label(s.format("%d %b %Y %H:%M").to_string());
        }
        (Some(s), Some(f)) => {
            ui.label(format!("{} → {}", s.format("%d %b %Y"), f.format("%d %b %Y")));
        }
        (Some(s), None) => {
            ui.label(s.format("%d %b %Y").to_string());
        }
        _ => {}
    }
    if task.duration_hours > 0.0 {
        ui.label(format!("Duration: {:.1} h", task.duration_hours));
    }
    ui.label(format!(
        "Progress: {}%  ·  {}",
        task.percent_complete,
        task.status_at(view.now()).label()
    ));
    if !task.resources.is_empty() {
        ui.label(format!("Resources: {}", task.resources.join(", ")));
    }
    if let Some(kind) = row.near_today {
        ui.colored_label(theme::near_today_color(kind), theme::near_today_label(kind));
    }
    if !task.notes.trim().is_empty() {
        ui.separator();
        ui.label(egui::RichText::new(task.notes.trim()).size(11.0).color(theme::TEXT_SECONDARY));
    }
}

fn bar_color(row: &RowView<'_>) -> Color32 {
    if row.task.is_milestone {
        theme::MILESTONE
    } else if row.task.is_summary {
        theme::SUMMARY
    } else {
        theme::group_color(row.group)
    }
}

fn draw_bar(painter: &Painter, body: Pos2, row: &RowView<'_>, bar: BarShape, today_focus: bool) -> Rect {
    let row_top = body.y + row.row as f32 * ROW_HEIGHT;
    let color = bar_color(row);
    let emphasis = match row.near_today {
        Some(kind) if today_focus => Some(theme::near_today_color(kind)),
        _ => None,
    };
    let outline = if row.highlighted || row.nav_focused {
        Some(Stroke::new(1.5, theme::BORDER_ACCENT))
    } else {
        emphasis.map(|c| Stroke::new(2.0, c))
    };

    match bar {
        BarShape::Milestone { center_x, center_y, size } => {
            let center = Pos2::new(body.x + center_x, row_top + center_y);
            let h = size / 2.0;
            let points = vec![
                Pos2::new(center.x, center.y - h),
                Pos2::new(center.x + h, center.y),
                Pos2::new(center.x, center.y + h),
                Pos2::new(center.x - h, center.y),
            ];
            painter.add(Shape::convex_polygon(
                points,
                color,
                outline.unwrap_or(Stroke::NONE),
            ));
            painter.text(
                Pos2::new(center.x + h + 6.0, center.y),
                Align2::LEFT_CENTER,
                &row.task.name,
                theme::font_small(),
                theme::TEXT_SECONDARY,
            );
            Rect::from_center_size(center, Vec2::splat(size))
        }
        BarShape::Bar {
            kind,
            x,
            width,
            top,
            height,
            progress_width,
            fill_opacity,
            progress_opacity,
        } => {
            let rect = Rect::from_min_size(
                Pos2::new(body.x + x, row_top + top),
                Vec2::new(width, height),
            );
            let base = if kind == BarKind::Summary { theme::group_color(row.group) } else { color };
            let rounding = Rounding::same(if kind == BarKind::Summary { 2.0 } else { theme::BAR_ROUNDING });

            painter.rect_filled(rect, rounding, base.gamma_multiply(fill_opacity));
            if progress_width > 0.0 {
                let progress = Rect::from_min_size(rect.min, Vec2::new(progress_width, height));
                painter.rect_filled(progress, rounding, base.gamma_multiply(progress_opacity));
            }
            if let Some(stroke) = outline {
                painter.rect_stroke(rect.expand(1.0), rounding, stroke);
            }

            // Resource initials trail the bar
            if kind == BarKind::Leaf && !row.task.resources.is_empty() {
                painter.text(
                    Pos2::new(rect.right() + 6.0, rect.center().y),
                    Align2::LEFT_CENTER,
                    row.task.resources.join(", "),
                    theme::font_small(),
                    theme::TEXT_DIM,
                );
            }
            rect
        }
    }
}

fn draw_arrow(painter: &Painter, body: Pos2, arrow: &Arrow) {
    let points: Vec<Pos2> = arrow
        .points
        .iter()
        .map(|p| Pos2::new(body.x + p.x, body.y + p.y))
        .collect();
    let Some(&end) = points.last() else { return };

    let (color, width) = if arrow.highlighted {
        (theme::ARROW_HIGHLIGHT, 1.8)
    } else {
        (theme::ARROW.gamma_multiply(0.6), 1.1)
    };
    painter.add(Shape::line(points, Stroke::new(width, color)));

    let tip = Pos2::new(end.x + ARROWHEAD_OFFSET, end.y);
    painter.add(Shape::convex_polygon(
        vec![
            tip,
            Pos2::new(end.x, end.y - 3.5),
            Pos2::new(end.x, end.y + 3.5),
        ],
        color,
        Stroke::NONE,
    ));
}

fn draw_row_background(painter: &Painter, body: Pos2, width: f32, row: &RowView<'_>) {
    let rect = Rect::from_min_size(
        Pos2::new(body.x, body.y + row.row as f32 * ROW_HEIGHT),
        Vec2::new(width, ROW_HEIGHT),
    );
    let fill = if row.nav_focused {
        Some(theme::BG_NAV_FOCUS)
    } else if row.highlighted {
        Some(theme::BG_HIGHLIGHT)
    } else if row.row % 2 == 1 {
        Some(theme::BG_ROW_ODD)
    } else {
        None
    };
    if let Some(fill) = fill {
        painter.rect_filled(rect, 0.0, fill);
    }
    painter.line_segment(
        [rect.left_bottom(), rect.right_bottom()],
        Stroke::new(0.5, theme::GRID_LINE),
    );
}

fn draw_columns(painter: &Painter, body: Pos2, scale: &TimelineScale, bottom: f32) {
    for (i, column) in scale.columns.iter().enumerate() {
        let x = body.x + i as f32 * scale.column_width;
        if column.is_weekend {
            painter.rect_filled(
                Rect::from_min_max(Pos2::new(x, body.y), Pos2::new(x + scale.column_width, bottom)),
                0.0,
                theme::BG_WEEKEND,
            );
        }
        let stroke = if column.is_major {
            Stroke::new(1.0, theme::GRID_MAJOR)
        } else {
            Stroke::new(0.5, theme::GRID_LINE)
        };
        painter.line_segment([Pos2::new(x, body.y), Pos2::new(x, bottom)], stroke);
    }
}

fn draw_header(painter: &Painter, origin: Pos2, scale: &TimelineScale, width: f32) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    let upper_y = origin.y + 14.0;
    let lower_y = origin.y + 34.0;
    let cw = scale.column_width;

    // Upper tier
    match scale.granularity {
        Granularity::Week => {
            for group in scale.month_groups() {
                let x = origin.x + group.first_column as f32 * cw;
                painter.text(
                    Pos2::new(x + 4.0, upper_y),
                    Align2::LEFT_CENTER,
                    &group.label,
                    theme::font_header(),
                    theme::TEXT_PRIMARY,
                );
            }
        }
        Granularity::Day => {
            for (i, column) in scale.columns.iter().enumerate() {
                if i == 0 || column.is_major {
                    painter.text(
                        Pos2::new(origin.x + i as f32 * cw + 4.0, upper_y),
                        Align2::LEFT_CENTER,
                        column.date.format("%B %Y").to_string(),
                        theme::font_header(),
                        theme::TEXT_PRIMARY,
                    );
                }
            }
        }
        Granularity::Month => {
            for (i, column) in scale.columns.iter().enumerate() {
                if i == 0 || column.is_major {
                    if let Some(year) = &column.sub_label {
                        painter.text(
                            Pos2::new(origin.x + i as f32 * cw + 4.0, upper_y),
                            Align2::LEFT_CENTER,
                            year,
                            theme::font_header(),
                            theme::TEXT_PRIMARY,
                        );
                    }
                }
            }
        }
    }

    // Lower tier
    for (i, column) in scale.columns.iter().enumerate() {
        let x = origin.x + i as f32 * cw;
        let color = if column.is_weekend { theme::TEXT_DIM } else { theme::TEXT_SECONDARY };
        painter.text(
            Pos2::new(x + cw / 2.0, lower_y),
            Align2::CENTER_CENTER,
            &column.label,
            theme::font_sub(),
            color,
        );
    }
}

fn draw_today_line(painter: &Painter, body: Pos2, today_x: f32, bottom: f32) {
    let x = body.x + today_x;
    painter.line_segment(
        [Pos2::new(x, body.y), Pos2::new(x, bottom)],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, body.y - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

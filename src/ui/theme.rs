use egui::{Color32, FontId, Rounding, Stroke, Visuals};

use msp_timeline::model::NearToday;

// ── Palette ──────────────────────────────────────────────────────────────────

pub const BG_DARK: Color32 = Color32::from_rgb(11, 22, 34);
pub const BG_PANEL: Color32 = Color32::from_rgb(16, 30, 45);
pub const BG_HEADER: Color32 = Color32::from_rgb(20, 37, 55);
pub const BG_ROW_ODD: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 5);
pub const BG_WEEKEND: Color32 = Color32::from_rgba_premultiplied(255, 255, 255, 8);
pub const BG_HIGHLIGHT: Color32 = Color32::from_rgba_premultiplied(20, 70, 92, 90);
pub const BG_NAV_FOCUS: Color32 = Color32::from_rgba_premultiplied(30, 90, 120, 120);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(36, 54, 74);
pub const BORDER_ACCENT: Color32 = Color32::from_rgb(56, 189, 248);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(226, 232, 240);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(148, 163, 184);
pub const TEXT_DIM: Color32 = Color32::from_rgb(98, 125, 152);

pub const ACCENT: Color32 = Color32::from_rgb(56, 189, 248);
pub const TODAY_LINE: Color32 = Color32::from_rgb(244, 63, 94);
pub const GRID_LINE: Color32 = Color32::from_rgb(28, 45, 64);
pub const GRID_MAJOR: Color32 = Color32::from_rgb(45, 68, 94);

pub const ARROW: Color32 = Color32::from_rgb(0x62, 0x7d, 0x98);
pub const ARROW_HIGHLIGHT: Color32 = Color32::from_rgb(0x38, 0xbd, 0xf8);
pub const MILESTONE: Color32 = Color32::from_rgb(0xfb, 0xbf, 0x24);
pub const SUMMARY: Color32 = Color32::from_rgb(0x1e, 0x3a, 0x52);

pub const NEAR_IN_PROGRESS: Color32 = Color32::from_rgb(0x10, 0xb9, 0x81);
pub const NEAR_JUST_FINISHED: Color32 = Color32::from_rgb(0xfb, 0xbf, 0x24);
pub const NEAR_UPCOMING: Color32 = Color32::from_rgb(0xa7, 0x8b, 0xfa);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const HEADER_HEIGHT: f32 = 48.0;
pub const INDENT_STEP: f32 = 16.0;
pub const BAR_ROUNDING: f32 = 4.0;
pub const STATUS_BAR_HEIGHT: f32 = 26.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_header() -> FontId {
    FontId::proportional(12.0)
}

pub fn font_sub() -> FontId {
    FontId::proportional(10.5)
}

pub fn font_bar() -> FontId {
    FontId::proportional(11.5)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

// ── Group colours ────────────────────────────────────────────────────────────

/// One colour per top-level branch, cycled.
pub const GROUP_COLORS: &[Color32] = &[
    Color32::from_rgb(0x38, 0xbd, 0xf8),
    Color32::from_rgb(0xf4, 0x72, 0xb6),
    Color32::from_rgb(0x34, 0xd3, 0x99),
    Color32::from_rgb(0xa7, 0x8b, 0xfa),
    Color32::from_rgb(0xfb, 0x92, 0x3c),
    Color32::from_rgb(0xfa, 0xcc, 0x15),
    Color32::from_rgb(0x2d, 0xd4, 0xbf),
    Color32::from_rgb(0x60, 0xa5, 0xfa),
];

pub fn group_color(group: usize) -> Color32 {
    GROUP_COLORS[group % GROUP_COLORS.len()]
}

pub fn near_today_color(kind: NearToday) -> Color32 {
    match kind {
        NearToday::InProgress => NEAR_IN_PROGRESS,
        NearToday::JustFinished => NEAR_JUST_FINISHED,
        NearToday::Upcoming => NEAR_UPCOMING,
    }
}

pub fn near_today_label(kind: NearToday) -> &'static str {
    match kind {
        NearToday::InProgress => "In progress",
        NearToday::JustFinished => "Just finished",
        NearToday::Upcoming => "Upcoming",
    }
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = BG_DARK;

    let rounding = Rounding::same(4.0);
    visuals.widgets.noninteractive.bg_fill = BG_PANEL;
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.noninteractive.rounding = rounding;

    visuals.widgets.inactive.bg_fill = BG_HEADER;
    visuals.widgets.inactive.weak_bg_fill = BG_HEADER;
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.inactive.rounding = rounding;

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(28, 52, 74);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.hovered.rounding = rounding;

    visuals.widgets.active.bg_fill = Color32::from_rgb(34, 62, 88);
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, ACCENT);
    visuals.widgets.active.fg_stroke = Stroke::new(2.0, Color32::WHITE);
    visuals.widgets.active.rounding = rounding;

    visuals.selection.bg_fill = BG_HIGHLIGHT;
    visuals.selection.stroke = Stroke::new(1.0, ACCENT);

    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.striped = false;

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}

use egui::{Context, RichText, Window};

use crate::app::ViewerApp;
use crate::ui::theme;

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut ViewerApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([320.0, 200.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("MSP Timeline").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("An interactive timeline for");
                ui.label("Microsoft Project schedules.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

/// Render the load-failure window. The previously loaded schedule stays up.
pub fn show_load_error_dialog(app: &mut ViewerApp, ctx: &Context) {
    let Some(message) = app.load_error.clone() else {
        return;
    };
    let mut should_close = false;
    Window::new(RichText::new("Could not load schedule").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([420.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(RichText::new(message).color(theme::TODAY_LINE));
            ui.add_space(8.0);
            ui.label(
                RichText::new("Record sets are JSON files with project, tasks, resources and assignments. CSV imports need at least a task name column.")
                    .small()
                    .color(theme::TEXT_SECONDARY),
            );
            ui.add_space(8.0);
            ui.separator();
            if ui.add_sized([80.0, 28.0], egui::Button::new("OK")).clicked() {
                should_close = true;
            }
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.load_error = None;
    }
}

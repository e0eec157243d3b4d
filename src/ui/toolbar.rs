use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icon;

use crate::app::ViewerApp;
use crate::ui::theme;
use msp_timeline::engine::SortMode;
use msp_timeline::model::Granularity;

/// Render the top menu bar.
pub fn show_menu_bar(app: &mut ViewerApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button("  File  ", |ui| {
            if ui.button(format!("{}  Open record set...", icon::FOLDER_OPEN)).clicked() {
                app.open_record_set();
                ui.close_menu();
            }
            if ui.button(format!("{}  Import CSV...", icon::FILE_CSV)).clicked() {
                app.import_csv();
                ui.close_menu();
            }
            ui.separator();
            if ui.button(format!("{}  Close", icon::X)).clicked() {
                app.close_project();
                ui.close_menu();
            }
        });

        ui.menu_button("  Help  ", |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let summary = app.view.summary();
            if !summary.author.is_empty() {
                ui.label(RichText::new(&summary.author).size(11.0).color(theme::TEXT_DIM));
            }
            ui.label(RichText::new(&summary.name).size(12.0).strong());
        });
    });
}

/// Render the controls row: filter, navigation, sort, links, scale and zoom.
pub fn show_controls(app: &mut ViewerApp, ui: &mut Ui) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 6.0;

        ui.label(RichText::new(icon::MAGNIFYING_GLASS).color(theme::TEXT_DIM));
        let filter = ui.add(
            egui::TextEdit::singleline(&mut app.filter_text)
                .hint_text("Filter tasks...")
                .desired_width(180.0),
        );
        if filter.changed() {
            app.view.set_filter(app.filter_text.clone());
        }

        ui.separator();

        let prev = ui.add_enabled(
            app.view.can_navigate_prev(),
            egui::Button::new(format!("{} Prev", icon::CARET_LEFT)),
        );
        if prev.clicked() {
            app.view.navigate_prev();
        }
        if ui.button(format!("{} Today", icon::CROSSHAIR)).clicked() {
            app.view.navigate_today(std::time::Instant::now());
        }
        let next = ui.add_enabled(
            app.view.can_navigate_next(),
            egui::Button::new(format!("Next {}", icon::CARET_RIGHT)),
        );
        if next.clicked() {
            app.view.navigate_next();
        }
        let total = app.view.chronology().len();
        let position = match app.view.cursor() {
            Some(i) => format!("{} / {}", i + 1, total),
            None => format!("– / {total}"),
        };
        ui.label(RichText::new(position).size(11.0).color(theme::TEXT_SECONDARY));

        ui.separator();

        let current_sort = app.view.state().sort;
        for mode in SortMode::ALL {
            if ui.selectable_label(current_sort == mode, mode.label()).clicked() {
                app.view.set_sort_mode(mode);
            }
        }

        ui.separator();

        let links = app.view.state().show_arrows;
        let links_label = if links { "Links On" } else { "Links Off" };
        if ui.selectable_label(links, links_label).clicked() {
            app.view.toggle_arrows(!links);
        }

        ui.separator();

        let current = app.view.state().granularity;
        for granularity in Granularity::ALL {
            if ui
                .selectable_label(current == granularity, granularity.label())
                .clicked()
            {
                app.view.set_granularity(granularity);
            }
        }

        ui.separator();

        if ui.button(icon::MAGNIFYING_GLASS_MINUS).on_hover_text("Zoom out").clicked() {
            app.view.zoom_out();
        }
        ui.label(
            RichText::new(format!("{:.0}%", app.view.state().zoom * 100.0))
                .size(11.0)
                .color(theme::TEXT_SECONDARY),
        );
        if ui.button(icon::MAGNIFYING_GLASS_PLUS).on_hover_text("Zoom in").clicked() {
            app.view.zoom_in();
        }
    });
}

/// Banner describing the task under the navigation cursor.
pub fn show_nav_banner(app: &ViewerApp, ui: &mut Ui) {
    let Some(task) = app.view.cursor_task() else {
        return;
    };
    let now = app.view.now();
    let status = task.status_at(now);
    let dates = match (task.start, task.finish) {
        (Some(s), Some(f)) => format!("{} → {}", s.format("%d %b %Y"), f.format("%d %b %Y")),
        (Some(s), None) => s.format("%d %b %Y").to_string(),
        (None, Some(f)) => f.format("%d %b %Y").to_string(),
        (None, None) => String::new(),
    };
    ui.horizontal(|ui| {
        ui.label(RichText::new(status.label()).strong().color(theme::ACCENT));
        ui.label(RichText::new(&task.name).strong());
        ui.label(RichText::new(dates).size(11.0).color(theme::TEXT_SECONDARY));
        ui.label(
            RichText::new(format!("{}%", task.percent_complete))
                .size(11.0)
                .color(theme::TEXT_DIM),
        );
    });
}

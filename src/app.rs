use std::path::PathBuf;
use std::time::Instant;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use log::{info, warn};

use crate::ui;
use crate::ui::task_table::LabelAction;
use msp_timeline::config::ViewerSettings;
use msp_timeline::engine::{Panel, TimelineView};
use msp_timeline::model::record::{AssignmentRecord, DurationValue, ResourceRecord, TaskRecord};
use msp_timeline::model::{Project, RecordSet};

/// How often the "now" instant is refreshed while the window is open.
const NOW_REFRESH_SECS: i64 = 60;

/// Main application state.
pub struct ViewerApp {
    pub view: TimelineView,
    pub settings: ViewerSettings,
    pub settings_path: PathBuf,
    pub file_path: Option<PathBuf>,
    pub filter_text: String,

    // Dialog state
    pub show_about: bool,
    pub load_error: Option<String>,

    pub status_message: String,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl ViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: ViewerSettings, settings_path: PathBuf) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        ui::theme::apply_theme(&cc.egui_ctx);

        let now = local_now();
        let project = Project::from_records(sample_records(now.date()));
        let view = TimelineView::new(project, settings.view_state(), now);

        Self {
            view,
            settings,
            settings_path,
            file_path: None,
            filter_text: String::new(),
            show_about: false,
            load_error: None,
            status_message: "Sample schedule loaded".to_string(),
        }
    }

    // --- File operations ---

    pub fn open_record_set(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Schedule record set", &["json"])
            .pick_file()
        else {
            return;
        };
        match msp_timeline::io::load_project(&path) {
            Ok(project) => {
                let count = project.tasks.len();
                self.replace_project(project);
                self.status_message = format!("Loaded {} tasks from {}", count, path.display());
                self.file_path = Some(path);
            }
            Err(e) => self.report_load_error(e.to_string()),
        }
    }

    pub fn import_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv", "txt"])
            .pick_file()
        else {
            return;
        };
        match msp_timeline::io::import_csv(&path) {
            Ok((records, skipped)) => {
                let project = Project::from_records(records);
                let count = project.tasks.len();
                self.replace_project(project);
                self.file_path = Some(path);
                self.status_message = if skipped > 0 {
                    format!("Imported {} tasks ({} rows skipped)", count, skipped)
                } else {
                    format!("Imported {} tasks", count)
                };
            }
            Err(e) => self.report_load_error(e.to_string()),
        }
    }

    pub fn close_project(&mut self) {
        self.replace_project(Project::from_records(RecordSet::default()));
        self.file_path = None;
        self.status_message = "Closed".to_string();
    }

    /// Swap in a new schedule. View preferences carry over; per-document
    /// state (filter, collapse, highlight, cursor) starts fresh.
    fn replace_project(&mut self, project: Project) {
        self.settings.remember(self.view.state());
        self.filter_text.clear();
        self.view = TimelineView::new(project, self.settings.view_state(), local_now());
    }

    fn report_load_error(&mut self, message: String) {
        warn!("load failed: {message}");
        self.status_message = format!("Load failed: {message}");
        self.load_error = Some(message);
    }

    fn refresh_now(&mut self) {
        let now = local_now();
        if now - self.view.now() >= Duration::seconds(NOW_REFRESH_SECS) {
            self.view.set_now(now);
        }
    }

    fn show_footer(&self, ui: &mut egui::Ui) {
        let stats = self.view.stats();
        let dim = |text: String| egui::RichText::new(text).size(10.5).color(ui::theme::TEXT_DIM);

        ui.horizontal_centered(|ui| {
            ui.label(
                egui::RichText::new(&self.status_message)
                    .size(11.0)
                    .color(ui::theme::TEXT_SECONDARY),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let (Some(start), Some(finish)) = (self.view.summary().start, self.view.summary().finish) {
                    ui.label(dim(format!(
                        "{} – {}",
                        start.format("%d %b %Y"),
                        finish.format("%d %b %Y")
                    )));
                    ui.label(dim("·".to_string()));
                }
                for (kind, color) in [
                    (msp_timeline::model::NearToday::Upcoming, ui::theme::NEAR_UPCOMING),
                    (msp_timeline::model::NearToday::JustFinished, ui::theme::NEAR_JUST_FINISHED),
                    (msp_timeline::model::NearToday::InProgress, ui::theme::NEAR_IN_PROGRESS),
                ] {
                    ui.colored_label(color, egui::RichText::new(ui::theme::near_today_label(kind)).size(10.5));
                }
                ui.label(dim("·".to_string()));
                ui.label(dim(format!(
                    "{} tasks · {} milestones · {} summary · {} complete · {} links · {} resources",
                    stats.tasks,
                    stats.milestones,
                    stats.summaries,
                    stats.complete,
                    self.view.link_count(),
                    stats.resources,
                )));
            });
        });
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.refresh_now();

        // Keyboard navigation outside closures to avoid borrow issues
        let typing = ctx.wants_keyboard_input();
        let (go_prev, go_next, go_today) = ctx.input(|i| {
            (
                !typing && i.key_pressed(egui::Key::ArrowLeft),
                !typing && i.key_pressed(egui::Key::ArrowRight),
                !typing && i.key_pressed(egui::Key::T),
            )
        });
        if go_prev {
            self.view.navigate_prev();
        }
        if go_next {
            self.view.navigate_next();
        }
        if go_today {
            self.view.navigate_today(Instant::now());
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_menu_bar(self, ui);
            ui.add_space(2.0);
            ui::toolbar::show_controls(self, ui);
            ui::toolbar::show_nav_banner(self, ui);
            ui.add_space(2.0);
        });

        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| self.show_footer(ui));

        let now = Instant::now();
        let today_focus = self.view.today_focus_active(now);
        if let Some(remaining) = self.view.today_focus_remaining(now) {
            ctx.request_repaint_after(remaining);
        }

        // Left panel: labels
        let label_offset = self.view.scroll_mut().take_pending(Panel::Labels);
        let mut label_output = None;
        egui::SidePanel::left("label_panel")
            .default_width(self.settings.label_width)
            .min_width(180.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                label_output = Some(ui::task_table::show_label_panel(
                    &self.view,
                    label_offset,
                    today_focus,
                    ui,
                ));
            });

        // Central panel: time grid
        let grid_offset = self.view.scroll_mut().take_pending(Panel::Grid);
        let center_on_x = self.view.take_horizontal_target();
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let chart = egui::CentralPanel::default()
            .frame(chart_frame)
            .show(ctx, |ui| {
                ui::gantt_chart::show_gantt_chart(&self.view, grid_offset, center_on_x, today_focus, ui)
            })
            .inner;

        // Feed the final offsets back; a change in one panel moves the other
        // on the next frame.
        if let Some(output) = label_output {
            if self.view.scroll_mut().observe(Panel::Labels, output.offset) {
                ctx.request_repaint();
            }
            match output.action {
                LabelAction::ToggleCollapse(uid) => self.view.toggle_collapse(&uid),
                LabelAction::ToggleHighlight(uid) => self.view.toggle_highlighted(&uid),
                LabelAction::None => {}
            }
        }
        if self.view.scroll_mut().observe(Panel::Grid, chart.offset) {
            ctx.request_repaint();
        }
        if let Some(uid) = chart.toggle_highlight {
            self.view.toggle_highlighted(&uid);
        } else if chart.clear_highlight {
            self.view.set_highlighted(None);
        }
        match chart.zoom_steps {
            1 => self.view.zoom_in(),
            -1 => self.view.zoom_out(),
            _ => {}
        }

        if self.view.scroll().has_pending() {
            ctx.request_repaint();
        }

        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
        if self.load_error.is_some() {
            ui::dialogs::show_load_error_dialog(self, ctx);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.settings.remember(self.view.state());
        match self.settings.save(&self.settings_path) {
            Ok(()) => info!("settings saved to {}", self.settings_path.display()),
            Err(e) => warn!("could not save settings: {e}"),
        }
    }
}

/// A small schedule around `today` shown before anything is opened.
fn sample_records(today: NaiveDate) -> RecordSet {
    let at = |days: i64, hour: u32| -> String {
        let date = today + Duration::days(days);
        date.and_hms_opt(hour, 0, 0)
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_default()
    };
    let task = |uid: &str, name: &str, level: i64, start: i64, finish: i64| TaskRecord {
        uid: uid.to_string(),
        id: uid.to_string(),
        name: name.to_string(),
        start: at(start, 8),
        finish: at(finish, 17),
        outline_level: Some(level),
        ..Default::default()
    };

    let mut tasks = vec![
        TaskRecord {
            summary: true,
            ..task("1", "Planning", 1, -20, 4)
        },
        TaskRecord {
            percent_complete: Some(100),
            duration: DurationValue::Hours(40.0),
            ..task("2", "Kickoff & scope", 2, -20, -16)
        },
        TaskRecord {
            percent_complete: Some(100),
            predecessor_uids: vec!["2".to_string()],
            ..task("3", "Requirements", 2, -15, -6)
        },
        TaskRecord {
            percent_complete: Some(60),
            predecessor_uids: vec!["3".to_string()],
            ..task("4", "Architecture review", 2, -5, 4)
        },
        TaskRecord {
            summary: true,
            ..task("5", "Delivery", 1, 2, 40)
        },
        TaskRecord {
            percent_complete: Some(10),
            predecessor_uids: vec!["3".to_string()],
            ..task("6", "UI design", 2, 2, 14)
        },
        TaskRecord {
            predecessor_uids: vec!["4".to_string()],
            ..task("7", "Backend build", 2, 0, 28)
        },
        TaskRecord {
            predecessor_uids: vec!["6".to_string(), "7".to_string()],
            ..task("8", "Testing & QA", 2, 26, 38)
        },
    ];
    let mut launch = task("9", "Launch", 1, 40, 40);
    launch.milestone = true;
    launch.predecessor_uids = vec!["8".to_string()];
    tasks.push(launch);

    let mut records = RecordSet {
        tasks,
        resources: vec![
            ResourceRecord {
                uid: "1".to_string(),
                name: "Ada".to_string(),
                kind: "Work".to_string(),
                ..Default::default()
            },
            ResourceRecord {
                uid: "2".to_string(),
                name: "Linus".to_string(),
                kind: "Work".to_string(),
                ..Default::default()
            },
        ],
        assignments: vec![
            AssignmentRecord {
                task_uid: "4".to_string(),
                resource_uid: "1".to_string(),
                ..Default::default()
            },
            AssignmentRecord {
                task_uid: "7".to_string(),
                resource_uid: "2".to_string(),
                ..Default::default()
            },
        ],
        ..Default::default()
    };
    records.project.name = "Sample Project".to_string();
    records.project.author = "Demo".to_string();
    records
}

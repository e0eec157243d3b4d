//! Viewer settings persisted as JSON in the OS config directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::engine::{SortMode, ViewState};
use crate::model::timeline::clamp_zoom;
use crate::model::{Granularity, NearTodayWindows};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub granularity: Granularity,
    pub zoom: f32,
    pub show_links: bool,
    pub sort: SortMode,
    pub label_width: f32,
    /// Used when `RUST_LOG` is not set.
    pub log_level: String,
    pub just_finished_days: i64,
    pub upcoming_days: i64,
    pub today_focus_secs: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        let windows = NearTodayWindows::default();
        Self {
            granularity: Granularity::Week,
            zoom: 1.0,
            show_links: true,
            sort: SortMode::Outline,
            label_width: 320.0,
            log_level: "info".to_string(),
            just_finished_days: windows.just_finished_days,
            upcoming_days: windows.upcoming_days,
            today_focus_secs: 3.0,
        }
    }
}

impl ViewerSettings {
    /// `settings.json` under the platform config dir, or the working
    /// directory when none can be resolved.
    pub fn default_path() -> PathBuf {
        match directories::ProjectDirs::from("", "", "MspTimeline") {
            Some(dirs) => dirs.config_dir().join(SETTINGS_FILE),
            None => PathBuf::from(SETTINGS_FILE),
        }
    }

    /// Read settings, falling back to the defaults when the file is missing
    /// or malformed.
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("ignoring malformed settings {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
        }
        std::fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Initial view state for a freshly opened project.
    pub fn view_state(&self) -> ViewState {
        ViewState {
            sort: self.sort,
            zoom: clamp_zoom(self.zoom),
            granularity: self.granularity,
            show_arrows: self.show_links,
            windows: NearTodayWindows {
                just_finished_days: self.just_finished_days.max(0),
                upcoming_days: self.upcoming_days.max(0),
            },
            today_focus_duration: Duration::from_secs_f32(self.today_focus_secs.clamp(0.0, 60.0)),
            ..ViewState::default()
        }
    }

    /// Remember the view preferences worth keeping between sessions.
    pub fn remember(&mut self, state: &ViewState) {
        self.granularity = state.granularity;
        self.zoom = state.zoom;
        self.sort = state.sort;
        self.show_links = state.show_arrows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let s: ViewerSettings = serde_json::from_str(r#"{ "zoom": 2.0 }"#).unwrap();
        assert_eq!(s.zoom, 2.0);
        assert_eq!(s.upcoming_days, 21);
        assert_eq!(s.granularity, Granularity::Week);
    }

    #[test]
    fn malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(ViewerSettings::load(&path), ViewerSettings::default());
        assert_eq!(
            ViewerSettings::load(&dir.path().join("absent.json")),
            ViewerSettings::default()
        );
    }

    #[test]
    fn round_trips_remembered_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = ViewerSettings::default();
        let state = ViewState {
            granularity: Granularity::Month,
            zoom: 1.6,
            show_arrows: false,
            ..ViewState::default()
        };
        settings.remember(&state);
        settings.save(&path).unwrap();

        let loaded = ViewerSettings::load(&path);
        let restored = loaded.view_state();
        assert_eq!(restored.granularity, Granularity::Month);
        assert!(!restored.show_arrows);
        assert_eq!(restored.today_focus_duration, Duration::from_secs(3));
    }
}

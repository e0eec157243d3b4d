//! Timeline scale: column generation per granularity and the date <-> pixel
//! mapping shared by bars, arrows and the today line.
//!
//! One column is one day, one Monday-aligned week or one calendar month.
//! Positions are linear in time from the first column, so `date_to_x` is
//! monotonic for a fixed scale.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Narrowest a column may get, whatever the zoom.
pub const MIN_COLUMN_WIDTH: f32 = 28.0;
/// Narrowest a bar may get, so degenerate bars stay clickable.
pub const MIN_BAR_WIDTH: f32 = 4.0;
pub const MIN_ZOOM: f32 = 0.3;
pub const MAX_ZOOM: f32 = 4.0;
pub const ZOOM_STEP: f32 = 0.2;
/// Trailing day columns after the last scheduled day.
const DAY_PADDING: i64 = 4;
const MS_PER_DAY: f64 = 86_400_000.0;
/// Average Gregorian month, keeps month columns uniform.
const DAYS_PER_MONTH: f64 = 30.4375;

/// Size of one timeline column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Granularity {
    Day,
    #[default]
    Week,
    Month,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Day, Granularity::Week, Granularity::Month];

    /// Column width at zoom 1.0.
    pub fn base_width(self) -> f32 {
        match self {
            Granularity::Day => 40.0,
            Granularity::Week => 120.0,
            Granularity::Month => 60.0,
        }
    }

    /// Days covered by one column width.
    pub fn unit_days(self) -> f64 {
        match self {
            Granularity::Day => 1.0,
            Granularity::Week => 7.0,
            Granularity::Month => DAYS_PER_MONTH,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Day => "Days",
            Granularity::Week => "Weeks",
            Granularity::Month => "Months",
        }
    }
}

/// One time bucket along the horizontal axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: String,
    /// Second header line (the year, in month view).
    pub sub_label: Option<String>,
    pub date: NaiveDateTime,
    pub is_major: bool,
    pub is_weekend: bool,
}

/// A run of week columns falling in the same calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup {
    pub label: String,
    pub first_column: usize,
    pub column_count: usize,
}

/// Ordered columns plus the date ↔ pixel mapping shared by every layout step.
#[derive(Debug, Clone)]
pub struct TimelineScale {
    pub granularity: Granularity,
    pub zoom: f32,
    pub column_width: f32,
    pub columns: Vec<Column>,
}

impl TimelineScale {
    pub fn new(min: NaiveDateTime, max: NaiveDateTime, granularity: Granularity, zoom: f32) -> Self {
        let max = max.max(min);
        let zoom = clamp_zoom(zoom);
        let columns = match granularity {
            Granularity::Day => day_columns(min, max),
            Granularity::Week => week_columns(min, max),
            Granularity::Month => month_columns(min, max),
        };
        Self {
            granularity,
            zoom,
            column_width: column_width(granularity, zoom),
            columns,
        }
    }

    /// Instant at x = 0.
    pub fn origin(&self) -> NaiveDateTime {
        // Every constructor yields at least one column.
        self.columns
            .first()
            .map(|c| c.date)
            .unwrap_or_default()
    }

    /// Convert an instant to an x-pixel offset from the first column.
    pub fn date_to_x(&self, date: NaiveDateTime) -> f32 {
        let ms = (date - self.origin()).num_milliseconds() as f64;
        (ms / self.unit_ms() * self.column_width as f64) as f32
    }

    /// Convert an x-pixel offset back to an instant.
    pub fn x_to_date(&self, x: f32) -> NaiveDateTime {
        let ms = x as f64 / self.column_width as f64 * self.unit_ms();
        self.origin() + Duration::milliseconds(ms.round() as i64)
    }

    /// Width of a bar spanning `start..finish`, never below [`MIN_BAR_WIDTH`].
    pub fn bar_width(&self, start: NaiveDateTime, finish: NaiveDateTime) -> f32 {
        let ms = (finish - start).num_milliseconds() as f64;
        let width = (ms / self.unit_ms() * self.column_width as f64) as f32;
        width.max(MIN_BAR_WIDTH)
    }

    /// Total width in pixels for all columns.
    pub fn total_width(&self) -> f32 {
        self.columns.len() as f32 * self.column_width
    }

    /// Month spans over the columns, for the upper header tier in week view.
    pub fn month_groups(&self) -> Vec<MonthGroup> {
        let mut groups: Vec<MonthGroup> = Vec::new();
        for (i, col) in self.columns.iter().enumerate() {
            let key = col.date.format("%B %Y").to_string();
            match groups.last_mut() {
                Some(g) if g.label == key => g.column_count += 1,
                _ => groups.push(MonthGroup {
                    label: key,
                    first_column: i,
                    column_count: 1,
                }),
            }
        }
        groups
    }

    fn unit_ms(&self) -> f64 {
        self.granularity.unit_days() * MS_PER_DAY
    }
}

pub fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        1.0
    }
}

/// Zoom in one step (rounded to a tenth).
pub fn zoom_in(zoom: f32) -> f32 {
    clamp_zoom(((zoom + ZOOM_STEP) * 10.0).round() / 10.0)
}

/// Zoom out one step (rounded to a tenth).
pub fn zoom_out(zoom: f32) -> f32 {
    clamp_zoom(((zoom - ZOOM_STEP) * 10.0).round() / 10.0)
}

pub fn column_width(granularity: Granularity, zoom: f32) -> f32 {
    (granularity.base_width() * zoom).max(MIN_COLUMN_WIDTH)
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn day_columns(min: NaiveDateTime, max: NaiveDateTime) -> Vec<Column> {
    let start = midnight(min.date());
    let span_ms = (max - min).num_milliseconds() as f64;
    let total_days = ((span_ms / MS_PER_DAY).ceil() as i64).max(1) + DAY_PADDING;

    (0..=total_days)
        .map(|d| {
            let date = start + Duration::days(d);
            let weekday = date.weekday().num_days_from_monday();
            Column {
                label: date.day().to_string(),
                sub_label: None,
                date,
                is_major: date.day() == 1,
                is_weekend: weekday >= 5,
            }
        })
        .collect()
}

fn week_columns(min: NaiveDateTime, max: NaiveDateTime) -> Vec<Column> {
    let day = min.date();
    let monday = day - Duration::days(day.weekday().num_days_from_monday() as i64);
    let end = max + Duration::days(7);

    let mut columns = Vec::new();
    let mut week = midnight(monday);
    while week <= end {
        columns.push(Column {
            label: week.format("%-d %b").to_string(),
            sub_label: None,
            date: week,
            is_major: week.day() <= 7,
            is_weekend: false,
        });
        week += Duration::days(7);
    }
    columns
}

fn month_columns(min: NaiveDateTime, max: NaiveDateTime) -> Vec<Column> {
    let end = max + Duration::days(32);
    let mut columns = Vec::new();
    let mut month = min.date().with_day(1).map(midnight).unwrap_or(min);
    while month <= end {
        columns.push(Column {
            label: month.format("%b").to_string(),
            sub_label: Some(month.year().to_string()),
            date: month,
            is_major: month.month() == 1,
            is_weekend: false,
        });
        let (y, m) = if month.month() == 12 {
            (month.year() + 1, 1)
        } else {
            (month.year(), month.month() + 1)
        };
        month = match NaiveDate::from_ymd_opt(y, m, 1) {
            Some(d) => midnight(d),
            None => break,
        };
    }
    columns
}

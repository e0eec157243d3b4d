//! The derivation pipeline: pure functions of (project, view state, now).

pub mod chronology;
pub mod hierarchy;
pub mod layout;
pub mod routing;
pub mod scroll;
pub mod view;
pub mod visibility;

pub use chronology::{ChronoEvent, Chronology, TodayFocus};
pub use layout::{BarKind, BarShape, ROW_HEIGHT};
pub use routing::{Arrow, RouteKind};
pub use scroll::{Panel, ScrollSync};
pub use view::{RowView, TimelineView, ViewState};
pub use visibility::{SortMode, VisibleRows};

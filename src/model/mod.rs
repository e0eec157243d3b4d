pub mod project;
pub mod record;
pub mod task;
pub mod timeline;

pub use project::{Project, ProjectStats, ProjectSummary};
pub use record::RecordSet;
pub use task::{NearToday, NearTodayWindows, Resource, Task, TaskStatus, TaskUid};
pub use timeline::{Column, Granularity, MonthGroup, TimelineScale};

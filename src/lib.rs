//! Gantt timeline engine for Microsoft Project schedules.
//!
//! [`model`] holds the normalized schedule, [`engine`] derives what to draw
//! from it, [`io`] loads record sets and CSV exports.

pub mod config;
pub mod engine;
pub mod io;
pub mod logging;
pub mod model;

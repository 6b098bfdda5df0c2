//! Timesheet cycle engine and report exporter.
//!
//! [`cycles`] maps a reference date and cycle type to period boundaries,
//! [`summary`] and [`export`] turn time entries into totals and CSV/JSON
//! reports. Everything in these modules is pure; file and config access
//! lives in [`storage`].

pub mod cycles;
pub mod durations;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod storage;
pub mod summary;

pub use cycles::{CyclePeriod, CycleType};
pub use error::{Error, Result};
pub use export::{Export, ExportFormat, ExportRange};
pub use models::{EntryStatus, Project, ProjectStatus, TimeEntry};
pub use summary::ExportSummary;

//! Output rendering (JSON report, CSV tables)

pub mod report;
pub mod tables;

pub use report::{report_stem, window_value, write_report};
pub use tables::write_tables;

//! Text rendering of reports.
pub mod report;

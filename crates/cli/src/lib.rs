//! `salesgrid-cli`: embeddable analysis session plus the `salesgrid` binary.

pub mod analytics;
pub mod exit_codes;
pub mod report;

pub use analytics::{AnalysisReport, PathOutput, SalesAnalytics};

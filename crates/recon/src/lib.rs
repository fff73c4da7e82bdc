//! `salesgrid-recon`: reconciliation of two purchase result sets.
//!
//! Pure crate: receives two record sequences, returns a report.
//! No CLI or IO dependencies.

pub mod engine;
pub mod model;

pub use engine::reconcile;
pub use model::{DiffKind, ReconReport, ReconSummary, RowDiff};

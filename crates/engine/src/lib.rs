//! `salesgrid-engine`: purchase model and the in-memory join pipeline.
//!
//! Pure crate: receives fully loaded tables, returns aggregated purchase
//! records. No database or file dependencies.

pub mod error;
pub mod filter;
pub mod frame;
pub mod model;
pub mod transform;

pub use error::SalesError;
pub use filter::AgeWindow;
pub use frame::Tables;
pub use model::{Customer, Item, Order, PurchaseRecord, Quantity, Sale};
pub use transform::transform_purchases;

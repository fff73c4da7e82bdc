// File I/O: the SQLite source and CSV export

pub mod csv;
pub mod load;
pub mod query;
pub mod schema;
pub mod source;

pub use load::load_tables;
pub use query::query_purchases;
pub use source::SalesDb;

#[cfg(test)]
pub(crate) mod fixture;

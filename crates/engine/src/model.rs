use serde::Serialize;

// ---------------------------------------------------------------------------
// Input rows
// ---------------------------------------------------------------------------
//
// Keys are optional because SQLite does not enforce NOT NULL on the source
// tables. A NULL key never takes part in a join.

/// One row of `Customer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub customer_id: Option<i64>,
    pub age: Option<i64>,
}

/// One row of `Sales`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    pub sales_id: Option<i64>,
    pub customer_id: Option<i64>,
}

/// One row of `Orders`.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: Option<i64>,
    pub sales_id: Option<i64>,
    pub item_id: Option<i64>,
    pub quantity: Option<Quantity>,
}

/// One row of `Items`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub item_id: Option<i64>,
    pub item_name: Option<String>,
}

/// A stored quantity. SQLite keeps whatever numeric class was inserted,
/// so both are carried through until summation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Quantity {
    Integer(i64),
    Real(f64),
}

impl Quantity {
    pub fn is_zero(&self) -> bool {
        match *self {
            Quantity::Integer(n) => n == 0,
            Quantity::Real(x) => x == 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Total quantity of one item bought by one customer in the age window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PurchaseRecord {
    pub customer_id: i64,
    pub age: i64,
    pub item_name: String,
    pub total_quantity: i64,
}

impl PurchaseRecord {
    pub fn new(customer_id: i64, age: i64, item_name: impl Into<String>, total_quantity: i64) -> Self {
        Self {
            customer_id,
            age,
            item_name: item_name.into(),
            total_quantity,
        }
    }

    /// Canonical sort key shared by both computation paths.
    pub fn sort_key(&self) -> (i64, &str, i64) {
        (self.customer_id, self.item_name.as_str(), self.age)
    }
}

/// Sort records into canonical order: customer, then item name (byte-wise,
/// same as SQLite's BINARY collation), then age.
pub fn sort_canonical(records: &mut [PurchaseRecord]) {
    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

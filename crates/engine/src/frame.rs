//! In-memory copies of the four source tables.

use std::collections::HashMap;
use std::hash::Hash;

use crate::model::{Customer, Item, Order, Sale};

/// All four tables, fully loaded.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub customers: Vec<Customer>,
    pub sales: Vec<Sale>,
    pub orders: Vec<Order>,
    pub items: Vec<Item>,
}

impl Tables {
    pub fn row_counts(&self) -> [(&'static str, usize); 4] {
        [
            ("Customer", self.customers.len()),
            ("Sales", self.sales.len()),
            ("Orders", self.orders.len()),
            ("Items", self.items.len()),
        ]
    }
}

/// Build a hash index from join key to every row carrying it.
///
/// Rows whose key is `None` are left out, so they never join. Duplicate keys
/// keep all rows, giving the same fan-out as a SQL inner join.
pub fn index_by<T, K, F>(rows: &[T], key: F) -> HashMap<K, Vec<&T>>
where
    K: Eq + Hash,
    F: Fn(&T) -> Option<K>,
{
    let mut index: HashMap<K, Vec<&T>> = HashMap::with_capacity(rows.len());
    for row in rows {
        if let Some(k) = key(row) {
            index.entry(k).or_default().push(row);
        }
    }
    index
}

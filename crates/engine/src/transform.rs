use std::collections::BTreeMap;

use crate::error::SalesError;
use crate::filter::{quantity_qualifies, AgeWindow};
use crate::frame::{index_by, Tables};
use crate::model::{PurchaseRecord, Quantity};

/// Group key. Field order gives the canonical output order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey {
    customer_id: i64,
    item_name: String,
    age: i64,
}

/// Running sum of one group, with the same arithmetic as SQLite's `SUM`.
///
/// Integers are summed exactly until the first REAL or the first overflow.
/// From then on the sum is carried as a Kahan-Babuska-Neumaier compensated
/// double. Overflow is an error only if no REAL took part afterwards.
/// `total` truncates toward zero like `CAST(SUM(x) AS INTEGER)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuantitySum {
    int_total: i64,
    sum: f64,
    err: f64,
    approx: bool,
    overflow: bool,
}

/// Integers at or beyond 2^52 are split so the low bits are not lost.
const EXACT_LIMIT: i64 = 4_503_599_627_370_496;

impl QuantitySum {
    pub fn add(&mut self, quantity: Quantity) {
        match (self.approx, quantity) {
            (false, Quantity::Integer(n)) => match self.int_total.checked_add(n) {
                Some(total) => self.int_total = total,
                None => {
                    self.overflow = true;
                    self.start_approx();
                    self.step_int(n);
                }
            },
            (false, Quantity::Real(x)) => {
                self.start_approx();
                self.step(x);
            }
            (true, Quantity::Integer(n)) => self.step_int(n),
            (true, Quantity::Real(x)) => {
                self.overflow = false;
                self.step(x);
            }
        }
    }

    fn start_approx(&mut self) {
        let n = self.int_total;
        if n <= -EXACT_LIMIT || n >= EXACT_LIMIT {
            let small = n % 16384;
            self.sum = (n - small) as f64;
            self.err = small as f64;
        } else {
            self.sum = n as f64;
            self.err = 0.0;
        }
        self.approx = true;
    }

    fn step(&mut self, x: f64) {
        let s = self.sum;
        let t = s + x;
        if s.abs() > x.abs() {
            self.err += (s - t) + x;
        } else {
            self.err += (x - t) + s;
        }
        self.sum = t;
    }

    fn step_int(&mut self, n: i64) {
        if n <= -EXACT_LIMIT || n >= EXACT_LIMIT {
            let small = n % 16384;
            self.step((n - small) as f64);
            self.step(small as f64);
        } else {
            self.step(n as f64);
        }
    }

    /// Final integer total, or a data type error if an all-integer sum
    /// overflowed.
    pub fn total(&self) -> Result<i64, SalesError> {
        if !self.approx {
            return Ok(self.int_total);
        }
        if self.overflow {
            return Err(SalesError::data_type("Orders", "quantity", "integer overflow in sum"));
        }
        let value = if self.err.is_finite() { self.sum + self.err } else { self.sum };
        // `as` saturates, matching SQLite's CAST on out-of-range reals
        Ok(value.trunc() as i64)
    }
}

/// Compute purchase records from loaded tables.
///
/// Filter customers by age, inner-join Customer -> Sales -> Orders -> Items,
/// drop NULL/zero quantities and NULL item names, sum per
/// (customer, age, item), drop non-positive totals, sort canonically.
pub fn transform_purchases(tables: &Tables, window: AgeWindow) -> Result<Vec<PurchaseRecord>, SalesError> {
    let sales_by_customer = index_by(&tables.sales, |s| s.customer_id);
    let orders_by_sale = index_by(&tables.orders, |o| o.sales_id);
    let items_by_id = index_by(&tables.items, |i| i.item_id);

    let mut groups: BTreeMap<GroupKey, QuantitySum> = BTreeMap::new();
    let mut joined_rows = 0usize;

    let eligible = tables.customers.iter().filter_map(|c| match (c.customer_id, c.age) {
        (Some(id), Some(age)) if window.contains(age) => Some((id, age)),
        _ => None,
    });

    for (customer_id, age) in eligible {
        let Some(sales) = sales_by_customer.get(&customer_id) else {
            continue;
        };
        for sale in sales {
            let Some(orders) = sale.sales_id.and_then(|id| orders_by_sale.get(&id)) else {
                continue;
            };
            for order in orders {
                if !quantity_qualifies(order.quantity) {
                    continue;
                }
                let (Some(quantity), Some(item_id)) = (order.quantity, order.item_id) else {
                    continue;
                };
                let Some(items) = items_by_id.get(&item_id) else {
                    continue;
                };
                for item in items {
                    let Some(name) = item.item_name.as_deref() else {
                        continue;
                    };
                    joined_rows += 1;
                    groups
                        .entry(GroupKey {
                            customer_id,
                            item_name: name.to_string(),
                            age,
                        })
                        .or_default()
                        .add(quantity);
                }
            }
        }
    }

    log::debug!("transform: {joined_rows} joined rows, {} groups", groups.len());

    let mut records = Vec::with_capacity(groups.len());
    for (key, sum) in groups {
        let total = sum.total()?;
        if total > 0 {
            records.push(PurchaseRecord::new(key.customer_id, key.age, key.item_name, total));
        }
    }
    Ok(records)
}

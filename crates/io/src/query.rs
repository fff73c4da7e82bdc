//! Query path: one aggregate statement evaluated by SQLite.

use rusqlite::params;

use salesgrid_engine::{AgeWindow, PurchaseRecord, SalesError};

use crate::schema::{verify_column_types, verify_schema};
use crate::source::{map_sql_error, SalesDb};

/// The aggregate is wrapped so the positivity check applies after the
/// integer cast; a REAL sum of 0.5 casts to 0 and must not survive.
pub const PURCHASE_QUERY: &str = "
SELECT customer_id, age, item_name, total_quantity
FROM (
    SELECT
        c.customer_id AS customer_id,
        c.age AS age,
        i.item_name AS item_name,
        CAST(SUM(o.quantity) AS INTEGER) AS total_quantity
    FROM Customer c
    INNER JOIN Sales s ON c.customer_id = s.customer_id
    INNER JOIN Orders o ON s.sales_id = o.sales_id
    INNER JOIN Items i ON o.item_id = i.item_id
    WHERE c.age BETWEEN ?1 AND ?2
      AND o.quantity IS NOT NULL
      AND o.quantity != 0
      AND i.item_name IS NOT NULL
    GROUP BY c.customer_id, c.age, i.item_name
)
WHERE total_quantity > 0
ORDER BY customer_id, item_name, age
";

/// Run the aggregate query against an open handle.
pub fn query_purchases(db: &SalesDb, window: AgeWindow) -> Result<Vec<PurchaseRecord>, SalesError> {
    let conn = db.conn()?;
    verify_schema(conn)?;
    verify_column_types(conn)?;

    let mut stmt = conn.prepare(PURCHASE_QUERY).map_err(|e| map_sql_error("Orders", e))?;
    let mut rows = stmt
        .query(params![window.min_age, window.max_age])
        .map_err(|e| map_sql_error("Orders", e))?;

    let mut records = Vec::new();
    while let Some(row) = rows.next().map_err(|e| map_sql_error("Orders", e))? {
        records.push(PurchaseRecord {
            customer_id: row.get(0).map_err(|e| map_sql_error("Customer", e))?,
            age: row.get(1).map_err(|e| map_sql_error("Customer", e))?,
            item_name: row.get(2).map_err(|e| map_sql_error("Items", e))?,
            total_quantity: row.get(3).map_err(|e| map_sql_error("Orders", e))?,
        });
    }

    log::debug!("query: {} records", records.len());
    Ok(records)
}

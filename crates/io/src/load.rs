//! Load the four source tables into memory for the transform path.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};

use salesgrid_engine::model::{Customer, Item, Order, Quantity, Sale};
use salesgrid_engine::{SalesError, Tables};

use crate::schema::{verify_schema, CUSTOMER, ITEMS, ORDERS, SALES};
use crate::source::{map_sql_error, SalesDb};

/// Read every row of Customer, Sales, Orders and Items.
///
/// Values are typed strictly: keys and ages must be INTEGER, quantities
/// INTEGER or REAL, item names TEXT. NULL is accepted everywhere.
pub fn load_tables(db: &SalesDb) -> Result<Tables, SalesError> {
    let conn = db.conn()?;
    verify_schema(conn)?;

    let tables = Tables {
        customers: read_rows(conn, CUSTOMER.name, "SELECT customer_id, age FROM Customer", |row| {
            Ok(Customer {
                customer_id: integer(row, CUSTOMER.name, 0, "customer_id")?,
                age: integer(row, CUSTOMER.name, 1, "age")?,
            })
        })?,
        sales: read_rows(conn, SALES.name, "SELECT sales_id, customer_id FROM Sales", |row| {
            Ok(Sale {
                sales_id: integer(row, SALES.name, 0, "sales_id")?,
                customer_id: integer(row, SALES.name, 1, "customer_id")?,
            })
        })?,
        orders: read_rows(
            conn,
            ORDERS.name,
            "SELECT order_id, sales_id, item_id, quantity FROM Orders",
            |row| {
                Ok(Order {
                    order_id: integer(row, ORDERS.name, 0, "order_id")?,
                    sales_id: integer(row, ORDERS.name, 1, "sales_id")?,
                    item_id: integer(row, ORDERS.name, 2, "item_id")?,
                    quantity: quantity(row, 3)?,
                })
            },
        )?,
        items: read_rows(conn, ITEMS.name, "SELECT item_id, item_name FROM Items", |row| {
            Ok(Item {
                item_id: integer(row, ITEMS.name, 0, "item_id")?,
                item_name: text(row, ITEMS.name, 1, "item_name")?,
            })
        })?,
    };

    for (table, count) in tables.row_counts() {
        log::debug!("loaded {count} rows from {table}");
    }
    Ok(tables)
}

fn read_rows<T, F>(conn: &Connection, table: &str, sql: &str, mut convert: F) -> Result<Vec<T>, SalesError>
where
    F: FnMut(&Row<'_>) -> Result<T, SalesError>,
{
    let mut stmt = conn.prepare(sql).map_err(|e| map_sql_error(table, e))?;
    let mut rows = stmt.query([]).map_err(|e| map_sql_error(table, e))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(|e| map_sql_error(table, e))? {
        out.push(convert(row)?);
    }
    Ok(out)
}

fn value<'a>(row: &'a Row<'_>, table: &str, idx: usize) -> Result<ValueRef<'a>, SalesError> {
    row.get_ref(idx).map_err(|e| map_sql_error(table, e))
}

fn describe(v: ValueRef<'_>) -> String {
    match v {
        ValueRef::Null => "NULL".into(),
        ValueRef::Integer(n) => format!("integer {n}"),
        ValueRef::Real(x) => format!("real {x}"),
        ValueRef::Text(t) => format!("text '{}'", String::from_utf8_lossy(t)),
        ValueRef::Blob(b) => format!("blob of {} bytes", b.len()),
    }
}

fn integer(row: &Row<'_>, table: &str, idx: usize, column: &str) -> Result<Option<i64>, SalesError> {
    match value(row, table, idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(n) => Ok(Some(n)),
        other => Err(SalesError::data_type(
            table,
            column,
            format!("expected integer/null, found {}", describe(other)),
        )),
    }
}

fn quantity(row: &Row<'_>, idx: usize) -> Result<Option<Quantity>, SalesError> {
    match value(row, ORDERS.name, idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(n) => Ok(Some(Quantity::Integer(n))),
        ValueRef::Real(x) => Ok(Some(Quantity::Real(x))),
        other => Err(SalesError::data_type(
            ORDERS.name,
            "quantity",
            format!("expected integer/real/null, found {}", describe(other)),
        )),
    }
}

fn text(row: &Row<'_>, table: &str, idx: usize, column: &str) -> Result<Option<String>, SalesError> {
    match value(row, table, idx)? {
        ValueRef::Null => Ok(None),
        ValueRef::Text(t) => String::from_utf8(t.to_vec())
            .map(Some)
            .map_err(|_| SalesError::data_type(table, column, "text is not valid UTF-8")),
        other => Err(SalesError::data_type(
            table,
            column,
            format!("expected text/null, found {}", describe(other)),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;

    #[test]
    fn loads_all_rows() {
        let db = SalesDb::from_connection(fixture::sample());
        let tables = load_tables(&db).unwrap();
        assert_eq!(tables.customers.len(), 5);
        assert_eq!(tables.sales.len(), 6);
        assert_eq!(tables.orders.len(), 10);
        assert_eq!(tables.items.len(), 3);
        assert_eq!(tables.orders[2].quantity, None);
        assert_eq!(tables.items[0].item_name.as_deref(), Some("x"));
    }

    #[test]
    fn text_quantity_fails_load() {
        let conn = fixture::empty_schema();
        conn.execute_batch("INSERT INTO Orders VALUES (1, 1, 1, 'lots');").unwrap();
        let db = SalesDb::from_connection(conn);
        let err = load_tables(&db).unwrap_err();
        assert!(matches!(err, SalesError::DataType { ref column, .. } if column == "quantity"), "{err:?}");
    }

    #[test]
    fn missing_table_fails_load() {
        let conn = fixture::empty_schema();
        conn.execute_batch("DROP TABLE Sales;").unwrap();
        let db = SalesDb::from_connection(conn);
        assert!(load_tables(&db).unwrap_err().is_schema());
    }

    #[test]
    fn closed_handle_fails_load() {
        let mut db = SalesDb::from_connection(fixture::sample());
        db.close().unwrap();
        assert!(matches!(load_tables(&db), Err(SalesError::Connection(_))));
    }
}

//! Expected source schema and the checks run before either computation path.

use rusqlite::Connection;

use salesgrid_engine::SalesError;

use crate::source::map_sql_error;

/// Storage classes (as reported by `typeof()`) a column may hold.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub allowed: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
}

const KEY: &[&str] = &["integer", "null"];

pub const CUSTOMER: TableSpec = TableSpec {
    name: "Customer",
    columns: &[
        ColumnSpec { name: "customer_id", allowed: KEY },
        ColumnSpec { name: "age", allowed: &["integer", "null"] },
    ],
};

pub const SALES: TableSpec = TableSpec {
    name: "Sales",
    columns: &[
        ColumnSpec { name: "sales_id", allowed: KEY },
        ColumnSpec { name: "customer_id", allowed: KEY },
    ],
};

pub const ORDERS: TableSpec = TableSpec {
    name: "Orders",
    columns: &[
        ColumnSpec { name: "order_id", allowed: KEY },
        ColumnSpec { name: "sales_id", allowed: KEY },
        ColumnSpec { name: "item_id", allowed: KEY },
        ColumnSpec { name: "quantity", allowed: &["integer", "real", "null"] },
    ],
};

pub const ITEMS: TableSpec = TableSpec {
    name: "Items",
    columns: &[
        ColumnSpec { name: "item_id", allowed: KEY },
        ColumnSpec { name: "item_name", allowed: &["text", "null"] },
    ],
};

pub const TABLES: [TableSpec; 4] = [CUSTOMER, SALES, ORDERS, ITEMS];

/// Fail with a schema error if any expected table or column is missing.
/// Name comparison is case-insensitive, like SQLite identifiers.
pub fn verify_schema(conn: &Connection) -> Result<(), SalesError> {
    for table in TABLES {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1 COLLATE NOCASE)",
                [table.name],
                |row| row.get(0),
            )
            .map_err(|e| map_sql_error(table.name, e))?;
        if !exists {
            return Err(SalesError::MissingTable { table: table.name.to_string() });
        }

        let columns = table_columns(conn, table.name)?;
        for column in table.columns {
            if !columns.iter().any(|c| c.eq_ignore_ascii_case(column.name)) {
                return Err(SalesError::MissingColumn {
                    table: table.name.to_string(),
                    column: column.name.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, SalesError> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1)")
        .map_err(|e| map_sql_error(table, e))?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))
        .map_err(|e| map_sql_error(table, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| map_sql_error(table, e))?;
    Ok(names)
}

/// Fail with a data type error on the first value whose storage class the
/// pipeline cannot use (e.g. TEXT in `Customer.age`).
pub fn verify_column_types(conn: &Connection) -> Result<(), SalesError> {
    for table in TABLES {
        for column in table.columns {
            let allowed = column
                .allowed
                .iter()
                .map(|t| format!("'{t}'"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "SELECT typeof(\"{col}\"), quote(\"{col}\") FROM \"{tbl}\" WHERE typeof(\"{col}\") NOT IN ({allowed}) LIMIT 1",
                col = column.name,
                tbl = table.name,
            );
            let mut stmt = conn.prepare(&sql).map_err(|e| map_sql_error(table.name, e))?;
            let mut rows = stmt.query([]).map_err(|e| map_sql_error(table.name, e))?;
            if let Some(row) = rows.next().map_err(|e| map_sql_error(table.name, e))? {
                let found: String = row.get(0).map_err(|e| map_sql_error(table.name, e))?;
                let literal: String = row.get(1).map_err(|e| map_sql_error(table.name, e))?;
                return Err(SalesError::data_type(
                    table.name,
                    column.name,
                    format!("expected {}, found {found} {literal}", column.allowed.join("/")),
                ));
            }
        }
    }
    Ok(())
}

// Database handle shared by both computation paths

use std::path::{Path, PathBuf};

use rusqlite::{Connection, ErrorCode, OpenFlags};

use salesgrid_engine::SalesError;

/// Open read-only connection to a sales database.
///
/// The connection is dropped (and therefore closed) with the handle, so every
/// exit path releases it. `close` exists for callers that want the close
/// error reported.
pub struct SalesDb {
    path: PathBuf,
    conn: Option<Connection>,
}

impl SalesDb {
    /// Open an existing database file. Never creates one.
    pub fn open(path: &Path) -> Result<Self, SalesError> {
        if !path.is_file() {
            return Err(SalesError::Connection(format!(
                "database file not found: {}",
                path.display()
            )));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| {
            SalesError::Connection(format!("cannot open {}: {e}", path.display()))
        })?;

        // SQLite opens lazily; touch the header so a non-database file fails here
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
            .map_err(|e| SalesError::Connection(format!("{} is not readable as SQLite: {e}", path.display())))?;

        log::info!("connected to database: {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            conn: Some(conn),
        })
    }

    /// Wrap an already-open connection (in-memory databases, embedding).
    pub fn from_connection(conn: Connection) -> Self {
        let path = conn
            .path()
            .map(PathBuf::from)
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(":memory:"));
        Self { path, conn: Some(conn) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    pub fn conn(&self) -> Result<&Connection, SalesError> {
        self.conn
            .as_ref()
            .ok_or_else(|| SalesError::Connection("database connection is closed".into()))
    }

    /// Close the connection. Calling it again is a no-op.
    pub fn close(&mut self) -> Result<(), SalesError> {
        if let Some(conn) = self.conn.take() {
            conn.close()
                .map_err(|(_, e)| SalesError::Connection(format!("close failed: {e}")))?;
            log::info!("database connection closed: {}", self.path.display());
        }
        Ok(())
    }
}

/// Classify a rusqlite error from a query against an open connection.
pub(crate) fn map_sql_error(table: &str, e: rusqlite::Error) -> SalesError {
    match e {
        rusqlite::Error::InvalidColumnType(_, column, ty) => {
            SalesError::data_type(table, &column, format!("unexpected {ty} value"))
        }
        rusqlite::Error::IntegralValueOutOfRange(idx, value) => {
            SalesError::data_type(table, &format!("#{idx}"), format!("value {value} out of range"))
        }
        rusqlite::Error::SqliteFailure(_, Some(ref msg)) if msg.contains("integer overflow") => {
            SalesError::data_type(table, "quantity", "integer overflow in sum")
        }
        rusqlite::Error::SqliteFailure(err, msg)
            if matches!(err.code, ErrorCode::NotADatabase | ErrorCode::CannotOpen | ErrorCode::DatabaseCorrupt) =>
        {
            SalesError::Connection(msg.unwrap_or_else(|| err.to_string()))
        }
        other => SalesError::Connection(format!("query on {table} failed: {other}")),
    }
}

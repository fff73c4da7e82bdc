use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SalesError {
    /// Database file missing, unreadable, not a database, or handle closed.
    Connection(String),
    /// Expected table is absent.
    MissingTable { table: String },
    /// Expected column is absent from an existing table.
    MissingColumn { table: String, column: String },
    /// A value has a storage class the pipeline cannot use.
    DataType { table: String, column: String, detail: String },
    /// Output path unwritable, export read failure, etc.
    Io(String),
    /// Config file unreadable or invalid.
    Config(String),
}

impl SalesError {
    pub fn data_type(table: &str, column: &str, detail: impl Into<String>) -> Self {
        Self::DataType {
            table: table.to_string(),
            column: column.to_string(),
            detail: detail.into(),
        }
    }

    /// True for both schema variants.
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::MissingTable { .. } | Self::MissingColumn { .. })
    }
}

impl fmt::Display for SalesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "connection error: {msg}"),
            Self::MissingTable { table } => write!(f, "schema error: missing table '{table}'"),
            Self::MissingColumn { table, column } => {
                write!(f, "schema error: table '{table}' has no column '{column}'")
            }
            Self::DataType { table, column, detail } => {
                write!(f, "data type error: {table}.{column}: {detail}")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for SalesError {}

impl From<std::io::Error> for SalesError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

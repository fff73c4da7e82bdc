//! CLI Exit Code Registry
//!
//! Single source of truth for `salesgrid` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success; both result sets agree                  |
//! | 1    | Result sets differ                               |
//! | 2    | CLI usage error (reported by clap)               |
//! | 3    | Database missing, unreadable or not SQLite       |
//! | 4    | Expected table or column absent                  |
//! | 5    | Column holds a value of the wrong type           |
//! | 6    | Output not writable / input CSV unreadable       |
//! | 7    | Config file unreadable or invalid                |

use salesgrid_engine::SalesError;

/// Success - both paths (or both files) agree.
pub const EXIT_SUCCESS: u8 = 0;

/// Results differ. Like `diff(1)`, exit 1 means "inputs differ."
pub const EXIT_MISMATCH: u8 = 1;

/// Usage error - bad arguments. Emitted by clap itself.
pub const EXIT_USAGE: u8 = 2;

pub const EXIT_CONNECTION: u8 = 3;

pub const EXIT_SCHEMA: u8 = 4;

pub const EXIT_DATA_TYPE: u8 = 5;

pub const EXIT_IO: u8 = 6;

pub const EXIT_CONFIG: u8 = 7;

/// Map an error to its exit code.
pub fn exit_code(err: &SalesError) -> u8 {
    match err {
        SalesError::Connection(_) => EXIT_CONNECTION,
        SalesError::MissingTable { .. } | SalesError::MissingColumn { .. } => EXIT_SCHEMA,
        SalesError::DataType { .. } => EXIT_DATA_TYPE,
        SalesError::Io(_) => EXIT_IO,
        SalesError::Config(_) => EXIT_CONFIG,
    }
}

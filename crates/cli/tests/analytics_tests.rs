// End-to-end tests of the SalesAnalytics session against SQLite files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;

use salesgrid_cli::SalesAnalytics;
use salesgrid_engine::{AgeWindow, SalesError};

const SCHEMA: &str = "
CREATE TABLE Customer (customer_id INTEGER PRIMARY KEY, age INTEGER);
CREATE TABLE Sales (sales_id INTEGER PRIMARY KEY, customer_id INTEGER);
CREATE TABLE Orders (order_id INTEGER PRIMARY KEY, sales_id INTEGER, item_id INTEGER, quantity INTEGER);
CREATE TABLE Items (item_id INTEGER PRIMARY KEY, item_name TEXT);
";

fn create_db(dir: &Path, rows: &str) -> PathBuf {
    let path = dir.join("sales.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    conn.execute_batch(rows).unwrap();
    path
}

fn sample_db(dir: &Path) -> PathBuf {
    create_db(
        dir,
        "INSERT INTO Customer VALUES (1, 21), (2, 23), (3, 35), (4, 17), (5, 36);
         INSERT INTO Items VALUES (100, 'x'), (101, 'y'), (102, 'z');
         INSERT INTO Sales VALUES (1, 1), (2, 1), (3, 2), (4, 3), (5, 4), (6, 5);
         INSERT INTO Orders VALUES
            (1, 1, 100, 3), (2, 2, 100, 7), (3, 1, 101, NULL),
            (4, 3, 100, 1), (5, 3, 101, 1), (6, 3, 102, 1),
            (7, 4, 102, 0), (8, 4, 101, 2),
            (9, 5, 100, 9), (10, 6, 100, 9);",
    )
}

const SAMPLE_CSV: &str = "Customer;Age;Item;Quantity
1;21;x;10
2;23;x;1
2;23;y;1
2;23;z;1
3;35;y;2
";

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[test]
fn analyze_writes_both_files_and_reconciles() {
    let dir = tempfile::tempdir().unwrap();
    let db = sample_db(dir.path());
    let out = dir.path().join("output");

    let mut analytics = SalesAnalytics::new(&db);
    analytics.connect().unwrap();
    let report = analytics.analyze("sales_analysis.csv", &out).unwrap();
    analytics.close().unwrap();

    assert!(report.recon.matched);
    assert_eq!(report.sql.records.len(), 5);
    assert_eq!(report.sql.path, out.join("sql_sales_analysis.csv"));
    assert_eq!(report.frame.path, out.join("frame_sales_analysis.csv"));

    assert_eq!(fs::read_to_string(&report.sql.path).unwrap(), SAMPLE_CSV);
    assert_eq!(fs::read_to_string(&report.frame.path).unwrap(), SAMPLE_CSV);
    assert_eq!(report.sql.sha256, report.frame.sha256);
}

#[test]
fn single_order_example() {
    let dir = tempfile::tempdir().unwrap();
    let db = create_db(
        dir.path(),
        "INSERT INTO Customer VALUES (1, 21);
         INSERT INTO Sales VALUES (1, 1);
         INSERT INTO Orders VALUES (1, 1, 101, 10);
         INSERT INTO Items VALUES (101, 'x');",
    );

    let mut analytics = SalesAnalytics::new(&db);
    analytics.connect().unwrap();
    let report = analytics.analyze("out.csv", dir.path()).unwrap();

    let text = fs::read_to_string(&report.sql.path).unwrap();
    assert_eq!(text.lines().nth(1), Some("1;21;x;10"));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let db = sample_db(dir.path());

    let mut analytics = SalesAnalytics::new(&db);
    analytics.connect().unwrap();
    let first = analytics.analyze("a.csv", dir.path()).unwrap();
    let first_bytes = fs::read(&first.sql.path).unwrap();
    let second = analytics.analyze("a.csv", dir.path()).unwrap();

    assert_eq!(first_bytes, fs::read(&second.sql.path).unwrap());
    assert_eq!(first.sql.sha256, second.sql.sha256);
    assert_eq!(first.frame.sha256, second.frame.sha256);
}

#[test]
fn custom_age_window() {
    let dir = tempfile::tempdir().unwrap();
    let db = sample_db(dir.path());

    let mut analytics = SalesAnalytics::new(&db).with_age_window(AgeWindow::new(30, 40));
    analytics.connect().unwrap();
    let report = analytics.analyze("a.csv", dir.path()).unwrap();

    let ids: Vec<i64> = report.frame.records.iter().map(|r| r.customer_id).collect();
    assert_eq!(ids, vec![3, 5]);
    assert!(report.recon.matched);
}

#[test]
fn empty_result_still_writes_headers() {
    let dir = tempfile::tempdir().unwrap();
    let db = create_db(dir.path(), "INSERT INTO Customer VALUES (1, 50);");

    let mut analytics = SalesAnalytics::new(&db);
    analytics.connect().unwrap();
    let report = analytics.analyze("a.csv", dir.path()).unwrap();

    assert!(report.recon.matched);
    assert_eq!(fs::read_to_string(&report.sql.path).unwrap(), "Customer;Age;Item;Quantity\n");
}

// ---------------------------------------------------------------------------
// Connection lifecycle
// ---------------------------------------------------------------------------

#[test]
fn analyze_before_connect_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db = sample_db(dir.path());
    let analytics = SalesAnalytics::new(&db);
    let err = analytics.analyze("a.csv", dir.path()).unwrap_err();
    assert!(matches!(err, SalesError::Connection(_)));
}

#[test]
fn connect_to_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut analytics = SalesAnalytics::new(dir.path().join("missing.db"));
    assert!(matches!(analytics.connect(), Err(SalesError::Connection(_))));
    assert!(!analytics.is_connected());
}

#[test]
fn close_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let db = sample_db(dir.path());
    let mut analytics = SalesAnalytics::new(&db);
    analytics.connect().unwrap();
    assert!(analytics.is_connected());
    analytics.close().unwrap();
    analytics.close().unwrap();
    assert!(!analytics.is_connected());
}

// ---------------------------------------------------------------------------
// Failures leave no output behind
// ---------------------------------------------------------------------------

#[test]
fn schema_error_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let db = create_db(dir.path(), "DROP TABLE Items;");
    let out = dir.path().join("output");

    let mut analytics = SalesAnalytics::new(&db);
    analytics.connect().unwrap();
    let err = analytics.analyze("a.csv", &out).unwrap_err();

    assert!(err.is_schema(), "{err:?}");
    assert!(!out.exists());
}

#[test]
fn data_type_error_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let db = create_db(dir.path(), "INSERT INTO Customer VALUES (1, 'twenty');");
    let out = dir.path().join("output");

    let mut analytics = SalesAnalytics::new(&db);
    analytics.connect().unwrap();
    let err = analytics.analyze("a.csv", &out).unwrap_err();

    assert!(matches!(err, SalesError::DataType { .. }), "{err:?}");
    assert!(!out.exists());
}

#[test]
fn failed_second_export_leaves_no_first_file() {
    let dir = tempfile::tempdir().unwrap();
    let db = sample_db(dir.path());
    let out = dir.path().join("output");
    fs::create_dir_all(out.join("frame_a.csv")).unwrap();

    let mut analytics = SalesAnalytics::new(&db);
    analytics.connect().unwrap();
    let err = analytics.analyze("a.csv", &out).unwrap_err();

    assert!(matches!(err, SalesError::Io(_)), "{err:?}");
    assert!(!out.join("sql_a.csv").exists());
    assert!(!out.join(".sql_a.csv.tmp").exists());
    assert!(!out.join(".frame_a.csv.tmp").exists());
}

//! Analysis session: one connection, both computation paths, export, reconcile.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use salesgrid_config::Settings;
use salesgrid_engine::{transform_purchases, AgeWindow, PurchaseRecord, SalesError};
use salesgrid_io::csv::{fingerprint, write_purchase_files};
use salesgrid_io::{load_tables, query_purchases, SalesDb};
use salesgrid_recon::{reconcile, ReconReport};

/// File name prefix and reconciliation label of the SQL path.
pub const SQL_TAG: &str = "sql";
/// File name prefix and reconciliation label of the in-memory path.
pub const FRAME_TAG: &str = "frame";

/// Purchase-pattern analysis over one SQLite database.
///
/// ```no_run
/// use std::path::Path;
/// use salesgrid_cli::SalesAnalytics;
///
/// let mut analytics = SalesAnalytics::new("data/sales.db");
/// analytics.connect()?;
/// let report = analytics.analyze("sales_analysis.csv", Path::new("output"))?;
/// analytics.close()?;
/// assert!(report.recon.matched);
/// # Ok::<(), salesgrid_engine::SalesError>(())
/// ```
///
/// The connection is released when the session is dropped, even if
/// `close` is never called.
pub struct SalesAnalytics {
    db_path: PathBuf,
    window: AgeWindow,
    db: Option<SalesDb>,
}

/// What one computation path produced.
#[derive(Debug, Clone, Serialize)]
pub struct PathOutput {
    pub path: PathBuf,
    pub sha256: String,
    pub records: Vec<PurchaseRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub database: PathBuf,
    pub age_window: AgeWindow,
    pub run_at: String,
    pub sql: PathOutput,
    pub frame: PathOutput,
    pub recon: ReconReport,
}

impl SalesAnalytics {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            window: AgeWindow::default(),
            db: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.database.path.clone()).with_age_window(settings.filter)
    }

    pub fn with_age_window(mut self, window: AgeWindow) -> Self {
        self.window = window;
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn is_connected(&self) -> bool {
        self.db.as_ref().is_some_and(SalesDb::is_open)
    }

    /// Open the database. A second call while connected is a no-op.
    pub fn connect(&mut self) -> Result<(), SalesError> {
        if !self.is_connected() {
            self.db = Some(SalesDb::open(&self.db_path)?);
        }
        Ok(())
    }

    /// Close the database. Safe to call when not connected.
    pub fn close(&mut self) -> Result<(), SalesError> {
        match self.db.take() {
            Some(mut db) => db.close(),
            None => Ok(()),
        }
    }

    fn db(&self) -> Result<&SalesDb, SalesError> {
        self.db
            .as_ref()
            .ok_or_else(|| SalesError::Connection("not connected: call connect() first".into()))
    }

    /// Query path: the aggregate SQL statement.
    pub fn query_path(&self) -> Result<Vec<PurchaseRecord>, SalesError> {
        let records = query_purchases(self.db()?, self.window)?;
        log::info!("sql path: retrieved {} records", records.len());
        Ok(records)
    }

    /// Transform path: load every table, join and aggregate in memory.
    pub fn transform_path(&self) -> Result<Vec<PurchaseRecord>, SalesError> {
        let tables = load_tables(self.db()?)?;
        let records = transform_purchases(&tables, self.window)?;
        log::info!("frame path: retrieved {} records", records.len());
        Ok(records)
    }

    /// Run both paths, write `<dir>/sql_<name>` and `<dir>/frame_<name>`,
    /// then reconcile. Nothing is written unless both paths succeed.
    pub fn analyze(&self, output_filename: &str, output_dir: &Path) -> Result<AnalysisReport, SalesError> {
        let sql_records = self.query_path()?;
        let frame_records = self.transform_path()?;

        fs::create_dir_all(output_dir).map_err(|e| {
            SalesError::Io(format!("cannot create output directory {}: {e}", output_dir.display()))
        })?;

        let sql_path = output_dir.join(format!("{SQL_TAG}_{output_filename}"));
        let frame_path = output_dir.join(format!("{FRAME_TAG}_{output_filename}"));
        write_purchase_files(&[
            (sql_path.as_path(), sql_records.as_slice()),
            (frame_path.as_path(), frame_records.as_slice()),
        ])?;

        let sql = path_output(sql_path, sql_records)?;
        let frame = path_output(frame_path, frame_records)?;

        let recon = reconcile(SQL_TAG, &sql.records, FRAME_TAG, &frame.records);
        if recon.matched {
            log::info!("both paths produced identical results");
        } else {
            log::warn!("paths disagree on {} keys", recon.differences.len());
        }

        Ok(AnalysisReport {
            database: self.db_path.clone(),
            age_window: self.window,
            run_at: chrono::Utc::now().to_rfc3339(),
            sql,
            frame,
            recon,
        })
    }
}

fn path_output(path: PathBuf, records: Vec<PurchaseRecord>) -> Result<PathOutput, SalesError> {
    Ok(PathOutput {
        sha256: fingerprint(&path)?,
        path,
        records,
    })
}

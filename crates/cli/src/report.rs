// Human-readable rendering of analysis and reconciliation results

use std::fmt::Write;

use salesgrid_engine::PurchaseRecord;
use salesgrid_io::csv::HEADER;
use salesgrid_recon::{ReconReport, RowDiff};

use crate::analytics::{AnalysisReport, PathOutput};

const RULE_WIDTH: usize = 60;
const MAX_LISTED_DIFFS: usize = 20;

/// Right-aligned text table with the export header.
pub fn render_table(records: &[PurchaseRecord]) -> String {
    let rows: Vec<[String; 4]> = records
        .iter()
        .map(|r| {
            [
                r.customer_id.to_string(),
                r.age.to_string(),
                r.item_name.clone(),
                r.total_quantity.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADER.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut line = |cells: [&str; 4]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:>w$}"))
            .collect();
        let _ = writeln!(out, "{}", padded.join(" ").trim_end());
    };
    line(HEADER);
    for row in &rows {
        line([&row[0], &row[1], &row[2], &row[3]]);
    }
    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{title}");
    let _ = writeln!(out, "{}", "-".repeat(40));
}

fn path_block(out: &mut String, label: &str, output: &PathOutput, preview: bool) {
    section(out, label);
    let _ = writeln!(out, "Retrieved {} records", output.records.len());
    let _ = writeln!(out, "Saved to {} (sha256 {})", output.path.display(), &output.sha256[..12.min(output.sha256.len())]);
    if preview {
        let _ = writeln!(out, "\nPreview of saved data:");
        out.push_str(&render_table(&output.records));
    }
}

/// Full run summary, as printed by `salesgrid run`.
pub fn render_analysis(report: &AnalysisReport, preview: bool) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}\nSALES DATA ANALYSIS\n{rule}");
    let _ = writeln!(
        out,
        "Database: {}\nAge window: {}-{}",
        report.database.display(),
        report.age_window.min_age,
        report.age_window.max_age
    );

    path_block(&mut out, "PATH 1: SQL aggregate query", &report.sql, preview);
    path_block(&mut out, "PATH 2: In-memory joins", &report.frame, preview);

    out.push_str(&render_recon(&report.recon));

    let _ = writeln!(out, "\n{rule}\nANALYSIS COMPLETE\n{rule}");
    let _ = writeln!(out, "Generated files:");
    let _ = writeln!(out, "  {}", report.sql.path.display());
    let _ = writeln!(out, "  {}", report.frame.path.display());
    out
}

/// Verification section: verdict plus up to twenty differing keys.
pub fn render_recon(report: &ReconReport) -> String {
    let mut out = String::new();
    section(&mut out, "VERIFICATION: Comparing Results");
    let _ = writeln!(
        out,
        "{}: {} rows, {}: {} rows",
        report.left_label, report.summary.left_rows, report.right_label, report.summary.right_rows
    );
    if !report.same_order {
        let _ = writeln!(out, "Input order differed; compared after sorting.");
    }

    if report.matched {
        let _ = writeln!(out, "Both approaches produce identical results.");
        return out;
    }

    let s = &report.summary;
    let _ = writeln!(
        out,
        "Results differ: {} value mismatches, {} only in {}, {} only in {}, {} duplicate keys",
        s.value_mismatches, s.only_left, report.left_label, s.only_right, report.right_label, s.duplicate_keys
    );
    for diff in report.differences.iter().take(MAX_LISTED_DIFFS) {
        let _ = writeln!(out, "  {}", describe_diff(report, diff));
    }
    if report.differences.len() > MAX_LISTED_DIFFS {
        let _ = writeln!(out, "  ... and {} more", report.differences.len() - MAX_LISTED_DIFFS);
    }
    out
}

fn describe_diff(report: &ReconReport, diff: &RowDiff) -> String {
    let side = |records: &[PurchaseRecord]| -> String {
        if records.is_empty() {
            return "-".to_string();
        }
        records
            .iter()
            .map(|r| format!("age {} qty {}", r.age, r.total_quantity))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "{:<14} customer {} item {:?}: {} [{}] vs {} [{}]",
        diff.kind.to_string(),
        diff.customer_id,
        diff.item_name,
        report.left_label,
        side(&diff.left),
        report.right_label,
        side(&diff.right)
    )
}

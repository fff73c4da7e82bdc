use serde::Serialize;

use salesgrid_engine::PurchaseRecord;

// ---------------------------------------------------------------------------
// Differences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    /// Key present on the left only.
    OnlyLeft,
    /// Key present on the right only.
    OnlyRight,
    /// Same key, different age or quantity.
    ValueMismatch,
    /// Key occurs more than once on at least one side and the occurrences differ.
    DuplicateKey,
}

impl std::fmt::Display for DiffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OnlyLeft => write!(f, "only_left"),
            Self::OnlyRight => write!(f, "only_right"),
            Self::ValueMismatch => write!(f, "value_mismatch"),
            Self::DuplicateKey => write!(f, "duplicate_key"),
        }
    }
}

/// One differing key, with every record each side holds for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDiff {
    pub kind: DiffKind,
    pub customer_id: i64,
    pub item_name: String,
    pub left: Vec<PurchaseRecord>,
    pub right: Vec<PurchaseRecord>,
}

// ---------------------------------------------------------------------------
// Summary + report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub left_rows: usize,
    pub right_rows: usize,
    pub matched_keys: usize,
    pub only_left: usize,
    pub only_right: usize,
    pub value_mismatches: usize,
    pub duplicate_keys: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub left_label: String,
    pub right_label: String,
    /// Both sides hold the same rows with the same values, compared in
    /// canonical order.
    pub matched: bool,
    /// Both inputs were already in canonical order before comparison.
    pub same_order: bool,
    pub summary: ReconSummary,
    pub differences: Vec<RowDiff>,
}

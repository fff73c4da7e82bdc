use std::collections::BTreeMap;

use salesgrid_engine::model::sort_canonical;
use salesgrid_engine::PurchaseRecord;

use crate::model::{DiffKind, ReconReport, ReconSummary, RowDiff};

type Key<'a> = (i64, &'a str);

/// Compare two result sets.
///
/// Both sides are sorted canonically first, so input order does not affect
/// the verdict; `same_order` records whether it already agreed. Rows are
/// keyed by (customer, item). Keys are visited in canonical order, so the
/// difference list is deterministic.
pub fn reconcile(
    left_label: &str,
    left: &[PurchaseRecord],
    right_label: &str,
    right: &[PurchaseRecord],
) -> ReconReport {
    let mut left_sorted = left.to_vec();
    let mut right_sorted = right.to_vec();
    sort_canonical(&mut left_sorted);
    sort_canonical(&mut right_sorted);
    let same_order = left_sorted.as_slice() == left && right_sorted.as_slice() == right;

    let left_groups = group(&left_sorted);
    let right_groups = group(&right_sorted);

    let mut keys: Vec<Key<'_>> = left_groups.keys().chain(right_groups.keys()).copied().collect();
    keys.sort_unstable();
    keys.dedup();

    let mut summary = ReconSummary {
        left_rows: left.len(),
        right_rows: right.len(),
        ..ReconSummary::default()
    };
    let mut differences = Vec::new();

    for key in keys {
        let l = left_groups.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        let r = right_groups.get(&key).map(Vec::as_slice).unwrap_or(&[]);

        let kind = match (l.len(), r.len()) {
            (_, 0) => Some(DiffKind::OnlyLeft),
            (0, _) => Some(DiffKind::OnlyRight),
            _ if l == r => None,
            (1, 1) => Some(DiffKind::ValueMismatch),
            _ => Some(DiffKind::DuplicateKey),
        };

        match kind {
            None => summary.matched_keys += 1,
            Some(kind) => {
                match kind {
                    DiffKind::OnlyLeft => summary.only_left += 1,
                    DiffKind::OnlyRight => summary.only_right += 1,
                    DiffKind::ValueMismatch => summary.value_mismatches += 1,
                    DiffKind::DuplicateKey => summary.duplicate_keys += 1,
                }
                differences.push(RowDiff {
                    kind,
                    customer_id: key.0,
                    item_name: key.1.to_string(),
                    left: l.iter().copied().cloned().collect(),
                    right: r.iter().copied().cloned().collect(),
                });
            }
        }
    }

    ReconReport {
        left_label: left_label.to_string(),
        right_label: right_label.to_string(),
        matched: differences.is_empty(),
        same_order,
        summary,
        differences,
    }
}

fn group(records: &[PurchaseRecord]) -> BTreeMap<Key<'_>, Vec<&PurchaseRecord>> {
    let mut groups: BTreeMap<Key<'_>, Vec<&PurchaseRecord>> = BTreeMap::new();
    for r in records {
        groups.entry((r.customer_id, r.item_name.as_str())).or_default().push(r);
    }
    groups
}

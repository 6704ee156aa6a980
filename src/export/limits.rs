// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Row and column caps.
//!
//! Caps never sample: they keep the first N rows and the first N native
//! columns. A cap of zero or less disables it.

use tracing::info;

/// Effective export extent after caps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLimits {
    /// Rows to export, from row 0
    pub effective_rows: u64,
    /// Native column names to export, in native order
    pub columns: Vec<String>,
    /// Human-readable notice, present only when a cap reduced a count
    pub warning: Option<String>,
}

/// Apply the row and column caps to a unit's extent.
///
/// `columns` is the native (pre-flattening) column list, already narrowed
/// by any allow-list.
///
/// # Example
///
/// ```
/// use fitstream::export::limits::compute_limits;
///
/// let cols = vec!["A".to_string(), "B".to_string()];
/// let limits = compute_limits(1000, &cols, 100, 0);
/// assert_eq!(limits.effective_rows, 100);
/// assert_eq!(limits.columns, cols);
/// assert_eq!(
///     limits.warning.as_deref(),
///     Some("Showing the first 100 of 1000 rows.")
/// );
/// ```
pub fn compute_limits(
    total_rows: u64,
    columns: &[String],
    max_rows: i64,
    max_cols: i64,
) -> RowLimits {
    let mut notices = Vec::new();

    let effective_rows = match cap(max_rows) {
        Some(limit) if limit < total_rows => {
            notices.push(format!("Showing the first {limit} of {total_rows} rows."));
            limit
        }
        _ => total_rows,
    };

    let total_cols = columns.len() as u64;
    let kept_cols = match cap(max_cols) {
        Some(limit) if limit < total_cols => {
            notices.push(format!(
                "Showing the first {limit} of {total_cols} columns."
            ));
            limit as usize
        }
        _ => columns.len(),
    };

    let warning = (!notices.is_empty()).then(|| notices.join(" "));
    if let Some(warning) = &warning {
        info!(context = "row_limits", warning = %warning, "Export truncated");
    }

    RowLimits {
        effective_rows,
        columns: columns[..kept_cols].to_vec(),
        warning,
    }
}

fn cap(limit: i64) -> Option<u64> {
    (limit > 0).then_some(limit as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("C{i}")).collect()
    }

    #[test]
    fn test_unlimited() {
        for max in [0, -1, i64::MIN] {
            let limits = compute_limits(1200, &names(3), max, max);
            assert_eq!(limits.effective_rows, 1200);
            assert_eq!(limits.columns, names(3));
            assert_eq!(limits.warning, None);
        }
    }

    #[test]
    fn test_cap_larger_than_total_has_no_warning() {
        let limits = compute_limits(10, &names(2), 50, 5);
        assert_eq!(limits.effective_rows, 10);
        assert_eq!(limits.columns.len(), 2);
        assert_eq!(limits.warning, None);

        let exact = compute_limits(10, &names(2), 10, 2);
        assert_eq!(exact.warning, None);
    }

    #[test]
    fn test_row_cap_mentions_total() {
        let limits = compute_limits(5000, &names(2), 100, 0);
        assert_eq!(limits.effective_rows, 100);
        let warning = limits.warning.unwrap();
        assert!(warning.contains("5000"));
        assert!(!warning.contains("columns"));
    }

    #[test]
    fn test_column_cap_keeps_first_columns() {
        let limits = compute_limits(10, &names(5), 0, 2);
        assert_eq!(limits.columns, vec!["C1".to_string(), "C2".to_string()]);
        assert_eq!(
            limits.warning.as_deref(),
            Some("Showing the first 2 of 5 columns.")
        );
    }

    #[test]
    fn test_both_caps_combine() {
        let limits = compute_limits(300, &names(4), 20, 1);
        assert_eq!(
            limits.warning.as_deref(),
            Some("Showing the first 20 of 300 rows. Showing the first 1 of 4 columns.")
        );
    }

    #[test]
    fn test_zero_rows() {
        let limits = compute_limits(0, &names(1), 10, 0);
        assert_eq!(limits.effective_rows, 0);
        assert_eq!(limits.warning, None);
    }
}

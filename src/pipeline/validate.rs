use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::Result;
use crate::table::{RecordTable, Value};

/// Reserved answer code meaning "not applicable".
pub const NOT_APPLICABLE: i64 = -1;

/// Permitted integer codes for a validated column: a contiguous answer
/// range, optionally extended with the "not applicable" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    min: i64,
    max: i64,
    not_applicable: bool,
}

impl Domain {
    pub const fn range(min: i64, max: i64) -> Self {
        Self {
            min,
            max,
            not_applicable: false,
        }
    }

    pub const fn with_not_applicable(min: i64, max: i64) -> Self {
        Self {
            min,
            max,
            not_applicable: true,
        }
    }

    /// Full-domain membership. Non-integer cells (text, floats, missing)
    /// are never members.
    pub fn contains(&self, value: &Value) -> bool {
        match value.as_int() {
            Some(n) => {
                (self.min <= n && n <= self.max) || (self.not_applicable && n == NOT_APPLICABLE)
            }
            None => false,
        }
    }

    /// Membership in the substantive answer range, with the
    /// "not applicable" sentinel excluded.
    pub fn contains_applicable(&self, value: &Value) -> bool {
        matches!(value.as_int(), Some(n) if self.min <= n && n <= self.max && n != NOT_APPLICABLE)
    }
}

/// Repair out-of-domain codes in the given columns, independently per
/// column.
///
/// If a column has at least one invalid cell, every invalid cell in it is
/// overwritten with the column's mode. The mode is taken over the raw
/// column including the invalid entries, so an invalid plurality can
/// itself become the repair value; that matches the source dataset's
/// established repair policy. Columns with no invalid cells are left
/// untouched. Returns the number of cells rewritten.
pub fn repair_columns(table: &mut RecordTable, columns: &[&str], domain: Domain) -> Result<usize> {
    let mut repaired = 0;

    for &column in columns {
        let col = table.column_index(column)?;

        let invalid: Vec<usize> = (0..table.row_count())
            .filter(|&row| !domain.contains(table.value(row, col)))
            .collect();

        if invalid.is_empty() {
            debug!("Column {} has no out-of-domain values", column);
            continue;
        }

        let Some(mode) = column_mode(table, col) else {
            warn!(
                "Column {} has no integer values to take a mode from; leaving {} invalid cells unrepaired",
                column,
                invalid.len()
            );
            continue;
        };

        warn!(
            "Repairing {} out-of-domain values in column {} with mode {}",
            invalid.len(),
            column,
            mode
        );
        for row in invalid {
            table.set(row, col, Value::Int(mode));
            repaired += 1;
        }
    }

    Ok(repaired)
}

/// Most frequent integer code in a column; ties break toward the smallest
/// code.
fn column_mode(table: &RecordTable, col: usize) -> Option<i64> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for row in 0..table.row_count() {
        if let Some(n) = table.value(row, col).as_int() {
            *counts.entry(n).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(value, _)| value)
}

/// Outcome of validating a column whose answers are gated by a yes/no
/// companion column.
#[derive(Debug)]
pub enum GateOutcome {
    /// Gate and target were consistent on every row; ordinary domain
    /// repair ran on the target column.
    Repaired { cells: usize },
    /// At least one row had an inconsistent gate/target pair. Nothing was
    /// repaired; the flagged rows are surfaced for manual review and the
    /// run continues with the target column unvalidated.
    Flagged(GateReport),
}

/// Diagnostic report for gate/target inconsistencies.
#[derive(Debug)]
pub struct GateReport {
    pub target_column: String,
    pub gate_column: String,
    pub rows: Vec<FlaggedRow>,
}

/// One inconsistent response, keyed by the respondent identifier.
#[derive(Debug)]
pub struct FlaggedRow {
    pub respondent_id: String,
    pub cells: Vec<(String, String)>,
}

/// Validate a column that is only meaningful when its gate column says
/// "yes" (coded 1).
///
/// A row is inconsistent when the gate is 1 but the target is not a real,
/// applicable answer, or the gate is 0 but the target is not exactly the
/// "not applicable" sentinel. Mode repair must not run across such rows:
/// it could inject a substantive answer into a not-applicable row or vice
/// versa. Repair is therefore delegated to [`repair_columns`] only when
/// zero rows are flagged.
pub fn repair_gated_column(
    table: &mut RecordTable,
    target: &str,
    gate: &str,
    domain: Domain,
    id_column: &str,
) -> Result<GateOutcome> {
    let target_col = table.column_index(target)?;
    let gate_col = table.column_index(gate)?;
    let id_col = table.column_index(id_column)?;

    let mut flagged = Vec::new();
    for row in 0..table.row_count() {
        let dependent = table.value(row, target_col);
        let inconsistent = match table.value(row, gate_col).as_int() {
            Some(1) => !domain.contains_applicable(dependent),
            Some(0) => dependent.as_int() != Some(NOT_APPLICABLE),
            _ => false,
        };

        if inconsistent {
            flagged.push(FlaggedRow {
                respondent_id: table.value(row, id_col).to_string(),
                cells: table.row_snapshot(row),
            });
        }
    }

    if flagged.is_empty() {
        let cells = repair_columns(table, &[target], domain)?;
        return Ok(GateOutcome::Repaired { cells });
    }

    warn!(
        "{} rows have {} answers inconsistent with their {} gate; skipping repair",
        flagged.len(),
        target,
        gate
    );
    Ok(GateOutcome::Flagged(GateReport {
        target_column: target.to_string(),
        gate_column: gate.to_string(),
        rows: flagged,
    }))
}

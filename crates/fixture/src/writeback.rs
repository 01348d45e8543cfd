//! Writeback synchronization
//!
//! After the suite finishes, the fixture is reopened and each data row whose
//! identifier appears in the frozen ledger gets its actual-output and status
//! cells overwritten, with bold colored status text. Every other cell is
//! left untouched, which is why this is an in-place read-modify-write of the
//! original workbook rather than a regeneration.
//!
//! The header row and column indices are re-derived here instead of reusing
//! loader state: this pass operates on a freshly opened workbook handle that
//! may reflect edits made while the suite was running.

use std::path::Path;

use tracing::{info, warn};

use crate::error::{FixtureError, FixtureResult};
use crate::ledger::{CaseStatus, FrozenLedger};
use crate::loader::{locate_header, ACTUAL_COLUMN_HINT, ID_COLUMN, STATUS_COLUMN};

/// ARGB tone applied to a `Pass` status cell.
pub const PASS_COLOR_ARGB: &str = "FF008000";

/// ARGB tone applied to a `Fail` status cell.
pub const FAIL_COLOR_ARGB: &str = "FFFF0000";

/// Counts reported after a writeback pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritebackSummary {
    /// Data rows whose identifier matched a ledger entry and were updated.
    pub rows_updated: usize,
    /// Ledger entries available for matching.
    pub ledger_entries: usize,
}

/// Update the fixture in place from the frozen ledger and persist it.
///
/// Only rows matched by identifier are touched; rows with no ledger entry
/// are left byte-for-byte unchanged. Re-running with the same ledger against
/// an already-updated file rewrites the same values and colors, so the pass
/// is idempotent.
pub fn write_results(path: &Path, ledger: &FrozenLedger) -> FixtureResult<WritebackSummary> {
    if !path.is_file() {
        return Err(FixtureError::FileNotFound(path.to_path_buf()));
    }

    let mut book = umya_spreadsheet::reader::xlsx::read(path)
        .map_err(|e| FixtureError::Locked(e.to_string()))?;
    let sheet = book
        .get_sheet_mut(&0)
        .ok_or_else(|| FixtureError::Schema("workbook has no worksheets".to_string()))?;

    let header = locate_header(sheet).ok_or_else(|| {
        FixtureError::Schema(format!(
            "no header row containing '{ID_COLUMN}' found during writeback"
        ))
    })?;

    let id_col = *header.columns.get(ID_COLUMN).ok_or_else(|| {
        FixtureError::Schema(format!("'{ID_COLUMN}' column missing from header row"))
    })?;
    let status_col = header.columns.get(STATUS_COLUMN).copied();
    let actual_col = resolve_actual_column(&header.columns)?;

    if status_col.is_none() {
        warn!("no '{STATUS_COLUMN}' column; status cells will not be updated");
    }
    if actual_col.is_none() {
        warn!("no column containing '{ACTUAL_COLUMN_HINT}'; output cells will not be updated");
    }

    let highest_row = sheet.get_highest_row();
    let mut rows_updated = 0;

    for row in header.row + 1..=highest_row {
        let id = crate::cell::normalized(sheet, id_col, row);
        if id.is_empty() {
            continue;
        }
        let Some(entry) = ledger.get(&id) else {
            continue;
        };

        if let Some(col) = actual_col {
            sheet.get_cell_mut((col, row)).set_value(&entry.actual);
        }
        if let Some(col) = status_col {
            sheet.get_cell_mut((col, row)).set_value(entry.status.as_str());

            let argb = match entry.status {
                CaseStatus::Pass => PASS_COLOR_ARGB,
                CaseStatus::Fail => FAIL_COLOR_ARGB,
            };
            let font = sheet.get_style_mut((col, row)).get_font_mut();
            font.set_bold(true);
            font.get_color_mut().set_argb(argb);
        }

        rows_updated += 1;
    }

    umya_spreadsheet::writer::xlsx::write(&book, path)
        .map_err(|e| FixtureError::Locked(e.to_string()))?;

    let summary = WritebackSummary {
        rows_updated,
        ledger_entries: ledger.len(),
    };
    info!(
        path = %path.display(),
        rows_updated = summary.rows_updated,
        ledger_entries = summary.ledger_entries,
        "fixture writeback complete"
    );
    Ok(summary)
}

/// Resolve the actual-output column by case-insensitive substring match.
///
/// Header variants like "Actual Output" and "actual output (observed)" all
/// resolve; two headers both containing the substring would make the
/// resolution ambiguous and are rejected outright.
fn resolve_actual_column(
    columns: &std::collections::BTreeMap<String, u32>,
) -> FixtureResult<Option<u32>> {
    let matches: Vec<(&String, u32)> = columns
        .iter()
        .filter(|(label, _)| label.to_lowercase().contains(ACTUAL_COLUMN_HINT))
        .map(|(label, &col)| (label, col))
        .collect();

    match matches.as_slice() {
        [] => Ok(None),
        [(_, col)] => Ok(Some(*col)),
        many => Err(FixtureError::Schema(format!(
            "ambiguous actual-output columns: {}",
            many.iter()
                .map(|(label, _)| label.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

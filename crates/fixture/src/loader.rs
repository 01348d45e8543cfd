//! Fixture loading
//!
//! The fixture is the first worksheet of an `.xlsx` document. Its header row
//! is not at a fixed position: authors keep notes, legends, or blank spacer
//! rows above and between the data, so the loader scans for the first row
//! containing the literal identifier label and treats everything below it as
//! candidate data. Rows whose identifier cell normalizes to empty are
//! silently skipped.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};
use umya_spreadsheet::Worksheet;

use crate::cell::normalized;
use crate::error::{FixtureError, FixtureResult};

/// Required identifier column label. A fixture without it cannot correlate
/// results back to rows and is rejected outright.
pub const ID_COLUMN: &str = "TC ID";

/// Recommended companion column labels.
pub const NAME_COLUMN: &str = "Test case name";
pub const INPUT_COLUMN: &str = "Input";
pub const EXPECTED_COLUMN: &str = "Expected output";
pub const STATUS_COLUMN: &str = "Status";

/// Case-insensitive substring that identifies the actual-output column,
/// tolerating header variants like "Actual Output" or
/// "actual output (observed)".
pub const ACTUAL_COLUMN_HINT: &str = "actual output";

/// Name substituted for rows that carry an identifier but no name.
pub const UNNAMED_CASE: &str = "Unnamed test case";

/// One loaded fixture row, immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Non-empty correlation key, unique within the loaded set.
    pub id: String,
    /// Human label; placeholder when the fixture left it blank.
    pub name: String,
    /// Normalized text fed to the target's input surface.
    pub input: String,
    /// Normalized expected text; may carry a `display:` prefix that the
    /// runner strips before comparison.
    pub expected_output: String,
    /// Every other discovered column, keyed by its header text, kept for
    /// forward compatibility with columns this core does not interpret.
    pub extra: BTreeMap<String, String>,
}

/// Header row position and the column-name → column-index map derived from it.
#[derive(Debug, Clone)]
pub(crate) struct HeaderMap {
    pub row: u32,
    pub columns: BTreeMap<String, u32>,
}

/// Scan top-to-bottom for the first row containing a cell whose normalized
/// text equals [`ID_COLUMN`]. Empty header cells are skipped in the map.
pub(crate) fn locate_header(sheet: &Worksheet) -> Option<HeaderMap> {
    let highest_row = sheet.get_highest_row();
    let highest_col = sheet.get_highest_column();

    for row in 1..=highest_row {
        let is_header = (1..=highest_col).any(|col| normalized(sheet, col, row) == ID_COLUMN);
        if !is_header {
            continue;
        }

        let mut columns = BTreeMap::new();
        for col in 1..=highest_col {
            let label = normalized(sheet, col, row);
            if !label.is_empty() {
                columns.insert(label, col);
            }
        }
        return Some(HeaderMap { row, columns });
    }

    None
}

/// Load the fixture into a deterministically ordered case list.
///
/// Cases are sorted by identifier using plain byte-wise `str` ordering so
/// that independent worker processes reloading the same fixture always agree
/// on the same set and order, regardless of platform locale.
pub fn load(path: &Path) -> FixtureResult<Vec<TestCase>> {
    if !path.is_file() {
        return Err(FixtureError::FileNotFound(path.to_path_buf()));
    }

    let book = umya_spreadsheet::reader::xlsx::read(path)
        .map_err(|e| FixtureError::Workbook(e.to_string()))?;
    let sheet = book
        .get_sheet(&0)
        .ok_or_else(|| FixtureError::Schema("workbook has no worksheets".to_string()))?;

    let header = locate_header(sheet).ok_or_else(|| {
        FixtureError::Schema(format!("no header row containing '{ID_COLUMN}' found"))
    })?;
    debug!(
        row = header.row,
        columns = header.columns.len(),
        "located fixture header"
    );

    let highest_row = sheet.get_highest_row();
    let mut cases = Vec::new();

    for row in header.row + 1..=highest_row {
        let mut record: BTreeMap<String, String> = header
            .columns
            .iter()
            .map(|(label, &col)| (label.clone(), normalized(sheet, col, row)))
            .collect();

        // Rows without an identifier are spacer rows or notes, not cases.
        let id = record.remove(ID_COLUMN).unwrap_or_default();
        if id.is_empty() {
            continue;
        }

        let mut name = record.remove(NAME_COLUMN).unwrap_or_default();
        if name.is_empty() {
            name = UNNAMED_CASE.to_string();
        }
        let input = record.remove(INPUT_COLUMN).unwrap_or_default();
        let expected_output = record.remove(EXPECTED_COLUMN).unwrap_or_default();

        cases.push(TestCase {
            id,
            name,
            input,
            expected_output,
            extra: record,
        });
    }

    cases.sort_by(|a, b| a.id.cmp(&b.id));

    info!(
        path = %path.display(),
        cases = cases.len(),
        "loaded fixture"
    );
    Ok(cases)
}

//! Cell value normalization
//!
//! Fixture cells arrive in mixed shapes: plain shared strings, rich-text
//! runs, numbers, booleans, or nothing at all. Everything downstream
//! (header discovery, row extraction, writeback row matching) works on one
//! trimmed plain-string form produced here.

use umya_spreadsheet::{Cell, CellRawValue};

/// One run of a rich-text cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
}

/// Closed variant model of a raw fixture cell.
///
/// Normalization is total: every variant maps to a trimmed string without
/// error conditions or side effects.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Rich(Vec<TextRun>),
}

impl CellValue {
    /// Normalize any cell shape to a trimmed plain string.
    ///
    /// Rich-text cells concatenate all run texts before trimming, so two
    /// different structured representations of the same visible text
    /// normalize identically.
    pub fn normalize(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.trim().to_string(),
            CellValue::Number(n) => n.to_string().trim().to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Rich(runs) => {
                let joined: String = runs.iter().map(|run| run.text.as_str()).collect();
                joined.trim().to_string()
            }
        }
    }

    /// Read a cell from a worksheet position, treating absent cells as empty.
    pub fn from_sheet(sheet: &umya_spreadsheet::Worksheet, col: u32, row: u32) -> Self {
        match sheet.get_cell((col, row)) {
            Some(cell) => Self::from_cell(cell),
            None => CellValue::Empty,
        }
    }

    /// Convert a raw workbook cell into the closed variant model.
    pub fn from_cell(cell: &Cell) -> Self {
        match cell.get_raw_value() {
            CellRawValue::Empty => CellValue::Empty,
            CellRawValue::Numeric(n) => CellValue::Number(*n),
            CellRawValue::Bool(b) => CellValue::Bool(*b),
            CellRawValue::RichText(rich) => CellValue::Rich(
                rich.get_rich_text_elements()
                    .iter()
                    .map(|el| TextRun {
                        text: el.get_text().to_string(),
                    })
                    .collect(),
            ),
            // Shared strings, inline strings, and anything else the workbook
            // layer hands us go through the flattened string form.
            _ => CellValue::Text(cell.get_value().to_string()),
        }
    }
}

/// Normalize a worksheet position directly to its trimmed string form.
pub fn normalized(sheet: &umya_spreadsheet::Worksheet, col: u32, row: u32) -> String {
    CellValue::from_sheet(sheet, col, row).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_normalizes_to_empty_string() {
        assert_eq!(CellValue::Empty.normalize(), "");
    }

    #[test]
    fn text_is_trimmed_but_inner_whitespace_kept() {
        let value = CellValue::Text("  Foo   Bar  ".to_string());
        assert_eq!(value.normalize(), "Foo   Bar");
    }

    #[test]
    fn rich_runs_concatenate_before_trimming() {
        let value = CellValue::Rich(vec![
            TextRun { text: " Hello ".to_string() },
            TextRun { text: "World ".to_string() },
        ]);
        assert_eq!(value.normalize(), "Hello World");
    }

    #[test]
    fn structured_and_plain_forms_normalize_identically() {
        let plain = CellValue::Text("TC-001".to_string());
        let rich = CellValue::Rich(vec![
            TextRun { text: "TC-".to_string() },
            TextRun { text: "001".to_string() },
        ]);
        assert_eq!(plain.normalize(), rich.normalize());
    }

    #[test]
    fn numbers_use_display_form() {
        assert_eq!(CellValue::Number(3.0).normalize(), "3");
        assert_eq!(CellValue::Number(3.5).normalize(), "3.5");
    }

    #[test]
    fn bools_stringify() {
        assert_eq!(CellValue::Bool(true).normalize(), "true");
    }
}

//! Shared helpers for building real xlsx fixtures in a temp directory.
#![allow(dead_code)] // not every test target uses every helper

use std::path::PathBuf;

use tempfile::TempDir;
use umya_spreadsheet::Worksheet;

/// Standard header labels in the order tests lay them out.
pub const HEADERS: [&str; 6] = [
    "TC ID",
    "Test case name",
    "Input",
    "Expected output",
    "Actual output",
    "Status",
];

/// Build an xlsx file under `dir` by populating the first worksheet.
pub fn build_fixture<F>(dir: &TempDir, name: &str, populate: F) -> PathBuf
where
    F: FnOnce(&mut Worksheet),
{
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).expect("new workbook has a sheet");
    populate(sheet);

    let path = dir.path().join(name);
    umya_spreadsheet::writer::xlsx::write(&book, &path).expect("write fixture");
    path
}

/// Write `values` left-to-right starting at column 1 of `row`.
pub fn set_row(sheet: &mut Worksheet, row: u32, values: &[&str]) {
    for (i, value) in values.iter().enumerate() {
        if !value.is_empty() {
            sheet.get_cell_mut((i as u32 + 1, row)).set_value(*value);
        }
    }
}

/// Read back a single cell's displayed value from a saved fixture.
pub fn read_cell(path: &std::path::Path, col: u32, row: u32) -> String {
    let book = umya_spreadsheet::reader::xlsx::read(path).expect("reopen fixture");
    let sheet = book.get_sheet(&0).expect("sheet");
    sheet
        .get_cell((col, row))
        .map(|cell| cell.get_value().to_string())
        .unwrap_or_default()
}

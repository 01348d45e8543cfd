//! End-to-end pipeline tests: fixture load → mock automation → ledger →
//! fixture writeback, without Node or a live target.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use umya_spreadsheet::Worksheet;

use sheetcheck_e2e::runner::{RunnerConfig, TestRunner, NOT_VISIBLE_SENTINEL};
use sheetcheck_e2e::{Automation, HarnessError, HarnessResult};
use sheetcheck_fixture::writeback::{FAIL_COLOR_ARGB, PASS_COLOR_ARGB};

const HEADERS: [&str; 6] = [
    "TC ID",
    "Test case name",
    "Input",
    "Expected output",
    "Actual output",
    "Status",
];
const ACTUAL_COL: u32 = 5;
const STATUS_COL: u32 = 6;

/// Simulated target: whatever is filled into the input surface appears on
/// the output surface.
#[derive(Default)]
struct EchoTarget {
    screen: Mutex<String>,
}

#[async_trait]
impl Automation for EchoTarget {
    async fn navigate(&self, _url: &str) -> HarnessResult<()> {
        Ok(())
    }

    async fn fill(&self, _selector: &str, text: &str) -> HarnessResult<()> {
        *self.screen.lock().unwrap() = text.to_string();
        Ok(())
    }

    async fn is_visible(&self, _selector: &str) -> HarnessResult<bool> {
        Ok(true)
    }

    async fn read_text(&self, _selector: &str) -> HarnessResult<String> {
        Ok(self.screen.lock().unwrap().clone())
    }
}

/// Simulated target whose output surface never renders at all.
struct HiddenTarget;

#[async_trait]
impl Automation for HiddenTarget {
    async fn navigate(&self, _url: &str) -> HarnessResult<()> {
        Ok(())
    }

    async fn fill(&self, _selector: &str, _text: &str) -> HarnessResult<()> {
        Ok(())
    }

    async fn is_visible(&self, _selector: &str) -> HarnessResult<bool> {
        Ok(false)
    }

    async fn read_text(&self, _selector: &str) -> HarnessResult<String> {
        Err(HarnessError::Browser("element not attached".to_string()))
    }
}

fn set_row(sheet: &mut Worksheet, row: u32, values: &[&str]) {
    for (i, value) in values.iter().enumerate() {
        if !value.is_empty() {
            sheet.get_cell_mut((i as u32 + 1, row)).set_value(*value);
        }
    }
}

fn build_fixture<F>(dir: &TempDir, populate: F) -> PathBuf
where
    F: FnOnce(&mut Worksheet),
{
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).expect("new workbook has a sheet");
    populate(sheet);
    let path = dir.path().join("cases.xlsx");
    umya_spreadsheet::writer::xlsx::write(&book, &path).expect("write fixture");
    path
}

fn read_cell(path: &Path, col: u32, row: u32) -> String {
    let book = umya_spreadsheet::reader::xlsx::read(path).expect("reopen fixture");
    let sheet = book.get_sheet(&0).expect("sheet");
    sheet
        .get_cell((col, row))
        .map(|cell| cell.get_value().to_string())
        .unwrap_or_default()
}

fn status_color(path: &Path, row: u32) -> String {
    let book = umya_spreadsheet::reader::xlsx::read(path).expect("reopen fixture");
    let sheet = book.get_sheet(&0).expect("sheet");
    sheet
        .get_cell((STATUS_COL, row))
        .and_then(|cell| cell.get_style().get_font())
        .map(|font| font.get_color().get_argb().to_string())
        .unwrap_or_default()
}

fn config_for(path: &Path) -> RunnerConfig {
    RunnerConfig {
        fixture_path: path.to_path_buf(),
        poll_timeout: Duration::from_millis(300),
        poll_interval: Duration::from_millis(20),
        ..RunnerConfig::default()
    }
}

#[tokio::test]
async fn suite_passes_with_deep_header_and_unsorted_rows() {
    let dir = TempDir::new().unwrap();
    let path = build_fixture(&dir, |sheet| {
        set_row(sheet, 1, &["Text renderer regression fixture"]);
        set_row(sheet, 3, &["Owner: QA"]);
        set_row(sheet, 4, &HEADERS);
        set_row(sheet, 5, &["TC-002", "Second case", "Hello", "display: Hello", "", ""]);
        set_row(sheet, 6, &["TC-001", "First case", "World", "World", "", ""]);
    });

    let mut runner = TestRunner::new(config_for(&path), EchoTarget::default());
    let report = runner.run_all().await.unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.passed, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.writeback_rows_updated, Some(2));

    // Loader orders by id, not by row position.
    let ids: Vec<&str> = report.cases.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["TC-001", "TC-002"]);
    assert_eq!(report.cases[0].actual, "World");
    assert_eq!(report.cases[1].actual, "Hello");

    // Both rows updated in place with green bold Pass.
    assert_eq!(read_cell(&path, ACTUAL_COL, 5), "Hello");
    assert_eq!(read_cell(&path, STATUS_COL, 5), "Pass");
    assert_eq!(status_color(&path, 5), PASS_COLOR_ARGB);
    assert_eq!(read_cell(&path, ACTUAL_COL, 6), "World");
    assert_eq!(read_cell(&path, STATUS_COL, 6), "Pass");
    assert_eq!(status_color(&path, 6), PASS_COLOR_ARGB);

    // Untouched columns keep their authored content.
    assert_eq!(read_cell(&path, 2, 5), "Second case");
    assert_eq!(read_cell(&path, 3, 5), "Hello");
    assert_eq!(read_cell(&path, 4, 5), "display: Hello");
    assert_eq!(read_cell(&path, 1, 1), "Text renderer regression fixture");
}

#[tokio::test]
async fn failing_case_is_isolated_and_recorded() {
    let dir = TempDir::new().unwrap();
    let path = build_fixture(&dir, |sheet| {
        set_row(sheet, 1, &HEADERS);
        set_row(sheet, 2, &["TC-001", "Echoes", "same", "same", "", ""]);
        set_row(sheet, 3, &["TC-002", "Never matches", "typed", "expected", "", ""]);
    });

    let mut runner = TestRunner::new(config_for(&path), EchoTarget::default());
    let report = runner.run_all().await.unwrap();

    assert_eq!(report.passed, 1);
    assert_eq!(report.failed, 1);

    let failing = report.cases.iter().find(|c| c.id == "TC-002").unwrap();
    assert_eq!(failing.status, "Fail");
    assert!(failing.error.as_deref().unwrap_or("").contains("Timeout"));

    assert_eq!(read_cell(&path, STATUS_COL, 2), "Pass");
    assert_eq!(status_color(&path, 2), PASS_COLOR_ARGB);

    // The diagnostic read captured the last-seen surface text.
    assert_eq!(read_cell(&path, ACTUAL_COL, 3), "typed");
    assert_eq!(read_cell(&path, STATUS_COL, 3), "Fail");
    assert_eq!(status_color(&path, 3), FAIL_COLOR_ARGB);
}

#[tokio::test]
async fn invisible_output_surface_records_sentinel() {
    let dir = TempDir::new().unwrap();
    let path = build_fixture(&dir, |sheet| {
        set_row(sheet, 1, &HEADERS);
        set_row(sheet, 2, &["TC-001", "Hidden", "in", "out", "", ""]);
    });

    let mut runner = TestRunner::new(config_for(&path), HiddenTarget);
    let report = runner.run_all().await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(read_cell(&path, ACTUAL_COL, 2), NOT_VISIBLE_SENTINEL);
    assert_eq!(read_cell(&path, STATUS_COL, 2), "Fail");
}

#[tokio::test]
async fn report_is_written_as_json() {
    let dir = TempDir::new().unwrap();
    let path = build_fixture(&dir, |sheet| {
        set_row(sheet, 1, &HEADERS);
        set_row(sheet, 2, &["TC-001", "Echoes", "same", "same", "", ""]);
    });

    let mut config = config_for(&path);
    config.output_dir = dir.path().join("results");
    let mut runner = TestRunner::new(config, EchoTarget::default());

    let report = runner.run_all().await.unwrap();
    let report_path = runner.write_report(&report).unwrap();

    let raw = std::fs::read_to_string(report_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["total"], 1);
    assert_eq!(parsed["passed"], 1);
    assert_eq!(parsed["cases"][0]["id"], "TC-001");
}

#[tokio::test]
async fn missing_fixture_aborts_before_any_case() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir.path().join("absent.xlsx"));
    let mut runner = TestRunner::new(config, EchoTarget::default());

    let err = runner.run_all().await.unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Fixture(sheetcheck_fixture::FixtureError::FileNotFound(_))
    ));
}

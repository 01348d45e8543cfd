//! Case runner - orchestrates fixture loading, per-case execution, the
//! result ledger, and the final fixture writeback.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use sheetcheck_fixture::{loader, writeback, CaseResult, ResultLedger, TestCase};

use crate::browser::Automation;
use crate::error::HarnessResult;

/// Delimiter separating a machine-readable prefix from the human-visible
/// expected text in the `Expected output` column.
pub const DISPLAY_PREFIX: &str = "display:";

/// Recorded when the output surface is absent during the diagnostic read.
pub const NOT_VISIBLE_SENTINEL: &str = "element not visible";

/// Recorded when the diagnostic read itself fails.
pub const READ_ERROR_SENTINEL: &str = "error retrieving text";

/// Recorded when a case is cancelled or panics before any outcome exists.
pub const ABORTED_SENTINEL: &str = "case aborted before completion";

/// Derive the unique display title for a case: `"{id}: {name}"` with runs of
/// line-break characters in the name collapsed to a single space. The
/// surrounding test framework indexes cases by title text and cannot
/// tolerate embedded line breaks.
pub fn display_title(case: &TestCase) -> String {
    let name = case
        .name
        .split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}: {}", case.id, name)
}

/// Derive the comparison target from the raw expected text.
///
/// Some fixture authors embed a machine-readable prefix before the visible
/// expected text; only the suffix after the first `display:` is compared.
/// Internal whitespace in the remaining string is significant and preserved.
pub fn expected_display(raw: &str) -> String {
    match raw.find(DISPLAY_PREFIX) {
        Some(idx) => raw[idx + DISPLAY_PREFIX.len()..].trim().to_string(),
        None => raw.trim().to_string(),
    }
}

/// Guarantees exactly one ledger entry per case on every exit path.
///
/// `finish` records the real outcome; if the case unwinds or is cancelled
/// before that, the drop records a Fail entry with an abort sentinel.
struct LedgerGuard<'a> {
    ledger: &'a ResultLedger,
    id: &'a str,
    armed: bool,
}

impl<'a> LedgerGuard<'a> {
    fn new(ledger: &'a ResultLedger, id: &'a str) -> Self {
        Self {
            ledger,
            id,
            armed: true,
        }
    }

    fn finish(mut self, result: CaseResult) {
        self.ledger.record(self.id, result);
        self.armed = false;
    }
}

impl Drop for LedgerGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.ledger.record(self.id, CaseResult::fail(ABORTED_SENTINEL));
        }
    }
}

/// Configuration for one suite execution.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Path to the xlsx fixture supplying the cases.
    pub fixture_path: PathBuf,

    /// Page navigated to once before the first case runs.
    pub start_path: String,

    /// Selector of the target's input surface.
    pub input_selector: String,

    /// Selector of the target's output surface.
    pub output_selector: String,

    /// Bounded wait for the output surface to reach the expected text.
    pub poll_timeout: Duration,

    /// Delay between output samples.
    pub poll_interval: Duration,

    /// Directory for the JSON suite report.
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            fixture_path: PathBuf::from("tests/fixtures/cases.xlsx"),
            start_path: "/".to_string(),
            input_selector: "#input".to_string(),
            output_selector: "#output".to_string(),
            poll_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

/// Outcome of one case as it appears in the suite report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    pub id: String,
    pub title: String,
    pub status: String,
    pub actual: String,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running the whole suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub started_at: String,
    /// Rows updated by the fixture writeback, absent when writeback was
    /// skipped because the file could not be reopened.
    pub writeback_rows_updated: Option<usize>,
    pub cases: Vec<CaseReport>,
}

/// Main suite runner, generic over the automation collaborator.
pub struct TestRunner<A: Automation> {
    config: RunnerConfig,
    automation: A,
    ledger: ResultLedger,
}

impl<A: Automation> TestRunner<A> {
    pub fn new(config: RunnerConfig, automation: A) -> Self {
        Self {
            config,
            automation,
            ledger: ResultLedger::new(),
        }
    }

    /// Run the whole suite: load, execute each case in sorted order, then
    /// write results back into the fixture.
    ///
    /// Per-case failures are isolated; a failed case never stops its
    /// siblings. Loading failures are fatal and abort before any case runs.
    pub async fn run_all(&mut self) -> HarnessResult<SuiteReport> {
        let start = Instant::now();
        let started_at = chrono::Utc::now().to_rfc3339();

        let cases = loader::load(&self.config.fixture_path)?;
        self.automation.navigate(&self.config.start_path).await?;

        info!("Running {} case(s)...", cases.len());

        let mut reports = Vec::with_capacity(cases.len());
        let mut passed = 0;
        let mut failed = 0;

        for case in &cases {
            let title = display_title(case);
            let case_start = Instant::now();

            let outcome = self.run_case(case).await;
            let duration_ms = case_start.elapsed().as_millis() as u64;
            let entry = self
                .ledger
                .get(&case.id)
                .unwrap_or_else(|| CaseResult::fail(ABORTED_SENTINEL));

            match outcome {
                Ok(_) => {
                    passed += 1;
                    info!("✓ {title} ({duration_ms} ms)");
                    reports.push(CaseReport {
                        id: case.id.clone(),
                        title,
                        status: entry.status.to_string(),
                        actual: entry.actual,
                        duration_ms,
                        error: None,
                    });
                }
                Err(e) => {
                    failed += 1;
                    error!("✗ {title} - {e}");
                    reports.push(CaseReport {
                        id: case.id.clone(),
                        title,
                        status: entry.status.to_string(),
                        actual: entry.actual,
                        duration_ms,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        // Finalization: one exclusive read-modify-write pass over the
        // fixture. A locked file loses only the spreadsheet update, never
        // the suite verdict, so the error is reported and swallowed.
        let frozen = std::mem::take(&mut self.ledger).freeze();
        let writeback_rows_updated =
            match writeback::write_results(&self.config.fixture_path, &frozen) {
                Ok(summary) => Some(summary.rows_updated),
                Err(e) => {
                    error!("fixture writeback skipped: {e}");
                    None
                }
            };

        let duration_ms = start.elapsed().as_millis() as u64;
        info!("");
        info!("Suite results: {passed} passed, {failed} failed ({duration_ms} ms)");

        Ok(SuiteReport {
            total: cases.len(),
            passed,
            failed,
            duration_ms,
            started_at,
            writeback_rows_updated,
            cases: reports,
        })
    }

    /// Run one case: fill the input surface, then wait for the output
    /// surface to strictly equal the derived expected text.
    ///
    /// Exactly one ledger entry is recorded whatever happens; the original
    /// failure still propagates afterwards so the surrounding runner marks
    /// the case red.
    pub async fn run_case(&self, case: &TestCase) -> HarnessResult<String> {
        let title = display_title(case);
        let expected = expected_display(&case.expected_output);
        debug!(%title, %expected, "running case");

        let guard = LedgerGuard::new(&self.ledger, &case.id);

        let outcome = self.execute(case, &expected).await;
        match outcome {
            Ok(actual) => {
                guard.finish(CaseResult::pass(actual.clone()));
                Ok(actual)
            }
            Err(e) => {
                let diagnostic = self.diagnostic_actual().await;
                guard.finish(CaseResult::fail(diagnostic));
                Err(e)
            }
        }
    }

    async fn execute(&self, case: &TestCase, expected: &str) -> HarnessResult<String> {
        self.automation
            .fill(&self.config.input_selector, &case.input)
            .await?;
        self.automation
            .poll_text(
                &self.config.output_selector,
                expected,
                self.config.poll_timeout,
                self.config.poll_interval,
            )
            .await
    }

    /// Best-effort read of the output surface after a failure.
    async fn diagnostic_actual(&self) -> String {
        match self.automation.is_visible(&self.config.output_selector).await {
            Ok(true) => match self.automation.read_text(&self.config.output_selector).await {
                Ok(text) => text,
                Err(_) => READ_ERROR_SENTINEL.to_string(),
            },
            Ok(false) => NOT_VISIBLE_SENTINEL.to_string(),
            Err(_) => READ_ERROR_SENTINEL.to_string(),
        }
    }

    /// Write the suite report to `<output_dir>/test-results.json`.
    pub fn write_report(&self, report: &SuiteReport) -> HarnessResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;

        info!("Report written to: {}", path.display());
        Ok(path)
    }
}

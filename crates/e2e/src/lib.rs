//! SheetCheck E2E Case Runner
//!
//! This crate orchestrates one suite execution over a spreadsheet fixture:
//! - Loads the deterministic case list from `sheetcheck-fixture`
//! - Drives the web target through a browser automation collaborator
//!   (Playwright over a persistent Node driver process)
//! - Records exactly one ledger entry per case on every exit path
//! - Finalizes by writing results back into the fixture file
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   SheetCheck Runner (Rust)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner<A: Automation>                                  │
//! │    ├── loader::load(fixture) -> [TestCase]  (sorted)        │
//! │    ├── run_case(case):                                      │
//! │    │     fill(input) → poll_text(output, expected, timeout) │
//! │    │     LedgerGuard records Pass/Fail exactly once         │
//! │    └── finalize: writeback::write_results(fixture, ledger)  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Automation (collaborator contract)                         │
//! │    navigate / fill / poll_text / is_visible / read_text     │
//! │    └── PlaywrightHandle: JSON-line protocol to Node driver  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod error;
pub mod runner;
pub mod target;

pub use browser::{Automation, Browser, PlaywrightConfig, PlaywrightHandle};
pub use error::{HarnessError, HarnessResult};
pub use runner::{RunnerConfig, SuiteReport, TestRunner};
pub use target::TargetConfig;

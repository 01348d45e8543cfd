//! SheetCheck Fixture Pipeline
//!
//! This crate owns the spreadsheet side of the SheetCheck harness:
//! - Loads a semi-structured `.xlsx` fixture (unknown header position, mixed
//!   cell representations) into a deterministic, uniquely-keyed case list
//! - Collects per-case outcomes into an append-only-by-key result ledger
//! - Writes outcomes back into the original fixture in place, with status
//!   coloring, leaving every other cell untouched
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   Fixture Pipeline (this crate)              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  loader::load(path) -> Vec<TestCase>     (sorted by TC ID)   │
//! │        │                                                     │
//! │        ▼  one execution per case (sheetcheck-e2e)            │
//! │  ResultLedger::record(id, CaseResult)    (exactly once)      │
//! │        │                                                     │
//! │        ▼  after the last case                                │
//! │  ResultLedger::freeze() -> FrozenLedger                      │
//! │        │                                                     │
//! │        ▼                                                     │
//! │  writeback::write_results(path, &frozen) (in-place update)   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The fixture file is read twice: once for loading (shared read) and once
//! for a single exclusive read-modify-write pass after all cases finish. No
//! case execution touches the file.

pub mod cell;
pub mod error;
pub mod ledger;
pub mod loader;
pub mod writeback;

pub use cell::{CellValue, TextRun};
pub use error::{FixtureError, FixtureResult};
pub use ledger::{CaseResult, CaseStatus, FrozenLedger, ResultLedger};
pub use loader::TestCase;
pub use writeback::WritebackSummary;

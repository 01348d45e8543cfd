//! Result ledger
//!
//! In-memory map from case identifier to its final observed outcome. The
//! ledger lives for one suite execution: created before any case runs,
//! populated exactly once per case, frozen after the last case completes,
//! consumed once by writeback, then discarded.

use std::collections::BTreeMap;
use std::fmt;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::warn;

/// Terminal status of one case. `Fail` is the default/safe state; `Pass` is
/// set only after a strict equality check succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    Pass,
    Fail,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pass => "Pass",
            CaseStatus::Fail => "Fail",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final outcome of one case. `actual` is never left unset: failure paths
/// record a diagnostic sentinel instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    pub actual: String,
    pub status: CaseStatus,
}

impl CaseResult {
    pub fn pass(actual: impl Into<String>) -> Self {
        Self {
            actual: actual.into(),
            status: CaseStatus::Pass,
        }
    }

    pub fn fail(actual: impl Into<String>) -> Self {
        Self {
            actual: actual.into(),
            status: CaseStatus::Fail,
        }
    }
}

/// Append-only-by-key map from case id to [`CaseResult`].
///
/// Workers never share a case id, so no write contention is expected on any
/// single key; the map itself tolerates concurrent inserts of distinct keys.
/// A second insert for an existing key is refused and logged; the first
/// recorded outcome wins.
#[derive(Debug, Default)]
pub struct ResultLedger {
    entries: DashMap<String, CaseResult>,
}

impl ResultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for `id`, trimming `actual`. Returns `false` when
    /// an entry already existed (the existing entry is kept).
    pub fn record(&self, id: &str, result: CaseResult) -> bool {
        let trimmed = CaseResult {
            actual: result.actual.trim().to_string(),
            status: result.status,
        };
        match self.entries.entry(id.to_string()) {
            Entry::Occupied(_) => {
                warn!(id, "duplicate ledger entry refused; keeping first outcome");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(trimmed);
                true
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<CaseResult> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze into an ordered read-only view for the writeback pass.
    pub fn freeze(self) -> FrozenLedger {
        FrozenLedger {
            entries: self.entries.into_iter().collect(),
        }
    }
}

/// Read-only, ordered snapshot of a completed suite's ledger.
#[derive(Debug, Clone, Default)]
pub struct FrozenLedger {
    entries: BTreeMap<String, CaseResult>,
}

impl FrozenLedger {
    pub fn get(&self, id: &str) -> Option<&CaseResult> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CaseResult)> {
        self.entries.iter()
    }
}

//! Aggregation - pure functions turning check outcomes into a decision
//!
//! No I/O happens here; the runner hands over the ordered outcomes of one
//! evaluation pass.

use crate::checks::{CheckKind, CheckResult, CheckStatus};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Where a check's result came from in this pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Check did not apply; result synthesized by the runner
    Skipped,
    /// Served from the results store
    Cached,
    /// Check logic ran in this pass
    Executed,
}

/// Result of one check within an evaluation pass
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub kind: CheckKind,
    pub result: CheckResult,
    pub source: ResultSource,
}

/// Overall verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeabilityStatus {
    /// Every applicable check passed (warnings allowed)
    Mergeable,
    /// At least one check failed
    Blocked,
    /// Nothing failed, but at least one check is still being determined
    Pending,
}

impl std::fmt::Display for MergeabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mergeable => write!(f, "mergeable"),
            Self::Blocked => write!(f, "blocked"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// Combined outcome of one evaluation pass
#[derive(Debug, Clone, PartialEq)]
pub struct MergeabilityDecision {
    /// Aggregate verdict
    pub status: MergeabilityStatus,
    /// Per-check outcomes in declared order
    pub outcomes: Vec<CheckOutcome>,
}

impl MergeabilityDecision {
    /// Whether the merge request can be merged right now
    #[must_use]
    pub fn mergeable(&self) -> bool {
        self.status == MergeabilityStatus::Mergeable
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.status == MergeabilityStatus::Blocked
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == MergeabilityStatus::Pending
    }

    /// Result for a specific check, if it was part of the pass
    pub fn result(&self, kind: CheckKind) -> Option<&CheckResult> {
        self.outcomes
            .iter()
            .find(|o| o.kind == kind)
            .map(|o| &o.result)
    }

    /// Results keyed by check identifier
    pub fn checks(&self) -> BTreeMap<&'static str, &CheckResult> {
        self.outcomes
            .iter()
            .map(|o| (o.kind.identifier(), &o.result))
            .collect()
    }

    fn with_status(&self, status: CheckStatus) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes
            .iter()
            .filter(move |o| o.result.status() == status)
    }

    /// Checks that block the merge
    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.with_status(CheckStatus::Failed)
    }

    /// Checks that pass with a caveat
    pub fn warnings(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.with_status(CheckStatus::Warning)
    }

    /// Checks still being determined
    pub fn pending(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.with_status(CheckStatus::Checking)
    }

    /// Checks that did not apply
    pub fn inactive(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.with_status(CheckStatus::Inactive)
    }

    /// Number of checks whose logic ran in this pass
    #[must_use]
    pub fn executed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.source == ResultSource::Executed)
            .count()
    }

    /// Number of checks served from cache
    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.source == ResultSource::Cached)
            .count()
    }

    /// Serializable view for API / CLI output
    pub fn report(&self) -> MergeabilityReport {
        MergeabilityReport {
            mergeable: self.mergeable(),
            status: self.status,
            checks: self
                .outcomes
                .iter()
                .map(|o| CheckReport {
                    check: o.kind,
                    identifier: o.kind.identifier(),
                    status: o.result.status(),
                    source: o.source,
                    payload: o.result.payload().clone(),
                })
                .collect(),
        }
    }
}

/// JSON shape of a decision
#[derive(Debug, Clone, Serialize)]
pub struct MergeabilityReport {
    pub mergeable: bool,
    pub status: MergeabilityStatus,
    pub checks: Vec<CheckReport>,
}

/// JSON shape of one check in a decision
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub check: CheckKind,
    pub identifier: &'static str,
    pub status: CheckStatus,
    pub source: ResultSource,
    pub payload: Map<String, Value>,
}

/// Fold outcomes into a decision (PURE)
///
/// - any `Failed` blocks the merge
/// - otherwise any `Checking` leaves the decision pending
/// - otherwise the merge request is mergeable; `Warning` and `Inactive`
///   never block
#[must_use]
pub fn decide(outcomes: Vec<CheckOutcome>) -> MergeabilityDecision {
    let any = |status: CheckStatus| outcomes.iter().any(|o| o.result.status() == status);

    let status = if any(CheckStatus::Failed) {
        MergeabilityStatus::Blocked
    } else if any(CheckStatus::Checking) {
        MergeabilityStatus::Pending
    } else {
        MergeabilityStatus::Mergeable
    };

    MergeabilityDecision { status, outcomes }
}

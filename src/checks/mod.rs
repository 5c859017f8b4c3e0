//! Mergeability checks
//!
//! Each check answers one merge-blocking question. The set of checks is
//! closed (`CheckKind`); an ordered `CheckList` decides which of them run
//! and in what order. Every check exposes the same capability set:
//! - `cache_key` - identity plus the state that invalidates the result
//! - `skip` - whether the check applies at all
//! - `execute` - run the check; collaborator failures become `Failed`

mod approvals;
mod ci_status;
mod conflicts;
mod context;
mod discussions;
mod draft;
mod open;
mod rebase;
mod result;

pub use approvals::ApprovalsCheck;
pub use ci_status::CiStatusCheck;
pub use conflicts::ConflictsCheck;
pub use context::{CheckContext, EvaluateOptions};
pub use discussions::DiscussionsCheck;
pub use draft::DraftCheck;
pub use open::OpenCheck;
pub use rebase::RebaseCheck;
pub use result::{CheckResult, CheckStatus, IDENTIFIER, LAST_RUN_AT, REASON, StoredResult, payload};

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::str::FromStr;
use tracing::debug;

/// Empty detail list for results that only carry a reason
pub const NO_DETAILS: [(&str, Value); 0] = [];

/// The closed set of mergeability checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Merge request must be open
    Open,
    /// Merge request must not be a draft
    Draft,
    /// Source must merge cleanly into target
    Conflicts,
    /// Head pipeline must have succeeded
    CiStatus,
    /// Resolvable discussions must be resolved
    Discussions,
    /// Approval rules must be satisfied
    Approvals,
    /// Source must be up to date with target when the merge method needs it
    Rebase,
}

impl CheckKind {
    /// Every check, in the default evaluation order
    pub const ALL: [Self; 7] = [
        Self::Open,
        Self::Draft,
        Self::Conflicts,
        Self::CiStatus,
        Self::Discussions,
        Self::Approvals,
        Self::Rebase,
    ];

    /// Configuration name (matches the serde representation)
    pub const fn name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Draft => "draft",
            Self::Conflicts => "conflicts",
            Self::CiStatus => "ci_status",
            Self::Discussions => "discussions",
            Self::Approvals => "approvals",
            Self::Rebase => "rebase",
        }
    }

    /// Identifier carried in result payloads for UI correlation
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Open => "not_open",
            Self::Draft => "draft_status",
            Self::Conflicts => "conflict",
            Self::CiStatus => "ci_must_pass",
            Self::Discussions => "discussions_not_resolved",
            Self::Approvals => "not_approved",
            Self::Rebase => "need_rebase",
        }
    }

    /// The check implementation for this kind
    pub fn check(self) -> &'static dyn MergeCheck {
        match self {
            Self::Open => &OpenCheck,
            Self::Draft => &DraftCheck,
            Self::Conflicts => &ConflictsCheck,
            Self::CiStatus => &CiStatusCheck,
            Self::Discussions => &DiscussionsCheck,
            Self::Approvals => &ApprovalsCheck,
            Self::Rebase => &RebaseCheck,
        }
    }

    fn base_payload(self) -> Map<String, Value> {
        payload([(IDENTIFIER, json!(self.identifier()))])
    }

    fn with_reason<I, K>(self, reason: &str, details: I) -> Map<String, Value>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut p = self.base_payload();
        p.insert(REASON.to_string(), json!(reason));
        p.extend(details.into_iter().map(|(k, v)| (k.into(), v)));
        p
    }

    /// Passing result tagged with this check's identifier
    pub fn success(self) -> CheckResult {
        CheckResult::success(self.base_payload())
    }

    /// Not-applicable result tagged with this check's identifier
    pub fn inactive(self) -> CheckResult {
        CheckResult::inactive(self.base_payload())
    }

    /// Blocking result with a reason code and extra detail
    pub fn failed<I, K>(self, reason: &str, details: I) -> CheckResult
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        CheckResult::failed(self.with_reason(reason, details))
    }

    /// Pending result with a reason code and extra detail
    pub fn checking<I, K>(self, reason: &str, details: I) -> CheckResult
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        CheckResult::checking(self.with_reason(reason, details))
    }

    /// Non-blocking result with a reason code and extra detail
    pub fn warning<I, K>(self, reason: &str, details: I) -> CheckResult
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        CheckResult::warning(self.with_reason(reason, details))
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CheckKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s || kind.identifier() == s)
            .ok_or_else(|| Error::UnknownCheck(s.to_string()))
    }
}

/// Cache key of one check for one merge request state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// `merge_request:{project_id}:{iid}:{identifier}:{discriminators...}`
    pub fn new(ctx: &CheckContext<'_>, kind: CheckKind, discriminators: &[&str]) -> Self {
        let mr = ctx.merge_request;
        let mut key = format!(
            "merge_request:{}:{}:{}",
            mr.project_id,
            mr.iid,
            kind.identifier()
        );
        for part in discriminators {
            key.push(':');
            key.push_str(part);
        }
        Self(key)
    }

    /// The key as written to the cache
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One mergeability condition
///
/// Implementors provide `evaluate`; callers use `execute`, which isolates
/// collaborator failures so one broken check cannot abort the others.
#[async_trait]
pub trait MergeCheck: Send + Sync {
    /// Which check this is
    fn kind(&self) -> CheckKind;

    /// Key under which the result may be cached
    fn cache_key(&self, ctx: &CheckContext<'_>) -> CacheKey;

    /// Whether the check does not apply to this merge request
    fn skip(&self, ctx: &CheckContext<'_>) -> bool;

    /// Run the check logic (may fail if a collaborator fails)
    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckResult>;

    /// Run the check, converting failures into a `Failed` result
    ///
    /// Never returns `Inactive`; that status belongs to the skip path.
    async fn execute(&self, ctx: &CheckContext<'_>) -> CheckResult {
        let kind = self.kind();
        match self.evaluate(ctx).await {
            Ok(result) if result.is_inactive() => {
                debug!(check = %kind, "check returned inactive from execute");
                kind.failed("invalid_result", [("error", json!("check returned inactive"))])
            }
            Ok(result) => result,
            Err(e) => {
                debug!(check = %kind, error = %e, "check failed to evaluate");
                kind.failed("check_error", [("error", json!(e.to_string()))])
            }
        }
    }
}

/// Ordered, duplicate-free list of checks to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckList(Vec<CheckKind>);

impl CheckList {
    /// Validate and build a check list
    ///
    /// # Errors
    /// Returns [`Error::InvalidCheckList`] if the list is empty or repeats a check.
    pub fn new(kinds: Vec<CheckKind>) -> Result<Self> {
        if kinds.is_empty() {
            return Err(Error::InvalidCheckList("no checks configured".to_string()));
        }
        for (i, kind) in kinds.iter().enumerate() {
            if kinds[..i].contains(kind) {
                return Err(Error::InvalidCheckList(format!(
                    "check '{kind}' listed more than once"
                )));
            }
        }
        Ok(Self(kinds))
    }

    /// Parse a list of check names
    ///
    /// # Errors
    /// Returns [`Error::UnknownCheck`] for names that are not checks and
    /// [`Error::InvalidCheckList`] for empty or duplicated lists.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let kinds = names
            .iter()
            .map(|n| n.as_ref().parse())
            .collect::<Result<Vec<CheckKind>>>()?;
        Self::new(kinds)
    }

    /// Checks in evaluation order
    pub fn kinds(&self) -> &[CheckKind] {
        &self.0
    }

    /// Number of checks
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated list
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CheckList {
    fn default() -> Self {
        Self(CheckKind::ALL.to_vec())
    }
}

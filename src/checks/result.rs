//! Outcome of a single mergeability check
//!
//! A `CheckResult` is an immutable status + payload pair. The payload is a
//! canonical string-keyed JSON object; freshly built results carry
//! `last_run_at`. Results cross the cache boundary as [`StoredResult`]
//! and come back with their payload untouched.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload key holding the evaluation timestamp
pub const LAST_RUN_AT: &str = "last_run_at";
/// Payload key holding the check identifier
pub const IDENTIFIER: &str = "identifier";
/// Payload key holding a machine-readable reason
pub const REASON: &str = "reason";

/// Status of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Condition holds
    Success,
    /// Condition does not hold; merge is blocked
    Failed,
    /// Check does not apply
    Inactive,
    /// Condition holds with a caveat worth showing
    Warning,
    /// Not determined yet (CI running, conflicts still computing)
    Checking,
}

impl CheckStatus {
    /// Parse a stored status, tolerating case and a leading `:`
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().trim_start_matches(':').to_ascii_lowercase();
        match normalized.as_str() {
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            "inactive" => Some(Self::Inactive),
            "warning" => Some(Self::Warning),
            "checking" => Some(Self::Checking),
            _ => None,
        }
    }

    /// Canonical lowercase name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Inactive => "inactive",
            Self::Warning => "warning",
            Self::Checking => "checking",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized form of a [`CheckResult`] as written to the cache
///
/// `status` stays a plain string so that foreign spellings (`"SUCCESS"`,
/// `":success"`) survive deserialization and are normalized later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    /// Status name as written, normalized by [`CheckResult::from_stored`]
    pub status: String,
    /// Payload exactly as the check produced it
    pub payload: Map<String, Value>,
}

/// Immutable outcome of one mergeability check
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    status: CheckStatus,
    payload: Map<String, Value>,
}

impl CheckResult {
    /// Build a result, merging `{last_run_at: now}` under the supplied payload
    pub fn new(status: CheckStatus, payload: Map<String, Value>) -> Self {
        let mut merged = Map::new();
        merged.insert(
            LAST_RUN_AT.to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        merged.extend(payload);
        Self {
            status,
            payload: merged,
        }
    }

    /// Passing result
    pub fn success(payload: Map<String, Value>) -> Self {
        Self::new(CheckStatus::Success, payload)
    }

    /// Blocking result
    pub fn failed(payload: Map<String, Value>) -> Self {
        Self::new(CheckStatus::Failed, payload)
    }

    /// Result that is not conclusive yet
    pub fn checking(payload: Map<String, Value>) -> Self {
        Self::new(CheckStatus::Checking, payload)
    }

    /// Result for a check that does not apply
    pub fn inactive(payload: Map<String, Value>) -> Self {
        Self::new(CheckStatus::Inactive, payload)
    }

    /// Non-blocking result with a caveat
    pub fn warning(payload: Map<String, Value>) -> Self {
        Self::new(CheckStatus::Warning, payload)
    }

    /// Rebuild a result from its cached representation
    ///
    /// The payload is kept as stored; `last_run_at` is not re-stamped.
    ///
    /// # Errors
    /// Returns [`Error::CorruptCacheEntry`] when the status is not recognised.
    pub fn from_stored(stored: StoredResult) -> Result<Self> {
        let status = CheckStatus::parse(&stored.status).ok_or_else(|| {
            Error::CorruptCacheEntry(format!("unknown status {:?}", stored.status))
        })?;
        Ok(Self {
            status,
            payload: stored.payload,
        })
    }

    /// Serialize for the cache
    pub fn to_stored(&self) -> StoredResult {
        StoredResult {
            status: self.status.as_str().to_string(),
            payload: self.payload.clone(),
        }
    }

    pub const fn status(&self) -> CheckStatus {
        self.status
    }

    pub const fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Identifier used to correlate the result with a check in the UI
    pub fn identifier(&self) -> Option<&str> {
        self.payload.get(IDENTIFIER).and_then(Value::as_str)
    }

    /// Machine-readable reason, if the check supplied one
    pub fn reason(&self) -> Option<&str> {
        self.payload.get(REASON).and_then(Value::as_str)
    }

    /// When the check was evaluated
    pub fn last_run_at(&self) -> Option<DateTime<Utc>> {
        self.payload
            .get(LAST_RUN_AT)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn is_success(&self) -> bool {
        self.status == CheckStatus::Success
    }

    pub fn is_failed(&self) -> bool {
        self.status == CheckStatus::Failed
    }

    pub fn is_checking(&self) -> bool {
        self.status == CheckStatus::Checking
    }

    pub fn is_inactive(&self) -> bool {
        self.status == CheckStatus::Inactive
    }

    pub fn is_warning(&self) -> bool {
        self.status == CheckStatus::Warning
    }

    /// Not a conclusive pass: failed or still checking
    pub fn is_unsuccessful(&self) -> bool {
        self.is_failed() || self.is_checking()
    }
}

/// Build a payload map from `(key, value)` pairs
///
/// ```
/// use mr_mergeability::checks::payload;
/// let p = payload([("identifier", "conflict".into())]);
/// assert_eq!(p["identifier"], "conflict");
/// ```
pub fn payload<I, K>(entries: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

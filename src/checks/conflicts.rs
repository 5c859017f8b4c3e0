//! Source branch must merge cleanly into the target branch

use super::{CacheKey, CheckContext, CheckKind, CheckResult, MergeCheck};
use crate::error::Result;
use crate::types::ConflictStatus;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

/// Asks the Git collaborator whether the current diff conflicts
///
/// Keyed on the diff head and the target branch head: a new push or a new
/// commit on the target can both introduce or remove conflicts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictsCheck;

#[async_trait]
impl MergeCheck for ConflictsCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Conflicts
    }

    fn cache_key(&self, ctx: &CheckContext<'_>) -> CacheKey {
        let mr = ctx.merge_request;
        CacheKey::new(
            ctx,
            self.kind(),
            &[&mr.diff_head_sha, mr.target_branch_sha.as_deref().unwrap_or("-")],
        )
    }

    fn skip(&self, _ctx: &CheckContext<'_>) -> bool {
        false
    }

    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckResult> {
        let mr = ctx.merge_request;
        let status = ctx.platform.conflict_status(mr).await?;
        debug!(mr_iid = mr.iid, ?status, "conflict status");

        let sha = [("diff_head_sha", json!(mr.diff_head_sha))];
        Ok(match status {
            ConflictStatus::NoConflicts => self.kind().success(),
            ConflictStatus::HasConflicts => self.kind().failed("conflict", sha),
            ConflictStatus::Unchecked => self.kind().checking("conflict_check_pending", sha),
        })
    }
}

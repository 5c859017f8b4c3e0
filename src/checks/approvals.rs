//! Approval rules must be satisfied

use super::{CacheKey, CheckContext, CheckKind, CheckResult, MergeCheck};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::json;

/// Approvals reset on push, so the key folds in the diff head as well as
/// `updated_at`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApprovalsCheck;

#[async_trait]
impl MergeCheck for ApprovalsCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Approvals
    }

    fn cache_key(&self, ctx: &CheckContext<'_>) -> CacheKey {
        let mr = ctx.merge_request;
        let updated_at = mr.updated_at.timestamp_micros().to_string();
        CacheKey::new(ctx, self.kind(), &[&mr.diff_head_sha, &updated_at])
    }

    fn skip(&self, ctx: &CheckContext<'_>) -> bool {
        ctx.settings.approvals_required == 0 || ctx.options.skip_approvals_check
    }

    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckResult> {
        let state = ctx.platform.approval_state(ctx.merge_request).await?;
        if state.is_approved() {
            return Ok(self.kind().success());
        }
        Ok(self.kind().failed(
            "not_approved",
            [
                ("approvals_required", json!(state.approvals_required)),
                ("approvals_left", json!(state.approvals_left)),
            ],
        ))
    }
}

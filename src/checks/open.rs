//! Merge request must be open

use super::{CacheKey, CheckContext, CheckKind, CheckResult, MergeCheck};
use crate::error::Result;
use crate::types::MergeRequestState;
use async_trait::async_trait;
use serde_json::json;

/// Blocks closed, merged and locked merge requests, and open ones whose
/// target branch no longer exists
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenCheck;

#[async_trait]
impl MergeCheck for OpenCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Open
    }

    fn cache_key(&self, ctx: &CheckContext<'_>) -> CacheKey {
        let mr = ctx.merge_request;
        CacheKey::new(
            ctx,
            self.kind(),
            &[
                &mr.state.to_string(),
                &mr.updated_at.timestamp_micros().to_string(),
                if mr.target_branch_sha.is_some() { "target" } else { "no_target" },
            ],
        )
    }

    fn skip(&self, _ctx: &CheckContext<'_>) -> bool {
        false
    }

    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckResult> {
        let mr = ctx.merge_request;
        if mr.state != MergeRequestState::Opened {
            return Ok(self
                .kind()
                .failed("not_open", [("state", json!(mr.state.to_string()))]));
        }
        if mr.target_branch_sha.is_none() {
            return Ok(self.kind().failed(
                "target_branch_missing",
                [("target_branch", json!(mr.target_branch))],
            ));
        }
        Ok(self.kind().success())
    }
}

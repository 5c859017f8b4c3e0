//! Resolvable discussions must be resolved

use super::{CacheKey, CheckContext, CheckKind, CheckResult, MergeCheck};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::json;

#[derive(Debug, Clone, Copy, Default)]
pub struct DiscussionsCheck;

#[async_trait]
impl MergeCheck for DiscussionsCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Discussions
    }

    fn cache_key(&self, ctx: &CheckContext<'_>) -> CacheKey {
        let updated_at = ctx.merge_request.updated_at.timestamp_micros().to_string();
        CacheKey::new(ctx, self.kind(), &[&updated_at])
    }

    fn skip(&self, ctx: &CheckContext<'_>) -> bool {
        !ctx.settings.only_allow_merge_if_all_discussions_are_resolved
            || ctx.options.skip_discussions_check
    }

    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckResult> {
        let unresolved = ctx.platform.unresolved_discussions(ctx.merge_request).await?;
        if unresolved.is_empty() {
            return Ok(self.kind().success());
        }
        Ok(self.kind().failed(
            "discussions_not_resolved",
            [
                ("unresolved_count", json!(unresolved.len())),
                ("unresolved_discussion_ids", json!(unresolved)),
            ],
        ))
    }
}

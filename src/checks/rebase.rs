//! Source branch must contain the target head when the merge method needs it

use super::{CacheKey, CheckContext, CheckKind, CheckResult, MergeCheck};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::json;

/// Blocks when fast-forward is required and the source is behind; only
/// warns for plain merge commits.
#[derive(Debug, Clone, Copy, Default)]
pub struct RebaseCheck;

#[async_trait]
impl MergeCheck for RebaseCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Rebase
    }

    fn cache_key(&self, ctx: &CheckContext<'_>) -> CacheKey {
        let mr = ctx.merge_request;
        CacheKey::new(
            ctx,
            self.kind(),
            &[&mr.diff_head_sha, mr.target_branch_sha.as_deref().unwrap_or("-")],
        )
    }

    fn skip(&self, ctx: &CheckContext<'_>) -> bool {
        ctx.options.skip_rebase_check
    }

    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckResult> {
        if ctx.merge_request.target_branch_sha.is_none() {
            // Nothing to compare against
            return Ok(self.kind().failed(
                "target_branch_missing",
                [("target_branch", json!(ctx.merge_request.target_branch))],
            ));
        }

        let behind = ctx.platform.commits_behind_target(ctx.merge_request).await?;
        if behind == 0 {
            return Ok(self.kind().success());
        }

        let details = [("commits_behind", json!(behind))];
        if ctx.settings.merge_method.requires_up_to_date_source() {
            Ok(self.kind().failed("need_rebase", details))
        } else {
            Ok(self.kind().warning("behind_target", details))
        }
    }
}

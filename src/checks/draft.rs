//! Merge request must not be a draft

use super::{CacheKey, CheckContext, CheckKind, CheckResult, MergeCheck, NO_DETAILS};
use crate::error::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, Default)]
pub struct DraftCheck;

#[async_trait]
impl MergeCheck for DraftCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::Draft
    }

    fn cache_key(&self, ctx: &CheckContext<'_>) -> CacheKey {
        let updated_at = ctx.merge_request.updated_at.timestamp_micros().to_string();
        CacheKey::new(ctx, self.kind(), &[&updated_at])
    }

    fn skip(&self, ctx: &CheckContext<'_>) -> bool {
        ctx.options.skip_draft_check
    }

    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckResult> {
        if ctx.merge_request.is_draft {
            Ok(self.kind().failed("draft_status", NO_DETAILS))
        } else {
            Ok(self.kind().success())
        }
    }
}

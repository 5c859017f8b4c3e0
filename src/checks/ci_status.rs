//! Head pipeline must have succeeded

use super::{CacheKey, CheckContext, CheckKind, CheckResult, MergeCheck, NO_DETAILS};
use crate::error::Result;
use crate::types::PipelineStatus;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

/// Applies only when the project requires a successful pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct CiStatusCheck;

#[async_trait]
impl MergeCheck for CiStatusCheck {
    fn kind(&self) -> CheckKind {
        CheckKind::CiStatus
    }

    fn cache_key(&self, ctx: &CheckContext<'_>) -> CacheKey {
        let mr = ctx.merge_request;
        // Retrying a job keeps the pipeline id but bumps status and updated_at
        let pipeline = mr.head_pipeline.as_ref().map_or_else(
            || "none".to_string(),
            |p| {
                format!(
                    "{}:{}:{}",
                    p.id,
                    p.status.map_or_else(|| "-".to_string(), |s| s.to_string()),
                    p.updated_at.map_or(0, |t| t.timestamp_micros())
                )
            },
        );
        CacheKey::new(ctx, self.kind(), &[&pipeline, &mr.diff_head_sha])
    }

    fn skip(&self, ctx: &CheckContext<'_>) -> bool {
        !ctx.settings.only_allow_merge_if_pipeline_succeeds || ctx.options.skip_ci_check
    }

    async fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckResult> {
        let mr = ctx.merge_request;
        let Some(pipeline) = mr.head_pipeline.as_ref() else {
            return Ok(self.kind().failed("no_pipeline", NO_DETAILS));
        };

        let status = ctx.platform.pipeline_status(mr, pipeline.id).await?;
        debug!(mr_iid = mr.iid, pipeline_id = pipeline.id, %status, "pipeline status");

        let details = [
            ("pipeline_id", json!(pipeline.id)),
            ("pipeline_status", json!(status.to_string())),
        ];
        Ok(match status {
            PipelineStatus::Success => self.kind().success(),
            PipelineStatus::Skipped if ctx.settings.allow_merge_on_skipped_pipeline => {
                self.kind().success()
            }
            s if s.is_in_progress() => self.kind().checking("pipeline_running", details),
            _ => self.kind().failed("pipeline_not_successful", details),
        })
    }
}

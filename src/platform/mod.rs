//! Platform services backing the mergeability checks
//!
//! The checks never talk to Git, CI or the review database directly. They
//! ask a `MergeRequestPlatform`, which keeps the engine testable and lets the
//! same checks run against any forge that can answer these questions.

mod gitlab;

pub use gitlab::{DEFAULT_TIMEOUT_SECS, GitLabService};

use crate::error::Result;
use crate::types::{
    ApprovalState, ConflictStatus, MergeRequest, PipelineStatus, PlatformConfig, ProjectSettings,
};
use async_trait::async_trait;

/// Read-only queries the mergeability checks depend on
#[async_trait]
pub trait MergeRequestPlatform: Send + Sync {
    /// Fetch a fresh snapshot of a merge request
    async fn get_merge_request(&self, iid: u64) -> Result<MergeRequest>;

    /// Fetch the project settings that enable or disable checks
    async fn get_project_settings(&self) -> Result<ProjectSettings>;

    /// Does the merge request conflict with its target as of its diff head?
    async fn conflict_status(&self, mr: &MergeRequest) -> Result<ConflictStatus>;

    /// Status of the given pipeline
    async fn pipeline_status(&self, mr: &MergeRequest, pipeline_id: u64)
    -> Result<PipelineStatus>;

    /// Ids of resolvable discussions that are still unresolved
    async fn unresolved_discussions(&self, mr: &MergeRequest) -> Result<Vec<String>>;

    /// Approval rule evaluation
    async fn approval_state(&self, mr: &MergeRequest) -> Result<ApprovalState>;

    /// Number of target branch commits missing from the source branch
    async fn commits_behind_target(&self, mr: &MergeRequest) -> Result<u64>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}

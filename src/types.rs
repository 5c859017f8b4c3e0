//! Core types for mr-mergeability

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Merge request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeRequestState {
    /// Open and reviewable
    Opened,
    /// Closed without merging
    Closed,
    /// Already merged
    Merged,
    /// Locked while a merge is in flight
    Locked,
}

impl std::fmt::Display for MergeRequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Opened => write!(f, "opened"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
            Self::Locked => write!(f, "locked"),
        }
    }
}

/// Reference to the head pipeline of a merge request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRef {
    /// Pipeline id
    pub id: u64,
    /// Commit the pipeline ran for
    pub sha: String,
    /// Status as embedded in the merge request, if reported
    pub status: Option<PipelineStatus>,
    /// Bumped when any job of the pipeline changes (e.g. a retried job)
    pub updated_at: Option<DateTime<Utc>>,
}

/// Snapshot of a merge request at the start of an evaluation pass
///
/// Every cache discriminator a check needs is read from this snapshot, so
/// the snapshot must be fetched fresh for each evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Numeric project id
    pub project_id: u64,
    /// Project-scoped merge request number
    pub iid: u64,
    /// Title (for display)
    pub title: String,
    /// Current state
    pub state: MergeRequestState,
    /// Whether the merge request is marked as draft
    pub is_draft: bool,
    /// Source branch name
    pub source_branch: String,
    /// Target branch name
    pub target_branch: String,
    /// Head commit of the current diff
    pub diff_head_sha: String,
    /// Merge base of the current diff
    pub diff_base_sha: Option<String>,
    /// Current head of the target branch
    pub target_branch_sha: Option<String>,
    /// Latest pipeline for the source branch head, if any
    pub head_pipeline: Option<PipelineRef>,
    /// Bumped on every mutation of the merge request
    pub updated_at: DateTime<Utc>,
    /// Web URL
    pub web_url: String,
}

/// How the project merges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectMergeMethod {
    /// Merge commit
    #[default]
    Merge,
    /// Merge commit, but only when fast-forward is possible
    RebaseMerge,
    /// Fast-forward only
    FastForward,
}

impl ProjectMergeMethod {
    /// Whether the source branch must contain the target branch head
    pub const fn requires_up_to_date_source(self) -> bool {
        matches!(self, Self::RebaseMerge | Self::FastForward)
    }
}

/// Project configuration relevant to mergeability
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Merge is only allowed after a successful pipeline
    pub only_allow_merge_if_pipeline_succeeds: bool,
    /// A skipped pipeline counts as successful
    pub allow_merge_on_skipped_pipeline: bool,
    /// All resolvable discussions must be resolved before merge
    pub only_allow_merge_if_all_discussions_are_resolved: bool,
    /// Number of approvals required (0 disables the approval rule)
    pub approvals_required: u32,
    /// Merge method configured for the project
    pub merge_method: ProjectMergeMethod,
}

/// Status of a CI pipeline as reported by the CI collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// Created, no job picked up yet
    Created,
    /// Waiting for a resource group
    WaitingForResource,
    /// Runner is preparing the environment
    Preparing,
    /// Queued for a runner
    Pending,
    /// Jobs are running
    Running,
    /// Every required job passed
    Success,
    /// A required job failed
    Failed,
    /// Canceled by a user or a newer pipeline
    Canceled,
    /// No job ran
    Skipped,
    /// Blocked on a manual job
    Manual,
    /// Delayed until a scheduled time
    Scheduled,
    /// Anything the platform reports that we do not recognise
    #[serde(other)]
    Unknown,
}

impl PipelineStatus {
    /// Whether the pipeline has not reached a terminal state yet
    pub const fn is_in_progress(self) -> bool {
        matches!(
            self,
            Self::Created
                | Self::WaitingForResource
                | Self::Preparing
                | Self::Pending
                | Self::Running
                | Self::Scheduled
        )
    }
}

impl std::fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::WaitingForResource => "waiting_for_resource",
            Self::Preparing => "preparing",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Skipped => "skipped",
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Result of asking the Git collaborator about conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictStatus {
    /// Source merges cleanly into target
    NoConflicts,
    /// Source conflicts with target
    HasConflicts,
    /// Conflict detection has not finished for the current diff head
    Unchecked,
}

/// Approval state of a merge request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalState {
    /// Approvals required by the rules in effect
    pub approvals_required: u32,
    /// Approvals still missing
    pub approvals_left: u32,
}

impl ApprovalState {
    /// Whether every approval rule is satisfied
    pub const fn is_approved(&self) -> bool {
        self.approvals_left == 0
    }
}

/// Platform configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Full project path (`group/subgroup/project`)
    pub project_path: String,
    /// Custom host (None for gitlab.com)
    pub host: Option<String>,
}

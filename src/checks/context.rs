//! Per-evaluation inputs shared by every check

use crate::platform::MergeRequestPlatform;
use crate::types::{MergeRequest, ProjectSettings};

/// Request-scoped evaluation options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct EvaluateOptions {
    /// Ignore cached results (fresh results are still written back)
    pub recheck: bool,
    /// Evaluate every check even after a failure
    pub execute_all: bool,
    /// Treat the CI check as not applicable (e.g. merge when pipeline succeeds)
    pub skip_ci_check: bool,
    /// Treat the discussions check as not applicable
    pub skip_discussions_check: bool,
    /// Treat the approvals check as not applicable
    pub skip_approvals_check: bool,
    /// Treat the draft check as not applicable
    pub skip_draft_check: bool,
    /// Treat the rebase check as not applicable
    pub skip_rebase_check: bool,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            recheck: false,
            execute_all: true,
            skip_ci_check: false,
            skip_discussions_check: false,
            skip_approvals_check: false,
            skip_draft_check: false,
            skip_rebase_check: false,
        }
    }
}

/// Everything a check may look at while evaluating one merge request
#[derive(Clone, Copy)]
pub struct CheckContext<'a> {
    pub merge_request: &'a MergeRequest,
    pub settings: &'a ProjectSettings,
    pub options: &'a EvaluateOptions,
    pub platform: &'a dyn MergeRequestPlatform,
}

impl std::fmt::Debug for CheckContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckContext")
            .field("project_id", &self.merge_request.project_id)
            .field("iid", &self.merge_request.iid)
            .field("options", self.options)
            .finish_non_exhaustive()
    }
}

//! Mock platform service for testing

#![allow(dead_code)]

use async_trait::async_trait;
use mr_mergeability::error::{Error, Result};
use mr_mergeability::platform::MergeRequestPlatform;
use mr_mergeability::types::{
    ApprovalState, ConflictStatus, MergeRequest, PipelineStatus, PlatformConfig, ProjectSettings,
};
use std::sync::Mutex;

/// Hand-written mock of `MergeRequestPlatform`
///
/// Features:
/// - Configurable answers per query (defaults describe a mergeable MR)
/// - Call tracking by merge request IID
/// - Error injection per query
pub struct MockPlatform {
    config: PlatformConfig,
    // Responses
    merge_request: Mutex<Option<MergeRequest>>,
    settings: Mutex<ProjectSettings>,
    conflict_status: Mutex<ConflictStatus>,
    pipeline_status: Mutex<PipelineStatus>,
    unresolved: Mutex<Vec<String>>,
    approvals: Mutex<ApprovalState>,
    commits_behind: Mutex<u64>,
    // Call tracking
    conflict_calls: Mutex<Vec<u64>>,
    pipeline_calls: Mutex<Vec<u64>>,
    discussion_calls: Mutex<Vec<u64>>,
    approval_calls: Mutex<Vec<u64>>,
    rebase_calls: Mutex<Vec<u64>>,
    // Error injection
    error_on_conflicts: Mutex<Option<String>>,
    error_on_pipeline: Mutex<Option<String>>,
    error_on_discussions: Mutex<Option<String>>,
    error_on_approvals: Mutex<Option<String>>,
    error_on_rebase: Mutex<Option<String>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            config: PlatformConfig {
                project_path: "group/project".to_string(),
                host: None,
            },
            merge_request: Mutex::new(None),
            settings: Mutex::new(ProjectSettings::default()),
            conflict_status: Mutex::new(ConflictStatus::NoConflicts),
            pipeline_status: Mutex::new(PipelineStatus::Success),
            unresolved: Mutex::new(Vec::new()),
            approvals: Mutex::new(ApprovalState {
                approvals_required: 1,
                approvals_left: 0,
            }),
            commits_behind: Mutex::new(0),
            conflict_calls: Mutex::new(Vec::new()),
            pipeline_calls: Mutex::new(Vec::new()),
            discussion_calls: Mutex::new(Vec::new()),
            approval_calls: Mutex::new(Vec::new()),
            rebase_calls: Mutex::new(Vec::new()),
            error_on_conflicts: Mutex::new(None),
            error_on_pipeline: Mutex::new(None),
            error_on_discussions: Mutex::new(None),
            error_on_approvals: Mutex::new(None),
            error_on_rebase: Mutex::new(None),
        }
    }

    // === Response setup ===

    pub fn set_merge_request(&self, mr: MergeRequest) {
        *self.merge_request.lock().unwrap() = Some(mr);
    }

    pub fn set_settings(&self, settings: ProjectSettings) {
        *self.settings.lock().unwrap() = settings;
    }

    pub fn set_conflict_status(&self, status: ConflictStatus) {
        *self.conflict_status.lock().unwrap() = status;
    }

    pub fn set_pipeline_status(&self, status: PipelineStatus) {
        *self.pipeline_status.lock().unwrap() = status;
    }

    pub fn set_unresolved(&self, ids: &[&str]) {
        *self.unresolved.lock().unwrap() = ids.iter().map(|s| (*s).to_string()).collect();
    }

    pub fn set_approvals_left(&self, left: u32) {
        self.approvals.lock().unwrap().approvals_left = left;
    }

    pub fn set_commits_behind(&self, behind: u64) {
        *self.commits_behind.lock().unwrap() = behind;
    }

    // === Error injection ===

    pub fn fail_conflicts(&self, msg: &str) {
        *self.error_on_conflicts.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_pipeline(&self, msg: &str) {
        *self.error_on_pipeline.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_discussions(&self, msg: &str) {
        *self.error_on_discussions.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_approvals(&self, msg: &str) {
        *self.error_on_approvals.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_rebase(&self, msg: &str) {
        *self.error_on_rebase.lock().unwrap() = Some(msg.to_string());
    }

    // === Call inspection ===

    pub fn conflict_calls(&self) -> usize {
        self.conflict_calls.lock().unwrap().len()
    }

    pub fn pipeline_calls(&self) -> usize {
        self.pipeline_calls.lock().unwrap().len()
    }

    pub fn discussion_calls(&self) -> usize {
        self.discussion_calls.lock().unwrap().len()
    }

    pub fn approval_calls(&self) -> usize {
        self.approval_calls.lock().unwrap().len()
    }

    pub fn rebase_calls(&self) -> usize {
        self.rebase_calls.lock().unwrap().len()
    }

    /// Total number of collaborator queries made by checks
    pub fn total_calls(&self) -> usize {
        self.conflict_calls()
            + self.pipeline_calls()
            + self.discussion_calls()
            + self.approval_calls()
            + self.rebase_calls()
    }

    fn injected(slot: &Mutex<Option<String>>) -> Result<()> {
        match slot.lock().unwrap().as_ref() {
            Some(msg) => Err(Error::Platform(msg.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MergeRequestPlatform for MockPlatform {
    async fn get_merge_request(&self, iid: u64) -> Result<MergeRequest> {
        self.merge_request
            .lock()
            .unwrap()
            .clone()
            .filter(|mr| mr.iid == iid)
            .ok_or_else(|| Error::GitLabApi(format!("404 merge request !{iid}")))
    }

    async fn get_project_settings(&self) -> Result<ProjectSettings> {
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn conflict_status(&self, mr: &MergeRequest) -> Result<ConflictStatus> {
        self.conflict_calls.lock().unwrap().push(mr.iid);
        Self::injected(&self.error_on_conflicts)?;
        Ok(*self.conflict_status.lock().unwrap())
    }

    async fn pipeline_status(&self, mr: &MergeRequest, _pipeline_id: u64) -> Result<PipelineStatus> {
        self.pipeline_calls.lock().unwrap().push(mr.iid);
        Self::injected(&self.error_on_pipeline)?;
        Ok(*self.pipeline_status.lock().unwrap())
    }

    async fn unresolved_discussions(&self, mr: &MergeRequest) -> Result<Vec<String>> {
        self.discussion_calls.lock().unwrap().push(mr.iid);
        Self::injected(&self.error_on_discussions)?;
        Ok(self.unresolved.lock().unwrap().clone())
    }

    async fn approval_state(&self, mr: &MergeRequest) -> Result<ApprovalState> {
        self.approval_calls.lock().unwrap().push(mr.iid);
        Self::injected(&self.error_on_approvals)?;
        Ok(*self.approvals.lock().unwrap())
    }

    async fn commits_behind_target(&self, mr: &MergeRequest) -> Result<u64> {
        self.rebase_calls.lock().unwrap().push(mr.iid);
        Self::injected(&self.error_on_rebase)?;
        Ok(*self.commits_behind.lock().unwrap())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

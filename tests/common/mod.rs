//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::MockPlatform;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mr_mergeability::cache::{CacheBackend, MemoryBackend};
use mr_mergeability::checks::{CheckKind, CheckList};
use mr_mergeability::error::{Error, Result};
use mr_mergeability::runner::MergeabilityCheckRunner;
use mr_mergeability::store::ResultsStore;
use mr_mergeability::types::{
    MergeRequest, MergeRequestState, PipelineRef, PipelineStatus, ProjectMergeMethod,
    ProjectSettings,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Open, non-draft merge request with a head pipeline
pub fn make_mr(iid: u64) -> MergeRequest {
    MergeRequest {
        project_id: 7,
        iid,
        title: format!("Feature {iid}"),
        state: MergeRequestState::Opened,
        is_draft: false,
        source_branch: format!("feature-{iid}"),
        target_branch: "main".to_string(),
        diff_head_sha: "abc123".to_string(),
        diff_base_sha: Some("base000".to_string()),
        target_branch_sha: Some("main000".to_string()),
        head_pipeline: Some(PipelineRef {
            id: 42,
            sha: "abc123".to_string(),
            status: Some(PipelineStatus::Running),
            updated_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 11, 55, 0).unwrap()),
        }),
        updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        web_url: format!("https://gitlab.com/group/project/-/merge_requests/{iid}"),
    }
}

/// Project settings that enable every conditional check
pub fn strict_settings() -> ProjectSettings {
    ProjectSettings {
        only_allow_merge_if_pipeline_succeeds: true,
        allow_merge_on_skipped_pipeline: false,
        only_allow_merge_if_all_discussions_are_resolved: true,
        approvals_required: 1,
        merge_method: ProjectMergeMethod::Merge,
    }
}

/// Memory backend that counts reads and writes
#[derive(Default)]
pub struct CountingBackend {
    inner: MemoryBackend,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheBackend for CountingBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl).await
    }
}

/// Backend whose every operation fails
pub struct FailingBackend;

#[async_trait]
impl CacheBackend for FailingBackend {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Err(Error::Cache("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<()> {
        Err(Error::Cache("connection refused".to_string()))
    }
}

/// Runner over `kinds` with a counting in-memory cache
pub fn counting_runner(kinds: &[CheckKind]) -> (MergeabilityCheckRunner, Arc<CountingBackend>) {
    let backend = Arc::new(CountingBackend::new());
    let store = ResultsStore::new(backend.clone());
    let checks = CheckList::new(kinds.to_vec()).unwrap();
    (MergeabilityCheckRunner::new(checks, store), backend)
}

//! GitLab platform service implementation

use crate::error::{Error, Result};
use crate::platform::MergeRequestPlatform;
use crate::types::{
    ApprovalState, ConflictStatus, MergeRequest, MergeRequestState, PipelineRef, PipelineStatus,
    PlatformConfig, ProjectMergeMethod, ProjectSettings,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Page size for list endpoints
const PER_PAGE: usize = 100;

/// GitLab service using reqwest
pub struct GitLabService {
    client: Client,
    token: String,
    base_url: String,
    config: PlatformConfig,
}

#[derive(Deserialize)]
struct DiffRefs {
    base_sha: Option<String>,
    head_sha: Option<String>,
}

#[derive(Deserialize)]
struct HeadPipeline {
    id: u64,
    sha: String,
    status: Option<PipelineStatus>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct ApiMergeRequest {
    iid: u64,
    project_id: u64,
    title: String,
    state: String, // "opened", "closed", "merged", "locked"
    #[serde(default)]
    draft: bool,
    source_branch: String,
    target_branch: String,
    sha: Option<String>,
    diff_refs: Option<DiffRefs>,
    head_pipeline: Option<HeadPipeline>,
    updated_at: DateTime<Utc>,
    web_url: String,
    #[serde(default)]
    has_conflicts: bool,
    merge_status: Option<String>, // "can_be_merged", "cannot_be_merged", "checking", "unchecked", ...
}

#[derive(Deserialize)]
struct ApiProject {
    #[serde(default)]
    only_allow_merge_if_pipeline_succeeds: bool,
    #[serde(default)]
    allow_merge_on_skipped_pipeline: Option<bool>,
    #[serde(default)]
    only_allow_merge_if_all_discussions_are_resolved: bool,
    #[serde(default)]
    approvals_before_merge: Option<u32>,
    merge_method: Option<String>, // "merge", "rebase_merge", "ff"
}

#[derive(Deserialize)]
struct ApiBranch {
    commit: ApiCommit,
}

#[derive(Deserialize)]
struct ApiCommit {
    id: String,
}

#[derive(Deserialize)]
struct ApiPipeline {
    status: PipelineStatus,
}

#[derive(Deserialize)]
struct ApiNote {
    #[serde(default)]
    resolvable: bool,
    #[serde(default)]
    resolved: bool,
}

#[derive(Deserialize)]
struct ApiDiscussion {
    id: String,
    #[serde(default)]
    notes: Vec<ApiNote>,
}

impl ApiDiscussion {
    fn is_unresolved(&self) -> bool {
        self.notes.iter().any(|n| n.resolvable && !n.resolved)
    }
}

#[derive(Deserialize)]
struct ApiApprovals {
    #[serde(default)]
    approvals_required: u32,
    #[serde(default)]
    approvals_left: u32,
}

#[derive(Deserialize)]
struct ApiCompare {
    #[serde(default)]
    commits: Vec<ApiCommit>,
}

fn parse_state(state: &str) -> MergeRequestState {
    match state {
        "opened" => MergeRequestState::Opened,
        "merged" => MergeRequestState::Merged,
        "locked" => MergeRequestState::Locked,
        _ => MergeRequestState::Closed,
    }
}

fn parse_merge_method(method: Option<&str>) -> ProjectMergeMethod {
    match method {
        Some("ff") => ProjectMergeMethod::FastForward,
        Some("rebase_merge") => ProjectMergeMethod::RebaseMerge,
        _ => ProjectMergeMethod::Merge,
    }
}

fn parse_conflict_status(has_conflicts: bool, merge_status: Option<&str>) -> ConflictStatus {
    match merge_status {
        Some("checking" | "unchecked" | "cannot_be_merged_recheck" | "cannot_be_merged_rechecking") => {
            ConflictStatus::Unchecked
        }
        _ if has_conflicts => ConflictStatus::HasConflicts,
        Some("cannot_be_merged") => ConflictStatus::HasConflicts,
        _ => ConflictStatus::NoConflicts,
    }
}

impl GitLabService {
    /// Create a new GitLab service for `project_path` (`group/project`)
    pub fn new(
        token: String,
        project_path: String,
        host: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let host = host.unwrap_or_else(|| "gitlab.com".to_string());

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::GitLabApi(format!("failed to create HTTP client: {e}")))?;

        let config_host = if host == "gitlab.com" {
            None
        } else {
            Some(host.clone())
        };

        Ok(Self {
            client,
            token,
            base_url: format!("https://{host}"),
            config: PlatformConfig {
                project_path,
                host: config_host,
            },
        })
    }

    /// Point the service at another scheme/host, e.g. a local test server
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v4{}", self.base_url, path)
    }

    fn encoded_project(&self) -> String {
        urlencoding::encode(&self.config.project_path).into_owned()
    }

    fn mr_url(&self, iid: u64, suffix: &str) -> String {
        self.api_url(&format!(
            "/projects/{}/merge_requests/{}{}",
            self.encoded_project(),
            iid,
            suffix
        ))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let value = self
            .client
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .query(query)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;
        Ok(value)
    }

    async fn fetch_merge_request(&self, iid: u64, recheck: bool) -> Result<ApiMergeRequest> {
        let query = if recheck {
            vec![("with_merge_status_recheck", "true".to_string())]
        } else {
            vec![]
        };
        self.get_json(&self.mr_url(iid, ""), &query).await
    }

    /// Head of the target branch; `None` only when the branch does not exist
    async fn target_branch_sha(&self, branch: &str) -> Result<Option<String>> {
        let url = self.api_url(&format!(
            "/projects/{}/repository/branches/{}",
            self.encoded_project(),
            urlencoding::encode(branch)
        ));
        let response = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(branch, "target branch does not exist");
            return Ok(None);
        }

        let head: ApiBranch = response
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;
        Ok(Some(head.commit.id))
    }
}

#[async_trait]
impl MergeRequestPlatform for GitLabService {
    async fn get_merge_request(&self, iid: u64) -> Result<MergeRequest> {
        debug!(mr_iid = iid, "getting MR");
        let mr = self.fetch_merge_request(iid, false).await?;
        let target_branch_sha = self.target_branch_sha(&mr.target_branch).await?;

        let (diff_base_sha, diff_head_sha) = match mr.diff_refs {
            Some(refs) => (refs.base_sha, refs.head_sha),
            None => (None, None),
        };
        let diff_head_sha = diff_head_sha
            .or(mr.sha)
            .ok_or_else(|| Error::GitLabApi(format!("MR !{iid} has no diff head")))?;

        let snapshot = MergeRequest {
            project_id: mr.project_id,
            iid: mr.iid,
            title: mr.title,
            state: parse_state(&mr.state),
            is_draft: mr.draft,
            source_branch: mr.source_branch,
            target_branch: mr.target_branch,
            diff_head_sha,
            diff_base_sha,
            target_branch_sha,
            head_pipeline: mr.head_pipeline.map(|p| PipelineRef {
                id: p.id,
                sha: p.sha,
                status: p.status,
                updated_at: p.updated_at,
            }),
            updated_at: mr.updated_at,
            web_url: mr.web_url,
        };

        debug!(mr_iid = iid, state = %snapshot.state, sha = %snapshot.diff_head_sha, "got MR");
        Ok(snapshot)
    }

    async fn get_project_settings(&self) -> Result<ProjectSettings> {
        debug!(project = %self.config.project_path, "getting project settings");
        let url = self.api_url(&format!("/projects/{}", self.encoded_project()));
        let project: ApiProject = self.get_json(&url, &[]).await?;

        Ok(ProjectSettings {
            only_allow_merge_if_pipeline_succeeds: project.only_allow_merge_if_pipeline_succeeds,
            allow_merge_on_skipped_pipeline: project.allow_merge_on_skipped_pipeline.unwrap_or(false),
            only_allow_merge_if_all_discussions_are_resolved: project
                .only_allow_merge_if_all_discussions_are_resolved,
            approvals_required: project.approvals_before_merge.unwrap_or(0),
            merge_method: parse_merge_method(project.merge_method.as_deref()),
        })
    }

    async fn conflict_status(&self, mr: &MergeRequest) -> Result<ConflictStatus> {
        debug!(mr_iid = mr.iid, "checking conflicts");
        // Ask GitLab to recompute so a stale merge status is not trusted
        let api_mr = self.fetch_merge_request(mr.iid, true).await?;
        Ok(parse_conflict_status(
            api_mr.has_conflicts,
            api_mr.merge_status.as_deref(),
        ))
    }

    async fn pipeline_status(&self, mr: &MergeRequest, pipeline_id: u64) -> Result<PipelineStatus> {
        debug!(mr_iid = mr.iid, pipeline_id, "getting pipeline status");
        let url = self.api_url(&format!(
            "/projects/{}/pipelines/{}",
            self.encoded_project(),
            pipeline_id
        ));
        let pipeline: ApiPipeline = self.get_json(&url, &[]).await?;
        Ok(pipeline.status)
    }

    async fn unresolved_discussions(&self, mr: &MergeRequest) -> Result<Vec<String>> {
        debug!(mr_iid = mr.iid, "listing MR discussions");
        let url = self.mr_url(mr.iid, "/discussions");

        let mut unresolved = Vec::new();
        let mut page = 1_usize;
        loop {
            let discussions: Vec<ApiDiscussion> = self
                .get_json(
                    &url,
                    &[("per_page", PER_PAGE.to_string()), ("page", page.to_string())],
                )
                .await?;
            let count = discussions.len();
            unresolved.extend(
                discussions
                    .into_iter()
                    .filter(ApiDiscussion::is_unresolved)
                    .map(|d| d.id),
            );
            if count < PER_PAGE {
                break;
            }
            page += 1;
        }

        debug!(mr_iid = mr.iid, count = unresolved.len(), "unresolved discussions");
        Ok(unresolved)
    }

    async fn approval_state(&self, mr: &MergeRequest) -> Result<ApprovalState> {
        debug!(mr_iid = mr.iid, "getting MR approvals");
        let approvals: ApiApprovals = self.get_json(&self.mr_url(mr.iid, "/approvals"), &[]).await?;
        Ok(ApprovalState {
            approvals_required: approvals.approvals_required,
            approvals_left: approvals.approvals_left,
        })
    }

    async fn commits_behind_target(&self, mr: &MergeRequest) -> Result<u64> {
        debug!(mr_iid = mr.iid, "comparing source with target");
        let url = self.api_url(&format!(
            "/projects/{}/repository/compare",
            self.encoded_project()
        ));
        let compare: ApiCompare = self
            .get_json(
                &url,
                &[
                    ("from", mr.diff_head_sha.clone()),
                    ("to", mr.target_branch.clone()),
                    ("straight", "true".to_string()),
                ],
            )
            .await?;
        Ok(compare.commits.len() as u64)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

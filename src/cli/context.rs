//! Shared command context for CLI commands

use mr_mergeability::auth::get_gitlab_auth;
use mr_mergeability::config::Config;
use mr_mergeability::error::Result;
use mr_mergeability::platform::{GitLabService, MergeRequestPlatform};
use mr_mergeability::runner::MergeabilityCheckRunner;
use std::path::Path;
use tracing::debug;

/// Everything a command needs to evaluate merge requests of one project
///
/// Setup order matters: the check list is validated before any credentials
/// are looked up, so a bad config fails without touching the network.
pub struct CommandContext {
    /// Runner wired to the configured checks and cache
    pub runner: MergeabilityCheckRunner,
    /// GitLab service for the project
    pub platform: Box<dyn MergeRequestPlatform>,
}

impl CommandContext {
    /// Load config, build the runner, resolve auth and create the service
    pub async fn new(config_path: Option<&Path>, project: &str) -> Result<Self> {
        let config = Config::load(config_path)?;
        let runner = config.runner()?;

        let host = config.gitlab.host.as_deref();
        let auth = get_gitlab_auth(host, config.gitlab.token_env.as_deref()).await?;
        debug!(source = ?auth.source, host = %auth.host, "resolved GitLab auth");

        let platform = GitLabService::new(
            auth.token,
            project.to_string(),
            Some(auth.host),
            config.gitlab.timeout(),
        )?;

        Ok(Self {
            runner,
            platform: Box::new(platform),
        })
    }
}

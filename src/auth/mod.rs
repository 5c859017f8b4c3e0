//! Authentication for GitLab
//!
//! Supports environment variables and the `glab` CLI.

use crate::error::{Error, Result};
use tokio::process::Command;
use tracing::debug;

/// Environment variables consulted after the configured one
const TOKEN_ENV_VARS: [&str; 2] = ["GITLAB_TOKEN", "GL_TOKEN"];

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (glab)
    Cli,
    /// Token from environment variable
    EnvVar,
}

/// Resolved GitLab credentials
#[derive(Clone)]
pub struct GitLabAuthConfig {
    /// Personal or project access token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
    /// Host the token is for
    pub host: String,
}

impl std::fmt::Debug for GitLabAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabAuthConfig")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .field("host", &self.host)
            .finish()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Look up a token in `preferred` (if any), then the standard variables
fn token_from_env(preferred: Option<&str>) -> Option<(String, &str)> {
    preferred
        .into_iter()
        .chain(TOKEN_ENV_VARS)
        .find_map(|name| non_empty_env(name).map(|token| (token, name)))
}

/// Resolve GitLab credentials for `host`
///
/// Order: `token_env`, then `GITLAB_TOKEN` / `GL_TOKEN`, then
/// `glab config get token --host <host>`.
pub async fn get_gitlab_auth(host: Option<&str>, token_env: Option<&str>) -> Result<GitLabAuthConfig> {
    let host = host.unwrap_or("gitlab.com").to_string();

    if let Some((token, var)) = token_from_env(token_env) {
        debug!(var, host = %host, "using GitLab token from environment");
        return Ok(GitLabAuthConfig {
            token,
            source: AuthSource::EnvVar,
            host,
        });
    }

    debug!(host = %host, "no token in environment, asking glab");
    let output = Command::new("glab")
        .args(["config", "get", "token", "--host", &host])
        .output()
        .await;

    match output {
        Ok(out) if out.status.success() => {
            let token = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if token.is_empty() {
                return Err(no_token_error(&host));
            }
            Ok(GitLabAuthConfig {
                token,
                source: AuthSource::Cli,
                host,
            })
        }
        Ok(out) => {
            debug!(status = %out.status, "glab did not return a token");
            Err(no_token_error(&host))
        }
        Err(e) => {
            debug!(error = %e, "failed to run glab");
            Err(no_token_error(&host))
        }
    }
}

fn no_token_error(host: &str) -> Error {
    Error::Auth(format!(
        "no GitLab token for {host}: set GITLAB_TOKEN or run 'glab auth login --hostname {host}'"
    ))
}

//! GitHub integration — commit status updates.

use serde::Serialize;

use crate::config::{RelayConfig, SecretToken};
use crate::error::RelayError;
use crate::models::commit::Repository;
use crate::models::status::CommitState;

const USER_AGENT: &str = "codepipeline-status";
const API_VERSION: &str = "2022-11-28";
/// GitHub rejects longer status descriptions.
const MAX_DESCRIPTION_CHARS: usize = 140;

/// Body of `POST /repos/{owner}/{repo}/statuses/{sha}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub state: CommitState,
    pub target_url: String,
    pub description: String,
    pub context: String,
}

impl StatusUpdate {
    /// Status for one pipeline execution, linking back to its console page.
    pub fn for_execution(
        config: &RelayConfig,
        pipeline: &str,
        execution_id: &str,
        state: CommitState,
    ) -> Self {
        let description = format!(
            "{}: pipeline {} {}",
            config.application_stage,
            pipeline,
            state.describe()
        );
        let target_url = format!(
            "https://{region}.console.aws.amazon.com/codesuite/codepipeline/pipelines/{pipeline}/executions/{execution_id}/timeline?region={region}",
            region = config.aws_region,
        );

        Self {
            state,
            target_url,
            description: truncate_chars(&description, MAX_DESCRIPTION_CHARS),
            context: config.status_context.clone(),
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Minimal GitHub REST client for commit statuses.
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    token: SecretToken,
}

impl GithubClient {
    pub fn new(http: reqwest::Client, api_url: &str, token: SecretToken) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Post a commit status to GitHub.
    pub async fn post_status(
        &self,
        repo: &Repository,
        sha: &str,
        update: &StatusUpdate,
    ) -> Result<(), RelayError> {
        let url = format!(
            "{}/repos/{}/{}/statuses/{sha}",
            self.api_url, repo.owner, repo.name
        );

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token.expose()))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
            .json(update)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(repo = %repo, sha, "GitHub status update failed: {} {}", status, text);
            return Err(RelayError::GithubRejected {
                status: status.as_u16(),
                body: text,
            });
        }

        tracing::info!(repo = %repo, sha, state = %update.state, "GitHub status updated");
        crate::metrics::status_posted(update.state.as_str());
        Ok(())
    }
}

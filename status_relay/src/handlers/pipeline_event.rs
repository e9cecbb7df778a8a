//! Pipeline event handler — relays one execution state change to GitHub.

use std::sync::Arc;

use serde::Serialize;

use crate::config::{EnvLookup, RelayConfig};
use crate::error::RelayError;
use crate::events::pipeline::PipelineEvent;
use crate::models::commit::CommitTarget;
use crate::models::status::CommitState;
use crate::services::github_service::{GithubClient, StatusUpdate};
use crate::services::kms_service::SecretDecryptor;
use crate::services::pipeline_service::{self, PipelineReader};

/// Result returned to the invoker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayOutcome {
    pub pipeline: String,
    pub execution_id: String,
    pub repository: String,
    pub commit: String,
    pub state: CommitState,
}

/// External collaborators of a relay invocation.
pub struct StatusRelay {
    env: Arc<EnvLookup>,
    decryptor: Arc<dyn SecretDecryptor>,
    pipelines: Arc<dyn PipelineReader>,
    http: reqwest::Client,
}

impl StatusRelay {
    pub fn new(
        env: Arc<EnvLookup>,
        decryptor: Arc<dyn SecretDecryptor>,
        pipelines: Arc<dyn PipelineReader>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            env,
            decryptor,
            pipelines,
            http,
        }
    }

    /// Handle one event: validate, configure, read the execution, notify GitHub.
    pub async fn handle(&self, event: &PipelineEvent) -> Result<RelayOutcome, RelayError> {
        crate::metrics::event_received();

        let result = self.relay(event).await;
        if let Err(e) = &result {
            tracing::error!(stage = e.stage(), "Status relay failed: {e}");
            crate::metrics::relay_failed(e.stage());
        }
        result
    }

    async fn relay(&self, event: &PipelineEvent) -> Result<RelayOutcome, RelayError> {
        let event = event.validate()?;
        tracing::info!(
            pipeline = %event.pipeline,
            execution_id = %event.execution_id,
            state = %event.state,
            "Pipeline event received"
        );

        let config = RelayConfig::load(self.env.as_ref(), self.decryptor.as_ref()).await?;

        let execution = pipeline_service::get_execution(
            self.pipelines.as_ref(),
            &event.pipeline,
            &event.execution_id,
        )
        .await?;

        let commit = pipeline_service::extract_commit(&execution, &config.source_artifact_name)
            .ok_or_else(|| RelayError::ArtifactNotFound(config.source_artifact_name.clone()))?;
        tracing::debug!(
            sha = %commit.sha,
            summary = commit.summary.as_deref().unwrap_or_default(),
            "Source commit found"
        );
        let target = CommitTarget::try_from(commit)?;

        let update = StatusUpdate::for_execution(
            &config,
            &event.pipeline,
            &event.execution_id,
            target.state,
        );
        let github = GithubClient::new(
            self.http.clone(),
            &config.github_api_url,
            config.github_token.clone(),
        );
        github
            .post_status(&target.repository, &target.sha, &update)
            .await?;

        Ok(RelayOutcome {
            pipeline: event.pipeline,
            execution_id: event.execution_id,
            repository: target.repository.full_name(),
            commit: target.sha,
            state: target.state,
        })
    }
}

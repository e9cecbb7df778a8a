//! CodePipeline execution lookup and commit extraction.

use async_trait::async_trait;
use aws_sdk_codepipeline::error::DisplayErrorContext;
use reqwest::Url;

use crate::error::RelayError;
use crate::models::commit::CommitInfo;
use crate::models::execution::{ArtifactRevision, ExecutionStatus, PipelineExecution};
use crate::models::status::CommitState;

/// Read access to pipeline executions.
#[async_trait]
pub trait PipelineReader: Send + Sync {
    /// `Ok(None)` when the service answers without execution data.
    async fn get_execution(
        &self,
        pipeline: &str,
        execution_id: &str,
    ) -> anyhow::Result<Option<PipelineExecution>>;
}

/// AWS CodePipeline backed reader.
pub struct CodePipelineReader {
    client: aws_sdk_codepipeline::Client,
}

impl CodePipelineReader {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_codepipeline::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl PipelineReader for CodePipelineReader {
    async fn get_execution(
        &self,
        pipeline: &str,
        execution_id: &str,
    ) -> anyhow::Result<Option<PipelineExecution>> {
        let output = self
            .client
            .get_pipeline_execution()
            .pipeline_name(pipeline)
            .pipeline_execution_id(execution_id)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("{}", DisplayErrorContext(e)))?;

        Ok(output
            .pipeline_execution()
            .map(|execution| to_execution(execution, pipeline, execution_id)))
    }
}

/// Convert an SDK execution, falling back to the requested identifiers.
fn to_execution(
    execution: &aws_sdk_codepipeline::types::PipelineExecution,
    pipeline: &str,
    execution_id: &str,
) -> PipelineExecution {
    let artifact_revisions = execution
        .artifact_revisions()
        .iter()
        .map(|a| ArtifactRevision {
            name: a.name().unwrap_or_default().to_string(),
            revision_id: a.revision_id().map(str::to_string),
            revision_summary: a.revision_summary().map(str::to_string),
            revision_url: a.revision_url().map(str::to_string),
        })
        .collect();

    PipelineExecution {
        pipeline_name: execution.pipeline_name().unwrap_or(pipeline).to_string(),
        execution_id: execution
            .pipeline_execution_id()
            .unwrap_or(execution_id)
            .to_string(),
        status: ExecutionStatus::parse(execution.status().map(|s| s.as_str()).unwrap_or("")),
        artifact_revisions,
    }
}

/// Fetch an execution, rejecting empty identifiers before calling the service.
pub async fn get_execution(
    reader: &dyn PipelineReader,
    pipeline: &str,
    execution_id: &str,
) -> Result<PipelineExecution, RelayError> {
    if pipeline.is_empty() {
        return Err(RelayError::MissingField("pipeline"));
    }
    if execution_id.is_empty() {
        return Err(RelayError::MissingField("execution-id"));
    }

    match reader.get_execution(pipeline, execution_id).await {
        Ok(Some(execution)) => {
            tracing::debug!(
                pipeline = %execution.pipeline_name,
                execution_id = %execution.execution_id,
                status = %execution.status,
                artifacts = execution.artifact_revisions.len(),
                "Pipeline execution loaded"
            );
            Ok(execution)
        }
        Ok(None) => Err(RelayError::MissingExecution {
            pipeline: pipeline.to_string(),
            execution_id: execution_id.to_string(),
        }),
        Err(e) => Err(RelayError::PipelineLookup {
            pipeline: pipeline.to_string(),
            execution_id: execution_id.to_string(),
            reason: format!("{e:#}"),
        }),
    }
}

/// Pull the commit out of the named source artifact.
///
/// Returns `None` when the execution has no such artifact. An unparsable
/// revision URL is not an error here; it leaves `revision_url` empty.
pub fn extract_commit(execution: &PipelineExecution, artifact_name: &str) -> Option<CommitInfo> {
    let artifact = execution.find_artifact(artifact_name)?;

    let revision_url = artifact.revision_url.as_deref().and_then(|raw| match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(url = raw, "Artifact revision url does not parse: {e}");
            None
        }
    });

    Some(CommitInfo {
        sha: artifact.revision_id.clone().unwrap_or_default(),
        summary: artifact.revision_summary.clone(),
        raw_url: artifact.revision_url.clone(),
        revision_url,
        state: CommitState::from_execution(&execution.status),
    })
}

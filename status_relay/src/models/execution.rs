//! A single CodePipeline execution, as far as the relay cares about it.

use std::fmt;

/// Execution status reported by CodePipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Cancelled,
    InProgress,
    Stopped,
    Stopping,
    Succeeded,
    Superseded,
    Failed,
    Other(String),
}

impl ExecutionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Cancelled" => ExecutionStatus::Cancelled,
            "InProgress" => ExecutionStatus::InProgress,
            "Stopped" => ExecutionStatus::Stopped,
            "Stopping" => ExecutionStatus::Stopping,
            "Succeeded" => ExecutionStatus::Succeeded,
            "Superseded" => ExecutionStatus::Superseded,
            "Failed" => ExecutionStatus::Failed,
            other => ExecutionStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ExecutionStatus::Cancelled => "Cancelled",
            ExecutionStatus::InProgress => "InProgress",
            ExecutionStatus::Stopped => "Stopped",
            ExecutionStatus::Stopping => "Stopping",
            ExecutionStatus::Succeeded => "Succeeded",
            ExecutionStatus::Superseded => "Superseded",
            ExecutionStatus::Failed => "Failed",
            ExecutionStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source revision metadata attached to a pipeline artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactRevision {
    pub name: String,
    pub revision_id: Option<String>,
    pub revision_summary: Option<String>,
    pub revision_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineExecution {
    pub pipeline_name: String,
    pub execution_id: String,
    pub status: ExecutionStatus,
    pub artifact_revisions: Vec<ArtifactRevision>,
}

impl PipelineExecution {
    /// First artifact revision with exactly this name.
    pub fn find_artifact(&self, name: &str) -> Option<&ArtifactRevision> {
        self.artifact_revisions.iter().find(|a| a.name == name)
    }
}

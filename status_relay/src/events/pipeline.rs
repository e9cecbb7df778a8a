//! EventBridge envelope for CodePipeline execution state changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// EventBridge event as delivered to the function.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineEvent {
    pub version: String,
    pub id: String,
    #[serde(rename = "detail-type")]
    pub detail_type: String,
    pub source: String,
    pub account: String,
    pub time: Option<DateTime<Utc>>,
    pub region: String,
    pub resources: Vec<String>,
    pub detail: Option<PipelineEventDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineEventDetail {
    pub pipeline: String,
    #[serde(rename = "execution-id")]
    pub execution_id: String,
    /// Execution state as seen by EventBridge (`STARTED`, `SUCCEEDED`, ...).
    pub state: String,
    pub version: Option<f64>,
}

/// Identifiers of the execution an event refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEvent {
    pub pipeline: String,
    pub execution_id: String,
    pub state: String,
}

impl PipelineEvent {
    /// Check that the event names a pipeline and an execution.
    pub fn validate(&self) -> Result<ValidatedEvent, RelayError> {
        let detail = self.detail.as_ref().ok_or(RelayError::MissingDetail)?;

        let execution_id = detail.execution_id.trim();
        if execution_id.is_empty() {
            return Err(RelayError::MissingField("execution-id"));
        }
        let pipeline = detail.pipeline.trim();
        if pipeline.is_empty() {
            return Err(RelayError::MissingField("pipeline"));
        }

        Ok(ValidatedEvent {
            pipeline: pipeline.to_string(),
            execution_id: execution_id.to_string(),
            state: detail.state.clone(),
        })
    }
}

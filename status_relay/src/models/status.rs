//! Commit status values understood by GitHub.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::execution::ExecutionStatus;

/// Three-valued commit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    Pending,
    Success,
    Failure,
}

impl CommitState {
    /// Map a pipeline execution status onto a commit status.
    ///
    /// Unrecognised statuses stay `pending` so a later event can settle them.
    pub fn from_execution(status: &ExecutionStatus) -> Self {
        match status {
            ExecutionStatus::InProgress | ExecutionStatus::Stopping => CommitState::Pending,
            ExecutionStatus::Succeeded => CommitState::Success,
            ExecutionStatus::Failed
            | ExecutionStatus::Stopped
            | ExecutionStatus::Superseded
            | ExecutionStatus::Cancelled => CommitState::Failure,
            ExecutionStatus::Other(raw) => {
                tracing::warn!(status = %raw, "Unrecognised pipeline status, reporting pending");
                CommitState::Pending
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitState::Pending => "pending",
            CommitState::Success => "success",
            CommitState::Failure => "failure",
        }
    }

    /// Human wording for status descriptions.
    pub fn describe(&self) -> &'static str {
        match self {
            CommitState::Pending => "is in progress",
            CommitState::Success => "succeeded",
            CommitState::Failure => "failed",
        }
    }
}

impl fmt::Display for CommitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Relay error taxonomy — one variant per way an invocation can abort.

use thiserror::Error;

/// Failures while assembling [`crate::config::RelayConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required key {0} missing value")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("{key} is not valid base64: {source}")]
    Base64 {
        key: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("failed to decrypt {key}: {reason}")]
    Decrypt { key: &'static str, reason: String },
}

/// Errors that abort a single relay invocation.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("missing event detail")]
    MissingDetail,

    #[error("missing {0} in event detail")]
    MissingField(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read execution {execution_id} of pipeline {pipeline}: {reason}")]
    PipelineLookup {
        pipeline: String,
        execution_id: String,
        reason: String,
    },

    #[error("pipeline {pipeline} returned no data for execution {execution_id}")]
    MissingExecution {
        pipeline: String,
        execution_id: String,
    },

    #[error("no artifact revision named {0} on the execution")]
    ArtifactNotFound(String),

    #[error("artifact revision carries an invalid commit id: {0:?}")]
    InvalidCommit(String),

    #[error("revision url {0:?} does not identify a repository")]
    InvalidRevisionUrl(String),

    #[error("GitHub status request failed: {0}")]
    GithubRequest(#[from] reqwest::Error),

    #[error("GitHub rejected status update with {status}: {body}")]
    GithubRejected { status: u16, body: String },
}

impl RelayError {
    /// Stage label used for logs and the failure counter.
    pub fn stage(&self) -> &'static str {
        match self {
            RelayError::MissingDetail | RelayError::MissingField(_) => "validate",
            RelayError::Config(_) => "config",
            RelayError::PipelineLookup { .. } | RelayError::MissingExecution { .. } => "pipeline",
            RelayError::ArtifactNotFound(_)
            | RelayError::InvalidCommit(_)
            | RelayError::InvalidRevisionUrl(_) => "extract",
            RelayError::GithubRequest(_) | RelayError::GithubRejected { .. } => "notify",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_message_names_the_key() {
        let err = RelayError::from(ConfigError::Missing("AWS_REGION"));
        assert_eq!(err.to_string(), "required key AWS_REGION missing value");
        assert_eq!(err.stage(), "config");
    }

    #[test]
    fn stages_cover_each_step() {
        assert_eq!(RelayError::MissingDetail.stage(), "validate");
        assert_eq!(RelayError::ArtifactNotFound("SourceCode".into()).stage(), "extract");
        assert_eq!(
            RelayError::GithubRejected {
                status: 422,
                body: String::new()
            }
            .stage(),
            "notify"
        );
    }
}

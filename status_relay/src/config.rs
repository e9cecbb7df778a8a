//! Relay configuration — loaded from environment variables on every invocation.

use std::fmt;

use reqwest::Url;

use crate::error::ConfigError;
use crate::services::kms_service::{self, SecretDecryptor};

/// Environment lookup, injectable so tests never touch the process env.
pub type EnvLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_SOURCE_ARTIFACT: &str = "SourceCode";

/// A decrypted credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretToken(String);

impl SecretToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretToken(***)")
    }
}

#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// AWS region the pipeline runs in (`AWS_REGION`).
    pub aws_region: String,
    /// Decrypted GitHub token (`GITHUB_ACCESS_TOKEN`, KMS ciphertext in base64).
    pub github_token: SecretToken,
    /// Deployment stage reported in status descriptions (`APPLICATION_STAGE_NAME`).
    pub application_stage: String,
    /// GitHub REST base URL (`GITHUB_API_URL`).
    pub github_api_url: String,
    /// Artifact revision holding the commit (`SOURCE_ARTIFACT_NAME`).
    pub source_artifact_name: String,
    /// Status context shown on the commit (`GITHUB_STATUS_CONTEXT`).
    pub status_context: String,
}

impl RelayConfig {
    /// Read and validate every setting, decrypting the GitHub token.
    ///
    /// Required keys are checked in a fixed order so the first missing one is
    /// reported.
    pub async fn load(
        lookup: &EnvLookup,
        decryptor: &dyn SecretDecryptor,
    ) -> Result<Self, ConfigError> {
        let aws_region = required(lookup, "AWS_REGION")?;
        let encrypted_token = required(lookup, "GITHUB_ACCESS_TOKEN")?;
        let application_stage = required(lookup, "APPLICATION_STAGE_NAME")?;

        let github_token =
            kms_service::decrypt_secret(decryptor, "GITHUB_ACCESS_TOKEN", &encrypted_token).await?;

        let github_api_url = match optional(lookup, "GITHUB_API_URL") {
            Some(raw) => parse_api_url(&raw)?,
            None => DEFAULT_GITHUB_API_URL.to_string(),
        };
        let source_artifact_name = optional(lookup, "SOURCE_ARTIFACT_NAME")
            .unwrap_or_else(|| DEFAULT_SOURCE_ARTIFACT.to_string());
        let status_context = optional(lookup, "GITHUB_STATUS_CONTEXT")
            .unwrap_or_else(|| format!("codepipeline/{application_stage}"));

        tracing::debug!(
            region = %aws_region,
            stage = %application_stage,
            api = %github_api_url,
            artifact = %source_artifact_name,
            "Configuration loaded"
        );

        Ok(Self {
            aws_region,
            github_token,
            application_stage,
            github_api_url,
            source_artifact_name,
            status_context,
        })
    }
}

fn optional(lookup: &EnvLookup, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(lookup: &EnvLookup, key: &'static str) -> Result<String, ConfigError> {
    optional(lookup, key).ok_or(ConfigError::Missing(key))
}

fn parse_api_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "GITHUB_API_URL",
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

//! Shared test doubles: KMS and CodePipeline mocks, a fake GitHub API.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::Json;
use axum::Router;

use crate::config::{EnvLookup, RelayConfig, SecretToken};
use crate::models::execution::{ArtifactRevision, ExecutionStatus, PipelineExecution};
use crate::services::kms_service::SecretDecryptor;
use crate::services::pipeline_service::PipelineReader;

pub const COMMIT_SHA: &str = "25c0c3e61c4db2c2cde8b163b3ad096875c1ce08";
pub const COMMIT_URL: &str = "https://github.com/mrz1836/codepipeline-to-github/commit/25c0c3e61c4db2c2cde8b163b3ad096875c1ce08";

/// Environment lookup backed by a fixed set of pairs.
pub fn env_from(pairs: &[(&str, &str)]) -> Arc<EnvLookup> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Arc::new(move |key: &str| vars.get(key).cloned())
}

pub fn config_with_api(api_url: &str) -> RelayConfig {
    RelayConfig {
        aws_region: "us-east-1".into(),
        github_token: SecretToken::new("some-encrypted-text"),
        application_stage: "development".into(),
        github_api_url: api_url.into(),
        source_artifact_name: "SourceCode".into(),
        status_context: "codepipeline/development".into(),
    }
}

/// KMS stand-in. Returns `" some-encrypted-text\n"` unless told otherwise.
#[derive(Default)]
pub struct MockKms {
    plaintext: Option<Vec<u8>>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockKms {
    pub fn returning(plaintext: &[u8]) -> Self {
        Self {
            plaintext: Some(plaintext.to_vec()),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretDecryptor for MockKms {
    async fn decrypt(&self, ciphertext: &[u8]) -> anyhow::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if ciphertext.is_empty() {
            anyhow::bail!("missing text to decrypt");
        }
        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }
        Ok(self
            .plaintext
            .clone()
            .unwrap_or_else(|| b" some-encrypted-text\n".to_vec()))
    }
}

/// CodePipeline stand-in whose behaviour is selected by pipeline name.
pub struct MockPipelines;

#[async_trait]
impl PipelineReader for MockPipelines {
    async fn get_execution(
        &self,
        pipeline: &str,
        execution_id: &str,
    ) -> anyhow::Result<Option<PipelineExecution>> {
        if pipeline.is_empty() || execution_id.is_empty() {
            anyhow::bail!("ValidationException: missing identifiers");
        }

        let (name, url) = match pipeline {
            "nil" => return Ok(None),
            "not-found" => anyhow::bail!(
                "PipelineNotFoundException: The account with id '123456789012' does not include a pipeline with the name '{pipeline}'"
            ),
            "bad-artifact-name" => ("InvalidArtifactName", COMMIT_URL),
            "bad-artifact-url" => ("SourceCode", "not a url"),
            _ => ("SourceCode", COMMIT_URL),
        };

        let status = match pipeline {
            "status-succeed" => "Succeeded",
            "status-fail" => "Failed",
            _ => "InProgress",
        };

        Ok(Some(PipelineExecution {
            pipeline_name: pipeline.to_string(),
            execution_id: execution_id.to_string(),
            status: ExecutionStatus::parse(status),
            artifact_revisions: vec![ArtifactRevision {
                name: name.to_string(),
                revision_id: Some(COMMIT_SHA.to_string()),
                revision_summary: Some("Some commit message".to_string()),
                revision_url: Some(url.to_string()),
            }],
        }))
    }
}

/// A request captured by [`FakeGithub`].
#[derive(Debug, Clone)]
pub struct ReceivedStatus {
    pub path: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl ReceivedStatus {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    received: Arc<Mutex<Vec<ReceivedStatus>>>,
}

/// In-process HTTP server answering every request with a fixed status.
pub struct FakeGithub {
    pub url: String,
    received: Arc<Mutex<Vec<ReceivedStatus>>>,
}

impl FakeGithub {
    pub async fn start(status: StatusCode) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            status,
            received: received.clone(),
        };
        let app = Router::new().fallback(record).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            received,
        }
    }

    pub fn received(&self) -> Vec<ReceivedStatus> {
        self.received.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<FakeState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<serde_json::Value>) {
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
    state.received.lock().unwrap().push(ReceivedStatus {
        path: uri.path().to_string(),
        headers,
        body: body.clone(),
    });

    if state.status.is_success() {
        (state.status, Json(body))
    } else {
        (
            state.status,
            Json(serde_json::json!({ "message": "Validation Failed" })),
        )
    }
}

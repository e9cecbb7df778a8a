//! CodePipeline status relay — AWS Lambda function.
//!
//! Triggered by EventBridge "Pipeline Execution State Change" events. Each
//! invocation reads the execution from CodePipeline, finds the commit behind
//! its source artifact and sets the matching GitHub commit status.

mod config;
mod error;
mod events;
mod handlers;
mod metrics;
mod models;
mod services;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use lambda_runtime::{service_fn, LambdaEvent};

use crate::events::pipeline::PipelineEvent;
use crate::handlers::StatusRelay;
use crate::services::kms_service::KmsDecryptor;
use crate::services::pipeline_service::CodePipelineReader;

#[derive(Parser)]
#[command(
    name = "codepipeline-status",
    about = "Relay CodePipeline execution state to GitHub commit statuses"
)]
struct Cli {
    /// Process one EventBridge event from a JSON file instead of serving Lambda invocations
    #[arg(long, env = "RELAY_EVENT_FILE")]
    event: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .init();
    }

    let cli = Cli::parse();

    // AWS clients are built once per cold start; settings are re-read per event.
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let relay = Arc::new(StatusRelay::new(
        Arc::new(|key: &str| std::env::var(key).ok()),
        Arc::new(KmsDecryptor::new(&sdk_config)),
        Arc::new(CodePipelineReader::new(&sdk_config)),
        reqwest::Client::new(),
    ));

    if let Some(path) = cli.event {
        let raw = tokio::fs::read(&path)
            .await
            .with_context(|| format!("reading event file {}", path.display()))?;
        let event: PipelineEvent =
            serde_json::from_slice(&raw).context("parsing EventBridge event")?;

        let outcome = relay.handle(&event).await?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    tracing::info!("Starting CodePipeline status relay...");
    lambda_runtime::run(service_fn(move |event: LambdaEvent<PipelineEvent>| {
        let relay = relay.clone();
        async move {
            relay
                .handle(&event.payload)
                .await
                .map_err(lambda_runtime::Error::from)
        }
    }))
    .await
    .map_err(|e| anyhow::anyhow!("lambda runtime: {e}"))
}

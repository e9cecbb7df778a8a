//! Relay services — the external systems each invocation talks to.

pub mod github_service;
pub mod kms_service;
pub mod pipeline_service;

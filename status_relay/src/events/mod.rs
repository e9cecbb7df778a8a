//! Inbound event definitions.
//!
//! The relay is triggered by EventBridge "CodePipeline Pipeline Execution
//! State Change" events.

pub mod pipeline;

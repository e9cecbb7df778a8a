//! Relay data models — pipeline executions, commits, statuses.

pub mod commit;
pub mod execution;
pub mod status;

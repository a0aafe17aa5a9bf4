//! Background tasks.
//!
//! Agent jobs are spawned onto a [`TaskTracker`](tokio_util::task::TaskTracker)
//! owned by [`AgentJobRunner`] so shutdown can wait for in-flight work.

pub mod agent_job;

pub use agent_job::{AgentJob, AgentJobKind, AgentJobRunner, JobState};

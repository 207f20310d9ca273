//! HTTP handlers for the job-lifecycle protocol.

pub mod health;
pub mod jobs;
pub mod queues;
pub mod workers;

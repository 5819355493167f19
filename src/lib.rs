//! gitlab-vars
//!
//! Small durable state for CI pipelines: counters and timestamps kept in
//! GitLab project CI/CD variables.

pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod gitlab;

//! GitLab API interaction module
//!
//! This module provides the core functionality for talking to the GitLab
//! REST API: token handling, the HTTP client and the project variable
//! operations.
//!
//! # Module Structure
//!
//! - [`auth`] - Token kinds, request headers and masking
//! - [`client`] - Main GitLab client and URL builders
//! - [`http`] - HTTP utilities for REST API calls
//! - [`variables`] - Get, create, update, increment, decrement and timestamp
//!
//! # Example
//!
//! ```ignore
//! use gitlab_vars::config::Config;
//! use gitlab_vars::env::ProcessEnv;
//! use gitlab_vars::gitlab::{client::GitlabClient, variables};
//!
//! async fn example() -> gitlab_vars::error::Result<()> {
//!     let client = GitlabClient::new(Config::resolve(&ProcessEnv)?, None)?;
//!     let build = variables::increment_variable(&client, "42", "BUILD_NUMBER").await?;
//!     println!("build {}", build);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
pub mod variables;

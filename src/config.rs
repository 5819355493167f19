//! Configuration Resolution
//!
//! Resolves the token, API endpoint and default project from the environment.
//! Each setting has an ordered list of sources: variables set by the operator
//! come first, then those injected by the GitLab runner, then a default.

use crate::env::{first_present, Environment};
use crate::error::{Result, VarsError};
use crate::gitlab::auth::{Credential, TokenKind};
use url::Url;

pub const DEFAULT_API_URL: &str = "https://gitlab.com/api/v4";

pub const ENV_CUSTOM_TOKEN: &str = "GITLAB_VARS_PERSONAL_TOKEN";
pub const ENV_LEGACY_TOKEN: &str = "GITLAB_TOKEN";
pub const ENV_JOB_TOKEN: &str = "CI_JOB_TOKEN";

pub const ENV_CUSTOM_API_URL: &str = "GITLAB_VARS_API_URL";
pub const ENV_LEGACY_API_URL: &str = "GITLAB_URL_API";
pub const ENV_CI_API_URL: &str = "CI_API_V4_URL";

pub const ENV_CUSTOM_PROJECT_ID: &str = "GITLAB_VARS_PROJECT_ID";
pub const ENV_CI_PROJECT_ID: &str = "CI_PROJECT_ID";

/// Token sources, highest precedence first
const TOKEN_SOURCES: &[(&str, TokenKind)] = &[
    (ENV_CUSTOM_TOKEN, TokenKind::Personal),
    (ENV_LEGACY_TOKEN, TokenKind::Personal),
    (ENV_JOB_TOKEN, TokenKind::Job),
];

const API_URL_SOURCES: &[&str] = &[ENV_CUSTOM_API_URL, ENV_LEGACY_API_URL, ENV_CI_API_URL];

const PROJECT_SOURCES: &[&str] = &[ENV_CUSTOM_PROJECT_ID, ENV_CI_PROJECT_ID];

/// Human-readable list of the token variables, used in the "not found" error
pub(crate) fn token_sources_display() -> String {
    let names: Vec<&str> = TOKEN_SOURCES.iter().map(|(name, _)| *name).collect();
    match names.split_last() {
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
        None => String::new(),
    }
}

/// Resolved configuration for one invocation
#[derive(Debug, Clone)]
pub struct Config {
    pub credential: Credential,
    /// Variable the token was read from
    pub token_source: &'static str,
    pub api_url: Url,
    pub default_project: Option<String>,
}

impl Config {
    /// Resolve configuration from the environment.
    ///
    /// Fails when no token is set or the endpoint is not a valid URL. A missing
    /// project is not an error here; see [`Config::project_for`].
    pub fn resolve<E: Environment + ?Sized>(env: &E) -> Result<Self> {
        let (token_source, credential) = resolve_credential(env)?;
        let api_url = resolve_api_url(env)?;
        let default_project = first_present(env, PROJECT_SOURCES).map(|found| {
            tracing::debug!("Default project from {}", found.source);
            found.value
        });

        tracing::debug!(
            "Using {} from {}, API URL {}",
            credential.header_name(),
            token_source,
            api_url
        );

        Ok(Self {
            credential,
            token_source,
            api_url,
            default_project,
        })
    }

    /// Project to operate on: explicit argument, else the environment default.
    /// An empty project counts as not given.
    pub fn project_for(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .or_else(|| self.default_project.clone())
            .ok_or(VarsError::MissingProject)
    }

    /// Diagnostic block printed by `info`
    pub fn info_lines(&self) -> Vec<String> {
        vec![
            format!("TOKEN (masked): {}", self.credential.masked()),
            format!("TOKEN TYPE: {}", self.credential.header_name()),
            format!("TOKEN SOURCE: {}", self.token_source),
            format!("API URL: {}", self.api_url),
            format!(
                "PROJECT: {}",
                self.default_project.as_deref().unwrap_or("(not set)")
            ),
        ]
    }
}

fn resolve_credential<E: Environment + ?Sized>(env: &E) -> Result<(&'static str, Credential)> {
    TOKEN_SOURCES
        .iter()
        .find_map(|&(source, kind)| {
            env.var(source)
                .map(|secret| (source, Credential::new(kind, secret)))
        })
        .ok_or(VarsError::MissingToken)
}

fn resolve_api_url<E: Environment + ?Sized>(env: &E) -> Result<Url> {
    let (source, raw) = match first_present(env, API_URL_SOURCES) {
        Some(found) => (found.source, found.value),
        None => ("default", DEFAULT_API_URL.to_string()),
    };

    let url = Url::parse(raw.trim()).map_err(|e| VarsError::InvalidEndpoint {
        url: raw.clone(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(VarsError::InvalidEndpoint {
            url: raw,
            reason: "not a base URL".to_string(),
        });
    }

    tracing::debug!("API URL from {}", source);
    Ok(url)
}

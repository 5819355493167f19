//! GitLab Client
//!
//! Main client for interacting with the GitLab API, combining the resolved
//! configuration and HTTP functionality.

use super::http::{GitlabHttpClient, RawResponse};
use crate::config::Config;
use crate::error::Result;
use std::borrow::Cow;
use std::time::Duration;
use url::Url;

/// Main GitLab client
#[derive(Clone)]
pub struct GitlabClient {
    pub config: Config,
    pub http: GitlabHttpClient,
}

impl GitlabClient {
    /// Create a new client for a resolved configuration
    pub fn new(config: Config, timeout: Option<Duration>) -> Result<Self> {
        let http = GitlabHttpClient::new(timeout)?;
        Ok(Self { config, http })
    }

    /// Make a GET request with the configured token
    pub async fn get(&self, url: &Url) -> Result<RawResponse> {
        self.http.get(url.as_str(), &self.config.credential).await
    }

    /// Make a form POST request with the configured token
    pub async fn post_form(&self, url: &Url, form: &[(&str, &str)]) -> Result<RawResponse> {
        self.http
            .post_form(url.as_str(), &self.config.credential, form)
            .await
    }

    /// Make a form PUT request with the configured token
    pub async fn put_form(&self, url: &Url, form: &[(&str, &str)]) -> Result<RawResponse> {
        self.http
            .put_form(url.as_str(), &self.config.credential, form)
            .await
    }

    // =========================================================================
    // Project variables API helpers
    // =========================================================================

    /// Build an API URL from path segments
    ///
    /// Segments are percent-encoded individually, so a `group/project` path is
    /// sent as a single `group%2Fproject` segment.
    pub fn api_url(&self, segments: &[&str]) -> Url {
        let mut url = self.config.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Build the project variables collection URL
    pub fn variables_url(&self, project: &str) -> Url {
        let project = decode_project(project);
        self.api_url(&["projects", project.as_ref(), "variables"])
    }

    /// Build a single project variable URL
    pub fn variable_url(&self, project: &str, key: &str) -> Url {
        let project = decode_project(project);
        self.api_url(&["projects", project.as_ref(), "variables", key])
    }
}

/// Accept project paths both raw (`group/app`) and already URL-encoded
/// (`group%2Fapp`) so the latter is not encoded twice
fn decode_project(project: &str) -> Cow<'_, str> {
    urlencoding::decode(project).unwrap_or(Cow::Borrowed(project))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::auth::{Credential, TokenKind};

    fn client(api_url: &str) -> GitlabClient {
        let config = Config {
            credential: Credential::new(TokenKind::Personal, "token"),
            token_source: "TEST",
            api_url: Url::parse(api_url).unwrap(),
            default_project: None,
        };
        GitlabClient::new(config, None).unwrap()
    }

    #[test]
    fn test_variable_urls() {
        let client = client("https://gitlab.com/api/v4");
        assert_eq!(
            client.variables_url("42").as_str(),
            "https://gitlab.com/api/v4/projects/42/variables"
        );
        assert_eq!(
            client.variable_url("42", "BUILD_NUMBER").as_str(),
            "https://gitlab.com/api/v4/projects/42/variables/BUILD_NUMBER"
        );
    }

    #[test]
    fn test_trailing_slash_on_base_url() {
        let client = client("https://gitlab.example.com/api/v4/");
        assert_eq!(
            client.variable_url("1", "K").as_str(),
            "https://gitlab.example.com/api/v4/projects/1/variables/K"
        );
    }

    #[test]
    fn test_project_path_is_encoded() {
        let client = client("https://gitlab.com/api/v4");
        assert_eq!(
            client.variable_url("group/sub/app", "K").as_str(),
            "https://gitlab.com/api/v4/projects/group%2Fsub%2Fapp/variables/K"
        );
    }

    #[test]
    fn test_encoded_project_path_is_not_encoded_twice() {
        let client = client("https://gitlab.com/api/v4");
        assert_eq!(
            client.variable_url("group%2Fapp", "K").as_str(),
            "https://gitlab.com/api/v4/projects/group%2Fapp/variables/K"
        );
        assert_eq!(
            client.variables_url("group%2fsub%2Fapp").as_str(),
            "https://gitlab.com/api/v4/projects/group%2Fsub%2Fapp/variables"
        );
        assert_eq!(
            client.variable_url("42", "K").as_str(),
            "https://gitlab.com/api/v4/projects/42/variables/K"
        );
    }
}

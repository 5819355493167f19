//! HTTP utilities for GitLab REST API calls

use super::auth::Credential;
use crate::error::Result;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Status and body of a completed request
///
/// Status codes are interpreted by the caller: each variable operation expects
/// a different one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP client wrapper for GitLab API calls
#[derive(Clone)]
pub struct GitlabHttpClient {
    client: Client,
}

impl GitlabHttpClient {
    /// Create a new HTTP client
    ///
    /// Without a timeout the transport defaults apply.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("gitlab-vars/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, credential: &Credential) -> Result<RawResponse> {
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url), credential).await
    }

    /// Make a form-encoded POST request
    pub async fn post_form(
        &self,
        url: &str,
        credential: &Credential,
        form: &[(&str, &str)],
    ) -> Result<RawResponse> {
        tracing::debug!("POST {}", url);
        self.send(self.client.post(url).form(form), credential).await
    }

    /// Make a form-encoded PUT request
    pub async fn put_form(
        &self,
        url: &str,
        credential: &Credential,
        form: &[(&str, &str)],
    ) -> Result<RawResponse> {
        tracing::debug!("PUT {}", url);
        self.send(self.client.put(url).form(form), credential).await
    }

    async fn send(&self, request: RequestBuilder, credential: &Credential) -> Result<RawResponse> {
        let response = request
            .header(credential.header_name(), credential.secret())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            tracing::debug!("Response: {}", status);
        } else {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::debug!("API error: {} - {}", status, sanitize_for_log(&body));
        }

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }
}

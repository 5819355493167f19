use thiserror::Error;

/// Errors that end a gitlab-vars invocation.
#[derive(Debug, Error)]
pub enum VarsError {
    #[error("Token not found. {} is not set", crate::config::token_sources_display())]
    MissingToken,

    #[error("Missing project id")]
    MissingProject,

    #[error("Invalid API URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("Invalid timestamp format '{0}'")]
    InvalidTimestampFormat(String),

    #[error("{0}")]
    Usage(String),

    #[error("Got status code {actual}")]
    UnexpectedStatus { expected: u16, actual: u16 },

    #[error("Project ({project}) variable ({key}) not set")]
    NotSet { project: String, key: String },

    #[error("Could not change value '{value}'")]
    NotAnInteger { value: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl VarsError {
    #[must_use]
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    #[must_use]
    pub fn not_set(project: &str, key: &str) -> Self {
        Self::NotSet {
            project: project.to_string(),
            key: key.to_string(),
        }
    }

    /// Process exit code for this error.
    ///
    /// Anything the operator can fix by changing arguments, environment or the
    /// remote variable exits with 2; infrastructure failures exit with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Transport(_) | Self::Decode(_) => 1,
            _ => 2,
        }
    }
}

pub type Result<T, E = VarsError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_reports_received_code() {
        let err = VarsError::UnexpectedStatus {
            expected: 201,
            actual: 200,
        };
        assert_eq!(err.to_string(), "Got status code 200");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_missing_token_names_every_source() {
        let msg = VarsError::MissingToken.to_string();
        assert!(msg.starts_with("Token not found."));
        assert!(msg.contains("GITLAB_VARS_PERSONAL_TOKEN"));
        assert!(msg.contains("CI_JOB_TOKEN"));
    }

    #[test]
    fn test_decode_errors_are_infrastructure_failures() {
        let err: VarsError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.exit_code(), 1);
    }
}

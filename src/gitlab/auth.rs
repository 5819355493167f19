//! GitLab Authentication
//!
//! GitLab accepts personal access tokens and CI job tokens, each under its
//! own request header. The header is derived from the token kind so the two
//! can never disagree.

use std::fmt;

/// Number of trailing characters left visible when masking a secret
const VISIBLE_SUFFIX: usize = 5;

/// Kind of token found in the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Personal, project or group access token
    Personal,
    /// Token injected by the runner into a CI job
    Job,
}

impl TokenKind {
    /// HTTP header carrying this kind of token
    pub fn header_name(self) -> &'static str {
        match self {
            TokenKind::Personal => "PRIVATE-TOKEN",
            TokenKind::Job => "JOB-TOKEN",
        }
    }
}

/// A token and its kind
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    kind: TokenKind,
    secret: String,
}

impl Credential {
    pub fn new(kind: TokenKind, secret: impl Into<String>) -> Self {
        Self {
            kind,
            secret: secret.into(),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn header_name(&self) -> &'static str {
        self.kind.header_name()
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Secret with everything but the last five characters masked
    pub fn masked(&self) -> String {
        mask_secret(&self.secret)
    }
}

// Security: never print the raw token, even in debug logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("secret", &self.masked())
            .finish()
    }
}

/// Replace every character except the trailing five with `*`
pub fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    let hidden = len.saturating_sub(VISIBLE_SUFFIX);
    secret
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { '*' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_follows_kind() {
        assert_eq!(
            Credential::new(TokenKind::Personal, "x").header_name(),
            "PRIVATE-TOKEN"
        );
        assert_eq!(Credential::new(TokenKind::Job, "x").header_name(), "JOB-TOKEN");
    }

    #[test]
    fn test_mask_keeps_last_five() {
        assert_eq!(mask_secret("glpat-abcdef12345"), "************12345");
        assert_eq!(mask_secret("12345"), "12345");
        assert_eq!(mask_secret("abc"), "abc");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn test_mask_counts_characters() {
        assert_eq!(mask_secret("ééééééé"), "**ééééé");
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let cred = Credential::new(TokenKind::Job, "super-secret-token");
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("token"));
        assert!(debug.contains("Job"));
    }
}

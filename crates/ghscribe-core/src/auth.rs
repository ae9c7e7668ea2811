// SPDX-License-Identifier: Apache-2.0

//! Credential provider abstraction.
//!
//! Components that talk to GitHub or the completion service ask a
//! `CredentialProvider` for secrets instead of reading the environment, so
//! tests can hand them fixed values.

use secrecy::SecretString;

use crate::config::{COMPLETION_API_KEY_ENV, Settings};
use crate::error::ScribeError;

/// Provides GitHub and completion service credentials for API calls.
///
/// Implementations return `None` if a credential is not available.
pub trait CredentialProvider: Send + Sync {
    /// Retrieves the GitHub API token.
    fn github_token(&self) -> Option<SecretString>;

    /// Retrieves the completion service API key.
    fn completion_api_key(&self) -> Option<SecretString>;

    /// Returns the GitHub token or `NotAuthenticated`.
    fn require_github_token(&self) -> Result<SecretString, ScribeError> {
        self.github_token().ok_or(ScribeError::NotAuthenticated)
    }

    /// Returns the completion API key or a configuration error.
    fn require_completion_api_key(&self) -> Result<SecretString, ScribeError> {
        self.completion_api_key().ok_or_else(|| {
            ScribeError::config(format!(
                "Missing {COMPLETION_API_KEY_ENV} environment variable"
            ))
        })
    }
}

impl CredentialProvider for Settings {
    fn github_token(&self) -> Option<SecretString> {
        self.github_token.clone()
    }

    fn completion_api_key(&self) -> Option<SecretString> {
        self.completion_api_key.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    /// Mock implementation for testing.
    struct MockCredentials {
        github_token: Option<SecretString>,
        completion_api_key: Option<SecretString>,
    }

    impl CredentialProvider for MockCredentials {
        fn github_token(&self) -> Option<SecretString> {
            self.github_token.clone()
        }

        fn completion_api_key(&self) -> Option<SecretString> {
            self.completion_api_key.clone()
        }
    }

    #[test]
    fn test_mock_provider_with_tokens() {
        let provider = MockCredentials {
            github_token: Some(SecretString::from("gh_token")),
            completion_api_key: Some(SecretString::from("sk_key")),
        };

        assert!(provider.github_token().is_some());
        assert!(provider.completion_api_key().is_some());
    }

    #[test]
    fn test_require_missing_credentials() {
        let provider = MockCredentials {
            github_token: None,
            completion_api_key: None,
        };

        assert!(matches!(
            provider.require_github_token(),
            Err(ScribeError::NotAuthenticated)
        ));
        let err = provider.require_completion_api_key().unwrap_err();
        assert!(matches!(err, ScribeError::Config { .. }));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_settings_as_provider() {
        let vars = [("GITHUB_TOKEN".to_string(), "ghp_x".to_string())]
            .into_iter()
            .collect();
        let settings = Settings::from_env_map(&vars).unwrap();
        let provider: &dyn CredentialProvider = &settings;

        assert_eq!(provider.github_token().unwrap().expose_secret(), "ghp_x");
        assert!(provider.completion_api_key().is_none());
    }
}

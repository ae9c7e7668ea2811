// SPDX-License-Identifier: Apache-2.0

//! Configuration management for ghscribe.
//!
//! Two layers feed a run:
//!
//! - [`AppConfig`]: tunables loaded from an optional TOML file and
//!   `GHSCRIBE_`-prefixed environment variables.
//! - [`Settings`]: the CI run context (credentials, repository, pull request)
//!   built once from an environment snapshot and passed to every component.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables (prefix: `GHSCRIBE_`)
//! 2. Config file: `./ghscribe.toml` or `--config <path>`
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Override the completion model via environment variable
//! GHSCRIBE_AI__MODEL=gpt-4o ghscribe review
//! ```

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::error::ScribeError;
use crate::github::RepoRef;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "ghscribe.toml";

/// Environment variable holding the completion service API key.
pub const COMPLETION_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Completion service settings.
    pub ai: AiConfig,
    /// GitHub API settings.
    pub github: GitHubConfig,
    /// Issue fetching settings.
    pub issues: IssuesConfig,
    /// README generation settings.
    pub readme: ReadmeConfig,
    /// Pull request review settings.
    pub review: ReviewConfig,
}

/// Completion service settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Chat completions endpoint.
    pub api_url: String,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens for API responses.
    pub max_tokens: u32,
    /// Temperature for API requests (0.0-1.0).
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1500,
            temperature: 0.3,
            timeout_seconds: 60,
        }
    }
}

/// GitHub API settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API request timeout in seconds.
    pub api_timeout_seconds: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_timeout_seconds: 30,
        }
    }
}

/// Which issue source backs the fetcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueBackend {
    /// GitHub MCP server spawned as a subprocess.
    #[default]
    Mcp,
    /// GitHub REST API via octocrab.
    Rest,
}

impl fmt::Display for IssueBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueBackend::Mcp => write!(f, "mcp"),
            IssueBackend::Rest => write!(f, "rest"),
        }
    }
}

/// Issue fetching settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IssuesConfig {
    /// Issue source backend.
    pub backend: IssueBackend,
    /// Issues requested per page.
    pub page_size: u8,
    /// Page ceiling; a listing that is still full after this many pages fails.
    pub max_pages: u32,
    /// Program used to start the MCP server.
    pub mcp_command: String,
    /// Arguments passed to the MCP server program.
    pub mcp_args: Vec<String>,
    /// Name of the MCP tool that lists issues.
    pub mcp_tool: String,
}

impl Default for IssuesConfig {
    fn default() -> Self {
        Self {
            backend: IssueBackend::Mcp,
            page_size: 100,
            max_pages: 100,
            mcp_command: "npx".to_string(),
            mcp_args: vec![
                "-y".to_string(),
                "@modelcontextprotocol/server-github".to_string(),
            ],
            mcp_tool: "list_issues".to_string(),
        }
    }
}

/// README generation settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReadmeConfig {
    /// Path of the document to update.
    pub path: PathBuf,
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("README.md"),
        }
    }
}

/// Pull request review settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Git ref the pull request is diffed against.
    pub base_ref: String,
    /// Diffs longer than this (in characters) are truncated before review.
    pub max_diff_chars: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            base_ref: "origin/main".to_string(),
            max_diff_chars: 12_000,
        }
    }
}

/// Load application configuration.
///
/// Loads from `path` (or `./ghscribe.toml`) if it exists, then applies
/// environment variables with the prefix `GHSCRIBE_` and double underscore
/// for nested keys (e.g., `GHSCRIBE_ISSUES__BACKEND=rest`).
///
/// # Errors
///
/// Returns `ScribeError::Config` if an explicit file is missing or any
/// source is invalid.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ScribeError> {
    let file = match path {
        Some(p) => File::from(p).required(true),
        None => File::with_name(CONFIG_FILE_NAME).required(false),
    };

    let config = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("GHSCRIBE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    debug!(backend = %app_config.issues.backend, model = %app_config.ai.model, "Configuration loaded");

    Ok(app_config)
}

/// The CI run context, resolved once from the process environment.
///
/// Components receive this value instead of reading environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Completion service API key (`OPENAI_API_KEY`).
    pub completion_api_key: Option<SecretString>,
    /// GitHub token (`GITHUB_TOKEN`, falling back to `GH_TOKEN`).
    pub github_token: Option<SecretString>,
    /// Pull request number (`PR_NUMBER`).
    pub pr_number: Option<u64>,
    /// Repository (`GITHUB_REPOSITORY`, or `REPO_OWNER` + `REPO_NAME`).
    pub repo: Option<RepoRef>,
    /// Base branch of the pull request (`GITHUB_BASE_REF`).
    pub base_ref: Option<String>,
}

impl Settings {
    /// Snapshot of the current process environment.
    pub fn from_process_env() -> Result<Self, ScribeError> {
        Self::from_env_map(&utf8_vars(std::env::vars_os()))
    }

    /// Builds settings from an environment snapshot.
    ///
    /// Empty values are treated as unset. Only values that are present but
    /// malformed (e.g. a non-numeric `PR_NUMBER`) are errors here; required
    /// values are checked by the `require_*` accessors.
    pub fn from_env_map(vars: &HashMap<String, String>) -> Result<Self, ScribeError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let pr_number = get("PR_NUMBER")
            .map(|raw| {
                raw.parse::<u64>().map_err(|_| {
                    ScribeError::config(format!("PR_NUMBER must be a number, got '{raw}'"))
                })
            })
            .transpose()?;

        let repo = match get("GITHUB_REPOSITORY") {
            Some(full) => {
                Some(RepoRef::parse(&full).map_err(|e| ScribeError::config(e.to_string()))?)
            }
            None => match (get("REPO_OWNER"), get("REPO_NAME")) {
                (Some(owner), Some(repo)) => Some(RepoRef::new(owner, repo)),
                _ => None,
            },
        };

        Ok(Self {
            completion_api_key: get(COMPLETION_API_KEY_ENV).map(SecretString::from),
            github_token: get("GITHUB_TOKEN")
                .or_else(|| get("GH_TOKEN"))
                .map(SecretString::from),
            pr_number,
            repo,
            base_ref: get("GITHUB_BASE_REF"),
        })
    }

    /// Returns the repository or a configuration error.
    pub fn require_repo(&self) -> Result<&RepoRef, ScribeError> {
        self.repo.as_ref().ok_or_else(|| {
            ScribeError::config(
                "Repository not set - provide GITHUB_REPOSITORY (owner/repo) or REPO_OWNER and REPO_NAME",
            )
        })
    }

    /// Returns the pull request number or a configuration error.
    pub fn require_pr_number(&self) -> Result<u64, ScribeError> {
        self.pr_number
            .ok_or_else(|| ScribeError::config("Pull request not set - provide PR_NUMBER"))
    }

    /// Git ref to diff a pull request against.
    ///
    /// `GITHUB_BASE_REF` wins over the configured default.
    #[must_use]
    pub fn review_base_ref(&self, review: &ReviewConfig) -> String {
        self.base_ref
            .as_ref()
            .map_or_else(|| review.base_ref.clone(), |b| format!("origin/{b}"))
    }
}

/// Keeps the variables whose name and value are valid UTF-8.
fn utf8_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> HashMap<String, String> {
    vars.into_iter()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialProvider;
    use secrecy::ExposeSecret;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn parse(config_str: &str) -> AppConfig {
        Config::builder()
            .add_source(config::File::from_str(config_str, config::FileFormat::Toml))
            .build()
            .expect("should build config")
            .try_deserialize()
            .expect("should deserialize")
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.ai.model, "gpt-4o-mini");
        assert_eq!(config.ai.max_tokens, 1500);
        assert_eq!(config.issues.backend, IssueBackend::Mcp);
        assert_eq!(config.issues.page_size, 100);
        assert_eq!(config.issues.max_pages, 100);
        assert_eq!(config.issues.mcp_tool, "list_issues");
        assert_eq!(config.readme.path, PathBuf::from("README.md"));
        assert_eq!(config.review.base_ref, "origin/main");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse(
            r#"
[issues]
backend = "rest"
max_pages = 5

[readme]
path = "docs/OVERVIEW.md"
"#,
        );

        assert_eq!(config.issues.backend, IssueBackend::Rest);
        assert_eq!(config.issues.max_pages, 5);
        assert_eq!(config.issues.page_size, 100);
        assert_eq!(config.readme.path, PathBuf::from("docs/OVERVIEW.md"));
        assert_eq!(config.ai.model, "gpt-4o-mini");
    }

    #[test]
    fn test_mcp_args_from_file() {
        let config = parse(
            r#"
[issues]
mcp_command = "github-mcp-server"
mcp_args = ["stdio"]
"#,
        );
        assert_eq!(config.issues.mcp_command, "github-mcp-server");
        assert_eq!(config.issues.mcp_args, vec!["stdio".to_string()]);
    }

    #[test]
    fn test_load_config_missing_explicit_file_fails() {
        let result = load_config(Some(Path::new("/nonexistent/ghscribe.toml")));
        assert!(matches!(result, Err(ScribeError::Config { .. })));
    }

    #[test]
    fn test_settings_from_github_repository() {
        let settings = Settings::from_env_map(&env(&[
            ("GITHUB_REPOSITORY", "octocat/hello-world"),
            ("GITHUB_TOKEN", "ghp_test"),
            ("OPENAI_API_KEY", "sk-test"),
            ("PR_NUMBER", "42"),
        ]))
        .unwrap();

        let repo = settings.require_repo().unwrap();
        assert_eq!(repo.owner, "octocat");
        assert_eq!(repo.repo, "hello-world");
        assert_eq!(settings.require_pr_number().unwrap(), 42);
        assert_eq!(
            settings.require_github_token().unwrap().expose_secret(),
            "ghp_test"
        );
        assert_eq!(
            settings.require_completion_api_key().unwrap().expose_secret(),
            "sk-test"
        );
    }

    #[test]
    fn test_settings_owner_repo_overrides() {
        let settings = Settings::from_env_map(&env(&[
            ("REPO_OWNER", "octocat"),
            ("REPO_NAME", "spoon-knife"),
        ]))
        .unwrap();
        let repo = settings.require_repo().unwrap();
        assert_eq!(repo.to_string(), "octocat/spoon-knife");
    }

    #[test]
    fn test_settings_combined_identifier_wins() {
        let settings = Settings::from_env_map(&env(&[
            ("GITHUB_REPOSITORY", "a/b"),
            ("REPO_OWNER", "c"),
            ("REPO_NAME", "d"),
        ]))
        .unwrap();
        assert_eq!(settings.require_repo().unwrap().to_string(), "a/b");
    }

    #[test]
    fn test_settings_missing_repo_is_config_error() {
        let settings = Settings::from_env_map(&env(&[("REPO_OWNER", "only-owner")])).unwrap();
        assert!(matches!(
            settings.require_repo(),
            Err(ScribeError::Config { .. })
        ));
    }

    #[test]
    fn test_settings_invalid_pr_number() {
        let result = Settings::from_env_map(&env(&[("PR_NUMBER", "abc")]));
        assert!(matches!(result, Err(ScribeError::Config { .. })));
    }

    #[test]
    fn test_settings_empty_values_are_unset() {
        let settings =
            Settings::from_env_map(&env(&[("GITHUB_TOKEN", ""), ("PR_NUMBER", " ")])).unwrap();
        assert!(matches!(
            settings.require_github_token(),
            Err(ScribeError::NotAuthenticated)
        ));
        assert!(settings.pr_number.is_none());
    }

    #[test]
    fn test_settings_gh_token_fallback() {
        let settings = Settings::from_env_map(&env(&[("GH_TOKEN", "gho_fallback")])).unwrap();
        assert_eq!(
            settings.require_github_token().unwrap().expose_secret(),
            "gho_fallback"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_variables_are_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let vars = utf8_vars([
            (OsString::from("GITHUB_REPOSITORY"), OsString::from("octocat/hello")),
            (OsString::from("BROKEN"), OsString::from_vec(vec![0x66, 0x6f, 0x80])),
            (OsString::from_vec(vec![0xff]), OsString::from("value")),
        ]);

        assert_eq!(vars.len(), 1);
        let settings = Settings::from_env_map(&vars).unwrap();
        assert_eq!(settings.require_repo().unwrap().to_string(), "octocat/hello");
    }

    #[test]
    fn test_review_base_ref() {
        let review = ReviewConfig::default();
        let settings = Settings::from_env_map(&env(&[])).unwrap();
        assert_eq!(settings.review_base_ref(&review), "origin/main");

        let settings = Settings::from_env_map(&env(&[("GITHUB_BASE_REF", "develop")])).unwrap();
        assert_eq!(settings.review_base_ref(&review), "origin/develop");
    }
}

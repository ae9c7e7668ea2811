// SPDX-License-Identifier: Apache-2.0

//! Issue and pull request comments.

use anyhow::{Context, Result};
use octocrab::Octocrab;
use tracing::{debug, instrument};

use super::RepoRef;
use crate::error::ScribeError;

/// Posts a comment to an issue or pull request.
///
/// Pull requests share the issue comment endpoint.
///
/// # Returns
///
/// The URL of the created comment.
///
/// # Errors
///
/// Returns an error if the API request fails.
#[instrument(skip(client, body), fields(repo = %repo, number = number))]
pub async fn post_comment(
    client: &Octocrab,
    repo: &RepoRef,
    number: u64,
    body: &str,
) -> Result<String> {
    debug!(body_len = body.len(), "Posting comment");

    let comment = client
        .issues(&repo.owner, &repo.repo)
        .create_comment(number, body)
        .await
        .map_err(ScribeError::from)
        .with_context(|| format!("Failed to post comment to #{number} in {repo}"))?;

    let comment_url = comment.html_url.to_string();

    debug!(url = %comment_url, "Comment posted successfully");

    Ok(comment_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_post_comment_failure_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octocat/hello/issues/9/comments"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"message": "Resource not accessible by integration"})),
            )
            .mount(&server)
            .await;

        let client = Octocrab::builder()
            .base_uri(server.uri())
            .unwrap()
            .personal_token("test-token".to_string())
            .build()
            .unwrap();
        let repo = RepoRef::new("octocat", "hello");

        let err = post_comment(&client, &repo, 9, "body").await.unwrap_err();
        assert!(err.to_string().contains("#9"));
        match err.downcast_ref::<ScribeError>() {
            Some(ScribeError::GitHub { message, status }) => {
                assert_eq!(*status, Some(403));
                assert!(message.contains("Resource not accessible"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

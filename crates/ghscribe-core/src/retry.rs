// SPDX-License-Identifier: Apache-2.0

//! Retry logic with exponential backoff for transient GitHub failures.
//!
//! Only issue page fetches over REST are retried. The completion call is a
//! single attempt and its failure ends the run.

use backon::ExponentialBuilder;

/// Determines if an HTTP status code is retryable.
///
/// Retryable status codes are 429 and the 5xx gateway family
/// (500, 502, 503, 504).
#[must_use]
pub fn is_retryable_http(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Determines if an octocrab error is retryable.
///
/// Retryable octocrab errors include:
/// - GitHub API errors with retryable status codes, plus 403 for secondary rate limits
/// - Service errors (transient)
/// - Hyper errors (network-related)
#[must_use]
pub fn is_retryable_octocrab(e: &octocrab::Error) -> bool {
    match e {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            is_retryable_http(status) || status == 403
        }
        octocrab::Error::Service { .. } | octocrab::Error::Hyper { .. } => true,
        _ => false,
    }
}

/// Creates a configured exponential backoff builder for retries.
///
/// - Factor: 2 (exponential growth)
/// - Min delay: 1 second
/// - Max times: 3
/// - Jitter: enabled
#[must_use]
pub fn retry_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_factor(2.0)
        .with_min_delay(std::time::Duration::from_secs(1))
        .with_max_times(3)
        .with_jitter()
}

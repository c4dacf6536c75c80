//! HTTP status handling shared by the completion providers.

use productdesk_core::error::ProviderError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use tracing::warn;

/// Used when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Classify a transport failure.
pub(crate) fn send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Pass a 200 through; turn anything else into the matching [`ProviderError`].
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    match status {
        200 => Ok(response),
        429 => Err(ProviderError::RateLimited {
            retry_after_secs: retry_after(response.headers()),
        }),
        401 | 403 => Err(ProviderError::AuthenticationFailed(format!(
            "{provider} rejected the API key (HTTP {status})"
        ))),
        _ => {
            let body = response.text().await.unwrap_or_default();
            warn!(provider, status, body = %body, "Completion endpoint returned an error");
            Err(ProviderError::ApiError {
                status_code: status,
                message: body,
            })
        }
    }
}

fn retry_after(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

//! HTTP retry with exponential backoff for transient errors.
//!
//! Dataset downloads go through [`get_bytes`] instead of calling
//! `reqwest::RequestBuilder::send()` directly, so timeouts, connection
//! resets, rate limiting and server errors are retried before the run
//! fails.

use std::time::Duration;

use crate::SourceError;

/// Maximum number of retry attempts after the first request.
///
/// With exponential backoff (2s, 4s, 8s, 16s) the total wait before
/// giving up is 30 seconds.
const MAX_RETRIES: u32 = 4;

/// What to do with a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusAction {
    Accept,
    Retry,
    Fail,
}

fn classify(status: reqwest::StatusCode) -> StatusAction {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        StatusAction::Retry
    } else if status.is_client_error() {
        StatusAction::Fail
    } else {
        StatusAction::Accept
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

/// Downloads `url` and returns the full response body.
///
/// Retries up to [`MAX_RETRIES`] times on transient transport errors
/// (including a body cut off mid-download), HTTP 429 and HTTP 5xx. Other
/// 4xx statuses are permanent.
///
/// # Errors
///
/// Returns [`SourceError::Http`] or [`SourceError::HttpStatus`] once the
/// request fails permanently or all retries are used up.
pub async fn get_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, SourceError> {
    let mut attempt = 0;

    loop {
        let error = match try_get(client, url).await {
            Ok(bytes) => return Ok(bytes),
            Err(Attempt::Permanent(e)) => return Err(e),
            Err(Attempt::Transient(e)) => e,
        };

        if attempt >= MAX_RETRIES {
            return Err(error);
        }
        attempt += 1;

        let delay = Duration::from_secs(1u64 << attempt);
        log::warn!("{error}; retry {attempt}/{MAX_RETRIES} in {delay:?}");
        tokio::time::sleep(delay).await;
    }
}

enum Attempt {
    Transient(SourceError),
    Permanent(SourceError),
}

impl From<reqwest::Error> for Attempt {
    fn from(e: reqwest::Error) -> Self {
        if is_transient(&e) {
            Self::Transient(SourceError::Http(e))
        } else {
            Self::Permanent(SourceError::Http(e))
        }
    }
}

async fn try_get(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, Attempt> {
    let response = client.get(url).send().await?;
    let status = response.status();

    let status_error = || SourceError::HttpStatus {
        status: status.as_u16(),
        url: url.to_owned(),
    };
    match classify(status) {
        StatusAction::Accept => Ok(response.bytes().await?.to_vec()),
        StatusAction::Retry => Err(Attempt::Transient(status_error())),
        StatusAction::Fail => Err(Attempt::Permanent(status_error())),
    }
}

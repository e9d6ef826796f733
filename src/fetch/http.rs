// src/fetch/http.rs
// =============================================================================
// The real Fetcher: GET requests over reqwest.
//
// Key functionality:
// - One shared Client (connection pooling across all workers)
// - Per-request timeout, applied by the client to connect + headers + body
// - Redirects are followed (up to MAX_REDIRECTS); only the final response counts
// - Failures are sorted into FetchError variants (timeout, DNS, connect, ...)
//
// Rust concepts:
// - async_trait: lets an async fn live in a trait object-safe way
// - Streams: the body is handed on as a stream of Bytes chunks
// =============================================================================

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::{FetchResponse, Fetcher};
use crate::error::{error_chain, ConfigError, FetchError};

// Longest redirect chain we follow before giving up
const MAX_REDIRECTS: usize = 10;

// Fetches over HTTP(S) with a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the client once; every request reuses it
    //
    // Parameters:
    //   timeout: upper bound for a whole request, body included
    //   user_agent: value of the User-Agent header
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            // Dropping the response here discards the body unread
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let final_url = response.url().clone();

        let body = response
            .bytes_stream()
            .map(|chunk| {
                chunk.map_err(|e| match categorize_error(e) {
                    FetchError::Other(message) => FetchError::Body(message),
                    other => other,
                })
            })
            .boxed();

        Ok(FetchResponse {
            status: status.as_u16(),
            content_type,
            final_url,
            body,
        })
    }
}

// Sorts a reqwest error into a FetchError
//
// reqwest errors can happen for many reasons:
// - Request timeout
// - DNS resolution failure
// - Refused / reset connections, TLS handshake failures
// - Redirect loops
fn categorize_error(error: reqwest::Error) -> FetchError {
    let detail = error_chain(&error);

    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_redirect() {
        FetchError::TooManyRedirects
    } else if error.is_connect() {
        // reqwest reports DNS failures as connect errors; the cause chain says which
        let lowered = detail.to_ascii_lowercase();
        if lowered.contains("dns") || lowered.contains("resolve") {
            FetchError::Dns(detail)
        } else {
            FetchError::Connect(detail)
        }
    } else {
        FetchError::Other(detail)
    }
}

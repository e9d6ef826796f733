// src/fetch/mod.rs
// =============================================================================
// Fetching: one HTTP GET per crawl target.
//
// The crawl engine only talks to the `Fetcher` trait, never to reqwest
// directly. The real implementation lives in http.rs; tests plug in an
// in-memory site instead of a network.
//
// A successful fetch hands back the status, the content type and the body as
// a byte stream. HTTP errors (>= 400) are NOT successes: they come back as
// FetchError::Status and the body is never exposed.
// =============================================================================

mod http;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream};
use futures::{future, StreamExt, TryStreamExt};
use std::fmt;
use url::Url;

use crate::error::FetchError;

pub use http::HttpFetcher;

/// Response body, delivered chunk by chunk
pub type BodyStream = BoxStream<'static, Result<Bytes, FetchError>>;

/// A successful (status < 400) response
pub struct FetchResponse {
    /// Final HTTP status after redirects
    pub status: u16,
    /// Raw Content-Type header, empty when the server sent none
    pub content_type: String,
    /// URL the response actually came from (differs after redirects)
    pub final_url: Url,
    /// The body
    pub body: BodyStream,
}

// Streams cannot be printed, so Debug shows everything else
impl fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("final_url", &self.final_url.as_str())
            .finish_non_exhaustive()
    }
}

impl FetchResponse {
    /// Whether the content type says this is an HTML document
    pub fn is_markup(&self) -> bool {
        is_markup_content_type(&self.content_type)
    }
}

/// Performs GET requests for the crawler.
///
/// Implementations must be shareable across tasks: the engine holds one
/// fetcher behind an Arc and calls it from every worker.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError>;
}

// Checks a Content-Type header value for HTML
// ("text/html; charset=utf-8" counts, "text/plain" does not)
pub fn is_markup_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

// Wraps an in-memory buffer as a single-chunk body
pub fn body_from_bytes(content: impl Into<Bytes>) -> BodyStream {
    let content: Bytes = content.into();
    stream::once(future::ready(Ok(content))).boxed()
}

// Reads a whole body into memory (used for pages, which must be parsed)
pub async fn collect_body(body: BodyStream) -> Result<Vec<u8>, FetchError> {
    body.try_fold(Vec::new(), |mut buffer, chunk| async move {
        buffer.extend_from_slice(&chunk);
        Ok(buffer)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_content_types() {
        assert!(is_markup_content_type("text/html"));
        assert!(is_markup_content_type("text/html; charset=UTF-8"));
        assert!(is_markup_content_type("TEXT/HTML"));
        assert!(is_markup_content_type("application/xhtml+xml"));
        assert!(!is_markup_content_type("text/css"));
        assert!(!is_markup_content_type("image/png"));
        assert!(!is_markup_content_type(""));
    }

    #[tokio::test]
    async fn test_collect_body_joins_chunks() {
        let chunks: Vec<Result<Bytes, FetchError>> =
            vec![Ok(Bytes::from_static(b"<ht")), Ok(Bytes::from_static(b"ml>"))];
        let body = collect_body(stream::iter(chunks).boxed()).await.unwrap();
        assert_eq!(body, b"<html>");
    }

    #[tokio::test]
    async fn test_collect_body_propagates_error() {
        let chunks: Vec<Result<Bytes, FetchError>> =
            vec![Ok(Bytes::from_static(b"<ht")), Err(FetchError::Timeout)];
        let err = collect_body(stream::iter(chunks).boxed()).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
    }
}

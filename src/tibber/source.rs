//! Completed HTTP responses as seen by the classifier.

use async_trait::async_trait;

/// A completed response whose body has not necessarily been read yet.
///
/// The body is materialized at most once, by consuming the source.
#[async_trait]
pub trait ResponseSource: Send + Sized {
    fn status(&self) -> u16;

    /// Raw `Content-Type` header value, if the response carried one.
    fn content_type(&self) -> Option<&str>;

    async fn into_body(self) -> anyhow::Result<Vec<u8>>;
}

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: Some(content_type.into()),
            body: body.into(),
        }
    }

    /// Shorthand for an `application/json` response.
    pub fn json(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, super::JSON_CONTENT_TYPE, body)
    }
}

#[async_trait]
impl ResponseSource for RawResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    async fn into_body(self) -> anyhow::Result<Vec<u8>> {
        Ok(self.body)
    }
}

#[async_trait]
impl ResponseSource for reqwest::Response {
    fn status(&self) -> u16 {
        reqwest::Response::status(self).as_u16()
    }

    fn content_type(&self) -> Option<&str> {
        self.headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    async fn into_body(self) -> anyhow::Result<Vec<u8>> {
        Ok(self.bytes().await?.to_vec())
    }
}

//! Turns a completed Tibber API response into a payload or a classified error.
//!
//! GraphQL-over-HTTP reports failures both through the status code and through
//! an `errors` array in the body. Since the 2025-01-03 API change, missing or
//! invalid tokens arrive as HTTP 200 with an `UNAUTHENTICATED` extension code,
//! so a 200 is only a success when the body carries no errors.

use super::errors::TibberApiError;
use super::extract::extract_error_details;
use super::json::parse_json_with_context;
use super::policy::{StatusClass, StatusPolicy};
use super::source::ResponseSource;
use super::{
    DEMO_USER_MARKER, INTERNAL_SERVER_ERROR, JSON_CONTENT_TYPE, UNAUTHENTICATED,
    UNAUTHORIZED_CODE, UNKNOWN_CODE,
};
use serde_json::Value;
use tracing::{debug, error};

/// The decoded GraphQL envelope (`data`, `errors`, `extensions`, ...).
pub type Payload = serde_json::Map<String, Value>;

/// Content type assumed when the response has no `Content-Type` header.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Stateless classifier; share it freely between tasks.
#[derive(Debug, Clone, Default)]
pub struct ResponseClassifier {
    policy: StatusPolicy,
}

impl ResponseClassifier {
    pub fn new(policy: StatusPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &StatusPolicy {
        &self.policy
    }

    /// Classify a response, reading its body at most once.
    ///
    /// The content type is checked before the body is touched. A body that
    /// cannot be read is reported as retryable.
    pub async fn classify_response<R: ResponseSource>(
        &self,
        response: R,
    ) -> Result<Payload, TibberApiError> {
        let status = response.status();
        check_content_type(status, response.content_type())?;

        let body = match response.into_body().await {
            Ok(body) => body,
            Err(err) => {
                return fail(TibberApiError::Retryable {
                    status,
                    message: format!("Failed to read response body: {err:#}"),
                    code: UNKNOWN_CODE.to_string(),
                });
            }
        };

        self.classify_body(status, &body)
    }

    /// Classify an already-buffered response.
    pub fn classify(
        &self,
        status: u16,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<Payload, TibberApiError> {
        check_content_type(status, content_type)?;
        self.classify_body(status, body)
    }

    fn classify_body(&self, status: u16, body: &[u8]) -> Result<Payload, TibberApiError> {
        let result: Value = match parse_json_with_context(body) {
            Ok(value) => value,
            Err(err) => {
                return fail(TibberApiError::Fatal {
                    status,
                    message: format!("Failed to parse response: {err}"),
                    code: UNKNOWN_CODE.to_string(),
                });
            }
        };

        let result = match result {
            Value::Object(map) => map,
            other => {
                return fail(TibberApiError::Fatal {
                    status,
                    message: format!("Unexpected response: {other}"),
                    code: UNKNOWN_CODE.to_string(),
                });
            }
        };

        let errors: &[Value] = match result.get("errors") {
            Some(Value::Array(errors)) => errors,
            _ => &[],
        };

        let class = self.policy.classify_status(status);

        if class == StatusClass::Ok {
            if errors.is_empty() {
                return Ok(result);
            }

            let (code, message) = extract_error_details(errors, &raw_text(body));
            if code == UNAUTHENTICATED {
                return fail(TibberApiError::InvalidLogin {
                    status,
                    message,
                    code,
                });
            }
            if code == INTERNAL_SERVER_ERROR && message.contains(DEMO_USER_MARKER) {
                return fail(TibberApiError::NotForDemoUser {
                    status,
                    message,
                    code,
                });
            }
        }

        match class {
            StatusClass::Retriable => {
                let (code, message) = extract_error_details(errors, &raw_text(body));
                fail(TibberApiError::Retryable {
                    status,
                    message,
                    code,
                })
            }
            StatusClass::Fatal => {
                let (mut code, message) = extract_error_details(errors, "request failed");
                if code == UNKNOWN_CODE && self.policy.is_unauthorized(status) {
                    code = UNAUTHORIZED_CODE.to_string();
                }
                if code == UNAUTHORIZED_CODE {
                    return fail(TibberApiError::InvalidLogin {
                        status,
                        message,
                        code,
                    });
                }
                fail(TibberApiError::Fatal {
                    status,
                    message,
                    code,
                })
            }
            StatusClass::Ok | StatusClass::Unhandled => {
                let (code, message) = extract_error_details(errors, "N/A");
                fail(TibberApiError::Fatal {
                    status,
                    message: format!("Unhandled error: {message}"),
                    code,
                })
            }
        }
    }
}

/// Gate shared by both entry points; runs before any body parsing.
fn check_content_type(status: u16, content_type: Option<&str>) -> Result<(), TibberApiError> {
    debug!(status, "Response status");

    let content_type = mime_essence(content_type);
    if content_type != JSON_CONTENT_TYPE {
        return fail(TibberApiError::Fatal {
            status,
            message: format!("Unexpected content type: {content_type}"),
            code: UNKNOWN_CODE.to_string(),
        });
    }
    Ok(())
}

/// Log a classified failure and return it.
fn fail<T>(err: TibberApiError) -> Result<T, TibberApiError> {
    error!(
        kind = err.kind(),
        status = err.status(),
        code = err.code(),
        detail = err.message(),
        "Tibber API request failed"
    );
    Err(err)
}

/// `application/json; charset=utf-8` -> `application/json`
fn mime_essence(content_type: Option<&str>) -> String {
    content_type
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn raw_text(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}

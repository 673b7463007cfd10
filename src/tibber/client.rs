//! Tibber GraphQL client.
//!
//! Sends one request per call and hands the response to the
//! [`ResponseClassifier`]. Retrying is left to the caller, guided by
//! [`ClientError::is_retryable`].

use super::classifier::{Payload, ResponseClassifier};
use super::errors::{ClientError, TibberApiError};
use super::json::from_value_with_context;
use super::UNKNOWN_CODE;
use crate::config::Config;
use crate::utils::SlowLog;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Requests slower than this are logged as a warning.
const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(5);

pub const USER_AGENT: &str = concat!("tibber/", env!("CARGO_PKG_VERSION"));

/// Client for the Tibber GraphQL API.
pub struct TibberClient {
    http: reqwest::Client,
    url: String,
    access_token: String,
    classifier: Arc<ResponseClassifier>,
}

impl TibberClient {
    pub fn new(
        url: impl Into<String>,
        access_token: impl Into<String>,
        classifier: Arc<ResponseClassifier>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(ClientError::RequestFailed)?;

        Ok(Self::with_http(http, url, access_token, classifier))
    }

    /// Use a preconfigured HTTP client (proxies, TLS roots, timeouts).
    pub fn with_http(
        http: reqwest::Client,
        url: impl Into<String>,
        access_token: impl Into<String>,
        classifier: Arc<ResponseClassifier>,
    ) -> Self {
        Self {
            http,
            url: url.into(),
            access_token: access_token.into(),
            classifier,
        }
    }

    /// Build a client from configuration, validating the status policy.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let token = config
            .access_token
            .clone()
            .context("TIBBER_ACCESS_TOKEN is not set")?;
        let policy = config
            .status_policy()
            .context("Invalid status policy configuration")?;

        Ok(Self::new(
            config.api_url.clone(),
            token,
            Arc::new(ResponseClassifier::new(policy)),
            config.request_timeout,
        )?)
    }

    pub fn classifier(&self) -> &ResponseClassifier {
        &self.classifier
    }

    /// Send a GraphQL request with variables and return the full classified envelope.
    pub async fn graphql_request(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<Payload, ClientError> {
        let (_status, payload) = self.send(query, variables).await?;
        Ok(payload)
    }

    /// Send a request and return its `data` object.
    ///
    /// A successful envelope without `data` is treated as fatal.
    pub async fn execute(&self, query: &str, variables: Value) -> Result<Value, ClientError> {
        let (status, data) = self.send_for_data(query, variables).await?;
        debug!(status, "Tibber GraphQL request succeeded");
        Ok(data)
    }

    /// Like [`Self::execute`], deserializing `data` into `T`.
    pub async fn execute_as<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, ClientError> {
        let (status, data) = self.send_for_data(query, variables).await?;
        from_value_with_context(data).map_err(|err| {
            ClientError::from(TibberApiError::Fatal {
                status,
                message: format!("Failed to decode data: {err}"),
                code: UNKNOWN_CODE.to_string(),
            })
        })
    }

    async fn send_for_data(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<(u16, Value), ClientError> {
        let (status, mut payload) = self.send(query, variables).await?;
        match payload.remove("data") {
            Some(Value::Null) | None => Err(ClientError::from(TibberApiError::Fatal {
                status,
                message: "Response contained no data".to_string(),
                code: UNKNOWN_CODE.to_string(),
            })),
            Some(data) => Ok((status, data)),
        }
    }

    /// POST the request and classify the response, keeping its HTTP status.
    async fn send(&self, query: &str, variables: Value) -> Result<(u16, Payload), ClientError> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        trace!(url = %self.url, "Sending Tibber GraphQL request");
        let timer = SlowLog::start("Tibber GraphQL request", SLOW_REQUEST_THRESHOLD);

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(ClientError::RequestFailed)?;

        let status = resp.status().as_u16();
        let payload = self.classifier.classify_response(resp).await;
        timer.finish();

        Ok((status, payload?))
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::request::ChatRequest;
use super::sse::{create_sse_stream, FrameStream};
use crate::config::WidgetConfig;
use crate::error::WidgetError;

const EVENT_STREAM: &str = "text/event-stream";

/// Opens a stream of raw frame payloads for one chat request.
///
/// The ingestor only sees this trait, so frame handling can be driven by a
/// real HTTP connection or by a scripted stream in tests.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn open(&self, request: &ChatRequest) -> Result<FrameStream, WidgetError>;
}

/// [`FrameSource`] that posts to the configured chat endpoint and reads the
/// reply as server-sent events.
#[derive(Debug)]
pub struct HttpFrameSource {
    client: reqwest::Client,
    endpoint: Url,
    token: SecretString,
    timeout_seconds: Option<u64>,
}

impl HttpFrameSource {
    pub fn new(
        endpoint: &str,
        token: SecretString,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, WidgetError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| WidgetError::InvalidRequest(format!("bad endpoint {endpoint}: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            token,
            timeout_seconds,
        })
    }

    pub fn from_config(config: &WidgetConfig) -> Result<Self, WidgetError> {
        Self::new(
            &config.api_endpoint,
            config.resolved_token(),
            config.timeout_seconds,
        )
    }

    fn apply_timeout(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.timeout_seconds {
            Some(timeout) => request.timeout(Duration::from_secs(timeout)),
            None => request,
        }
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.token.expose_secret();
        if token.is_empty() {
            return request;
        }
        request.bearer_auth(token)
    }

    fn log_request_payload<T: Serialize>(&self, body: &T) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }
        if let Ok(json) = serde_json::to_string(body) {
            log::trace!("chat stream request: {json}");
        }
    }

    async fn ensure_success_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, WidgetError> {
        log::debug!("chat stream HTTP status: {}", response.status());
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_text = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(WidgetError::AuthError(
                format!("{status}: {error_text}"),
            )),
            _ => Err(WidgetError::HttpError(format!(
                "chat endpoint returned error status {status}: {error_text}"
            ))),
        }
    }
}

#[async_trait]
impl FrameSource for HttpFrameSource {
    async fn open(&self, request: &ChatRequest) -> Result<FrameStream, WidgetError> {
        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, EVENT_STREAM)
            .json(request);
        builder = self.apply_auth(builder);
        builder = self.apply_timeout(builder);
        self.log_request_payload(request);

        let response = builder.send().await?;
        let response = self.ensure_success_response(response).await?;
        Ok(create_sse_stream(response))
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;

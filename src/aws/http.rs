//! HTTP utilities for inventory gateway calls

use crate::error::UpstreamError;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Per-request timeout; a timeout surfaces as an ordinary transport failure
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for inventory actions
#[derive(Clone)]
pub struct InventoryHttpClient {
    client: Client,
    token: Option<String>,
}

impl InventoryHttpClient {
    pub fn new(token: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("cwvars/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client, token })
    }

    /// POST a JSON action body and parse the JSON reply
    pub async fn post_action(
        &self,
        operation: &str,
        url: &str,
        body: &Value,
    ) -> Result<Value, UpstreamError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!("POST {} ({}, request {})", url, operation, request_id);

        let mut request = self
            .client
            .post(url)
            .header("x-request-id", &request_id)
            .json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::transport(operation, e))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| UpstreamError::transport(operation, e))?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!(
                "{} failed: {} - {} (request {})",
                operation,
                status,
                sanitize_for_log(&response_body),
                request_id
            );
            return Err(UpstreamError::status(operation, status.as_u16()));
        }

        if response_body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_body)
            .map_err(|e| UpstreamError::decode(operation, e.to_string()))
    }
}

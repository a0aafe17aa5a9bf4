//! HTTP client for the reasoning agent service.
//!
//! Wraps the service's single `POST /invoke` endpoint using [`reqwest`].

use async_trait::async_trait;

use crate::{Agent, AgentError, AgentInput, AgentOutput};

/// Agent reached over HTTP.
pub struct HttpAgent {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAgent {
    /// * `base_url` - Service root, e.g. `http://localhost:8100`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create an agent client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn invoke_url(&self) -> String {
        format!("{}/invoke", self.base_url)
    }

    /// Turn a raw response into an [`AgentOutput`].
    ///
    /// Non-2xx statuses become [`AgentError::Api`]; bodies that do not decode
    /// become [`AgentError::Malformed`].
    async fn parse_response(response: reqwest::Response) -> Result<AgentOutput, AgentError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AgentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        decode_output(&body)
    }
}

/// Decode a successful response body.
pub(crate) fn decode_output(body: &str) -> Result<AgentOutput, AgentError> {
    serde_json::from_str(body).map_err(|e| AgentError::Malformed(e.to_string()))
}

#[async_trait]
impl Agent for HttpAgent {
    async fn invoke(&self, input: AgentInput) -> Result<AgentOutput, AgentError> {
        tracing::debug!(
            user_id = %input.user_id,
            turns = input.conversation.len(),
            "Invoking agent",
        );

        let response = self
            .client
            .post(self.invoke_url())
            .json(&input)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}

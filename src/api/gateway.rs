use crate::api::client::build_http_client;
use crate::api::models::RequestBody;
use crate::api::response::parse_completion;
use crate::error::GatewayError;
use crate::models::Turn;
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// What a successful call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Reply(String),
    /// The call worked but the model gave nothing usable back.
    NoAnswer,
}

/// Adapter to the completion service. One call per `generate`, no retry.
pub trait CompletionGateway: Send + Sync {
    fn generate<'a>(
        &'a self,
        history: &'a [Turn],
        config: &'a ModelConfig,
    ) -> BoxFuture<'a, Result<Completion, GatewayError>>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiGateway {
    pub fn new(api_key: &str, endpoint: &str, timeout: Duration) -> Result<Self, String> {
        Ok(Self {
            client: build_http_client(api_key, timeout)?,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, history: &[Turn], config: &ModelConfig) -> Result<Completion, GatewayError> {
        let request_body = RequestBody {
            model: &config.model,
            messages: history,
            temperature: config.temperature,
            max_tokens: config.max_output_tokens,
            stream: false,
        };

        debug!(model = %config.model, turns = history.len(), "requesting completion");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        parse_completion(&body)
    }
}

impl CompletionGateway for OpenAiGateway {
    fn generate<'a>(
        &'a self,
        history: &'a [Turn],
        config: &'a ModelConfig,
    ) -> BoxFuture<'a, Result<Completion, GatewayError>> {
        Box::pin(self.call(history, config))
    }
}

//! OpenAI-compatible HTTP gateway.
//!
//! Implements [`LlmGateway`] against a `POST {base_url}/chat/completions`
//! endpoint, which covers OpenAI itself and the self-hosted servers that
//! mirror its API (Ollama, vLLM, llama.cpp). Transport and HTTP-status
//! failures map to [`GatewayError`]; whatever text the model returns is
//! passed through untouched — interpreting it is the parser's job.

use async_trait::async_trait;
use kalendo_application::ports::llm_gateway::{
    Completion, CompletionOptions, GatewayError, LlmGateway,
};
use kalendo_domain::{ModelId, truncate};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Request timeout for completion calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Gateway speaking the OpenAI chat-completions wire format
pub struct HttpLlmGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpLlmGateway {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Pull the completion text out of a decoded response.
fn extract_text(response: ChatResponse) -> Result<String, GatewayError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| GatewayError::RequestFailed("Response contained no completion".to_string()))
}

#[async_trait]
impl LlmGateway for HttpLlmGateway {
    async fn complete(
        &self,
        prompt: &str,
        model: &ModelId,
        options: &CompletionOptions,
    ) -> Result<Completion, GatewayError> {
        let body = ChatRequest {
            model: model.as_str(),
            messages: vec![ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!("Requesting completion from {} ({})", self.endpoint(), model);

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else if e.is_connect() {
                GatewayError::ConnectionError(e.to_string())
            } else {
                GatewayError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(GatewayError::ModelNotAvailable(model.to_string()));
            }
            return Err(GatewayError::RequestFailed(format!(
                "HTTP {}: {}",
                status,
                truncate(&body, 300)
            )));
        }

        let decoded: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::RequestFailed(format!("Malformed response body: {}", e)))?;

        extract_text(decoded).map(Completion::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let gateway = HttpLlmGateway::new("http://localhost:11434/v1/", None);
        assert_eq!(gateway.endpoint(), "http://localhost:11434/v1/chat/completions");

        let gateway = HttpLlmGateway::new("http://localhost:11434/v1", None);
        assert_eq!(gateway.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn test_request_serialization_skips_unset_options() {
        let body = ChatRequest {
            model: "llama3.2",
            messages: vec![ChatRequestMessage {
                role: "user",
                content: "hello",
            }],
            temperature: None,
            max_tokens: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("temperature"));
        assert!(!json.contains("max_tokens"));

        let body = ChatRequest {
            model: "llama3.2",
            messages: vec![],
            temperature: Some(0.2),
            max_tokens: Some(512),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"temperature\":0.2"));
        assert!(json.contains("\"max_tokens\":512"));
    }

    #[test]
    fn test_extract_text() {
        let decoded: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "Hi there"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(decoded).unwrap(), "Hi there");
    }

    #[test]
    fn test_extract_text_missing_content() {
        let decoded: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"role": "assistant"}}]}"#).unwrap();
        assert!(extract_text(decoded).is_err());

        let decoded: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(extract_text(decoded).is_err());
    }
}

//! Groq chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AssistantMessage, ChatMessage, LlmClient, ToolDefinition};

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Upper bound on generated tokens per completion.
const MAX_COMPLETION_TOKENS: u32 = 4096;

/// Client for the Groq OpenAI-compatible chat API.
pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    /// Create a client against the public Groq endpoint.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GROQ_API_BASE.to_string())
    }

    /// Create a client against a custom endpoint (useful for testing).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],

    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,

    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a str>,

    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[async_trait]
impl LlmClient for GroqClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> anyhow::Result<AssistantMessage> {
        let request = CompletionRequest {
            model,
            messages,
            tools,
            tool_choice: tools.map(|_| "auto"),
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(model, messages = messages.len(), "Requesting chat completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Groq API error {}: {}", status, body);
        }

        let mut parsed: CompletionResponse = response.json().await?;
        if parsed.choices.is_empty() {
            anyhow::bail!("Groq API returned no choices");
        }
        Ok(parsed.choices.remove(0).message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> GroqClient {
        GroqClient::with_base_url("test-key".to_string(), server.uri())
    }

    #[tokio::test]
    async fn parses_plain_text_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "42 trials are recruiting."}}]
            })))
            .mount(&server)
            .await;

        let reply = test_client(&server)
            .chat_completion("llama-3.3-70b-versatile", &[ChatMessage::user("hi")], None)
            .await
            .unwrap();

        assert_eq!(reply.content.as_deref(), Some("42 trials are recruiting."));
        assert!(reply.tool_calls.is_none());
    }

    #[tokio::test]
    async fn parses_tool_call_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "count_trials",
                            "arguments": "{\"condition\":\"diabetes\"}"
                        }
                    }]
                }}]
            })))
            .mount(&server)
            .await;

        let reply = test_client(&server)
            .chat_completion("llama-3.3-70b-versatile", &[ChatMessage::user("hi")], None)
            .await
            .unwrap();

        let calls = reply.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function.name, "count_trials");
    }

    #[tokio::test]
    async fn sends_auto_tool_choice_when_tools_are_supplied() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"tool_choice": "auto"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "ok"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tools = vec![ToolDefinition {
            def_type: "function".to_string(),
            function: crate::llm::FunctionDefinition {
                name: "count_trials".to_string(),
                description: "Count trials".to_string(),
                parameters: json!({"type": "object", "properties": {}}),
            },
        }];

        test_client(&server)
            .chat_completion(
                "llama-3.3-70b-versatile",
                &[ChatMessage::user("hi")],
                Some(&tools),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn provider_error_status_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .chat_completion("llama-3.3-70b-versatile", &[ChatMessage::user("hi")], None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("429"));
    }
}

//! Core orchestration loop implementation.

use std::sync::Arc;

use crate::config::Config;
use crate::llm::{ChatMessage, GroqClient, LlmClient};
use crate::registry::RegistryClient;
use crate::tools::ToolRegistry;

use super::prompt::build_system_prompt;

/// The clinical trials research agent.
///
/// Each call to [`Agent::answer`] owns its own conversation, so a shared
/// agent may serve questions from independent tasks concurrently.
pub struct Agent {
    config: Config,
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
}

impl Agent {
    /// Create an agent backed by the Groq API.
    pub fn new(config: Config) -> Self {
        let llm = Arc::new(GroqClient::new(config.api_key.clone()));
        Self::with_client(config, llm)
    }

    /// Create an agent with a caller-supplied completion client.
    pub fn with_client(config: Config, llm: Arc<dyn LlmClient>) -> Self {
        let registry = Arc::new(RegistryClient::new(
            config.registry_base_url.clone(),
            config.limits.clone(),
        ));
        let tools = ToolRegistry::builtin(registry);

        Self { config, llm, tools }
    }

    /// Answer a user question, optionally overriding the configured model.
    ///
    /// # Errors
    ///
    /// Completion-endpoint failures, malformed model-issued arguments,
    /// unknown tool names, and registry transport failures all propagate.
    /// The caller decides how to present them.
    pub async fn answer(&self, question: &str, model: Option<&str>) -> anyhow::Result<String> {
        let model = model.unwrap_or(&self.config.default_model);

        let mut messages = vec![
            ChatMessage::system(build_system_prompt(&self.tools)),
            ChatMessage::user(question),
        ];

        let tool_schemas = self.tools.get_tool_schemas();

        // First call: let the model decide which tools to use.
        let response = self
            .llm
            .chat_completion(model, &messages, Some(&tool_schemas))
            .await?;

        let tool_calls = match response.tool_calls {
            Some(calls) if !calls.is_empty() => calls,
            // No tool calls - the model answered directly.
            _ => {
                return response
                    .content
                    .ok_or_else(|| anyhow::anyhow!("LLM returned empty response"));
            }
        };

        messages.push(ChatMessage::assistant_tool_calls(
            response.content,
            tool_calls.clone(),
        ));

        // Execute each tool call in the order the model issued them.
        for tool_call in &tool_calls {
            tracing::info!(
                tool = %tool_call.function.name,
                args = %tool_call.function.arguments,
                "Calling tool"
            );

            let args: serde_json::Value = serde_json::from_str(&tool_call.function.arguments)?;
            let result = self.tools.execute(&tool_call.function.name, args).await?;

            messages.push(ChatMessage::tool_result(tool_call.id.clone(), result));
        }

        // Second call: produce the final answer from the tool results.
        let final_response = self.llm.chat_completion(model, &messages, None).await?;
        final_response
            .content
            .ok_or_else(|| anyhow::anyhow!("LLM returned empty response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{AssistantMessage, FunctionCall, ToolCall, ToolDefinition};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Plays back a fixed sequence of assistant replies and records how it
    /// was called.
    struct ScriptedLlm {
        replies: Mutex<VecDeque<AssistantMessage>>,
        calls: AtomicUsize,
        tools_enabled: Mutex<Vec<bool>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<AssistantMessage>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
                tools_enabled: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat_completion(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            tools: Option<&[ToolDefinition]>,
        ) -> anyhow::Result<AssistantMessage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.tools_enabled.lock().unwrap().push(tools.is_some());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("unexpected completion call"))
        }
    }

    fn text_reply(content: &str) -> AssistantMessage {
        AssistantMessage {
            content: Some(content.to_string()),
            tool_calls: None,
        }
    }

    fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    fn config_for(server: &MockServer) -> Config {
        let mut config = Config::new("test-key".to_string(), "test-model".to_string());
        config.registry_base_url = Url::parse(&format!("{}/studies", server.uri())).unwrap();
        config
    }

    async fn stub_registry(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/studies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn direct_answer_issues_exactly_one_completion() {
        let server = MockServer::start().await;
        let llm = ScriptedLlm::new(vec![text_reply("No lookup needed.")]);
        let agent = Agent::with_client(config_for(&server), llm.clone());

        let answer = agent.answer("What is a clinical trial?", None).await.unwrap();

        assert_eq!(answer, "No lookup needed.");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*llm.tools_enabled.lock().unwrap(), vec![true]);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tool_calls_run_in_order_then_one_final_completion() {
        let server = MockServer::start().await;
        stub_registry(&server, json!({"studies": []})).await;

        let llm = ScriptedLlm::new(vec![
            AssistantMessage {
                content: None,
                tool_calls: Some(vec![
                    tool_call("call_1", "count_trials", "{\"condition\":\"diabetes\"}"),
                    tool_call(
                        "call_2",
                        "get_trial_phases",
                        "{\"condition\":\"asthma\",\"phase\":\"PHASE3\"}",
                    ),
                ]),
            },
            text_reply("Here is what I found."),
        ]);
        let agent = Agent::with_client(config_for(&server), llm.clone());

        let answer = agent.answer("Diabetes counts and asthma phases?", None).await.unwrap();

        assert_eq!(answer, "Here is what I found.");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
        // Tool selection on for the decision call, off for the final one.
        assert_eq!(*llm.tools_enabled.lock().unwrap(), vec![true, false]);

        // One registry request per tool call, in invocation order.
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        let first = requests[0].url.query().unwrap_or_default().to_string();
        let second = requests[1].url.query().unwrap_or_default().to_string();
        assert!(first.contains("filter.overallStatus"));
        assert!(second.contains("query.term"));
    }

    #[tokio::test]
    async fn malformed_tool_arguments_propagate() {
        let server = MockServer::start().await;
        let llm = ScriptedLlm::new(vec![AssistantMessage {
            content: None,
            tool_calls: Some(vec![tool_call("call_1", "count_trials", "not json")]),
        }]);
        let agent = Agent::with_client(config_for(&server), llm.clone());

        let result = agent.answer("How many diabetes trials?", None).await;

        assert!(result.is_err());
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_tool_name_propagates() {
        let server = MockServer::start().await;
        let llm = ScriptedLlm::new(vec![AssistantMessage {
            content: None,
            tool_calls: Some(vec![tool_call("call_1", "fetch_prices", "{}")]),
        }]);
        let agent = Agent::with_client(config_for(&server), llm);

        let err = agent.answer("Prices?", None).await.unwrap_err();
        assert!(err.to_string().contains("Unknown tool"));
    }

    #[tokio::test]
    async fn empty_assistant_reply_is_an_error() {
        let server = MockServer::start().await;
        let llm = ScriptedLlm::new(vec![AssistantMessage {
            content: None,
            tool_calls: None,
        }]);
        let agent = Agent::with_client(config_for(&server), llm);

        assert!(agent.answer("Anything?", None).await.is_err());
    }

    #[tokio::test]
    async fn upstream_registry_error_still_reaches_the_final_answer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/studies"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let llm = ScriptedLlm::new(vec![
            AssistantMessage {
                content: None,
                tool_calls: Some(vec![tool_call(
                    "call_1",
                    "count_trials",
                    "{\"condition\":\"diabetes\"}",
                )]),
            },
            text_reply("The registry is unavailable right now."),
        ]);
        let agent = Agent::with_client(config_for(&server), llm.clone());

        let answer = agent.answer("How many diabetes trials?", None).await.unwrap();

        assert_eq!(answer, "The registry is unavailable right now.");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
    }
}

//! Minimal OpenAI-compatible chat completions client.
//!
//! This crate provides a focused client for the `/chat/completions` endpoint
//! exposed by OpenAI and by local servers that mimic it (LM Studio, llama.cpp,
//! vLLM and friends):
//! - Single, non-streaming completions
//! - Configurable base URL and bearer credential
//! - Typed access to the first choice's message content

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:1234/v1";
/// Placeholder credential; local servers ignore it.
pub const DEFAULT_API_KEY: &str = "unused";
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b";

/// Errors that can occur when using the client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Response contained no choices")]
    EmptyChoices,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// OpenAI-compatible API client.
#[derive(Clone)]
pub struct OpenAi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAi {
    /// Create a client bound to `base_url` using `api_key` as the bearer token.
    ///
    /// The underlying HTTP client has no request timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create a client from `OPENAI_BASE_URL`, `OPENAI_API_KEY` and `OPENAI_MODEL`.
    ///
    /// Unset variables fall back to the local defaults.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let api_key =
            std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string());
        let client = Self::new(base_url, api_key);
        match std::env::var("OPENAI_MODEL") {
            Ok(model) => client.with_model(model),
            Err(_) => client,
        }
    }

    /// Set the default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a caller-built HTTP client (proxies, timeouts, TLS settings).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a completion request and return the full response.
    pub async fn complete(&self, request: Request) -> Result<Response, Error> {
        let api_request = self.build_api_request(&request);
        let headers = self.build_headers()?;
        let url = self.endpoint()?;

        debug!(
            "POST {url} model={} messages={}",
            api_request.model,
            api_request.messages.len()
        );

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        let response = parse_response(api_response);
        debug!(
            "completion {} from {}: {} choice(s), usage {:?}",
            response.id,
            response.model,
            response.choices.len(),
            response.usage
        );
        Ok(response)
    }

    fn endpoint(&self) -> Result<String, Error> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "Base URL must start with http:// or https://: {}",
                self.base_url
            )));
        }
        Ok(format!("{}/chat/completions", self.base_url))
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }

    fn build_api_request(&self, request: &Request) -> ApiRequest {
        ApiRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            messages: request
                .messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        }
    }
}

fn parse_role(role: &str) -> Role {
    match role {
        "system" => Role::System,
        "user" => Role::User,
        _ => Role::Assistant,
    }
}

fn parse_response(api_response: ApiResponse) -> Response {
    let choices = api_response
        .choices
        .into_iter()
        .map(|c| Choice {
            index: c.index,
            role: parse_role(&c.message.role),
            content: c.message.content,
            finish_reason: c.finish_reason.as_deref().map(FinishReason::from_api),
        })
        .collect();

    Response {
        id: api_response.id,
        model: api_response.model,
        choices,
        usage: api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        }),
    }
}

// ============================================================================
// Public types
// ============================================================================

/// A chat completion request.
#[derive(Debug, Clone)]
pub struct Request {
    pub model: Option<String>,
    pub messages: Vec<Message>,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
}

impl Request {
    /// Create a new request with the given messages.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            model: None,
            messages,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: text.into(),
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A completion response.
#[derive(Debug, Clone)]
pub struct Response {
    pub id: String,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

impl Response {
    /// Message content of the first choice; a `null` content reads as empty.
    pub fn first_content(&self) -> Result<&str, Error> {
        let choice = self.choices.first().ok_or(Error::EmptyChoices)?;
        Ok(choice.content.as_deref().unwrap_or_default())
    }
}

/// One generated alternative.
#[derive(Debug, Clone)]
pub struct Choice {
    pub index: usize,
    pub role: Role,
    /// `None` when the server sent `null` (e.g. a tool-call-only reply).
    pub content: Option<String>,
    pub finish_reason: Option<FinishReason>,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    Other(String),
}

impl FinishReason {
    fn from_api(reason: &str) -> Self {
        match reason {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "content_filter" => FinishReason::ContentFilter,
            "tool_calls" | "function_call" => FinishReason::ToolCalls,
            other => FinishReason::Other(other.to_string()),
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    #[serde(default)]
    index: usize,
    message: ApiResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default = "default_assistant_role")]
    role: String,
    #[serde(default)]
    content: Option<String>,
}

fn default_assistant_role() -> String {
    "assistant".to_string()
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Response {
        parse_response(serde_json::from_str::<ApiResponse>(json).unwrap())
    }

    #[test]
    fn test_client_creation() {
        let client = OpenAi::new(DEFAULT_BASE_URL, DEFAULT_API_KEY);
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.base_url(), "http://127.0.0.1:1234/v1");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = OpenAi::new("http://localhost:8080/v1/", "k");
        assert_eq!(client.endpoint().unwrap(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_client_with_model() {
        let client = OpenAi::new(DEFAULT_BASE_URL, "k").with_model("gpt-4o-mini");
        assert_eq!(client.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_endpoint_rejects_non_http_base_url() {
        let client = OpenAi::new("127.0.0.1:1234/v1", "k");
        assert!(matches!(client.endpoint(), Err(Error::Config(_))));
    }

    #[test]
    fn test_headers_carry_bearer_token() {
        let client = OpenAi::new(DEFAULT_BASE_URL, "unused");
        let headers = client.build_headers().unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer unused");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_invalid_api_key_is_config_error() {
        let client = OpenAi::new(DEFAULT_BASE_URL, "bad\nkey");
        assert!(matches!(client.build_headers(), Err(Error::Config(_))));
    }

    #[test]
    fn test_request_serialization() {
        let client = OpenAi::new(DEFAULT_BASE_URL, "k");
        let request = Request::new(vec![Message::user("Best Easter ehh in Minecraft!")]);
        let body = serde_json::to_value(client.build_api_request(&request)).unwrap();

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Best Easter ehh in Minecraft!");
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_request_builder_overrides() {
        let client = OpenAi::new(DEFAULT_BASE_URL, "k");
        let request = Request::new(vec![Message::system("Be terse"), Message::user("Hi")])
            .with_model("other-model")
            .with_max_tokens(64)
            .with_temperature(0.5);
        let body = serde_json::to_value(client.build_api_request(&request)).unwrap();

        assert_eq!(body["model"], "other-model");
        assert_eq!(body["max_tokens"], 64);
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["messages"][0]["role"], "system");
    }

    #[test]
    fn test_parse_response() {
        let response = parse(
            r#"{
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "model": "openai/gpt-oss-20b",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "Hello, Steve!"}, "finish_reason": "stop"}
                ],
                "usage": {"prompt_tokens": 9, "completion_tokens": 4, "total_tokens": 13}
            }"#,
        );

        assert_eq!(response.id, "chatcmpl-1");
        assert_eq!(response.first_content().unwrap(), "Hello, Steve!");
        assert_eq!(response.choices[0].role, Role::Assistant);
        assert_eq!(response.choices[0].finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.unwrap().completion_tokens, 4);
    }

    #[test]
    fn test_first_content_uses_first_choice() {
        let response = parse(
            r#"{"choices": [
                {"index": 0, "message": {"role": "assistant", "content": "first"}},
                {"index": 1, "message": {"role": "assistant", "content": "second"}}
            ]}"#,
        );
        assert_eq!(response.first_content().unwrap(), "first");
    }

    #[test]
    fn test_empty_choices_is_error() {
        let response = parse(r#"{"id": "x", "model": "m", "choices": []}"#);
        assert!(matches!(response.first_content(), Err(Error::EmptyChoices)));
    }

    #[test]
    fn test_null_content_reads_as_empty() {
        let response = parse(
            r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": null}, "finish_reason": "tool_calls"}]}"#,
        );
        assert_eq!(response.first_content().unwrap(), "");
        assert!(response.choices[0].content.is_none());
        assert_eq!(response.choices[0].finish_reason, Some(FinishReason::ToolCalls));
    }

    #[test]
    fn test_missing_choices_fails_to_parse() {
        assert!(serde_json::from_str::<ApiResponse>(r#"{"id": "x"}"#).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = OpenAi::new(format!("http://127.0.0.1:{port}/v1"), "k")
            .with_http_client(reqwest::Client::builder().no_proxy().build().unwrap());

        let result = client.complete(Request::new(vec![Message::user("Hi")])).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }
}

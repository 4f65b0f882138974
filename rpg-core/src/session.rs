//! Session bootstrap: one prompt out, one completion back.
//!
//! A [`Session`] binds a [`SessionConfig`] to a [`CompletionService`] and
//! performs exactly one chat completion with a single user message. There is
//! no conversation history, retry or fallback; any failure is returned to
//! the caller as a [`SessionError`].

use async_trait::async_trait;
use log::debug;
use openai::{Message, OpenAi, Request};
use thiserror::Error;

/// Prompt sent when none is configured.
pub const DEFAULT_PROMPT: &str = "Best Easter ehh in Minecraft!";

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Completion error: {0}")]
    Completion(#[from] openai::Error),
}

/// Something that can answer a chat completion request.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: Request) -> Result<openai::Response, openai::Error>;
}

#[async_trait]
impl CompletionService for OpenAi {
    async fn complete(&self, request: Request) -> Result<openai::Response, openai::Error> {
        OpenAi::complete(self, request).await
    }
}

/// Configuration for a bootstrap session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Base URL of the OpenAI-compatible API, including the `/v1` prefix.
    pub base_url: String,

    /// Bearer token. Local servers accept any placeholder.
    pub api_key: String,

    /// Model identifier sent with the request.
    pub model: String,

    /// The single user message.
    pub prompt: String,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            base_url: openai::DEFAULT_BASE_URL.to_string(),
            api_key: openai::DEFAULT_API_KEY.to_string(),
            model: openai::DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }

    /// Defaults overridden by `OPENAI_BASE_URL`, `OPENAI_API_KEY` and `OPENAI_MODEL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new();
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            config.base_url = url;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            config.api_key = key;
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            config.model = model;
        }
        config
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Build the HTTP client this configuration describes.
    pub fn client(&self) -> OpenAi {
        OpenAi::new(&self.base_url, &self.api_key).with_model(&self.model)
    }

    /// The one-message request this configuration sends.
    pub fn request(&self) -> Request {
        Request::new(vec![Message::user(&self.prompt)]).with_model(&self.model)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A single-shot completion session.
pub struct Session<S = OpenAi> {
    config: SessionConfig,
    service: S,
}

impl Session<OpenAi> {
    /// Create a session that talks to the configured HTTP endpoint.
    pub fn new(config: SessionConfig) -> Self {
        let service = config.client();
        Self { config, service }
    }
}

impl<S: CompletionService> Session<S> {
    /// Create a session backed by an arbitrary completion service.
    pub fn with_service(config: SessionConfig, service: S) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Send the prompt and return the first choice's message content.
    pub async fn run(&self) -> Result<String, SessionError> {
        debug!(
            "Requesting completion from {} (model {})",
            self.config.base_url, self.config.model
        );
        debug!("Prompt: {}", self.config.prompt);

        let response = self.service.complete(self.config.request()).await?;
        let content = response.first_content()?.to_string();

        debug!("Completion {} returned {} bytes", response.id, content.len());
        Ok(content)
    }
}

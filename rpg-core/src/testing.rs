//! Testing utilities.
//!
//! This module provides stand-ins for a real completion service:
//! - `MockCompletion` for in-process tests without any network traffic
//! - `MockCompletionServer` (behind the `testing` feature) for tests that
//!   exercise the real HTTP client or the compiled binary against a loopback
//!   `/chat/completions` endpoint

#[cfg(any(test, feature = "testing"))]
mod server;

#[cfg(any(test, feature = "testing"))]
pub use server::{MockCompletionServer, MockReply, RecordedRequest};

use crate::session::CompletionService;
use async_trait::async_trait;
use openai::Request;
use std::sync::{Mutex, MutexGuard};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

enum Script {
    Reply(String),
    NullContent,
    NoChoices,
    Fail(Box<dyn Fn() -> openai::Error + Send + Sync>),
}

/// A completion service that answers every request the same way.
///
/// Requests are recorded so tests can assert on what was sent.
pub struct MockCompletion {
    script: Script,
    requests: Mutex<Vec<Request>>,
}

impl MockCompletion {
    /// Answer with a single choice carrying `text`.
    pub fn reply(text: impl Into<String>) -> Self {
        Self::scripted(Script::Reply(text.into()))
    }

    /// Answer with a single choice whose content is `null`.
    pub fn null_content() -> Self {
        Self::scripted(Script::NullContent)
    }

    /// Answer with an empty `choices` list.
    pub fn no_choices() -> Self {
        Self::scripted(Script::NoChoices)
    }

    /// Fail every request with the error produced by `error`.
    pub fn failing(error: impl Fn() -> openai::Error + Send + Sync + 'static) -> Self {
        Self::scripted(Script::Fail(Box::new(error)))
    }

    fn scripted(script: Script) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<Request> {
        lock(&self.requests).clone()
    }
}

fn single_choice(content: Option<String>) -> Vec<openai::Choice> {
    vec![openai::Choice {
        index: 0,
        role: openai::Role::Assistant,
        content,
        finish_reason: Some(openai::FinishReason::Stop),
    }]
}

#[async_trait]
impl CompletionService for MockCompletion {
    async fn complete(&self, request: Request) -> Result<openai::Response, openai::Error> {
        let model = request.model.clone().unwrap_or_else(|| "mock".to_string());
        lock(&self.requests).push(request);

        let choices = match &self.script {
            Script::Reply(text) => single_choice(Some(text.clone())),
            Script::NullContent => single_choice(None),
            Script::NoChoices => Vec::new(),
            Script::Fail(error) => return Err(error()),
        };

        Ok(openai::Response {
            id: "mock-completion".to_string(),
            model,
            choices,
            usage: None,
        })
    }
}

//! Shared test helpers: a scripted provider that answers by prompt content.

use async_trait::async_trait;
use productdesk_core::error::ProviderError;
use productdesk_core::message::Message;
use productdesk_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use productdesk_providers::CompletionClient;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Phrase unique to the first-round selection prompt.
pub const SELECT_NEEDLE: &str = "most relevant product domain agents";
/// Phrase unique to the sufficiency prompt.
pub const ASSESS_NEEDLE: &str = "Assess if this information is sufficient";
/// Phrase unique to the backfill selection prompt.
pub const BACKFILL_NEEDLE: &str = "additional agents that are most likely";
/// Phrase unique to the merge prompt.
pub const MERGE_NEEDLE: &str = "Combine this information into a single";

/// Phrase unique to a domain agent's system prompt.
pub fn agent_needle(domain: &str) -> String {
    format!("questions about NVIDIA {domain}.")
}

#[derive(Clone)]
enum Reply {
    Text(String),
    Fail(ProviderError),
}

struct Rule {
    needle: String,
    reply: Reply,
    delay: Duration,
}

struct Inner {
    rules: Mutex<Vec<Rule>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

/// A provider whose replies are chosen by the first rule whose needle
/// occurs in the request. Requests without a matching rule fail with a 500.
#[derive(Clone)]
pub struct ScriptedProvider {
    inner: Arc<Inner>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                rules: Mutex::new(Vec::new()),
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    fn rule(self, needle: impl Into<String>, reply: Reply, delay: Duration) -> Self {
        self.inner.rules.lock().unwrap().push(Rule {
            needle: needle.into(),
            reply,
            delay,
        });
        self
    }

    pub fn reply(self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.rule(needle, Reply::Text(text.into()), Duration::ZERO)
    }

    pub fn reply_after(
        self,
        needle: impl Into<String>,
        text: impl Into<String>,
        delay: Duration,
    ) -> Self {
        self.rule(needle, Reply::Text(text.into()), delay)
    }

    pub fn fail(self, needle: impl Into<String>, error: ProviderError) -> Self {
        self.rule(needle, Reply::Fail(error), Duration::ZERO)
    }

    /// Every request seen so far, in arrival order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.inner.requests.lock().unwrap().clone()
    }

    /// How many requests contained `needle`.
    pub fn calls_matching(&self, needle: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| haystack(r).contains(needle))
            .count()
    }
}

fn haystack(request: &ProviderRequest) -> String {
    request
        .messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let text = haystack(&request);
        self.inner.requests.lock().unwrap().push(request);

        let matched = {
            let rules = self.inner.rules.lock().unwrap();
            rules
                .iter()
                .find(|r| text.contains(&r.needle))
                .map(|r| (r.reply.clone(), r.delay))
        };

        let Some((reply, delay)) = matched else {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: "no scripted reply".into(),
            });
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match reply {
            Reply::Text(text) => Ok(make_text_response(&text)),
            Reply::Fail(e) => Err(e),
        }
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Wrap a scripted provider in a completion client.
pub fn client_for(provider: ScriptedProvider) -> Arc<CompletionClient> {
    Arc::new(CompletionClient::new(Arc::new(provider), "mock-model"))
}

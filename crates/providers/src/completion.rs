//! Completion client: the single call shape the orchestration layer uses.
//!
//! Wraps a [`Provider`] with a model name and a per-call ceiling, and turns
//! `(prompt, system_prompt, temperature, max_tokens)` into generated text.
//! Every call is also bounded by the caller's deadline, so a query-wide
//! budget propagates into each individual request.

use productdesk_config::{AppConfig, vendor_key_var};
use productdesk_core::error::{Error, ProviderError};
use productdesk_core::message::Message;
use productdesk_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::router::{build_from_config, requires_api_key};

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// One completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    pub fn system(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn into_provider_request(self, model: &str) -> ProviderRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system_prompt {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(self.prompt));

        ProviderRequest {
            model: model.to_string(),
            messages,
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        }
    }
}

/// Stateless request/response wrapper around a provider.
pub struct CompletionClient {
    provider: Arc<dyn Provider>,
    model: String,
    call_timeout: Duration,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Override the per-call ceiling.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Build the client for the configured default provider.
    ///
    /// Fails when the provider needs a credential and none is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let provider_name = &config.default_provider;

        if requires_api_key(provider_name) && config.api_key_for(provider_name).is_none() {
            let vars = match vendor_key_var(provider_name) {
                Some(var) => format!("PRODUCTDESK_API_KEY or {var}"),
                None => "PRODUCTDESK_API_KEY".to_string(),
            };
            return Err(Error::config(format!(
                "no API key for provider '{provider_name}'; set {vars}, or add api_key to {}",
                AppConfig::config_path().display()
            )));
        }

        let router = build_from_config(config);
        let provider = router
            .default()
            .ok_or_else(|| Error::config(format!("provider '{provider_name}' is not available")))?;

        let model = config
            .providers
            .get(provider_name)
            .and_then(|p| p.default_model.clone())
            .unwrap_or_else(|| config.default_model.clone());

        Ok(Self::new(provider, model)
            .with_call_timeout(Duration::from_secs(config.orchestrator.call_timeout_secs)))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Run one completion, bounded by `min(now + call_timeout, deadline)`.
    pub async fn complete(
        &self,
        request: CompletionRequest,
        deadline: Instant,
    ) -> Result<String, ProviderError> {
        let now = Instant::now();
        if now >= deadline {
            return Err(ProviderError::Timeout("query deadline already passed".into()));
        }

        let bound = std::cmp::min(now + self.call_timeout, deadline);
        let provider_request = request.into_provider_request(&self.model);

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            budget_ms = bound.duration_since(now).as_millis() as u64,
            "Issuing completion"
        );

        match tokio::time::timeout_at(bound, self.provider.complete(provider_request)).await {
            Ok(Ok(response)) => Ok(response.message.content),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProviderError::Timeout(format!(
                "no response within {}ms",
                bound.duration_since(now).as_millis()
            ))),
        }
    }
}

//! Domain agents: one per product domain.
//!
//! A domain agent knows a small, fixed body of text about its product line
//! and answers from that text only. It issues exactly one completion call per
//! query and reports a constant confidence.

use productdesk_config::OrchestratorConfig;
use productdesk_core::error::ProviderError;
use productdesk_providers::{CompletionClient, CompletionRequest};
use serde::Serialize;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::debug;

/// Confidence reported by every domain agent. Not derived from the answer.
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

/// What a domain agent returns for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentAnswer {
    pub response: String,
    pub confidence: f32,
}

/// An agent scoped to a single product domain.
pub struct DomainAgent {
    domain: String,
    description: String,
    client: Arc<CompletionClient>,
    temperature: f32,
    max_tokens: u32,
    confidence: f32,
}

impl DomainAgent {
    pub fn new(
        domain: impl Into<String>,
        description: impl Into<String>,
        client: Arc<CompletionClient>,
    ) -> Self {
        Self {
            domain: domain.into(),
            description: description.into(),
            client,
            temperature: 0.3,
            max_tokens: 600,
            confidence: DEFAULT_CONFIDENCE,
        }
    }

    /// Apply the agent-level knobs from configuration.
    pub fn with_settings(self, settings: &OrchestratorConfig) -> Self {
        self.with_temperature(settings.agent_temperature)
            .with_max_tokens(settings.agent_max_tokens)
            .with_confidence(settings.confidence)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// States the domain and the exact knowledge the agent may use.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are answering questions about NVIDIA {}. You only know the following few \
             sentences about this product domain:\n\n{}",
            self.domain,
            self.description.trim()
        )
    }

    pub fn user_prompt(&self, query: &str) -> String {
        format!(
            "User query: \"{query}\"\n\n\
             Please use ONLY the information in your system prompt about NVIDIA {} to answer this query.\n\
             Do not make up any specifications or details that weren't provided to you.\n\
             If you don't have enough information to answer fully, be honest about your limitations.",
            self.domain
        )
    }

    /// Answer `query` from this domain's knowledge.
    pub async fn process(
        &self,
        query: &str,
        deadline: Instant,
    ) -> Result<AgentAnswer, ProviderError> {
        debug!(domain = %self.domain, "Domain agent processing query");

        let request = CompletionRequest::new(self.user_prompt(query))
            .system(self.system_prompt())
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);

        let response = self.client.complete(request, deadline).await?;

        if response.trim().is_empty() {
            return Err(ProviderError::MalformedResponse(format!(
                "empty answer from {} agent",
                self.domain
            )));
        }

        Ok(AgentAnswer {
            response,
            confidence: self.confidence,
        })
    }
}

impl std::fmt::Debug for DomainAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainAgent")
            .field("domain", &self.domain)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("confidence", &self.confidence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::time::Duration;

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[tokio::test]
    async fn answers_with_constant_confidence() {
        let provider = ScriptedProvider::new()
            .reply(agent_needle("Networking & DPUs"), "BlueField DPUs offload networking.");
        let client = client_for(provider.clone());
        let agent = DomainAgent::new(
            "Networking & DPUs",
            "NVIDIA networking products include ConnectX adapters and BlueField DPUs.",
            client,
        );

        let answer = agent.process("What does a DPU do?", deadline()).await.unwrap();
        assert_eq!(answer.response, "BlueField DPUs offload networking.");
        assert!((answer.confidence - 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn request_is_scoped_to_domain_knowledge() {
        let provider = ScriptedProvider::new().reply(agent_needle("Automotive"), "DRIVE Orin.");
        let agent = DomainAgent::new(
            "Automotive",
            "The DRIVE platform includes Orin processors.",
            client_for(provider.clone()),
        );
        agent.process("Self-driving?", deadline()).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        let system = req.system_prompt().unwrap();
        assert!(system.contains("The DRIVE platform includes Orin processors."));
        assert!(system.contains("NVIDIA Automotive"));
        let user = &req.messages.last().unwrap().content;
        assert!(user.contains("\"Self-driving?\""));
        assert!(user.contains("ONLY"));
        assert!((req.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(req.max_tokens, Some(600));
    }

    #[tokio::test]
    async fn completion_failure_propagates() {
        let provider = ScriptedProvider::new().fail(
            agent_needle("CUDA & Developer Tools"),
            ProviderError::AuthenticationFailed("bad key".into()),
        );
        let agent = DomainAgent::new("CUDA & Developer Tools", "CUDA.", client_for(provider));
        let err = agent.process("nvcc?", deadline()).await.unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn blank_answer_is_malformed() {
        let provider = ScriptedProvider::new().reply(agent_needle("Cloud Gaming Services"), "   ");
        let agent = DomainAgent::new("Cloud Gaming Services", "GeForce NOW.", client_for(provider));
        let err = agent.process("Tiers?", deadline()).await.unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn settings_override_defaults() {
        let provider = ScriptedProvider::new();
        let settings = OrchestratorConfig {
            agent_temperature: 0.1,
            agent_max_tokens: 300,
            confidence: 2.0,
            ..OrchestratorConfig::default()
        };
        let agent = DomainAgent::new("X", "x", client_for(provider)).with_settings(&settings);
        assert!((agent.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(agent.max_tokens, 300);
        assert!((agent.confidence - 1.0).abs() < f32::EPSILON);
    }
}

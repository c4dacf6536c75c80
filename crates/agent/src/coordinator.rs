//! Two-round consult / assess / backfill / merge coordinator.
//!
//! # Protocol
//!
//! ```text
//! query
//!   │
//!   ▼
//! select 1..=max_selected domains ──(call or parse fails)──► first N registered
//!   │
//!   ▼
//! round 1: all selected agents concurrently, barrier
//!   │
//!   ▼
//! assess sufficiency ──(call or parse fails)──► sufficient
//!   │
//!   ├─ insufficient and unconsulted domains remain
//!   │     │
//!   │     ▼
//!   │   backfill selection ──(fails)──► nobody
//!   │     │
//!   │     ▼
//!   │   round 2 (never re-assessed)
//!   ▼
//! merge ──(call fails)──► labelled concatenation
//! ```
//!
//! Every query gets its own deadline; each completion call is bounded by it.
//! Nothing inside `process_query*` is allowed to fail outward.

use crate::domain::{AgentAnswer, DomainAgent};
use crate::extract::{DomainSelection, SufficiencyPayload, extract_json};
use crate::prompts;
use crate::registry::AgentRegistry;
use futures::future::join_all;
use productdesk_config::OrchestratorConfig;
use productdesk_core::error::ProviderError;
use productdesk_core::event::{CompletionStatus, Notification, Notifier};
use productdesk_providers::CompletionClient;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Returned when no agent produced a usable answer.
pub const APOLOGY: &str =
    "I'm sorry, I couldn't find information to answer your question about NVIDIA products.";

/// Prefix of the deterministic answer used when the merge call fails.
pub const FALLBACK_PREAMBLE: &str =
    "Here's what I know about NVIDIA products related to your query:\n\n";

/// Gap reported when round 1 produced no successful answers.
pub const NO_VALID_RESPONSES: &str = "No valid agent responses received";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Error,
}

/// One agent invocation's outcome within a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResult {
    pub domain: String,
    pub response: String,
    pub confidence: f32,
    pub status: ResultStatus,
}

impl AgentResult {
    fn success(domain: &str, answer: AgentAnswer) -> Self {
        Self {
            domain: domain.to_string(),
            response: answer.response,
            confidence: answer.confidence,
            status: ResultStatus::Success,
        }
    }

    fn error(domain: &str, error: &ProviderError) -> Self {
        Self {
            domain: domain.to_string(),
            response: format!("Error: {error}"),
            confidence: 0.0,
            status: ResultStatus::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }
}

/// Whether round-1 information answers the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SufficiencyVerdict {
    pub is_sufficient: bool,
    pub missing_information: String,
}

impl SufficiencyVerdict {
    fn sufficient() -> Self {
        Self {
            is_sufficient: true,
            missing_information: String::new(),
        }
    }

    fn insufficient(gap: impl Into<String>) -> Self {
        Self {
            is_sufficient: false,
            missing_information: gap.into(),
        }
    }
}

/// Everything one query produced, for diagnostics and tests.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    /// The final answer text. Never empty.
    pub answer: String,
    /// Round-1 results in selection order, then round-2 results.
    pub results: Vec<AgentResult>,
    /// The verdict reached after round 1.
    pub verdict: SufficiencyVerdict,
    /// Number of invocation rounds actually run (0, 1 or 2).
    pub rounds: usize,
}

/// Routes queries to domain agents and merges what they say.
pub struct Coordinator {
    client: Arc<CompletionClient>,
    notifier: Arc<dyn Notifier>,
    registry: AgentRegistry,
    max_selected: usize,
    max_backfill: usize,
    preview_chars: usize,
    query_timeout: Duration,
}

impl Coordinator {
    pub fn new(client: Arc<CompletionClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_settings(client, notifier, &OrchestratorConfig::default())
    }

    pub fn with_settings(
        client: Arc<CompletionClient>,
        notifier: Arc<dyn Notifier>,
        settings: &OrchestratorConfig,
    ) -> Self {
        Self {
            client,
            notifier,
            registry: AgentRegistry::new(),
            max_selected: settings.max_selected.max(1),
            max_backfill: settings.max_backfill,
            preview_chars: settings.preview_chars,
            query_timeout: Duration::from_secs(settings.query_timeout_secs),
        }
    }

    /// Override the per-query deadline.
    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    /// Upsert an agent under `name`. Returns `true` if one was replaced.
    pub fn register(&mut self, name: impl Into<String>, agent: DomainAgent) -> bool {
        self.registry.register(name, agent)
    }

    /// Register an agent under its own domain name.
    pub fn register_agent(&mut self, agent: DomainAgent) -> bool {
        let name = agent.domain().to_string();
        self.registry.register(name, agent)
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn client(&self) -> &Arc<CompletionClient> {
        &self.client
    }

    /// Answer `query`, reporting progress to the construction-time notifier.
    pub async fn process_query(&self, query: &str) -> String {
        self.process_query_with(query, self.notifier.as_ref()).await
    }

    /// Answer `query`, reporting progress to `notifier` only.
    pub async fn process_query_with(&self, query: &str, notifier: &dyn Notifier) -> String {
        self.process_query_detailed(query, notifier).await.answer
    }

    /// Run the full protocol and keep the intermediate results.
    pub async fn process_query_detailed(&self, query: &str, notifier: &dyn Notifier) -> QueryOutcome {
        let deadline = Instant::now() + self.query_timeout;
        info!(agents = self.registry.len(), "Processing query");

        notifier.notify(Notification::thinking(
            "Analyzing query to determine relevant product domains...",
        ));

        let selected = self.select_agents(query, deadline).await;
        notifier.notify(Notification::thinking(format!(
            "Selected agents: {}",
            selected.join(", ")
        )));

        let mut rounds = 0;
        let mut results = Vec::new();
        if !selected.is_empty() {
            results = self.invoke_round(&selected, query, deadline, notifier).await;
            rounds = 1;
        }

        let verdict = self.assess_sufficiency(query, &results, deadline).await;
        debug!(sufficient = verdict.is_sufficient, "Sufficiency assessed");

        if !verdict.is_sufficient {
            let remaining: Vec<&str> = self
                .registry
                .names()
                .into_iter()
                .filter(|name| !selected.iter().any(|s| s.as_str() == *name))
                .collect();

            if remaining.is_empty() {
                notifier.notify(Notification::thinking(format!(
                    "The current information is insufficient: {}. No unconsulted agents remain.",
                    verdict.missing_information
                )));
            } else {
                notifier.notify(Notification::thinking(format!(
                    "The current information is insufficient: {}. Consulting additional agents...",
                    verdict.missing_information
                )));

                let additional = self
                    .select_backfill(query, &results, &remaining, &verdict.missing_information, deadline)
                    .await;

                if !additional.is_empty() {
                    notifier.notify(Notification::thinking(format!(
                        "Consulting additional agents: {}",
                        additional.join(", ")
                    )));
                    let more = self.invoke_round(&additional, query, deadline, notifier).await;
                    results.extend(more);
                    rounds += 1;
                }
            }
        }

        let answer = self.merge(query, &results, deadline).await;
        notifier.notify(Notification::response(answer.clone()));

        info!(
            rounds,
            results = results.len(),
            succeeded = results.iter().filter(|r| r.is_success()).count(),
            "Query complete"
        );

        QueryOutcome {
            answer,
            results,
            verdict,
            rounds,
        }
    }

    /// First `max_selected` registered names, in registration order.
    fn default_selection(&self) -> Vec<String> {
        self.registry
            .names()
            .into_iter()
            .take(self.max_selected)
            .map(str::to_string)
            .collect()
    }

    async fn select_agents(&self, query: &str, deadline: Instant) -> Vec<String> {
        let names = self.registry.names();
        if names.is_empty() {
            warn!("No agents registered; skipping selection");
            return Vec::new();
        }

        let request = prompts::selection(query, &names, self.max_selected);
        let text = match self.client.complete(request, deadline).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Agent selection call failed; using default selection");
                return self.default_selection();
            }
        };

        let picked = match extract_json::<DomainSelection>(&text) {
            Ok(selection) => selection.selected_domains.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Could not parse agent selection; using default selection");
                return self.default_selection();
            }
        };

        let chosen = keep_known(picked, &names, self.max_selected);
        if chosen.is_empty() {
            debug!("Selection named no registered agents; using default selection");
            return self.default_selection();
        }

        debug!(selected = ?chosen, "Agents selected");
        chosen
    }

    async fn invoke_round(
        &self,
        domains: &[String],
        query: &str,
        deadline: Instant,
        notifier: &dyn Notifier,
    ) -> Vec<AgentResult> {
        let mut calls = Vec::with_capacity(domains.len());
        for domain in domains {
            let Some(agent) = self.registry.get(domain) else {
                continue;
            };
            notifier.notify(Notification::agent_invocation(domain.as_str()));
            calls.push(invoke_agent(domain, agent, query, deadline, notifier));
        }

        // Results come back in invocation order regardless of completion order.
        join_all(calls).await
    }

    async fn assess_sufficiency(
        &self,
        query: &str,
        results: &[AgentResult],
        deadline: Instant,
    ) -> SufficiencyVerdict {
        let successes: Vec<&AgentResult> = results.iter().filter(|r| r.is_success()).collect();
        if successes.is_empty() {
            return SufficiencyVerdict::insufficient(NO_VALID_RESPONSES);
        }

        let request = prompts::sufficiency(query, &successes);
        let text = match self.client.complete(request, deadline).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Sufficiency call failed; assuming sufficient");
                return SufficiencyVerdict::sufficient();
            }
        };

        match extract_json::<SufficiencyPayload>(&text) {
            Ok(SufficiencyPayload {
                is_sufficient: Some(is_sufficient),
                missing_information: Some(missing_information),
            }) => SufficiencyVerdict {
                is_sufficient,
                missing_information,
            },
            Ok(_) => {
                debug!("Sufficiency verdict missing keys; assuming sufficient");
                SufficiencyVerdict::sufficient()
            }
            Err(e) => {
                warn!(error = %e, "Could not parse sufficiency verdict; assuming sufficient");
                SufficiencyVerdict::sufficient()
            }
        }
    }

    async fn select_backfill(
        &self,
        query: &str,
        results: &[AgentResult],
        remaining: &[&str],
        gap: &str,
        deadline: Instant,
    ) -> Vec<String> {
        if self.max_backfill == 0 {
            return Vec::new();
        }

        let request = prompts::backfill(
            query,
            results,
            remaining,
            gap,
            self.max_backfill,
            self.preview_chars,
        );

        let text = match self.client.complete(request, deadline).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Backfill selection call failed; skipping round 2");
                return Vec::new();
            }
        };

        match extract_json::<DomainSelection>(&text) {
            Ok(selection) => keep_known(
                selection.selected_domains.unwrap_or_default(),
                remaining,
                self.max_backfill,
            ),
            Err(e) => {
                warn!(error = %e, "Could not parse backfill selection; skipping round 2");
                Vec::new()
            }
        }
    }

    async fn merge(&self, query: &str, results: &[AgentResult], deadline: Instant) -> String {
        let successes: Vec<&AgentResult> = results.iter().filter(|r| r.is_success()).collect();
        if successes.is_empty() {
            return APOLOGY.to_string();
        }

        match self.client.complete(prompts::merge(query, &successes), deadline).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Merge call returned nothing; concatenating agent answers");
                fallback_answer(&successes)
            }
            Err(e) => {
                warn!(error = %e, "Merge call failed; concatenating agent answers");
                fallback_answer(&successes)
            }
        }
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("domains", &self.registry.names())
            .field("max_selected", &self.max_selected)
            .field("max_backfill", &self.max_backfill)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

async fn invoke_agent(
    domain: &str,
    agent: &DomainAgent,
    query: &str,
    deadline: Instant,
    notifier: &dyn Notifier,
) -> AgentResult {
    match agent.process(query, deadline).await {
        Ok(answer) => {
            notifier.notify(Notification::agent_completion(domain, CompletionStatus::Completed));
            AgentResult::success(domain, answer)
        }
        Err(e) => {
            warn!(domain, error = %e, "Agent failed");
            notifier.notify(Notification::agent_completion(domain, CompletionStatus::Failed));
            AgentResult::error(domain, &e)
        }
    }
}

/// Names from `picked` that appear in `allowed`, deduplicated, at most `cap`.
fn keep_known(picked: Vec<String>, allowed: &[&str], cap: usize) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for name in picked {
        if kept.len() >= cap {
            break;
        }
        let name = name.trim();
        if allowed.contains(&name) && !kept.iter().any(|k| k == name) {
            kept.push(name.to_string());
        }
    }
    kept
}

/// Deterministic answer: the preamble, then each answer labelled by domain.
pub fn fallback_answer(successes: &[&AgentResult]) -> String {
    let mut text = String::from(FALLBACK_PREAMBLE);
    for r in successes {
        text.push_str(&format!("From {}:\n{}\n\n", r.domain, r.response));
    }
    text
}

// ── Tests ─────────────────────────────────────────────────────────────────

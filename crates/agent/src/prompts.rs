//! Prompt builders for the coordinator's completion calls.
//!
//! Each builder returns a ready [`CompletionRequest`] so sampling settings
//! live next to the wording they were tuned for.

use crate::coordinator::AgentResult;
use productdesk_providers::CompletionRequest;

const ADVISOR_SYSTEM: &str = "You are an NVIDIA product advisor.\n\
Your job is to determine which specialized NVIDIA product domain agents should be consulted to answer a query.\n\
Select only the agents that are directly relevant to the query.";

const BACKFILL_SYSTEM: &str = "You are an NVIDIA product advisor.\n\
Your job is to determine which additional product domain agents should be consulted to fill gaps in information.";

const ASSESS_SYSTEM: &str = "You are an NVIDIA product information specialist.\n\
Your task is to judge whether the provided information is enough to answer a user's query.\n\
Be critical and name the specific information that would be needed for a complete answer.";

const MERGE_SYSTEM: &str = "You are an NVIDIA product information specialist.\n\
Use ONLY the information provided to answer the query.\n\
Do NOT add any information beyond what's provided in the agent responses.\n\
Be honest about limitations if the provided information is insufficient.";

fn bullet_list(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| format!("- {n}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Successful answers, each tagged with its source domain.
fn information_block(results: &[&AgentResult]) -> String {
    results
        .iter()
        .map(|r| format!("\n--- Information from {} ---\n{}\n\n", r.domain, r.response))
        .collect()
}

/// Pick up to `max` domains for a fresh query.
pub fn selection(query: &str, domains: &[&str], max: usize) -> CompletionRequest {
    let prompt = format!(
        "Here is a user query about NVIDIA products:\n\"{query}\"\n\n\
         Available product domain agents:\n{}\n\n\
         Task: Select 1-{max} most relevant product domain agents to answer this query.\n\
         Return a JSON object with a 'selected_domains' key containing an array of domain names.\n",
        bullet_list(domains)
    );

    CompletionRequest::new(prompt)
        .system(ADVISOR_SYSTEM)
        .temperature(0.2)
        .max_tokens(1024)
}

/// Judge whether the gathered answers cover the query. Biased toward "yes".
pub fn sufficiency(query: &str, successes: &[&AgentResult]) -> CompletionRequest {
    let prompt = format!(
        "User query about NVIDIA products: \"{query}\"\n\n\
         Information gathered from NVIDIA product domain agents:\n{}\n\
         Task: Assess if this information is sufficient to answer the user's query.\n\
         Return a JSON object with the following format:\n\
         {{\n  \"is_sufficient\": true/false,\n  \"missing_information\": \"Description of what information is missing (if any)\"\n}}\n\n\
         Only return false if critical information needed to answer the query is missing.\n\
         If the information is sufficient, even if not comprehensive, return true.\n",
        information_block(successes)
    );

    CompletionRequest::new(prompt)
        .system(ASSESS_SYSTEM)
        .temperature(0.3)
        .max_tokens(800)
}

/// Pick up to `max` unconsulted domains that could fill `gap`.
pub fn backfill(
    query: &str,
    results: &[AgentResult],
    remaining: &[&str],
    gap: &str,
    max: usize,
    preview_chars: usize,
) -> CompletionRequest {
    let previews: String = results
        .iter()
        .map(|r| {
            let preview: String = r.response.chars().take(preview_chars).collect();
            format!("\n--- Response from {} ---\n{preview}...\n\n", r.domain)
        })
        .collect();

    let prompt = format!(
        "User query about NVIDIA products: \"{query}\"\n\n\
         Current information from agents:\n{previews}\n\
         Missing information identified: {gap}\n\n\
         Remaining available agents that haven't been consulted:\n{}\n\n\
         Task: Select up to {max} additional agents that are most likely to provide the missing information.\n\
         Return a JSON object with a 'selected_domains' key containing an array of domain names.\n\
         If no additional agents would be helpful, return an empty array.\n",
        bullet_list(remaining)
    );

    CompletionRequest::new(prompt)
        .system(BACKFILL_SYSTEM)
        .temperature(0.2)
        .max_tokens(1024)
}

/// Synthesize one answer from the successful agent responses.
pub fn merge(query: &str, successes: &[&AgentResult]) -> CompletionRequest {
    let prompt = format!(
        "User query about NVIDIA products: \"{query}\"\n\n\
         Information from various product domain agents:\n{}\n\
         Task: Combine this information into a single, coherent answer that directly addresses the user's query.\n\
         Only use the information given - do not make up additional specifications or details.\n\
         If the information provided doesn't fully answer the query, be upfront about these limitations.\n",
        information_block(successes)
    );

    CompletionRequest::new(prompt)
        .system(MERGE_SYSTEM)
        .temperature(0.3)
        .max_tokens(800)
}

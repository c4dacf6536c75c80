//! Domain agents and the coordinator that routes product questions to them.
//!
//! A query flows through [`Coordinator::process_query`]:
//!
//! 1. **Select** the relevant domains (model-chosen, with a fixed fallback)
//! 2. **Consult** the selected [`DomainAgent`]s concurrently
//! 3. **Assess** whether their answers suffice
//! 4. **Backfill** from unconsulted domains at most once
//! 5. **Merge** the successful answers into one reply
//!
//! Progress is reported through a [`productdesk_core::Notifier`] sink.

pub mod catalog;
pub mod coordinator;
pub mod domain;
pub mod extract;
mod prompts;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use catalog::{CATALOG, CatalogEntry, DEMO_QUERIES, register_catalog, sales_coordinator};
pub use coordinator::{
    APOLOGY, AgentResult, Coordinator, FALLBACK_PREAMBLE, NO_VALID_RESPONSES, QueryOutcome,
    ResultStatus, SufficiencyVerdict,
};
pub use domain::{AgentAnswer, DEFAULT_CONFIDENCE, DomainAgent};
pub use extract::{DomainSelection, ExtractError, SufficiencyPayload, extract_json, json_span};
pub use registry::AgentRegistry;

//! Completion endpoint implementations for productdesk.
//!
//! All providers implement the `productdesk_core::Provider` trait.
//! The router selects the correct provider based on configuration, and
//! [`CompletionClient`] is the call shape the orchestration layer uses.

pub mod anthropic;
pub mod completion;
mod http;
pub mod openai_compat;
pub mod router;

pub use anthropic::AnthropicProvider;
pub use completion::{CompletionClient, CompletionRequest};
pub use openai_compat::OpenAiCompatProvider;
pub use router::ProviderRouter;

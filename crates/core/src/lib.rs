//! # productdesk core
//!
//! Domain types, traits, and error definitions for the productdesk sales agent.
//! This crate has **no framework dependencies**: it defines the model that the
//! provider, agent, and gateway crates implement against.
//!
//! - [`Provider`] abstracts over language-model completion endpoints.
//! - [`Notifier`] is the one-directional sink that receives orchestration
//!   progress [`Notification`]s.
//! - [`Error`] and [`ProviderError`] form the error taxonomy.

pub mod error;
pub mod event;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result};
pub use event::{
    BroadcastNotifier, ChannelNotifier, CompletionStatus, FnNotifier, Notification, Notifier,
    NullNotifier, RecordingNotifier,
};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};

//! Orchestration notifications: one-directional progress events.
//!
//! The coordinator publishes a [`Notification`] at every protocol
//! transition. Delivery goes through a [`Notifier`] sink that is injected
//! by the caller, so concurrent queries can each carry their own sink.
//! Notification delivery never influences the protocol: `notify` is
//! synchronous and infallible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, mpsc};

/// Outcome reported by an `agent_completion` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Completed,
    Failed,
}

impl std::fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// All notification kinds, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A domain agent is about to be called.
    AgentInvocation {
        agent_id: String,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A domain agent finished.
    AgentCompletion {
        agent_id: String,
        message: String,
        status: CompletionStatus,
        timestamp: DateTime<Utc>,
    },

    /// Coordinator-level progress note.
    OrchestratorThinking {
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// The merged answer; terminal event for a query.
    Response {
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Session lifecycle note (emitted by hosts, never by the coordinator).
    System {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl Notification {
    pub fn agent_invocation(agent_id: impl Into<String>) -> Self {
        let agent_id = agent_id.into();
        Self::AgentInvocation {
            message: format!("Consulting {agent_id} agent"),
            agent_id,
            timestamp: Utc::now(),
        }
    }

    pub fn agent_completion(agent_id: impl Into<String>, status: CompletionStatus) -> Self {
        let agent_id = agent_id.into();
        Self::AgentCompletion {
            message: format!("{agent_id} agent finished processing"),
            agent_id,
            status,
            timestamp: Utc::now(),
        }
    }

    pub fn thinking(message: impl Into<String>) -> Self {
        Self::OrchestratorThinking {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn response(message: impl Into<String>) -> Self {
        Self::Response {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::System {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// The wire tag of this notification.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AgentInvocation { .. } => "agent_invocation",
            Self::AgentCompletion { .. } => "agent_completion",
            Self::OrchestratorThinking { .. } => "orchestrator_thinking",
            Self::Response { .. } => "response",
            Self::System { .. } => "system",
        }
    }

    /// The human-readable message carried by every kind.
    pub fn message(&self) -> &str {
        match self {
            Self::AgentInvocation { message, .. }
            | Self::AgentCompletion { message, .. }
            | Self::OrchestratorThinking { message, .. }
            | Self::Response { message, .. }
            | Self::System { message, .. } => message,
        }
    }

    /// The agent this notification is about, if any.
    pub fn agent_id(&self) -> Option<&str> {
        match self {
            Self::AgentInvocation { agent_id, .. } | Self::AgentCompletion { agent_id, .. } => {
                Some(agent_id)
            }
            _ => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::AgentInvocation { timestamp, .. }
            | Self::AgentCompletion { timestamp, .. }
            | Self::OrchestratorThinking { timestamp, .. }
            | Self::Response { timestamp, .. }
            | Self::System { timestamp, .. } => *timestamp,
        }
    }
}

/// A fire-and-forget notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Forwards notifications to a closure.
pub struct FnNotifier<F>(F);

impl<F> FnNotifier<F>
where
    F: Fn(Notification) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self(callback)
    }
}

impl<F> Notifier for FnNotifier<F>
where
    F: Fn(Notification) + Send + Sync,
{
    fn notify(&self, notification: Notification) {
        (self.0)(notification);
    }
}

/// Pushes notifications into an unbounded tokio channel.
///
/// A dropped receiver is not an error; the notification is discarded.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        let _ = self.sender.send(notification);
    }
}

/// A broadcast-based notifier for multiple subscribers.
///
/// Uses `tokio::sync::broadcast`; slow subscribers may lag and miss events.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Arc<Notification>>,
}

impl BroadcastNotifier {
    /// Create a new broadcast notifier with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to receive notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Notification>> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notification: Notification) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(notification));
    }
}

/// Buffers notifications in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything recorded so far.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}

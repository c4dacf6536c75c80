//! Console progress output for the coordinator's notifications.

use productdesk_core::event::{CompletionStatus, Notification, Notifier};

/// Prints agent activity to stderr. The final answer is left to the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

/// One display line per notification; `None` for the final response.
pub fn render(notification: &Notification) -> Option<String> {
    match notification {
        Notification::AgentInvocation { agent_id, .. } => {
            Some(format!("  🔍 Consulting {agent_id} agent..."))
        }
        Notification::AgentCompletion {
            agent_id, status, ..
        } => Some(match status {
            CompletionStatus::Completed => format!("  ✓ {agent_id} agent has responded"),
            CompletionStatus::Failed => format!("  ✗ {agent_id} agent failed"),
        }),
        Notification::OrchestratorThinking { message, .. } => Some(format!("  💭 {message}")),
        Notification::System { message, .. } => Some(format!("  {message}")),
        Notification::Response { .. } => None,
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        if let Some(line) = render(&notification) {
            eprintln!("{line}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_agent_lifecycle() {
        assert_eq!(
            render(&Notification::agent_invocation("Networking & DPUs")).unwrap(),
            "  🔍 Consulting Networking & DPUs agent..."
        );
        assert_eq!(
            render(&Notification::agent_completion("X", CompletionStatus::Failed)).unwrap(),
            "  ✗ X agent failed"
        );
        assert_eq!(
            render(&Notification::thinking("Selected agents: A")).unwrap(),
            "  💭 Selected agents: A"
        );
    }

    #[test]
    fn final_response_is_not_echoed() {
        assert!(render(&Notification::response("answer")).is_none());
    }
}

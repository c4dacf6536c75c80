//! Ordered registry of domain agents.
//!
//! Enumeration follows first registration. Re-registering a domain replaces
//! the agent in place, so the fallback selection stays stable.

use crate::domain::DomainAgent;
use std::sync::Arc;
use tracing::debug;

/// Domain name → agent, in registration order.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    entries: Vec<(String, Arc<DomainAgent>)>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert an agent. Returns `true` when an existing entry was replaced.
    pub fn register(&mut self, name: impl Into<String>, agent: DomainAgent) -> bool {
        let name = name.into();
        let agent = Arc::new(agent);

        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            debug!(domain = %name, "Replacing registered agent");
            slot.1 = agent;
            return true;
        }

        debug!(domain = %name, "Registering agent");
        self.entries.push((name, agent));
        false
    }

    pub fn get(&self, name: &str) -> Option<&Arc<DomainAgent>> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered domain names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<DomainAgent>)> {
        self.entries.iter().map(|(n, a)| (n.as_str(), a))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ScriptedProvider, client_for};

    fn agent(domain: &str, description: &str) -> DomainAgent {
        DomainAgent::new(domain, description, client_for(ScriptedProvider::new()))
    }

    #[test]
    fn preserves_registration_order() {
        let mut registry = AgentRegistry::new();
        registry.register("C", agent("C", "c"));
        registry.register("A", agent("A", "a"));
        registry.register("B", agent("B", "b"));
        assert_eq!(registry.names(), vec!["C", "A", "B"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn last_registration_wins_in_original_position() {
        let mut registry = AgentRegistry::new();
        assert!(!registry.register("A", agent("A", "first")));
        registry.register("B", agent("B", "b"));
        assert!(registry.register("A", agent("A", "second")));

        assert_eq!(registry.names(), vec!["A", "B"]);
        assert_eq!(registry.get("A").unwrap().description(), "second");
    }

    #[test]
    fn lookup_and_contains() {
        let mut registry = AgentRegistry::new();
        assert!(registry.is_empty());
        registry.register("Networking & DPUs", agent("Networking & DPUs", "dpu"));
        assert!(registry.contains("Networking & DPUs"));
        assert!(!registry.contains("networking & dpus"));
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn iter_yields_pairs() {
        let mut registry = AgentRegistry::new();
        registry.register("X", agent("X", "x"));
        let pairs: Vec<_> = registry.iter().map(|(n, a)| (n, a.domain().to_string())).collect();
        assert_eq!(pairs, vec![("X", "X".to_string())]);
    }
}

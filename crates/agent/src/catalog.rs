//! Built-in product catalog: the eight NVIDIA domains and what each knows.

use crate::coordinator::Coordinator;
use crate::domain::DomainAgent;
use productdesk_config::OrchestratorConfig;
use productdesk_core::event::Notifier;
use productdesk_providers::CompletionClient;
use std::sync::Arc;

/// A catalog domain and its knowledge snippet.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub domain: &'static str,
    pub description: &'static str,
}

pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        domain: "GeForce Gaming GPUs",
        description: "NVIDIA GeForce GPUs are dedicated graphics cards for gaming. The current RTX 40-series \
            includes models like the 4090, 4080, 4070, and 4060, offering features like ray tracing and DLSS. \
            They are designed for gaming performance across different price points.",
    },
    CatalogEntry {
        domain: "RTX Professional GPUs",
        description: "NVIDIA RTX Professional GPUs (formerly Quadro) are designed for professional workloads. \
            They include the RTX A-series cards with certified drivers for CAD, 3D modeling, and visualization \
            software. They prioritize accuracy and reliability over gaming performance.",
    },
    CatalogEntry {
        domain: "NVIDIA Data Center Solutions",
        description: "NVIDIA Data Center solutions include H100, A100, and L40S GPUs for enterprise applications. \
            These power AI, HPC, and data analytics in server environments. NVIDIA DGX systems combine multiple \
            GPUs for advanced AI training and inference.",
    },
    CatalogEntry {
        domain: "CUDA & Developer Tools",
        description: "NVIDIA CUDA is a parallel computing platform for developers. It includes the CUDA Toolkit, \
            libraries like cuDNN and TensorRT, and programming APIs. CUDA allows developers to use NVIDIA GPUs \
            for general purpose computing beyond graphics.",
    },
    CatalogEntry {
        domain: "AI & Deep Learning Platforms",
        description: "NVIDIA's AI platforms support machine learning and deep learning workflows. They include \
            hardware optimized for AI, frameworks like NeMo and Omniverse, and enterprise software solutions. \
            NVIDIA GPUs have tensor cores specifically designed to accelerate AI computations.",
    },
    CatalogEntry {
        domain: "Networking & DPUs",
        description: "NVIDIA networking products include ConnectX adapters, BlueField DPUs, and Spectrum switches. \
            They provide high-bandwidth, low-latency networking for data centers. The BlueField DPUs offload \
            networking, security, and storage tasks from CPUs.",
    },
    CatalogEntry {
        domain: "Automotive & Self-Driving Tech",
        description: "NVIDIA automotive solutions power self-driving vehicles and in-car AI. The DRIVE platform \
            includes Orin processors and software for autonomous driving. These systems handle sensor fusion, \
            path planning, and driver monitoring for vehicle autonomy.",
    },
    CatalogEntry {
        domain: "Cloud Gaming Services",
        description: "NVIDIA GeForce NOW is a cloud gaming service that streams games from NVIDIA servers. \
            It supports various devices including PCs, Macs, mobile, and TVs. Different subscription tiers \
            offer varying levels of performance and features like RTX.",
    },
];

/// Sample questions exercised by `productdesk demo`.
pub const DEMO_QUERIES: &[&str] = &[
    "What's the best NVIDIA GPU for gaming?",
    "Tell me about NVIDIA's AI solutions",
    "How does NVIDIA support self-driving cars?",
    "What are the benefits of RTX technology?",
    "Tell me about NVIDIA's cloud gaming service",
];

/// Catalog domain names in registration order.
pub fn domain_names() -> Vec<&'static str> {
    CATALOG.iter().map(|e| e.domain).collect()
}

/// Register one agent per catalog domain.
pub fn register_catalog(
    coordinator: &mut Coordinator,
    client: Arc<CompletionClient>,
    settings: &OrchestratorConfig,
) {
    for entry in CATALOG {
        let agent =
            DomainAgent::new(entry.domain, entry.description, client.clone()).with_settings(settings);
        coordinator.register(entry.domain, agent);
    }
}

/// A coordinator with the full catalog registered.
pub fn sales_coordinator(
    client: Arc<CompletionClient>,
    notifier: Arc<dyn Notifier>,
    settings: &OrchestratorConfig,
) -> Coordinator {
    let mut coordinator = Coordinator::with_settings(client.clone(), notifier, settings);
    register_catalog(&mut coordinator, client, settings);
    coordinator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ScriptedProvider, client_for};
    use productdesk_core::event::NullNotifier;

    #[test]
    fn catalog_has_eight_unique_domains() {
        let names = domain_names();
        assert_eq!(names.len(), 8);
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), 8);
    }

    #[test]
    fn descriptions_are_single_paragraphs() {
        for entry in CATALOG {
            assert!(!entry.description.contains('\n'), "{}", entry.domain);
            assert!(entry.description.starts_with("NVIDIA"), "{}", entry.domain);
        }
    }

    #[test]
    fn sales_coordinator_registers_catalog_in_order() {
        let coordinator = sales_coordinator(
            client_for(ScriptedProvider::new()),
            Arc::new(NullNotifier),
            &OrchestratorConfig::default(),
        );
        assert_eq!(coordinator.registry().names(), domain_names());
        assert!(
            coordinator
                .registry()
                .get("Networking & DPUs")
                .unwrap()
                .system_prompt()
                .contains("BlueField DPUs")
        );
    }

    #[test]
    fn five_demo_queries() {
        assert_eq!(DEMO_QUERIES.len(), 5);
    }
}

//! Whole-landscape views of one completed analysis: tier breakdown, influence
//! metrics and per-tier engagement strategies.

use chrono::{DateTime, Utc};
use negotiator_core::{EngagementLabel, LandscapeConfig, NegotiationError, PriorityTier, SalienceResult};
use negotiator_graph::{DanglingReference, InfluenceEdge, InfluenceGraph};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A completed stakeholder analysis, as stored per session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StakeholderAnalysis {
    pub analysis_id: Uuid,
    pub context: String,
    pub analyzed_at: DateTime<Utc>,
    /// Ranked: tier, then descending salience, then input order
    pub stakeholders: Vec<SalienceResult>,
    #[serde(skip)]
    pub graph: InfluenceGraph,
    pub priority_summary: PrioritySummary,
    pub relationships: RelationshipSummary,
    pub engagement_strategies: Vec<EngagementStrategy>,
}

impl StakeholderAnalysis {
    pub fn stakeholder(&self, name: &str) -> Option<&SalienceResult> {
        self.stakeholders.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.stakeholders.iter().map(|s| s.name.clone()).collect()
    }

    /// Dangling influence references as warning-level errors
    pub fn warnings(&self) -> Vec<NegotiationError> {
        self.relationships
            .dangling_references
            .iter()
            .cloned()
            .map(NegotiationError::from)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSummary {
    pub tier: PriorityTier,
    pub label: String,
    pub count: usize,
    pub stakeholders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrioritySummary {
    pub total_stakeholders: usize,
    /// Always three entries, First to Third
    pub tiers: Vec<TierSummary>,
    pub supportive: usize,
    pub neutral: usize,
    pub adversarial: usize,
}

impl PrioritySummary {
    pub fn tier(&self, tier: PriorityTier) -> Option<&TierSummary> {
        self.tiers.iter().find(|t| t.tier == tier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConnector {
    pub name: String,
    pub influences_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfluenceTarget {
    pub name: String,
    pub influenced_by_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSummary {
    /// Stakeholders shaping the most others
    pub key_connectors: Vec<KeyConnector>,
    /// Stakeholders shaped by the most others
    pub key_influencers: Vec<KeyInfluenceTarget>,
    pub total_connections: usize,
    pub edges: Vec<InfluenceEdge>,
    pub dangling_references: Vec<DanglingReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementStrategy {
    pub tier: PriorityTier,
    pub description: String,
    pub actions: Vec<String>,
    pub stakeholders: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LandscapeAnalyzer {
    config: LandscapeConfig,
}

impl LandscapeAnalyzer {
    pub fn new(config: LandscapeConfig) -> Self {
        Self { config }
    }

    pub fn priority_summary(&self, ranked: &[SalienceResult]) -> PrioritySummary {
        let tiers = PriorityTier::ALL
            .iter()
            .map(|&tier| {
                let stakeholders: Vec<String> = ranked
                    .iter()
                    .filter(|s| s.tier == tier)
                    .map(|s| s.name.clone())
                    .collect();
                TierSummary {
                    tier,
                    label: tier.label().to_string(),
                    count: stakeholders.len(),
                    stakeholders,
                }
            })
            .collect();

        let count = |label: EngagementLabel| ranked.iter().filter(|s| s.engagement == label).count();

        PrioritySummary {
            total_stakeholders: ranked.len(),
            tiers,
            supportive: count(EngagementLabel::Supportive),
            neutral: count(EngagementLabel::Neutral),
            adversarial: count(EngagementLabel::Adversarial),
        }
    }

    /// Degree rankings over resolved edges. Ties keep declaration order.
    pub fn relationships(&self, graph: &InfluenceGraph) -> RelationshipSummary {
        let limit = self.config.key_actor_limit;

        let mut connectors: Vec<KeyConnector> = graph
            .node_names()
            .map(|name| KeyConnector {
                name: name.to_string(),
                influences_count: graph.out_degree(name),
            })
            .filter(|c| c.influences_count > 0)
            .collect();
        connectors.sort_by(|a, b| b.influences_count.cmp(&a.influences_count));
        connectors.truncate(limit);

        let mut influencers: Vec<KeyInfluenceTarget> = graph
            .node_names()
            .map(|name| KeyInfluenceTarget {
                name: name.to_string(),
                influenced_by_count: graph.in_degree(name),
            })
            .filter(|t| t.influenced_by_count > 0)
            .collect();
        influencers.sort_by(|a, b| b.influenced_by_count.cmp(&a.influenced_by_count));
        influencers.truncate(limit);

        RelationshipSummary {
            key_connectors: connectors,
            key_influencers: influencers,
            total_connections: graph.edge_count(),
            edges: graph.edges(),
            dangling_references: graph.dangling().to_vec(),
        }
    }

    pub fn engagement_strategies(&self, ranked: &[SalienceResult]) -> Vec<EngagementStrategy> {
        PriorityTier::ALL
            .iter()
            .map(|&tier| EngagementStrategy {
                tier,
                description: tier_description(tier).to_string(),
                actions: tier_actions(tier).iter().map(|a| a.to_string()).collect(),
                stakeholders: ranked
                    .iter()
                    .filter(|s| s.tier == tier)
                    .map(|s| s.name.clone())
                    .collect(),
            })
            .collect()
    }
}

fn tier_description(tier: PriorityTier) -> &'static str {
    match tier {
        PriorityTier::First => {
            "These stakeholders require active, continuous engagement and careful management"
        }
        PriorityTier::Second => {
            "These stakeholders need selective engagement - focus efforts strategically"
        }
        PriorityTier::Third => {
            "These stakeholders require minimal engagement unless their influence grows"
        }
    }
}

fn tier_actions(tier: PriorityTier) -> &'static [&'static str] {
    match tier {
        PriorityTier::First => &[
            "Schedule regular one-on-one meetings with each stakeholder",
            "Develop personalized engagement plans addressing their specific concerns",
            "For opposed stakeholders: understand their objections and seek compromise",
            "For supportive stakeholders: leverage their advocacy and visibility",
            "For neutral stakeholders: provide information to shift toward support",
            "Monitor their positions continuously and adjust strategies as needed",
        ],
        PriorityTier::Second => &[
            "Engage through targeted communications and periodic updates",
            "Leverage supportive stakeholders as advocates and amplifiers",
            "Monitor opposed stakeholders for escalating resistance",
            "Use intermediaries to influence indirectly where appropriate",
            "Provide key information at critical decision points",
            "Build coalitions among aligned stakeholders in this group",
        ],
        PriorityTier::Third => &[
            "Include in general communications and broad stakeholder updates",
            "Monitor for changes in power, urgency, or position",
            "Respond to direct inquiries but don't proactively engage",
            "Keep informed of major developments that might affect them",
            "Re-assess if they show signs of increasing influence",
        ],
    }
}

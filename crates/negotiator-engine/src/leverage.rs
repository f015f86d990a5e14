//! Tactic synthesis for one target stakeholder.
//!
//! Synthesis reads only the ranked results and the influence graph of one
//! analysis. It never touches the clock or the session store, so the same
//! analysis and target always produce the same plan.

use negotiator_core::{
    EngagementLabel, LeverageConfig, NegotiationError, PriorityTier, Result, SalienceResult, ScoringPolicy,
};
use negotiator_graph::InfluenceGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// Overall stance the plan takes towards its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimaryApproach {
    #[serde(rename = "coalition reinforcement")]
    CoalitionReinforcement,
    #[serde(rename = "containment and risk mitigation")]
    ContainmentAndRiskMitigation,
    #[serde(rename = "persuasion and incentive framing")]
    PersuasionAndIncentiveFraming,
}

impl PrimaryApproach {
    pub fn for_label(label: EngagementLabel) -> Self {
        match label {
            EngagementLabel::Supportive => PrimaryApproach::CoalitionReinforcement,
            EngagementLabel::Adversarial => PrimaryApproach::ContainmentAndRiskMitigation,
            EngagementLabel::Neutral => PrimaryApproach::PersuasionAndIncentiveFraming,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimaryApproach::CoalitionReinforcement => "coalition reinforcement",
            PrimaryApproach::ContainmentAndRiskMitigation => "containment and risk mitigation",
            PrimaryApproach::PersuasionAndIncentiveFraming => "persuasion and incentive framing",
        }
    }
}

impl fmt::Display for PrimaryApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A direct influencer of the target with what it costs to mobilize it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluencerProfile {
    pub name: String,
    pub tier: PriorityTier,
    pub engagement: EngagementLabel,
    pub salience: f64,
    pub power: f64,
}

impl InfluencerProfile {
    fn from_result(result: &SalienceResult) -> Self {
        Self {
            name: result.name.clone(),
            tier: result.tier,
            engagement: result.engagement,
            salience: result.salience,
            power: result.power,
        }
    }
}

/// An influencer reached through one of the target's direct influencers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndirectInfluencer {
    pub name: String,
    /// The direct influencer it is reached through
    pub via: String,
    pub depth: usize,
    pub tier: PriorityTier,
    pub engagement: EngagementLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticKind {
    PrimaryApproach,
    TierEngagement,
    Coalition,
    Neutralization,
    CounterInfluence,
    NeutralConversion,
    IntermediaryRouting,
    DirectEngagement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tactic {
    pub kind: TacticKind,
    pub description: String,
    /// Stakeholders the tactic works through
    pub actors: Vec<String>,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoalitionKind {
    Power,
    Peer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoalitionOpportunity {
    pub kind: CoalitionKind,
    pub description: String,
    pub members: Vec<String>,
    pub benefit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskMitigation {
    pub risk: String,
    pub mitigation: String,
}

impl RiskMitigation {
    fn new(risk: impl Into<String>, mitigation: impl Into<String>) -> Self {
        Self {
            risk: risk.into(),
            mitigation: mitigation.into(),
        }
    }
}

/// Tactical plan for influencing one stakeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeveragePlan {
    pub target: String,
    pub target_result: SalienceResult,
    pub primary_approach: PrimaryApproach,
    pub overall_strategy: String,
    /// Supportive direct influencers
    pub allies: Vec<InfluencerProfile>,
    /// Adversarial direct influencers
    pub opponents: Vec<InfluencerProfile>,
    pub neutral_influencers: Vec<InfluencerProfile>,
    pub indirect_influencers: Vec<IndirectInfluencer>,
    pub tactics: Vec<Tactic>,
    pub coalition_opportunities: Vec<CoalitionOpportunity>,
    pub risks: Vec<RiskMitigation>,
    /// Cached analysis the plan was derived from; `None` for explicit payloads
    pub analysis_id: Option<Uuid>,
}

impl LeveragePlan {
    pub fn ally_names(&self) -> Vec<&str> {
        self.allies.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn opponent_names(&self) -> Vec<&str> {
        self.opponents.iter().map(|o| o.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeverageSynthesizer {
    policy: ScoringPolicy,
    config: LeverageConfig,
}

impl LeverageSynthesizer {
    pub fn new(policy: ScoringPolicy, config: LeverageConfig) -> Self {
        Self { policy, config }
    }

    /// Build the plan for `target` from one analysis' results and graph.
    ///
    /// Fails with `TargetNotFound` on anything but an exact, case-sensitive name.
    pub fn synthesize(
        &self,
        results: &[SalienceResult],
        graph: &InfluenceGraph,
        target: &str,
        analysis_id: Option<Uuid>,
    ) -> Result<LeveragePlan> {
        let by_name: HashMap<&str, &SalienceResult> = results.iter().map(|r| (r.name.as_str(), r)).collect();

        let target_result = by_name
            .get(target)
            .copied()
            .ok_or_else(|| NegotiationError::TargetNotFound {
                target: target.to_string(),
                valid_names: results.iter().map(|r| r.name.clone()).collect(),
            })?;

        let mut allies = Vec::new();
        let mut opponents = Vec::new();
        let mut neutral_influencers = Vec::new();
        for name in graph.direct_influencers(target) {
            let Some(influencer) = by_name.get(name) else {
                continue;
            };
            let profile = InfluencerProfile::from_result(influencer);
            match influencer.engagement {
                EngagementLabel::Supportive => allies.push(profile),
                EngagementLabel::Adversarial => opponents.push(profile),
                EngagementLabel::Neutral => neutral_influencers.push(profile),
            }
        }

        let indirect_influencers: Vec<IndirectInfluencer> = graph
            .reachable_within(target, self.config.indirect_depth)
            .into_iter()
            .filter(|reached| reached.depth >= 2)
            .filter_map(|reached| {
                let result = by_name.get(reached.name.as_str())?;
                Some(IndirectInfluencer {
                    via: reached.via?,
                    name: reached.name,
                    depth: reached.depth,
                    tier: result.tier,
                    engagement: result.engagement,
                })
            })
            .collect();

        let primary_approach = PrimaryApproach::for_label(target_result.engagement);
        let tactics = self.tactics(
            target_result,
            primary_approach,
            &allies,
            &opponents,
            &neutral_influencers,
            &indirect_influencers,
        );
        let coalition_opportunities = self.coalition_opportunities(target_result, results);
        let risks = self.risks(target_result, &opponents);

        debug!(
            target = %target,
            approach = %primary_approach,
            allies = allies.len(),
            opponents = opponents.len(),
            tactics = tactics.len(),
            "Leverage plan synthesized"
        );

        Ok(LeveragePlan {
            target: target_result.name.clone(),
            target_result: target_result.clone(),
            primary_approach,
            overall_strategy: overall_strategy(target_result),
            allies,
            opponents,
            neutral_influencers,
            indirect_influencers,
            tactics,
            coalition_opportunities,
            risks,
            analysis_id,
        })
    }

    fn tactics(
        &self,
        target: &SalienceResult,
        approach: PrimaryApproach,
        allies: &[InfluencerProfile],
        opponents: &[InfluencerProfile],
        neutrals: &[InfluencerProfile],
        indirect: &[IndirectInfluencer],
    ) -> Vec<Tactic> {
        let name = target.name.as_str();
        let mut tactics = vec![approach_tactic(name, approach), tier_tactic(name, target.tier)];

        if !allies.is_empty() {
            let actors = names(allies);
            tactics.push(Tactic {
                kind: TacticKind::Coalition,
                description: format!("Build coalition with {}", actors.join(", ")),
                actions: vec![
                    "Brief supportive influencers on key talking points".to_string(),
                    "Provide evidence and documentation to support their advocacy".to_string(),
                    format!("Request they raise concerns directly with {}", name),
                    "Coordinate timing of advocacy for maximum impact".to_string(),
                ],
                actors,
            });
        }

        if !opponents.is_empty() {
            let actors = names(opponents);
            let (kind, description) = if target.is_adversarial() {
                (
                    TacticKind::Neutralization,
                    format!("Neutralize opposing influence via {}", actors.join(", ")),
                )
            } else {
                (
                    TacticKind::CounterInfluence,
                    format!("Counter opposing influence from {}", actors.join(", ")),
                )
            };
            tactics.push(Tactic {
                kind,
                description,
                actions: vec![
                    "Understand and document objections of opposed influencers".to_string(),
                    "Seek common ground or compromise positions".to_string(),
                    format!("Provide counter-evidence to {} directly", name),
                    "Build coalitions that outnumber opposition".to_string(),
                ],
                actors,
            });
        }

        if !neutrals.is_empty() {
            let actors = names(neutrals);
            tactics.push(Tactic {
                kind: TacticKind::NeutralConversion,
                description: format!(
                    "Convert neutral influencers {} into advocates before they engage {}",
                    actors.join(", "),
                    name
                ),
                actions: vec![
                    "Present compelling case to neutral influencers".to_string(),
                    "Address their specific interests and concerns".to_string(),
                    "Build relationship before requesting advocacy".to_string(),
                    "Demonstrate how your position benefits them".to_string(),
                ],
                actors,
            });
        }

        let routed: Vec<&IndirectInfluencer> = indirect
            .iter()
            .filter(|i| i.engagement == EngagementLabel::Supportive)
            .collect();
        if !routed.is_empty() {
            let paths: Vec<String> = routed.iter().map(|i| format!("{} via {}", i.name, i.via)).collect();
            tactics.push(Tactic {
                kind: TacticKind::IntermediaryRouting,
                description: format!("Route advocacy through intermediaries: {}", paths.join(", ")),
                actors: routed.iter().map(|i| i.name.clone()).collect(),
                actions: vec![
                    format!("Ask each intermediary to carry the message to {}", name),
                    "Use intermediaries with credibility to reduce resistance".to_string(),
                    "Align timing so indirect and direct advocacy reinforce each other".to_string(),
                ],
            });
        }

        if allies.is_empty() && opponents.is_empty() && neutrals.is_empty() {
            tactics.push(Tactic {
                kind: TacticKind::DirectEngagement,
                description: format!("Engage {} directly", name),
                actors: Vec::new(),
                actions: vec![
                    format!("Open a direct channel with {}", name),
                    format!("Identify who {} listens to and extend the influence map", name),
                ],
            });
        }

        tactics
    }

    fn coalition_opportunities(
        &self,
        target: &SalienceResult,
        results: &[SalienceResult],
    ) -> Vec<CoalitionOpportunity> {
        let mut opportunities = Vec::new();

        let powerful_supporters: Vec<String> = results
            .iter()
            .filter(|s| s.name != target.name)
            .filter(|s| s.is_supportive() && s.power >= self.policy.high_threshold)
            .map(|s| s.name.clone())
            .collect();
        if !powerful_supporters.is_empty() {
            opportunities.push(CoalitionOpportunity {
                kind: CoalitionKind::Power,
                description: "Alliance of high-power supportive stakeholders".to_string(),
                members: powerful_supporters,
                benefit: "Collective influence can counterbalance opposition and demonstrate broad support"
                    .to_string(),
            });
        }

        let peers: Vec<String> = results
            .iter()
            .filter(|s| s.tier == target.tier && s.name != target.name)
            .take(self.config.peer_coalition_size)
            .map(|s| s.name.clone())
            .collect();
        if !peers.is_empty() {
            opportunities.push(CoalitionOpportunity {
                kind: CoalitionKind::Peer,
                description: format!("Stakeholders at same priority level as {}", target.name),
                members: peers,
                benefit: "Peers can influence each other through shared concerns and perspectives".to_string(),
            });
        }

        opportunities
    }

    fn risks(&self, target: &SalienceResult, opponents: &[InfluencerProfile]) -> Vec<RiskMitigation> {
        let mut risks = Vec::new();

        if !opponents.is_empty() {
            risks.push(RiskMitigation::new(
                format!(
                    "{} opposed influencer(s) may counteract your efforts",
                    opponents.len()
                ),
                "Build larger coalition of supportive voices to outnumber opposition",
            ));
        }
        if target.power >= self.config.high_power_risk {
            risks.push(RiskMitigation::new(
                format!("{} has very high power", target.name),
                "Engage at highest organizational levels and use peer-level advocates",
            ));
        }
        if target.urgency <= self.config.low_urgency_risk {
            risks.push(RiskMitigation::new(
                format!("Low urgency may mean {} deprioritizes this issue", target.name),
                "Demonstrate time-sensitivity and consequences of inaction",
            ));
        }
        risks.push(RiskMitigation::new(
            "Influence attempts may backfire if perceived as manipulation",
            "Maintain transparency and focus on shared values and mutual benefits",
        ));

        risks
    }
}

fn names(profiles: &[InfluencerProfile]) -> Vec<String> {
    profiles.iter().map(|p| p.name.clone()).collect()
}

fn approach_tactic(name: &str, approach: PrimaryApproach) -> Tactic {
    let (description, actions) = match approach {
        PrimaryApproach::CoalitionReinforcement => (
            format!("Reinforce {}'s supportive position", name),
            vec![
                format!("Provide {} with evidence and talking points to advocate with others", name),
                format!("Invite {} into coalition planning", name),
                "Acknowledge their support where it is safe to do so".to_string(),
            ],
        ),
        PrimaryApproach::ContainmentAndRiskMitigation => (
            format!("Contain {}'s opposition and mitigate the risks it creates", name),
            vec![
                format!("Understand and document {}'s objections", name),
                "Address underlying concerns driving opposition".to_string(),
                format!("Prepare contingency plans in case {} escalates resistance", name),
            ],
        ),
        PrimaryApproach::PersuasionAndIncentiveFraming => (
            format!("Persuade {} by framing incentives around their interests", name),
            vec![
                format!("Present a compelling case tailored to {}'s interests", name),
                "Demonstrate clear benefits of your position".to_string(),
                "Build the relationship before requesting commitments".to_string(),
            ],
        ),
    };

    Tactic {
        kind: TacticKind::PrimaryApproach,
        description,
        actors: vec![name.to_string()],
        actions,
    }
}

fn tier_tactic(name: &str, tier: PriorityTier) -> Tactic {
    let (description, actions) = match tier {
        PriorityTier::First => (
            format!("Engage {} at the highest level through regular one-on-one meetings", name),
            vec![
                format!("Develop a personalized engagement plan addressing {}'s specific concerns", name),
                format!("Monitor {}'s position continuously and adjust as needed", name),
            ],
        ),
        PriorityTier::Second => (
            format!("Engage {} through targeted communications at critical decision points", name),
            vec![
                "Send targeted communications and periodic updates".to_string(),
                "Provide key information at critical decision points".to_string(),
            ],
        ),
        PriorityTier::Third => (
            format!("Keep {} informed with light-touch monitoring", name),
            vec![
                "Include in general communications and broad stakeholder updates".to_string(),
                format!("Re-assess if {} shows signs of increasing influence", name),
            ],
        ),
    };

    Tactic {
        kind: TacticKind::TierEngagement,
        description,
        actors: vec![name.to_string()],
        actions,
    }
}

fn overall_strategy(target: &SalienceResult) -> String {
    let name = &target.name;
    match target.engagement {
        EngagementLabel::Adversarial => format!(
            "Focus on building overwhelming coalition of supportive voices to counterbalance {}'s opposition. \
             Use intermediaries with credibility to reduce resistance. \
             Simultaneously address underlying concerns driving opposition.",
            name
        ),
        EngagementLabel::Neutral => format!(
            "Convert {} to supportive stance through education, relationship building, and demonstrating clear benefits. \
             Leverage existing supportive influencers for advocacy.",
            name
        ),
        EngagementLabel::Supportive => format!(
            "Reinforce and strengthen {}'s supportive position. \
             Provide resources and ammunition for them to advocate effectively to others.",
            name
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use negotiator_core::{SalienceScorer, Stakeholder};

    fn plan_for(stakeholders: &[Stakeholder], target: &str) -> Result<LeveragePlan> {
        let ranked = SalienceScorer::default().rank(stakeholders);
        let graph = InfluenceGraph::build(stakeholders);
        LeverageSynthesizer::default().synthesize(&ranked, &graph, target, None)
    }

    fn scenario() -> Vec<Stakeholder> {
        vec![
            Stakeholder::new("Gov", 0.9, 0.8, 0.95, 0.6),
            Stakeholder::new("NGO", 0.5, 0.8, 0.7, 0.7),
            Stakeholder::new("Armed Group", 0.7, 0.9, 0.3, -0.8).influenced_by(["NGO"]),
        ]
    }

    #[test]
    fn test_adversarial_target_with_ally() {
        let plan = plan_for(&scenario(), "Armed Group").unwrap();

        assert_eq!(plan.primary_approach, PrimaryApproach::ContainmentAndRiskMitigation);
        assert_eq!(plan.ally_names(), vec!["NGO"]);
        assert_eq!(plan.allies[0].tier, PriorityTier::Second);
        assert!(plan.opponents.is_empty());

        let kinds: Vec<_> = plan.tactics.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TacticKind::PrimaryApproach, TacticKind::TierEngagement, TacticKind::Coalition]
        );
        assert_eq!(plan.tactics[2].description, "Build coalition with NGO");
        assert_eq!(plan.tactics[2].actors, vec!["NGO"]);
    }

    #[test]
    fn test_adversarial_target_with_opponent_gets_neutralization() {
        let stakeholders = vec![
            Stakeholder::new("Militia", 0.8, 0.9, 0.2, -0.9).influenced_by(["Warlord", "Elders"]),
            Stakeholder::new("Warlord", 0.9, 0.6, 0.1, -0.7),
            Stakeholder::new("Elders", 0.4, 0.5, 0.9, 0.1),
        ];
        let plan = plan_for(&stakeholders, "Militia").unwrap();

        assert_eq!(plan.opponent_names(), vec!["Warlord"]);
        assert_eq!(plan.neutral_influencers[0].name, "Elders");
        let neutralize = plan
            .tactics
            .iter()
            .find(|t| t.kind == TacticKind::Neutralization)
            .unwrap();
        assert_eq!(neutralize.description, "Neutralize opposing influence via Warlord");
        assert!(plan.tactics.iter().any(|t| t.kind == TacticKind::NeutralConversion));
        assert!(plan.risks[0].risk.starts_with("1 opposed influencer"));
        // Militia power 0.8 hits the high-power risk
        assert!(plan.risks.iter().any(|r| r.risk == "Militia has very high power"));
    }

    #[test]
    fn test_supportive_target_countering_opponent() {
        let stakeholders = vec![
            Stakeholder::new("Ministry", 0.6, 0.2, 0.8, 0.5).influenced_by(["Hardliners"]),
            Stakeholder::new("Hardliners", 0.6, 0.6, 0.4, -0.5),
        ];
        let plan = plan_for(&stakeholders, "Ministry").unwrap();

        assert_eq!(plan.primary_approach, PrimaryApproach::CoalitionReinforcement);
        let counter = plan
            .tactics
            .iter()
            .find(|t| t.kind == TacticKind::CounterInfluence)
            .unwrap();
        assert_eq!(counter.description, "Counter opposing influence from Hardliners");
        assert!(plan
            .risks
            .iter()
            .any(|r| r.risk == "Low urgency may mean Ministry deprioritizes this issue"));
    }

    #[test]
    fn test_neutral_target_without_influencers() {
        let plan = plan_for(&[Stakeholder::new("Donor", 0.3, 0.5, 0.5, 0.1)], "Donor").unwrap();

        assert_eq!(plan.primary_approach, PrimaryApproach::PersuasionAndIncentiveFraming);
        assert_eq!(plan.tactics.last().unwrap().kind, TacticKind::DirectEngagement);
        assert!(plan.coalition_opportunities.is_empty());
        assert_eq!(plan.risks.len(), 1);
        assert!(plan.overall_strategy.starts_with("Convert Donor to supportive stance"));
    }

    #[test]
    fn test_indirect_influencers_route_through_intermediary() {
        let stakeholders = vec![
            Stakeholder::new("Governor", 0.9, 0.5, 0.8, 0.0).influenced_by(["Advisor"]),
            Stakeholder::new("Advisor", 0.4, 0.5, 0.6, 0.0).influenced_by(["UN"]),
            Stakeholder::new("UN", 0.8, 0.6, 0.9, 0.8),
        ];
        let plan = plan_for(&stakeholders, "Governor").unwrap();

        assert_eq!(plan.indirect_influencers.len(), 1);
        assert_eq!(plan.indirect_influencers[0].name, "UN");
        assert_eq!(plan.indirect_influencers[0].via, "Advisor");
        let routing = plan
            .tactics
            .iter()
            .find(|t| t.kind == TacticKind::IntermediaryRouting)
            .unwrap();
        assert_eq!(routing.description, "Route advocacy through intermediaries: UN via Advisor");
    }

    #[test]
    fn test_coalition_opportunities() {
        let plan = plan_for(&scenario(), "NGO").unwrap();

        let power = &plan.coalition_opportunities[0];
        assert_eq!(power.kind, CoalitionKind::Power);
        assert_eq!(power.members, vec!["Gov"]);

        let peer = &plan.coalition_opportunities[1];
        assert_eq!(peer.kind, CoalitionKind::Peer);
        assert_eq!(peer.members, vec!["Armed Group"]);
    }

    #[test]
    fn test_target_lookup_is_exact() {
        let err = plan_for(&scenario(), "armed group").unwrap_err();
        match err {
            NegotiationError::TargetNotFound { target, valid_names } => {
                assert_eq!(target, "armed group");
                assert_eq!(valid_names, vec!["Gov", "NGO", "Armed Group"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_plan_serializes_approach_tag() {
        let plan = plan_for(&scenario(), "Armed Group").unwrap();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["primary_approach"], "containment and risk mitigation");
        assert_eq!(json["tactics"][2]["kind"], "coalition");
    }
}

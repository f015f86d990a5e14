//! Salience scoring: priority tier and engagement label per stakeholder.
//!
//! Scoring is a pure function of one stakeholder's own attributes. The
//! influence graph is never consulted here.

use crate::config_manager::ScoringPolicy;
use crate::types::{EngagementLabel, PriorityTier, SalienceResult, Stakeholder};

#[derive(Debug, Clone, Copy, Default)]
pub struct SalienceScorer {
    policy: ScoringPolicy,
}

impl SalienceScorer {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn is_high(&self, value: f64) -> bool {
        value >= self.policy.high_threshold
    }

    pub fn classify_position(&self, position: f64) -> EngagementLabel {
        if position >= self.policy.supportive_threshold {
            EngagementLabel::Supportive
        } else if position <= self.policy.adversarial_threshold {
            EngagementLabel::Adversarial
        } else {
            EngagementLabel::Neutral
        }
    }

    pub fn score(&self, stakeholder: &Stakeholder) -> SalienceResult {
        let high_attribute_count = [stakeholder.power, stakeholder.urgency, stakeholder.legitimacy]
            .into_iter()
            .filter(|value| self.is_high(*value))
            .count() as u8;
        let tier = PriorityTier::from_high_count(high_attribute_count);

        SalienceResult {
            name: stakeholder.name.clone(),
            role: stakeholder.role.clone(),
            power: stakeholder.power,
            urgency: stakeholder.urgency,
            legitimacy: stakeholder.legitimacy,
            position: stakeholder.position,
            salience: stakeholder.power + stakeholder.urgency + stakeholder.legitimacy,
            high_attribute_count,
            tier,
            engagement: self.classify_position(stakeholder.position),
            engagement_strategy: tier.default_strategy().to_string(),
        }
    }

    /// Score every stakeholder and order the results by tier, then descending
    /// salience. `sort_by` is stable, so remaining ties keep input order.
    pub fn rank(&self, stakeholders: &[Stakeholder]) -> Vec<SalienceResult> {
        let mut results: Vec<SalienceResult> = stakeholders.iter().map(|s| self.score(s)).collect();
        results.sort_by(|a, b| {
            a.tier
                .cmp(&b.tier)
                .then_with(|| b.salience.total_cmp(&a.salience))
        });
        results
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stakeholder as submitted by the caller.
///
/// Attribute ranges are checked by [`crate::StakeholderValidator`]; a value of
/// this type is not guaranteed to be valid until it has passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stakeholder {
    /// Case-sensitive identifier, unique within one analysis
    pub name: String,
    /// Ability to influence decisions, 0.0 to 1.0
    pub power: f64,
    /// Time-sensitivity from the stakeholder's perspective, 0.0 to 1.0
    pub urgency: f64,
    /// Relevance and ability to contribute meaningfully, 0.0 to 1.0
    pub legitimacy: f64,
    /// Stance on the issue, -1.0 (opposed) to 1.0 (supportive)
    pub position: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Names of the stakeholders whose stance shapes this one
    #[serde(default)]
    pub influenced_by: Vec<String>,
}

impl Stakeholder {
    pub fn new(
        name: impl Into<String>,
        power: f64,
        urgency: f64,
        legitimacy: f64,
        position: f64,
    ) -> Self {
        Self {
            name: name.into(),
            power,
            urgency,
            legitimacy,
            position,
            role: None,
            influenced_by: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn influenced_by<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.influenced_by.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Request body of a stakeholder analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisRequest {
    pub context: String,
    pub stakeholders: Vec<Stakeholder>,
}

impl AnalysisRequest {
    pub fn new(context: impl Into<String>, stakeholders: Vec<Stakeholder>) -> Self {
        Self {
            context: context.into(),
            stakeholders,
        }
    }
}

/// Priority bucket. Ordering follows engagement intensity: `First < Second < Third`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    First,
    Second,
    Third,
}

impl PriorityTier {
    pub const ALL: [PriorityTier; 3] = [PriorityTier::First, PriorityTier::Second, PriorityTier::Third];

    /// Three high attributes give First, two give Second, anything less gives Third.
    pub fn from_high_count(high_attributes: u8) -> Self {
        match high_attributes {
            3.. => PriorityTier::First,
            2 => PriorityTier::Second,
            _ => PriorityTier::Third,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriorityTier::First => "First Priority",
            PriorityTier::Second => "Second Priority",
            PriorityTier::Third => "Third Priority",
        }
    }

    pub fn default_strategy(&self) -> &'static str {
        match self {
            PriorityTier::First => "Actively engage and manage opposition",
            PriorityTier::Second => "Selective engagement - leverage allies, monitor risks",
            PriorityTier::Third => "Minimal engagement unless influence increases",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Disposition derived from a stakeholder's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLabel {
    Supportive,
    Neutral,
    Adversarial,
}

impl EngagementLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementLabel::Supportive => "Supportive",
            EngagementLabel::Neutral => "Neutral",
            EngagementLabel::Adversarial => "Adversarial",
        }
    }
}

impl fmt::Display for EngagementLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored view of one stakeholder.
///
/// Carries the raw attributes so that downstream consumers (leverage plans,
/// cached analyses) never need the original request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalienceResult {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub power: f64,
    pub urgency: f64,
    pub legitimacy: f64,
    pub position: f64,
    /// power + urgency + legitimacy
    pub salience: f64,
    pub high_attribute_count: u8,
    pub tier: PriorityTier,
    pub engagement: EngagementLabel,
    pub engagement_strategy: String,
}

impl SalienceResult {
    pub fn role_or_default(&self) -> &str {
        self.role.as_deref().unwrap_or("Not specified")
    }

    pub fn is_supportive(&self) -> bool {
        self.engagement == EngagementLabel::Supportive
    }

    pub fn is_adversarial(&self) -> bool {
        self.engagement == EngagementLabel::Adversarial
    }
}

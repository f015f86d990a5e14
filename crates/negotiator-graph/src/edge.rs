use negotiator_core::NegotiationError;
use serde::{Deserialize, Serialize};

/// A resolved influence relation: `influencer` shapes the stance of `influenced`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InfluenceEdge {
    pub influencer: String,
    pub influenced: String,
}

impl InfluenceEdge {
    pub fn new(influencer: impl Into<String>, influenced: impl Into<String>) -> Self {
        Self {
            influencer: influencer.into(),
            influenced: influenced.into(),
        }
    }
}

/// An `influenced_by` entry naming a stakeholder absent from the analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DanglingReference {
    /// The stakeholder whose `influenced_by` list holds the reference
    pub stakeholder: String,
    /// The unknown name
    pub reference: String,
}

impl From<DanglingReference> for NegotiationError {
    fn from(dangling: DanglingReference) -> Self {
        NegotiationError::DanglingInfluenceReference {
            stakeholder: dangling.stakeholder,
            reference: dangling.reference,
        }
    }
}

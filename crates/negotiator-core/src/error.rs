use crate::config_manager::ConfigError;
use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NegotiationError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("No cached analysis for session '{session_key}': run a stakeholder analysis first")]
    NoCachedAnalysis { session_key: String },

    #[error("Target stakeholder '{target}' not found. Valid names: {}", .valid_names.join(", "))]
    TargetNotFound {
        target: String,
        valid_names: Vec<String>,
    },

    #[error("Stakeholder '{stakeholder}' is influenced by unknown stakeholder '{reference}'")]
    DanglingInfluenceReference {
        stakeholder: String,
        reference: String,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NegotiationError {
    /// Stable machine-readable tag used by the tool layer.
    pub fn kind(&self) -> &'static str {
        match self {
            NegotiationError::Validation(_) => "validation_error",
            NegotiationError::NoCachedAnalysis { .. } => "no_cached_analysis",
            NegotiationError::TargetNotFound { .. } => "target_not_found",
            NegotiationError::DanglingInfluenceReference { .. } => "dangling_influence_reference",
            NegotiationError::Config(_) => "config_error",
            NegotiationError::Serialization(_) => "serialization_error",
        }
    }

    /// Warnings are reported alongside a successful analysis, never returned as `Err`.
    pub fn is_warning(&self) -> bool {
        matches!(self, NegotiationError::DanglingInfluenceReference { .. })
    }
}

pub type Result<T> = std::result::Result<T, NegotiationError>;

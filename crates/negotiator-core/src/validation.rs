use crate::config_manager::LimitsConfig;
use crate::types::{AnalysisRequest, Stakeholder};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid length for field '{field}': expected {min}-{max} characters, got {actual}")]
    InvalidLength {
        field: String,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Invalid count for field '{field}': expected {min}-{max} entries, got {actual}")]
    InvalidCount {
        field: String,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Value out of range for field '{field}': {value} (allowed {min} to {max})")]
    ValueOutOfRange {
        field: String,
        value: String,
        min: f64,
        max: f64,
    },

    #[error("Required field '{field}' is missing or empty")]
    RequiredField { field: String },

    #[error("Duplicate stakeholder name in field '{field}': '{value}'")]
    DuplicateName { field: String, value: String },
}

impl ValidationError {
    /// Path of the offending field, e.g. `stakeholders[2].power`
    pub fn field(&self) -> &str {
        match self {
            ValidationError::InvalidLength { field, .. }
            | ValidationError::InvalidCount { field, .. }
            | ValidationError::ValueOutOfRange { field, .. }
            | ValidationError::RequiredField { field }
            | ValidationError::DuplicateName { field, .. } => field,
        }
    }
}

/// Boundary check for analysis requests. Never mutates its input.
#[derive(Debug, Clone, Default)]
pub struct StakeholderValidator {
    limits: LimitsConfig,
}

impl StakeholderValidator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// All-or-nothing: the first violation found is returned.
    pub fn validate_request(&self, request: &AnalysisRequest) -> Result<(), ValidationError> {
        self.validate_context(&request.context)?;
        self.validate_stakeholders(&request.stakeholders)
    }

    pub fn validate_context(&self, context: &str) -> Result<(), ValidationError> {
        let actual = context.chars().count();
        if actual < self.limits.min_context_chars || actual > self.limits.max_context_chars {
            return Err(ValidationError::InvalidLength {
                field: "context".to_string(),
                min: self.limits.min_context_chars,
                max: self.limits.max_context_chars,
                actual,
            });
        }
        Ok(())
    }

    pub fn validate_session_key(&self, session_key: &str) -> Result<(), ValidationError> {
        if session_key.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: "session_key".to_string(),
            });
        }
        let actual = session_key.chars().count();
        if actual > self.limits.max_session_key_chars {
            return Err(ValidationError::InvalidLength {
                field: "session_key".to_string(),
                min: 1,
                max: self.limits.max_session_key_chars,
                actual,
            });
        }
        Ok(())
    }

    pub fn validate_stakeholders(&self, stakeholders: &[Stakeholder]) -> Result<(), ValidationError> {
        if stakeholders.is_empty() || stakeholders.len() > self.limits.max_stakeholders {
            return Err(ValidationError::InvalidCount {
                field: "stakeholders".to_string(),
                min: 1,
                max: self.limits.max_stakeholders,
                actual: stakeholders.len(),
            });
        }

        let mut seen = HashSet::with_capacity(stakeholders.len());
        for (index, stakeholder) in stakeholders.iter().enumerate() {
            self.validate_stakeholder(index, stakeholder)?;
            if !seen.insert(stakeholder.name.as_str()) {
                return Err(ValidationError::DuplicateName {
                    field: format!("stakeholders[{}].name", index),
                    value: stakeholder.name.clone(),
                });
            }
        }

        Ok(())
    }

    fn validate_stakeholder(&self, index: usize, stakeholder: &Stakeholder) -> Result<(), ValidationError> {
        let field = |name: &str| format!("stakeholders[{}].{}", index, name);

        if stakeholder.name.trim().is_empty() {
            return Err(ValidationError::RequiredField { field: field("name") });
        }
        let name_len = stakeholder.name.chars().count();
        if name_len > self.limits.max_name_chars {
            return Err(ValidationError::InvalidLength {
                field: field("name"),
                min: 1,
                max: self.limits.max_name_chars,
                actual: name_len,
            });
        }

        check_range(&field("power"), stakeholder.power, 0.0, 1.0)?;
        check_range(&field("urgency"), stakeholder.urgency, 0.0, 1.0)?;
        check_range(&field("legitimacy"), stakeholder.legitimacy, 0.0, 1.0)?;
        check_range(&field("position"), stakeholder.position, -1.0, 1.0)?;

        if let Some(role) = &stakeholder.role {
            let role_len = role.chars().count();
            if role_len > self.limits.max_role_chars {
                return Err(ValidationError::InvalidLength {
                    field: field("role"),
                    min: 0,
                    max: self.limits.max_role_chars,
                    actual: role_len,
                });
            }
        }

        if stakeholder.influenced_by.len() > self.limits.max_influences {
            return Err(ValidationError::InvalidCount {
                field: field("influenced_by"),
                min: 0,
                max: self.limits.max_influences,
                actual: stakeholder.influenced_by.len(),
            });
        }
        for (ref_index, reference) in stakeholder.influenced_by.iter().enumerate() {
            if reference.trim().is_empty() {
                return Err(ValidationError::RequiredField {
                    field: format!("stakeholders[{}].influenced_by[{}]", index, ref_index),
                });
            }
        }

        Ok(())
    }
}

/// NaN and infinities fail the closed-range check.
fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::ValueOutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: &str = "Access negotiation for IDP camps in the northern region ahead of the rainy season";

    fn stakeholder(name: &str) -> Stakeholder {
        Stakeholder::new(name, 0.5, 0.5, 0.5, 0.0)
    }

    #[test]
    fn test_valid_request() {
        let validator = StakeholderValidator::default();
        let request = AnalysisRequest::new(CONTEXT, vec![stakeholder("Gov"), stakeholder("NGO")]);
        assert!(validator.validate_request(&request).is_ok());
    }

    #[test]
    fn test_context_length_bounds() {
        let validator = StakeholderValidator::default();
        let err = validator.validate_context("too short").unwrap_err();
        assert_eq!(err.field(), "context");

        assert!(validator.validate_context(&"a".repeat(50)).is_ok());
        assert!(validator.validate_context(&"a".repeat(49)).is_err());
        assert!(validator.validate_context(&"a".repeat(1001)).is_err());
    }

    #[test]
    fn test_stakeholder_count_bounds() {
        let validator = StakeholderValidator::default();
        let err = validator.validate_stakeholders(&[]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCount { actual: 0, .. }));

        let many: Vec<_> = (0..51).map(|i| stakeholder(&format!("S{}", i))).collect();
        assert!(validator.validate_stakeholders(&many).is_err());
        assert!(validator.validate_stakeholders(&many[..50]).is_ok());
    }

    #[test]
    fn test_duplicate_names_are_case_sensitive() {
        let validator = StakeholderValidator::default();
        assert!(validator
            .validate_stakeholders(&[stakeholder("NGO"), stakeholder("ngo")])
            .is_ok());

        let err = validator
            .validate_stakeholders(&[stakeholder("NGO"), stakeholder("NGO")])
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateName {
                field: "stakeholders[1].name".to_string(),
                value: "NGO".to_string(),
            }
        );
    }

    #[test]
    fn test_blank_name_rejected() {
        let validator = StakeholderValidator::default();
        let err = validator.validate_stakeholders(&[stakeholder("   ")]).unwrap_err();
        assert_eq!(err.field(), "stakeholders[0].name");
    }

    #[test]
    fn test_attribute_ranges() {
        let validator = StakeholderValidator::default();

        let mut s = stakeholder("Gov");
        s.power = 1.01;
        let err = validator.validate_stakeholders(&[s]).unwrap_err();
        assert_eq!(err.field(), "stakeholders[0].power");
        assert!(err.to_string().contains("1.01"));

        let mut s = stakeholder("Gov");
        s.position = -1.0;
        assert!(validator.validate_stakeholders(&[s]).is_ok());

        let mut s = stakeholder("Gov");
        s.urgency = f64::NAN;
        assert!(validator.validate_stakeholders(&[s]).is_err());

        let mut s = stakeholder("Gov");
        s.position = -1.2;
        let err = validator.validate_stakeholders(&[s]).unwrap_err();
        assert_eq!(err.field(), "stakeholders[0].position");
    }

    #[test]
    fn test_influence_list_limits() {
        let validator = StakeholderValidator::default();
        let s = stakeholder("Gov").influenced_by((0..21).map(|i| format!("S{}", i)));
        let err = validator.validate_stakeholders(&[s]).unwrap_err();
        assert_eq!(err.field(), "stakeholders[0].influenced_by");

        let s = stakeholder("Gov").influenced_by([""]);
        let err = validator.validate_stakeholders(&[s]).unwrap_err();
        assert_eq!(err.field(), "stakeholders[0].influenced_by[0]");
    }

    #[test]
    fn test_session_key() {
        let validator = StakeholderValidator::default();
        assert!(validator.validate_session_key("conversation-42").is_ok());
        assert!(validator.validate_session_key("").is_err());
        assert!(validator.validate_session_key(&"k".repeat(257)).is_err());
    }
}

// ABOUTME: Tool schemas for the stakeholder negotiation engine
// ABOUTME: JSON schemas for tool calling - parameters and descriptions for LLM consumption

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Tool schema for LLM function calling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: JsonValue,
}

/// Collection of all negotiation tool schemas
pub struct NegotiationToolSchemas;

impl NegotiationToolSchemas {
    /// Get all tool schemas for registration with LLM
    pub fn all() -> Vec<ToolSchema> {
        vec![
            Self::analyze_stakeholders(),
            Self::leverage_influence(),
            Self::get_analysis_age(),
        ]
    }

    fn stakeholder_schema() -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Stakeholder name, unique within the analysis (e.g., 'Minister of Health', 'Local Community Leaders')",
                    "minLength": 1,
                    "maxLength": 200
                },
                "power": {
                    "type": "number",
                    "description": "Ability to influence decisions (0.0 = Low, 1.0 = High)",
                    "minimum": 0.0,
                    "maximum": 1.0
                },
                "urgency": {
                    "type": "number",
                    "description": "Time-sensitivity from the stakeholder's perspective (0.0 = Low, 1.0 = High)",
                    "minimum": 0.0,
                    "maximum": 1.0
                },
                "legitimacy": {
                    "type": "number",
                    "description": "Relevance and ability to contribute meaningfully (0.0 = Low, 1.0 = High)",
                    "minimum": 0.0,
                    "maximum": 1.0
                },
                "position": {
                    "type": "number",
                    "description": "Stance on the issue (-1.0 = Opposed, 0.0 = Neutral, 1.0 = Supportive)",
                    "minimum": -1.0,
                    "maximum": 1.0
                },
                "role": {
                    "type": "string",
                    "description": "Role or title (e.g., 'Government Official', 'Aid Provider')",
                    "maxLength": 200
                },
                "influenced_by": {
                    "type": "array",
                    "description": "Names of other stakeholders whose stance shapes this one",
                    "items": { "type": "string" },
                    "maxItems": 20
                }
            },
            "required": ["name", "power", "urgency", "legitimacy", "position"],
            "additionalProperties": false
        })
    }

    /// Schema for analyze_stakeholders
    pub fn analyze_stakeholders() -> ToolSchema {
        ToolSchema {
            name: "analyze_stakeholders".to_string(),
            description: "Rank negotiation stakeholders by salience and map who influences whom. \
                Assigns each stakeholder a priority tier from power, urgency and legitimacy, labels \
                its stance, and caches the analysis for the session so follow-up tools can reuse it."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "session_key": {
                        "type": "string",
                        "description": "Opaque conversation identifier scoping the cached analysis",
                        "minLength": 1,
                        "maxLength": 256
                    },
                    "context": {
                        "type": "string",
                        "description": "Brief description of the negotiation context (50-1000 characters)",
                        "minLength": 50,
                        "maxLength": 1000
                    },
                    "stakeholders": {
                        "type": "array",
                        "description": "Stakeholders with their attributes",
                        "items": Self::stakeholder_schema(),
                        "minItems": 1,
                        "maxItems": 50
                    }
                },
                "required": ["session_key", "context", "stakeholders"],
                "additionalProperties": false
            }),
        }
    }

    /// Schema for leverage_influence
    pub fn leverage_influence() -> ToolSchema {
        ToolSchema {
            name: "leverage_influence".to_string(),
            description: "Develop influence tactics for one target stakeholder: allies and opponents \
                among its influencers, coalition opportunities, risks and mitigations. Uses the \
                session's most recent analysis unless a stakeholder list is supplied."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "session_key": {
                        "type": "string",
                        "description": "Conversation identifier used for the earlier analyze_stakeholders call",
                        "minLength": 1,
                        "maxLength": 256
                    },
                    "target": {
                        "type": "string",
                        "description": "Exact, case-sensitive name of the stakeholder to influence"
                    },
                    "stakeholders": {
                        "type": "array",
                        "description": "Optional explicit stakeholder list; takes precedence over the cached analysis",
                        "items": Self::stakeholder_schema(),
                        "minItems": 1,
                        "maxItems": 50
                    }
                },
                "required": ["session_key", "target"],
                "additionalProperties": false
            }),
        }
    }

    /// Schema for get_analysis_age
    pub fn get_analysis_age() -> ToolSchema {
        ToolSchema {
            name: "get_analysis_age".to_string(),
            description: "Report how old the session's cached analysis is and how many seconds remain \
                before it expires."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "session_key": {
                        "type": "string",
                        "description": "Conversation identifier",
                        "minLength": 1,
                        "maxLength": 256
                    }
                },
                "required": ["session_key"],
                "additionalProperties": false
            }),
        }
    }

    /// Get schema by name
    pub fn get_by_name(name: &str) -> Option<ToolSchema> {
        Self::all().into_iter().find(|s| s.name == name)
    }

    /// Get list of all tool names
    pub fn tool_names() -> Vec<String> {
        Self::all().into_iter().map(|s| s.name).collect()
    }
}

// ABOUTME: Tool executor mapping tool-call JSON onto the negotiation engine
// ABOUTME: Converts loosely-typed parameters into closed request types once and maps failures to error payloads

use crate::tool_schemas::{NegotiationToolSchemas, ToolSchema};
use negotiator_cache::{InMemorySessionCache, SessionStore};
use negotiator_core::{AnalysisRequest, NegotiationError, Stakeholder, ValidationError};
use negotiator_engine::{NegotiationEngine, StakeholderAnalysis};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const TOOL_PROGRESS_LOG_TARGET: &str = "negotiator::tools";

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid parameters for {tool}: {message}")]
    InvalidParameters { tool: String, message: String },

    #[error(transparent)]
    Engine(#[from] NegotiationError),
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_) => "unknown_tool",
            ToolError::InvalidParameters { .. } => "invalid_parameters",
            ToolError::Engine(err) => err.kind(),
        }
    }

    /// Structured payload handed back to the caller in place of a result
    pub fn to_json(&self) -> JsonValue {
        let mut error = json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });

        match self {
            ToolError::UnknownTool(tool) => {
                error["available_tools"] = json!(NegotiationToolSchemas::tool_names());
                error["tool"] = json!(tool);
            }
            ToolError::InvalidParameters { tool, .. } => {
                error["tool"] = json!(tool);
            }
            ToolError::Engine(NegotiationError::Validation(validation)) => {
                error["field"] = json!(validation.field());
                if let ValidationError::DuplicateName { value, .. } = validation {
                    error["value"] = json!(value);
                }
            }
            ToolError::Engine(NegotiationError::NoCachedAnalysis { session_key }) => {
                error["session_key"] = json!(session_key);
                error["hint"] = json!("Run analyze_stakeholders for this session first");
            }
            ToolError::Engine(NegotiationError::TargetNotFound { target, valid_names }) => {
                error["target"] = json!(target);
                error["valid_names"] = json!(valid_names);
            }
            ToolError::Engine(_) => {}
        }

        json!({ "error": error })
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzeStakeholdersParams {
    pub session_key: String,
    pub context: String,
    pub stakeholders: Vec<Stakeholder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeverageInfluenceParams {
    pub session_key: String,
    pub target: String,
    #[serde(default)]
    pub stakeholders: Option<Vec<Stakeholder>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisAgeParams {
    pub session_key: String,
}

/// Executor for negotiation tools.
/// Receives tool calls from an LLM front end and runs them against one shared engine.
pub struct NegotiationToolExecutor<S = InMemorySessionCache<StakeholderAnalysis>> {
    engine: Arc<NegotiationEngine<S>>,
}

impl<S> Clone for NegotiationToolExecutor<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<S: SessionStore<StakeholderAnalysis>> NegotiationToolExecutor<S> {
    pub fn new(engine: Arc<NegotiationEngine<S>>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &NegotiationEngine<S> {
        &self.engine
    }

    /// Get all tool schemas for registration
    pub fn get_tool_schemas() -> Vec<ToolSchema> {
        NegotiationToolSchemas::all()
    }

    /// Get tool names for listing
    pub fn get_tool_names() -> Vec<String> {
        NegotiationToolSchemas::tool_names()
    }

    /// Execute a tool call
    ///
    /// # Arguments
    /// * `tool_name` - Name of the tool to execute
    /// * `parameters` - JSON parameters for the tool
    ///
    /// # Returns
    /// JSON result from the tool execution
    pub fn execute(&self, tool_name: &str, parameters: JsonValue) -> Result<JsonValue> {
        log_tool_call_start(tool_name, &parameters);

        let exec_result = match tool_name {
            "analyze_stakeholders" => {
                parse_params(tool_name, parameters).and_then(|p| self.execute_analyze_stakeholders(p))
            }
            "leverage_influence" => {
                parse_params(tool_name, parameters).and_then(|p| self.execute_leverage_influence(p))
            }
            "get_analysis_age" => {
                parse_params(tool_name, parameters).and_then(|p| self.execute_get_analysis_age(p))
            }
            _ => Err(ToolError::UnknownTool(tool_name.to_string())),
        };

        match exec_result {
            Ok(result) => {
                log_tool_call_finish(tool_name, &result);
                Ok(result)
            }
            Err(err) => {
                log_tool_call_error(tool_name, &err);
                Err(err)
            }
        }
    }

    /// Like [`execute`](Self::execute), but failures come back as the error payload
    pub fn execute_to_json(&self, tool_name: &str, parameters: JsonValue) -> JsonValue {
        self.execute(tool_name, parameters)
            .unwrap_or_else(|err| err.to_json())
    }

    fn execute_analyze_stakeholders(&self, params: AnalyzeStakeholdersParams) -> Result<JsonValue> {
        let request = AnalysisRequest::new(params.context, params.stakeholders);
        let analysis = self.engine.analyze_stakeholders(&params.session_key, request)?;

        let warnings: Vec<JsonValue> = analysis
            .warnings()
            .iter()
            .map(|w| json!({ "kind": w.kind(), "message": w.to_string() }))
            .collect();

        Ok(json!({
            "tool": "analyze_stakeholders",
            "session_key": params.session_key,
            "result": analysis.as_ref(),
            "warnings": warnings,
        }))
    }

    fn execute_leverage_influence(&self, params: LeverageInfluenceParams) -> Result<JsonValue> {
        let source = if params.stakeholders.is_some() { "explicit" } else { "cached" };
        let plan = self
            .engine
            .leverage_influence(&params.session_key, &params.target, params.stakeholders)?;

        Ok(json!({
            "tool": "leverage_influence",
            "session_key": params.session_key,
            "source": source,
            "result": plan,
        }))
    }

    fn execute_get_analysis_age(&self, params: AnalysisAgeParams) -> Result<JsonValue> {
        let age = self.engine.get_analysis_age(&params.session_key)?;
        Ok(json!({
            "tool": "get_analysis_age",
            "session_key": params.session_key,
            "result": age,
        }))
    }
}

fn parse_params<P: DeserializeOwned>(tool_name: &str, parameters: JsonValue) -> Result<P> {
    serde_json::from_value(parameters).map_err(|e| ToolError::InvalidParameters {
        tool: tool_name.to_string(),
        message: e.to_string(),
    })
}

fn log_tool_call_start(tool_name: &str, parameters: &JsonValue) {
    info!(
        target: TOOL_PROGRESS_LOG_TARGET,
        tool = tool_name,
        "Tool call started"
    );
    debug!(
        target: TOOL_PROGRESS_LOG_TARGET,
        tool = tool_name,
        "Tool input payload: {}",
        parameters
    );
}

fn log_tool_call_finish(tool_name: &str, result: &JsonValue) {
    info!(
        target: TOOL_PROGRESS_LOG_TARGET,
        tool = tool_name,
        "Tool call completed"
    );
    debug!(
        target: TOOL_PROGRESS_LOG_TARGET,
        tool = tool_name,
        "Tool output payload: {}",
        result
    );
}

fn log_tool_call_error(tool_name: &str, err: &ToolError) {
    warn!(
        target: TOOL_PROGRESS_LOG_TARGET,
        tool = tool_name,
        kind = err.kind(),
        "Tool call failed: {}",
        err
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use negotiator_core::NegotiatorConfig;

    const CONTEXT: &str = "Access negotiation for IDP camps in the northern region ahead of the rainy season";

    fn executor() -> NegotiationToolExecutor {
        NegotiationToolExecutor::new(Arc::new(NegotiationEngine::new(&NegotiatorConfig::default())))
    }

    fn scenario_params() -> JsonValue {
        json!({
            "session_key": "conv-1",
            "context": CONTEXT,
            "stakeholders": [
                {"name": "Gov", "power": 0.9, "urgency": 0.8, "legitimacy": 0.95, "position": 0.6},
                {"name": "NGO", "power": 0.5, "urgency": 0.8, "legitimacy": 0.7, "position": 0.7},
                {"name": "Armed Group", "power": 0.7, "urgency": 0.9, "legitimacy": 0.3, "position": -0.8,
                 "influenced_by": ["NGO"]}
            ]
        })
    }

    #[test]
    fn test_tool_schemas_available() {
        let schemas = NegotiationToolExecutor::<InMemorySessionCache<StakeholderAnalysis>>::get_tool_schemas();
        assert_eq!(schemas.len(), 3);
    }

    #[test]
    fn test_analyze_then_leverage_from_cache() {
        let executor = executor();
        let analysis = executor.execute("analyze_stakeholders", scenario_params()).unwrap();
        assert_eq!(analysis["result"]["stakeholders"][0]["name"], "Gov");
        assert_eq!(analysis["result"]["stakeholders"][0]["tier"], "first");

        let plan = executor
            .execute("leverage_influence", json!({"session_key": "conv-1", "target": "Armed Group"}))
            .unwrap();
        assert_eq!(plan["source"], "cached");
        assert_eq!(plan["result"]["primary_approach"], "containment and risk mitigation");
        assert_eq!(plan["result"]["allies"][0]["name"], "NGO");
    }

    #[test]
    fn test_unknown_tool() {
        let err = executor().execute("summon_mediator", json!({})).unwrap_err();
        assert_eq!(err.kind(), "unknown_tool");
        assert_eq!(err.to_json()["error"]["tool"], "summon_mediator");
    }

    #[test]
    fn test_unknown_parameter_is_rejected() {
        let err = executor()
            .execute(
                "get_analysis_age",
                json!({"session_key": "conv-1", "verbose": true}),
            )
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_parameters");
    }

    #[test]
    fn test_error_payloads() {
        let executor = executor();
        let payload = executor.execute_to_json(
            "leverage_influence",
            json!({"session_key": "fresh", "target": "Gov"}),
        );
        assert_eq!(payload["error"]["kind"], "no_cached_analysis");
        assert_eq!(payload["error"]["session_key"], "fresh");

        executor.execute("analyze_stakeholders", scenario_params()).unwrap();
        let payload = executor.execute_to_json(
            "leverage_influence",
            json!({"session_key": "conv-1", "target": "gov"}),
        );
        assert_eq!(payload["error"]["kind"], "target_not_found");
        assert_eq!(payload["error"]["valid_names"], json!(["Gov", "NGO", "Armed Group"]));

        let mut params = scenario_params();
        params["context"] = json!("too short");
        let payload = executor.execute_to_json("analyze_stakeholders", params);
        assert_eq!(payload["error"]["kind"], "validation_error");
        assert_eq!(payload["error"]["field"], "context");
    }

    #[test]
    fn test_dangling_reference_reported_as_warning() {
        let mut params = scenario_params();
        params["stakeholders"][0]["influenced_by"] = json!(["Diaspora"]);
        let analysis = executor().execute("analyze_stakeholders", params).unwrap();

        assert_eq!(analysis["warnings"][0]["kind"], "dangling_influence_reference");
        assert_eq!(
            analysis["result"]["relationships"]["dangling_references"][0]["reference"],
            "Diaspora"
        );
    }

    #[test]
    fn test_log_tool_call_start_captures_info_and_debug() {
        let logs = capture_logs(|| {
            let params = json!({ "session_key": "conv-1", "target": "NGO" });
            log_tool_call_start("leverage_influence", &params);
        });

        assert!(logs.contains("Tool call started"));
        assert!(logs.contains("Tool input payload"));
    }

    #[test]
    fn test_dangling_reference_warned_once() {
        let mut params = scenario_params();
        params["stakeholders"][0]["influenced_by"] = json!(["Diaspora"]);
        let logs = capture_logs(|| {
            executor().execute("analyze_stakeholders", params).unwrap();
        });

        let warnings = logs
            .lines()
            .filter(|line| line.contains("WARN") && line.contains("Diaspora"))
            .count();
        assert_eq!(warnings, 1);
    }

    #[test]
    fn test_failed_call_logs_kind() {
        let logs = capture_logs(|| {
            let _ = executor().execute("get_analysis_age", json!({ "session_key": "nobody" }));
        });

        assert!(logs.contains("Tool call failed"));
        assert!(logs.contains("no_cached_analysis"));
    }

    fn capture_logs<F>(f: F) -> String
    where
        F: FnOnce(),
    {
        use std::io::Write;
        use std::sync::Mutex;
        use tracing::subscriber::with_default;
        use tracing_subscriber::EnvFilter;

        #[derive(Clone)]
        struct BufferWriter {
            inner: Arc<Mutex<Vec<u8>>>,
        }

        impl BufferWriter {
            fn new() -> Self {
                Self {
                    inner: Arc::new(Mutex::new(Vec::new())),
                }
            }

            fn into_string(&self) -> String {
                let bytes = self.inner.lock().unwrap().clone();
                String::from_utf8(bytes).unwrap()
            }
        }

        impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for BufferWriter {
            type Writer = BufferGuard;

            fn make_writer(&'a self) -> Self::Writer {
                BufferGuard {
                    inner: self.inner.clone(),
                }
            }
        }

        struct BufferGuard {
            inner: Arc<Mutex<Vec<u8>>>,
        }

        impl Write for BufferGuard {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.inner.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let writer = BufferWriter::new();

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_ansi(false)
            .without_time()
            .with_writer(writer.clone())
            .finish();

        with_default(subscriber, f);

        writer.into_string()
    }
}

// ABOUTME: Tool-call layer for the negotiation engine
// ABOUTME: Provides NegotiationToolExecutor and schemas for LLM front ends

pub mod tool_executor;
pub mod tool_schemas;

pub use tool_executor::*;
pub use tool_schemas::*;

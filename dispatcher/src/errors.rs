//! Dispatcher-facing error shape (SPEC_FULL.md §4.J, §7). Every internal
//! error collapses into one of the three JSON-RPC-style codes; a `Debug`
//! backtrace is never surfaced to the caller.

use serde::Serialize;

pub const UNKNOWN_TOOL: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL: i32 = -32603;

#[derive(Debug, Clone, Serialize)]
pub struct ToolError {
    pub code: i32,
    pub message: String,
}

impl ToolError {
    pub fn unknown_tool(name: &str) -> Self {
        Self {
            code: UNKNOWN_TOOL,
            message: format!("unknown tool: {name}"),
        }
    }

    pub fn invalid_params(reason: impl std::fmt::Display) -> Self {
        Self {
            code: INVALID_PARAMS,
            message: reason.to_string(),
        }
    }

    pub fn internal(reason: impl std::fmt::Display) -> Self {
        Self {
            code: INTERNAL,
            message: reason.to_string(),
        }
    }
}

impl From<pattern_store::StoreError> for ToolError {
    fn from(err: pattern_store::StoreError) -> Self {
        ToolError::internal(err)
    }
}

impl From<candidate_pipeline::PipelineError> for ToolError {
    fn from(err: candidate_pipeline::PipelineError) -> Self {
        ToolError::internal(err)
    }
}

impl From<harvester::HarvestError> for ToolError {
    fn from(err: harvester::HarvestError) -> Self {
        ToolError::internal(err)
    }
}

impl From<federation::FederationError> for ToolError {
    fn from(err: federation::FederationError) -> Self {
        ToolError::internal(err)
    }
}

impl From<deduplicator::DeduplicatorError> for ToolError {
    fn from(err: deduplicator::DeduplicatorError) -> Self {
        ToolError::internal(err)
    }
}

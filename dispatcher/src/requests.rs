//! Tagged-variant request/response shapes for the dispatcher boundary
//! (SPEC_FULL.md §4.J). One variant per tool name, exhaustively matched in
//! [`crate::handle`] — no string-keyed handler table.

use crate::errors::ToolError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolRequest {
    Submit {
        code: String,
        language: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        tags: Vec<String>,
        test_code: Option<String>,
    },
    Search {
        text: String,
        language: Option<String>,
        #[serde(default)]
        tags: Vec<String>,
        limit: Option<usize>,
    },
    Reflect {
        code: String,
        language: String,
    },
    Promote {
        max_per_run: Option<usize>,
    },
    Harvest {
        root: String,
    },
    HarvestRemote {
        url: String,
        branch: Option<String>,
        depth: Option<u32>,
    },
    Push,
    Share {
        allow_copyleft_override: Option<bool>,
    },
    Pull {
        language: Option<String>,
    },
    FederatedQuery {
        text: String,
        language: Option<String>,
        #[serde(default)]
        tags: Vec<String>,
        limit: Option<usize>,
    },
    RecordUsage {
        pattern_id: String,
        succeeded: bool,
    },
    RecordBug {
        pattern_id: String,
        description: String,
    },
    Retag {
        pattern_id: String,
        tags: Vec<String>,
    },
}

/// Every tool name the dispatcher recognizes, matching `ToolRequest`'s
/// variants one-for-one (kept as a literal list rather than derived, so a
/// request for any other name fails closed with `UNKNOWN_TOOL` before the
/// parameter schema is even considered).
pub const KNOWN_TOOLS: &[&str] = &[
    "submit",
    "search",
    "reflect",
    "promote",
    "harvest",
    "harvest_remote",
    "push",
    "share",
    "pull",
    "federated_query",
    "record_usage",
    "record_bug",
    "retag",
];

/// Validates `tool` against [`KNOWN_TOOLS`] and `params` against the
/// matching variant's schema, in that order, so an unrecognized tool name
/// never attempts to validate fields it could never define.
pub fn route(tool: &str, params: serde_json::Value) -> Result<ToolRequest, ToolError> {
    if !KNOWN_TOOLS.contains(&tool) {
        return Err(ToolError::unknown_tool(tool));
    }
    let mut tagged = match params {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => serde_json::Map::new(),
        _ => return Err(ToolError::invalid_params("params must be a JSON object")),
    };
    tagged.insert("tool".to_string(), serde_json::Value::String(tool.to_string()));
    serde_json::from_value(serde_json::Value::Object(tagged)).map_err(ToolError::invalid_params)
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolResponse {
    pub id: i64,
    #[serde(flatten)]
    pub outcome: ToolOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ToolOutcome {
    Result { result: serde_json::Value },
    Error { error: ToolError },
}

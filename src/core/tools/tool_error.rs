use thiserror::Error;

use super::tool_catalog::ToolName;
use crate::core::docs::DocsError;

/// Everything that can make a tool call fail.
///
/// `UnknownTool` and `InvalidArguments` are raised before any remote call;
/// `Precondition` is raised before any remote mutation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: ToolName, reason: String },

    #[error("{0}")]
    Precondition(String),

    #[error(transparent)]
    Remote(#[from] DocsError),
}

// Typed argument structs, one per tool.
//
// Parsing an incoming argument map into one of these is the only validation
// step: a missing required field or a value of the wrong type fails here,
// with a single error kind, before the dispatcher touches the backend.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::tool_catalog::{ToolName, DEFAULT_DOCUMENT_TITLE};
use super::tool_error::ToolError;

fn default_title() -> String {
    DEFAULT_DOCUMENT_TITLE.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateDocArgs {
    #[serde(default = "default_title")]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InsertTextArgs {
    pub document_id: String,
    pub index: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplaceTextArgs {
    pub document_id: String,
    pub search_text: String,
    pub replace_text: String,
    #[serde(default)]
    pub match_case: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeleteContentArgs {
    pub document_id: String,
    pub start_index: u32,
    pub end_index: u32,
}

/// Shared by `read-doc` and `read-comments`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentArgs {
    pub document_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplyCommentArgs {
    pub document_id: String,
    pub comment_id: String,
    pub reply: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateCommentArgs {
    pub document_id: String,
    pub content: String,
    pub start_offset: u64,
    pub length: u64,
    #[serde(default)]
    pub total_length: Option<u64>,
}

/// A validated tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    CreateDoc(CreateDocArgs),
    InsertText(InsertTextArgs),
    ReplaceText(ReplaceTextArgs),
    DeleteContent(DeleteContentArgs),
    ReadComments(DocumentArgs),
    ReplyComment(ReplyCommentArgs),
    ReadDoc(DocumentArgs),
    CreateComment(CreateCommentArgs),
}

impl ToolCall {
    /// Resolves `name` and validates `arguments` against that tool's contract.
    /// A `null` argument map is treated as empty.
    pub fn parse(name: &str, arguments: Value) -> Result<Self, ToolError> {
        let tool =
            ToolName::from_name(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let arguments = if arguments.is_null() {
            Value::Object(Default::default())
        } else {
            arguments
        };

        let call = match tool {
            ToolName::CreateDoc => ToolCall::CreateDoc(parse_args(tool, arguments)?),
            ToolName::InsertText => ToolCall::InsertText(parse_args(tool, arguments)?),
            ToolName::ReplaceText => ToolCall::ReplaceText(parse_args(tool, arguments)?),
            ToolName::DeleteContent => ToolCall::DeleteContent(parse_args(tool, arguments)?),
            ToolName::ReadComments => ToolCall::ReadComments(parse_args(tool, arguments)?),
            ToolName::ReplyComment => ToolCall::ReplyComment(parse_args(tool, arguments)?),
            ToolName::ReadDoc => ToolCall::ReadDoc(parse_args(tool, arguments)?),
            ToolName::CreateComment => ToolCall::CreateComment(parse_args(tool, arguments)?),
        };

        Ok(call)
    }

    pub fn tool(&self) -> ToolName {
        match self {
            ToolCall::CreateDoc(_) => ToolName::CreateDoc,
            ToolCall::InsertText(_) => ToolName::InsertText,
            ToolCall::ReplaceText(_) => ToolName::ReplaceText,
            ToolCall::DeleteContent(_) => ToolName::DeleteContent,
            ToolCall::ReadComments(_) => ToolName::ReadComments,
            ToolCall::ReplyComment(_) => ToolName::ReplyComment,
            ToolCall::ReadDoc(_) => ToolName::ReadDoc,
            ToolCall::CreateComment(_) => ToolName::CreateComment,
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
        tool,
        reason: e.to_string(),
    })
}

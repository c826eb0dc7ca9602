// Static catalog of the tools advertised to MCP clients.
//
// Each entry pairs a stable name with the JSON Schema of its arguments. The
// schemas are what clients see; the typed structs in `tool_args` are what the
// dispatcher actually enforces, and the two are kept in step by the tests below.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_DOCUMENT_TITLE: &str = "New Document";

/// The tools this server understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    CreateDoc,
    InsertText,
    ReplaceText,
    DeleteContent,
    ReadComments,
    ReplyComment,
    ReadDoc,
    CreateComment,
}

impl ToolName {
    pub const ALL: [ToolName; 8] = [
        ToolName::CreateDoc,
        ToolName::InsertText,
        ToolName::ReplaceText,
        ToolName::DeleteContent,
        ToolName::ReadComments,
        ToolName::ReplyComment,
        ToolName::ReadDoc,
        ToolName::CreateComment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::CreateDoc => "create-doc",
            ToolName::InsertText => "insert-text",
            ToolName::ReplaceText => "replace-text",
            ToolName::DeleteContent => "delete-content",
            ToolName::ReadComments => "read-comments",
            ToolName::ReplyComment => "reply-comment",
            ToolName::ReadDoc => "read-doc",
            ToolName::CreateComment => "create-comment",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool as listed by `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

fn document_id_property() -> Value {
    json!({
        "type": "string",
        "description": "The ID of the Google Document",
        "example": "1abcXYZ..."
    })
}

pub fn tool_definition(tool: ToolName) -> ToolDefinition {
    let (description, input_schema) = match tool {
        ToolName::CreateDoc => (
            "Creates a new Google Doc with an optional title",
            json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "Title of the new document",
                        "default": DEFAULT_DOCUMENT_TITLE,
                        "example": "My New Document"
                    }
                },
                "required": []
            }),
        ),
        ToolName::InsertText => (
            "Inserts text into a Google Doc at a specified index",
            json!({
                "type": "object",
                "properties": {
                    "document_id": document_id_property(),
                    "index": {
                        "type": "number",
                        "description": "The insertion index (1-based)",
                        "example": 1
                    },
                    "text": {
                        "type": "string",
                        "description": "The text to insert",
                        "example": "Hello World\n"
                    }
                },
                "required": ["document_id", "index", "text"]
            }),
        ),
        ToolName::ReplaceText => (
            "Replaces all occurrences of a search string with a replacement string in a Google Doc",
            json!({
                "type": "object",
                "properties": {
                    "document_id": document_id_property(),
                    "search_text": {
                        "type": "string",
                        "description": "The text to search for",
                        "example": "FOO"
                    },
                    "replace_text": {
                        "type": "string",
                        "description": "The text to replace with",
                        "example": "BAR"
                    },
                    "match_case": {
                        "type": "boolean",
                        "description": "Whether the search should be case sensitive",
                        "default": false,
                        "example": false
                    }
                },
                "required": ["document_id", "search_text", "replace_text"]
            }),
        ),
        ToolName::DeleteContent => (
            "Deletes the content in a specified range in a Google Doc",
            json!({
                "type": "object",
                "properties": {
                    "document_id": document_id_property(),
                    "start_index": {
                        "type": "number",
                        "description": "The starting index of the content range (inclusive)",
                        "example": 10
                    },
                    "end_index": {
                        "type": "number",
                        "description": "The ending index of the content range (exclusive)",
                        "example": 20
                    }
                },
                "required": ["document_id", "start_index", "end_index"]
            }),
        ),
        ToolName::ReadComments => (
            "Reads comments from a Google Doc",
            json!({
                "type": "object",
                "properties": {
                    "document_id": document_id_property()
                },
                "required": ["document_id"]
            }),
        ),
        ToolName::ReplyComment => (
            "Replies to a comment in a Google Doc",
            json!({
                "type": "object",
                "properties": {
                    "document_id": document_id_property(),
                    "comment_id": {
                        "type": "string",
                        "description": "ID of the comment",
                        "example": "Cp1..."
                    },
                    "reply": {
                        "type": "string",
                        "description": "Content of the reply",
                        "example": "Thanks for the feedback!"
                    }
                },
                "required": ["document_id", "comment_id", "reply"]
            }),
        ),
        ToolName::ReadDoc => (
            "Reads and returns the plain-text content of a Google Doc",
            json!({
                "type": "object",
                "properties": {
                    "document_id": document_id_property()
                },
                "required": ["document_id"]
            }),
        ),
        ToolName::CreateComment => (
            "Creates a new anchored comment on a Google Doc. You must specify the document ID, \
             comment content, starting offset, and length. Optionally, provide the total number \
             of characters (ml) in the target region.",
            json!({
                "type": "object",
                "properties": {
                    "document_id": document_id_property(),
                    "content": {
                        "type": "string",
                        "description": "The text content of the comment",
                        "example": "This is an anchored comment."
                    },
                    "start_offset": {
                        "type": "number",
                        "description": "Starting offset in the document text",
                        "example": 10
                    },
                    "length": {
                        "type": "number",
                        "description": "Length of the text range for the anchor",
                        "example": 5
                    },
                    "total_length": {
                        "type": "number",
                        "description": "Total characters in the target region (ml); defaults to length",
                        "example": 5
                    }
                },
                "required": ["document_id", "content", "start_offset", "length"]
            }),
        ),
    };

    ToolDefinition {
        name: tool.as_str().to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Every tool, in catalog order.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    ToolName::ALL.into_iter().map(tool_definition).collect()
}

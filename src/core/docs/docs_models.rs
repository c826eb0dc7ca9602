// Shapes exchanged with the Docs and Drive APIs.
//
// These mirror Google's REST resources closely enough to read what we need
// (ids, revision, body structure, comment threads). Fields we never look at
// are simply not modelled; serde ignores them on the way in.

use serde::{Deserialize, Serialize};

use super::docs_service::DocsError;

// =============================================================================
// DOCUMENT RESOURCE
// =============================================================================

/// A Google Doc as returned by `documents.get` / `documents.create`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub document_id: String,
    pub title: String,
    /// Version token for the content state this resource was read at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

impl Document {
    /// End index of the body, i.e. one past the implicit final newline.
    /// Returns 1 for a document without structural content.
    pub fn body_end_index(&self) -> i64 {
        self.body
            .as_ref()
            .and_then(|b| b.content.last())
            .and_then(|e| e.end_index)
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Body {
    pub content: Vec<StructuralElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuralElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<Paragraph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_of_contents: Option<TableOfContents>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_break: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Paragraph {
    pub elements: Vec<ParagraphElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParagraphElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextRun {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Table {
    pub table_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableRow {
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableCell {
    pub content: Vec<StructuralElement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableOfContents {
    pub content: Vec<StructuralElement>,
}

// =============================================================================
// EDIT REQUESTS
// =============================================================================
//
// Each variant becomes exactly one entry in a `documents.batchUpdate` call.
// Serialisation is externally tagged, so `InsertText(..)` is written as
// `{"insertText": {...}}`, which is the shape the API expects.

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EditRequest {
    InsertText(InsertTextRequest),
    ReplaceAllText(ReplaceAllTextRequest),
    DeleteContentRange(DeleteContentRangeRequest),
}

impl EditRequest {
    pub fn insert_text(index: i64, text: impl Into<String>) -> Self {
        Self::InsertText(InsertTextRequest {
            location: Location { index },
            text: text.into(),
        })
    }

    pub fn replace_all_text(
        search: impl Into<String>,
        replace: impl Into<String>,
        match_case: bool,
    ) -> Self {
        Self::ReplaceAllText(ReplaceAllTextRequest {
            contains_text: SubstringMatchCriteria {
                text: search.into(),
                match_case,
            },
            replace_text: replace.into(),
        })
    }

    /// Deletes `[start_index, end_index)`.
    pub fn delete_content_range(start_index: i64, end_index: i64) -> Self {
        Self::DeleteContentRange(DeleteContentRangeRequest {
            range: Range {
                start_index,
                end_index,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTextRequest {
    pub location: Location,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub index: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceAllTextRequest {
    pub contains_text: SubstringMatchCriteria,
    pub replace_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstringMatchCriteria {
    pub text: String,
    pub match_case: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteContentRangeRequest {
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_index: i64,
    pub end_index: i64,
}

/// Reply from `documents.batchUpdate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchUpdateResponse {
    pub document_id: String,
    /// One entry per request, in request order. Most are empty objects.
    pub replies: Vec<BatchUpdateReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_control: Option<WriteControl>,
}

impl BatchUpdateResponse {
    /// Total occurrences changed across every `replaceAllText` reply.
    pub fn occurrences_changed(&self) -> i64 {
        self.replies
            .iter()
            .filter_map(|r| r.replace_all_text.as_ref())
            .filter_map(|r| r.occurrences_changed)
            .sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchUpdateReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_all_text: Option<ReplaceAllTextReply>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplaceAllTextReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrences_changed: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WriteControl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_revision_id: Option<String>,
}

// =============================================================================
// COMMENTS (Drive v3)
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Comment {
    pub id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    pub resolved: bool,
    /// Drive keeps deleted comments as tombstones with this flag set.
    pub deleted: bool,
    pub replies: Vec<Reply>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reply {
    pub id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    pub deleted: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Author {
    pub display_name: String,
}

/// Binds a comment to a span of text as of a specific revision.
///
/// The Drive API takes the anchor as an opaque JSON string; the layout
/// produced by [`CommentAnchor::to_anchor_json`] is what the Docs editor
/// resolves, so the short field names must be kept as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentAnchor {
    pub revision_id: String,
    pub offset: u64,
    pub length: u64,
    pub total_length: u64,
}

impl CommentAnchor {
    /// `total_length` defaults to `length` when not supplied.
    pub fn new(
        revision_id: impl Into<String>,
        offset: u64,
        length: u64,
        total_length: Option<u64>,
    ) -> Result<Self, DocsError> {
        let total_length = total_length.unwrap_or(length);
        if length < 1 {
            return Err(DocsError::InvalidInput(
                "anchor length must be at least 1".to_string(),
            ));
        }
        if total_length < length {
            return Err(DocsError::InvalidInput(format!(
                "anchor total_length ({}) must not be smaller than length ({})",
                total_length, length
            )));
        }

        Ok(Self {
            revision_id: revision_id.into(),
            offset,
            length,
            total_length,
        })
    }

    pub fn to_anchor_json(&self) -> String {
        serde_json::json!({
            "r": self.revision_id,
            "a": [{
                "txt": {
                    "o": self.offset,
                    "l": self.length,
                    "ml": self.total_length,
                }
            }]
        })
        .to_string()
    }
}

// Tool dispatcher - turns a validated tool call into DocsService calls and
// renders the result as a single text message.
//
// Calls are made one after another, never concurrently. Nothing is retried:
// whatever the remote service says is what the caller gets back.

use std::fmt::Write as _;

use serde_json::Value;

use super::tool_args::{CreateCommentArgs, ToolCall};
use super::tool_catalog::{tool_definitions, ToolDefinition, ToolName};
use super::tool_error::ToolError;
use crate::core::docs::{
    Comment, CommentAnchor, DocsBackend, DocsError, DocsService, EditRequest,
};

/// Organisation domain that newly created documents are shared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainShare {
    pub domain: String,
    pub role: String,
}

pub struct ToolDispatcher<B: DocsBackend> {
    docs: DocsService<B>,
    share: Option<DomainShare>,
}

impl<B: DocsBackend> ToolDispatcher<B> {
    pub fn new(docs: DocsService<B>) -> Self {
        Self { docs, share: None }
    }

    pub fn with_domain_share(mut self, share: Option<DomainShare>) -> Self {
        self.share = share;
        self
    }

    #[cfg(test)]
    pub fn docs(&self) -> &DocsService<B> {
        &self.docs
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Runs one tool call to completion.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<String, ToolError> {
        let call = ToolCall::parse(name, arguments)?;
        tracing::info!(tool = %call.tool(), "Handling tool call");

        match call {
            ToolCall::CreateDoc(args) => {
                let (org, role) = match &self.share {
                    Some(share) => (Some(share.domain.as_str()), Some(share.role.as_str())),
                    None => (None, None),
                };
                let doc = self
                    .docs
                    .create_document(&args.title, org, role)
                    .await
                    .map_err(local_as_argument_error(ToolName::CreateDoc))?;
                Ok(format!(
                    "Document created at URL: https://docs.google.com/document/d/{}/edit",
                    doc.document_id
                ))
            }
            ToolCall::InsertText(args) => {
                let request = EditRequest::insert_text(i64::from(args.index), args.text);
                self.docs
                    .edit_document(&args.document_id, &[request])
                    .await?;
                Ok(format!("Inserted text into document {}.", args.document_id))
            }
            ToolCall::ReplaceText(args) => {
                let request = EditRequest::replace_all_text(
                    args.search_text.as_str(),
                    args.replace_text.as_str(),
                    args.match_case,
                );
                let result = self
                    .docs
                    .edit_document(&args.document_id, &[request])
                    .await?;
                Ok(format!(
                    "Replaced {} occurrence(s) of \"{}\" in document {}.",
                    result.occurrences_changed(),
                    args.search_text,
                    args.document_id
                ))
            }
            ToolCall::DeleteContent(args) => {
                let request = EditRequest::delete_content_range(
                    i64::from(args.start_index),
                    i64::from(args.end_index),
                );
                self.docs
                    .edit_document(&args.document_id, &[request])
                    .await?;
                Ok(format!(
                    "Deleted content [{}, {}) from document {}.",
                    args.start_index, args.end_index, args.document_id
                ))
            }
            ToolCall::ReadComments(args) => {
                let comments = self.docs.read_comments(&args.document_id).await?;
                Ok(render_comments(&args.document_id, &comments))
            }
            ToolCall::ReplyComment(args) => {
                let reply = self
                    .docs
                    .reply_comment(&args.document_id, &args.comment_id, &args.reply)
                    .await?;
                Ok(format!(
                    "Reply posted to comment {}: [{}] {}",
                    args.comment_id, reply.id, reply.content
                ))
            }
            ToolCall::ReadDoc(args) => Ok(self.docs.read_document_text(&args.document_id).await?),
            ToolCall::CreateComment(args) => self.create_comment(args).await,
        }
    }

    async fn create_comment(&self, args: CreateCommentArgs) -> Result<String, ToolError> {
        // Check the range before spending a remote read on it.
        let invalid = local_as_argument_error(ToolName::CreateComment);
        CommentAnchor::new("", args.start_offset, args.length, args.total_length)
            .map_err(invalid)?;

        let document = self.docs.read_document(&args.document_id).await?;
        let revision_id = document
            .revision_id
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ToolError::Precondition("Document revision ID not found.".to_string()))?;

        let anchor = CommentAnchor::new(
            revision_id,
            args.start_offset,
            args.length,
            args.total_length,
        )
        .map_err(invalid)?;

        let comment = self
            .docs
            .create_comment(&args.document_id, &args.content, Some(&anchor))
            .await?;
        Ok(format!("Comment created: [{}] {}", comment.id, comment.content))
    }
}

/// Local checks inside the client surface as argument errors of `tool`;
/// everything else is a remote failure.
fn local_as_argument_error(tool: ToolName) -> impl Fn(DocsError) -> ToolError + Copy {
    move |e| match e {
        DocsError::InvalidInput(reason) => ToolError::InvalidArguments { tool, reason },
        other => ToolError::Remote(other),
    }
}

fn render_comments(document_id: &str, comments: &[Comment]) -> String {
    if comments.is_empty() {
        return format!("No comments on document {}.", document_id);
    }

    let mut output = String::new();
    for comment in comments {
        let author = comment
            .author
            .as_ref()
            .map(|a| a.display_name.as_str())
            .unwrap_or("unknown");
        let _ = write!(output, "[{}] {}: {}", comment.id, author, comment.content);
        if comment.resolved {
            output.push_str(" (resolved)");
        }
        output.push('\n');

        for reply in &comment.replies {
            let author = reply
                .author
                .as_ref()
                .map(|a| a.display_name.as_str())
                .unwrap_or("unknown");
            let _ = writeln!(output, "  ↳ [{}] {}: {}", reply.id, author, reply.content);
        }
    }

    output
}

// Document/Comment client - the operations the tool layer builds on.
//
// The service is platform-agnostic: it never touches HTTP. Every remote
// round-trip goes through the `DocsBackend` port, which the infra layer
// implements against the real Docs/Drive REST APIs (and tests implement
// in memory). What lives here is the logic on top of those round-trips:
// text flattening, the delete-then-insert rewrite, and anchor encoding.

use async_trait::async_trait;
use thiserror::Error;

use super::docs_models::{
    BatchUpdateResponse, Comment, CommentAnchor, Document, EditRequest, Reply,
};
use super::text_extraction::document_text;

/// Role granted when a document is shared with a domain and no role is given.
pub const DEFAULT_SHARE_ROLE: &str = "writer";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum DocsError {
    /// The remote service answered with a non-success status.
    #[error("Google API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Unexpected response from Google API: {0}")]
    Decode(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// ============================================================================
// BACKEND TRAIT (PORT)
// ============================================================================

/// One method per remote call. Implementations must not retry.
#[async_trait]
pub trait DocsBackend: Send + Sync {
    async fn create_document(&self, title: &str) -> Result<Document, DocsError>;

    async fn get_document(&self, document_id: &str) -> Result<Document, DocsError>;

    /// Applies `requests` atomically and in order. When `required_revision_id`
    /// is set the remote service rejects the batch if the document has moved on.
    async fn batch_update(
        &self,
        document_id: &str,
        requests: &[EditRequest],
        required_revision_id: Option<&str>,
    ) -> Result<BatchUpdateResponse, DocsError>;

    async fn share_with_domain(
        &self,
        document_id: &str,
        domain: &str,
        role: &str,
    ) -> Result<(), DocsError>;

    /// All comments, in the order the remote service lists them.
    async fn list_comments(&self, document_id: &str) -> Result<Vec<Comment>, DocsError>;

    async fn create_comment(
        &self,
        document_id: &str,
        content: &str,
        anchor: Option<&str>,
    ) -> Result<Comment, DocsError>;

    async fn create_reply(
        &self,
        document_id: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<Reply, DocsError>;

    async fn delete_reply(
        &self,
        document_id: &str,
        comment_id: &str,
        reply_id: &str,
    ) -> Result<(), DocsError>;
}

// ============================================================================
// SERVICE
// ============================================================================

pub struct DocsService<B: DocsBackend> {
    backend: B,
}

impl<B: DocsBackend> DocsService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Creates a document and, when `org` is given, shares it with that domain.
    pub async fn create_document(
        &self,
        title: &str,
        org: Option<&str>,
        role: Option<&str>,
    ) -> Result<Document, DocsError> {
        if title.trim().is_empty() {
            return Err(DocsError::InvalidInput(
                "document title must not be empty".to_string(),
            ));
        }

        let document = self.backend.create_document(title).await?;
        tracing::info!(document_id = %document.document_id, "Created document");

        if let Some(org) = org {
            let role = role.unwrap_or(DEFAULT_SHARE_ROLE);
            self.backend
                .share_with_domain(&document.document_id, org, role)
                .await?;
            tracing::info!(
                document_id = %document.document_id,
                domain = org,
                role,
                "Shared document with domain"
            );
        }

        Ok(document)
    }

    pub async fn read_document(&self, document_id: &str) -> Result<Document, DocsError> {
        self.backend.get_document(document_id).await
    }

    pub async fn read_document_text(&self, document_id: &str) -> Result<String, DocsError> {
        let document = self.backend.get_document(document_id).await?;
        Ok(document_text(&document))
    }

    pub async fn edit_document(
        &self,
        document_id: &str,
        requests: &[EditRequest],
    ) -> Result<BatchUpdateResponse, DocsError> {
        tracing::debug!(document_id, requests = requests.len(), "Applying batch update");
        self.backend.batch_update(document_id, requests, None).await
    }

    /// Replaces the whole body with `new_text`.
    ///
    /// The delete covers `[1, end - 1)`: index 1 is the first character and the
    /// body's final newline cannot be deleted. The batch is pinned to the
    /// revision that was read, so a concurrent edit in between makes the
    /// remote service reject it instead of deleting the wrong span.
    pub async fn rewrite_document(
        &self,
        document_id: &str,
        new_text: &str,
    ) -> Result<BatchUpdateResponse, DocsError> {
        let current = self.backend.get_document(document_id).await?;
        let end_index = current.body_end_index() - 1;

        let mut requests = Vec::with_capacity(2);
        if end_index > 1 {
            requests.push(EditRequest::delete_content_range(1, end_index));
        }
        if !new_text.is_empty() {
            requests.push(EditRequest::insert_text(1, new_text));
        }

        if requests.is_empty() {
            return Ok(BatchUpdateResponse {
                document_id: document_id.to_string(),
                ..Default::default()
            });
        }

        tracing::debug!(
            document_id,
            end_index,
            revision = current.revision_id.as_deref().unwrap_or("<none>"),
            "Rewriting document body"
        );

        self.backend
            .batch_update(document_id, &requests, current.revision_id.as_deref())
            .await
    }

    pub async fn read_comments(&self, document_id: &str) -> Result<Vec<Comment>, DocsError> {
        self.backend.list_comments(document_id).await
    }

    pub async fn create_comment(
        &self,
        document_id: &str,
        content: &str,
        anchor: Option<&CommentAnchor>,
    ) -> Result<Comment, DocsError> {
        let anchor_json = anchor.map(CommentAnchor::to_anchor_json);
        self.backend
            .create_comment(document_id, content, anchor_json.as_deref())
            .await
    }

    pub async fn reply_comment(
        &self,
        document_id: &str,
        comment_id: &str,
        reply_text: &str,
    ) -> Result<Reply, DocsError> {
        self.backend
            .create_reply(document_id, comment_id, reply_text)
            .await
    }

    pub async fn delete_reply(
        &self,
        document_id: &str,
        comment_id: &str,
        reply_id: &str,
    ) -> Result<(), DocsError> {
        self.backend
            .delete_reply(document_id, comment_id, reply_id)
            .await
    }
}

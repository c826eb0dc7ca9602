// =============================================================================
// GOOGLE DOCS / DRIVE REST BACKEND
// =============================================================================
//
// Implements the core `DocsBackend` port against:
// - Docs API v1 (`documents.create`, `documents.get`, `documents.batchUpdate`)
// - Drive API v3 (`permissions.create`, `comments.*`, `replies.*`)
//
// Every method is a single HTTP round-trip (comment listing follows page
// tokens). Non-success replies become `DocsError::Api` carrying Google's own
// error message; nothing is retried here.
//
// Ids are pushed as percent-encoded path segments, never spliced into the URL
// text, so an id cannot add path components or a query.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::google_auth::GoogleAuth;
use crate::core::docs::{
    BatchUpdateResponse, Comment, DocsBackend, DocsError, Document, EditRequest, Reply,
    WriteControl,
};

const DOCS_API_BASE: &str = "https://docs.googleapis.com/v1";
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

const REPLY_FIELDS: &str = "id,content,author(displayName),createdTime,deleted";
const COMMENT_FIELDS: &str = "id,content,author(displayName),createdTime,modifiedTime,resolved,\
                              deleted,replies(id,content,author(displayName),createdTime,deleted)";

pub struct GoogleDocsClient {
    client: Client,
    auth: GoogleAuth,
    docs_base_url: Url,
    drive_base_url: Url,
}

impl GoogleDocsClient {
    pub fn new(auth: GoogleAuth) -> Result<Self, DocsError> {
        Self::with_base_urls(auth, DOCS_API_BASE, DRIVE_API_BASE)
    }

    /// Points the client at other Docs/Drive roots (e.g. a local test server).
    pub fn with_base_urls(
        auth: GoogleAuth,
        docs_base_url: &str,
        drive_base_url: &str,
    ) -> Result<Self, DocsError> {
        Ok(Self {
            client: Client::new(),
            auth,
            docs_base_url: parse_base_url(docs_base_url)?,
            drive_base_url: parse_base_url(drive_base_url)?,
        })
    }

    fn docs_url(&self, segments: &[&str]) -> Result<Url, DocsError> {
        endpoint(&self.docs_base_url, segments)
    }

    fn drive_url(&self, segments: &[&str]) -> Result<Url, DocsError> {
        endpoint(&self.drive_base_url, segments)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DocsError> {
        let token = self.auth.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| DocsError::Http(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = api_error_message(&body);
        tracing::warn!(status, "Google API call failed: {}", message);
        Err(DocsError::Api { status, message })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, DocsError> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| DocsError::Decode(e.to_string()))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, DocsError> {
    let url = Url::parse(raw)
        .map_err(|e| DocsError::InvalidInput(format!("invalid API base URL {}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(DocsError::InvalidInput(format!(
            "API base URL {} cannot carry a path",
            raw
        )));
    }
    Ok(url)
}

/// Appends `segments` to `base`, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, DocsError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| DocsError::InvalidInput(format!("API base URL {} cannot carry a path", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Pulls `error.message` out of a Google error body, falling back to the raw body.
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "no error details returned".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentList {
    #[serde(default)]
    comments: Vec<Comment>,
    next_page_token: Option<String>,
}

/// Drops deleted comments and deleted replies; Drive still lists both.
fn live_comments(comments: Vec<Comment>) -> impl Iterator<Item = Comment> {
    comments
        .into_iter()
        .filter(|c| !c.deleted)
        .map(|mut comment| {
            comment.replies.retain(|r| !r.deleted);
            comment
        })
}

#[async_trait]
impl DocsBackend for GoogleDocsClient {
    async fn create_document(&self, title: &str) -> Result<Document, DocsError> {
        let url = self.docs_url(&["documents"])?;
        tracing::debug!(title, "Creating Google Doc");
        self.send_json(self.client.post(url).json(&json!({ "title": title })))
            .await
    }

    async fn get_document(&self, document_id: &str) -> Result<Document, DocsError> {
        let url = self.docs_url(&["documents", document_id])?;
        tracing::debug!(document_id, "Fetching Google Doc");
        self.send_json(self.client.get(url)).await
    }

    async fn batch_update(
        &self,
        document_id: &str,
        requests: &[EditRequest],
        required_revision_id: Option<&str>,
    ) -> Result<BatchUpdateResponse, DocsError> {
        let method = format!("{}:batchUpdate", document_id);
        let url = self.docs_url(&["documents", method.as_str()])?;

        let mut body = json!({ "requests": requests });
        if let Some(revision) = required_revision_id {
            body["writeControl"] = serde_json::to_value(WriteControl {
                required_revision_id: Some(revision.to_string()),
            })
            .map_err(|e| DocsError::Decode(e.to_string()))?;
        }

        tracing::debug!(document_id, requests = requests.len(), "Sending batchUpdate");
        self.send_json(self.client.post(url).json(&body)).await
    }

    async fn share_with_domain(
        &self,
        document_id: &str,
        domain: &str,
        role: &str,
    ) -> Result<(), DocsError> {
        let url = self.drive_url(&["files", document_id, "permissions"])?;
        let body = json!({ "type": "domain", "domain": domain, "role": role });
        self.send(self.client.post(url).json(&body)).await?;
        Ok(())
    }

    async fn list_comments(&self, document_id: &str) -> Result<Vec<Comment>, DocsError> {
        let url = self.drive_url(&["files", document_id, "comments"])?;
        let fields = format!("comments({}),nextPageToken", COMMENT_FIELDS);
        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(url.clone())
                .query(&[("fields", fields.as_str()), ("pageSize", "100")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: CommentList = self.send_json(request).await?;
            comments.extend(live_comments(page.comments));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(document_id, count = comments.len(), "Listed comments");
        Ok(comments)
    }

    async fn create_comment(
        &self,
        document_id: &str,
        content: &str,
        anchor: Option<&str>,
    ) -> Result<Comment, DocsError> {
        let url = self.drive_url(&["files", document_id, "comments"])?;
        let mut body = json!({ "content": content });
        if let Some(anchor) = anchor {
            body["anchor"] = json!(anchor);
        }

        self.send_json(
            self.client
                .post(url)
                .query(&[("fields", COMMENT_FIELDS)])
                .json(&body),
        )
        .await
    }

    async fn create_reply(
        &self,
        document_id: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<Reply, DocsError> {
        let url = self.drive_url(&["files", document_id, "comments", comment_id, "replies"])?;
        self.send_json(
            self.client
                .post(url)
                .query(&[("fields", REPLY_FIELDS)])
                .json(&json!({ "content": content })),
        )
        .await
    }

    async fn delete_reply(
        &self,
        document_id: &str,
        comment_id: &str,
        reply_id: &str,
    ) -> Result<(), DocsError> {
        let url = self.drive_url(&[
            "files",
            document_id,
            "comments",
            comment_id,
            "replies",
            reply_id,
        ])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

// In-memory implementation of DocsBackend.
//
// Behaves like the Docs/Drive APIs closely enough to exercise the service and
// dispatcher without network access:
// - indices are UTF-16 code units, index 1 is the first character
// - the body always ends with a newline that cannot be deleted
// - a batch is applied to a scratch copy and only committed if every request
//   succeeds, and each commit bumps the revision id
// It also counts calls so tests can assert that nothing reached the remote side.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::core::docs::docs_models::{
    BatchUpdateReply, Body, Paragraph, ParagraphElement, ReplaceAllTextReply, StructuralElement,
    TextRun,
};
use crate::core::docs::{
    BatchUpdateResponse, Comment, DocsBackend, DocsError, Document, EditRequest, Reply,
    WriteControl,
};

#[derive(Clone, Debug)]
struct StoredDocument {
    title: String,
    /// Body text including the trailing newline.
    text: Vec<u16>,
    revision: u64,
    comments: Vec<Comment>,
    permissions: Vec<(String, String)>,
}

impl StoredDocument {
    fn revision_id(&self) -> String {
        format!("rev-{}", self.revision)
    }
}

pub struct InMemoryDocsBackend {
    documents: DashMap<String, StoredDocument>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
    batch_updates: AtomicUsize,
    comment_creates: AtomicUsize,
    last_anchor: Mutex<Option<String>>,
    last_required_revision: Mutex<Option<String>>,
}

impl InMemoryDocsBackend {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            next_id: AtomicUsize::new(1),
            calls: AtomicUsize::new(0),
            batch_updates: AtomicUsize::new(0),
            comment_creates: AtomicUsize::new(0),
            last_anchor: Mutex::new(None),
            last_required_revision: Mutex::new(None),
        }
    }

    /// Seeds a document whose `documents.get` reply carries no revision id.
    pub fn insert_document_without_revision(&self, document_id: &str) {
        self.documents.insert(
            document_id.to_string(),
            StoredDocument {
                title: "Unversioned".to_string(),
                text: "\n".encode_utf16().collect(),
                revision: 0,
                comments: Vec::new(),
                permissions: Vec::new(),
            },
        );
    }

    /// Total number of remote calls of any kind.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn batch_update_count(&self) -> usize {
        self.batch_updates.load(Ordering::SeqCst)
    }

    pub fn comment_create_count(&self) -> usize {
        self.comment_creates.load(Ordering::SeqCst)
    }

    pub fn last_anchor(&self) -> Option<String> {
        self.last_anchor.lock().unwrap().clone()
    }

    pub fn last_required_revision(&self) -> Option<String> {
        self.last_required_revision.lock().unwrap().clone()
    }

    pub fn permissions(&self, document_id: &str) -> Vec<(String, String)> {
        self.documents
            .get(document_id)
            .map(|d| d.permissions.clone())
            .unwrap_or_default()
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn not_found(what: &str, id: &str) -> DocsError {
        DocsError::Api {
            status: 404,
            message: format!("{} not found: {}", what, id),
        }
    }

    fn bad_request(message: impl Into<String>) -> DocsError {
        DocsError::Api {
            status: 400,
            message: message.into(),
        }
    }

    fn to_document(id: &str, stored: &StoredDocument) -> Document {
        let mut content = vec![StructuralElement {
            end_index: Some(1),
            section_break: Some(serde_json::json!({})),
            ..Default::default()
        }];

        let text = String::from_utf16_lossy(&stored.text);
        let mut index = 1i64;
        for line in text.split_inclusive('\n') {
            let end = index + line.encode_utf16().count() as i64;
            content.push(StructuralElement {
                start_index: Some(index),
                end_index: Some(end),
                paragraph: Some(Paragraph {
                    elements: vec![ParagraphElement {
                        start_index: Some(index),
                        end_index: Some(end),
                        text_run: Some(TextRun {
                            content: Some(line.to_string()),
                        }),
                    }],
                }),
                ..Default::default()
            });
            index = end;
        }

        Document {
            document_id: id.to_string(),
            title: stored.title.clone(),
            revision_id: (stored.revision > 0).then(|| stored.revision_id()),
            body: Some(Body { content }),
        }
    }

    fn apply(text: &mut Vec<u16>, request: &EditRequest) -> Result<BatchUpdateReply, DocsError> {
        let len = text.len() as i64;
        match request {
            EditRequest::InsertText(insert) => {
                let index = insert.location.index;
                if index < 1 || index > len {
                    return Err(Self::bad_request(format!(
                        "Index {} must be less than the end index of the referenced segment, {}.",
                        index,
                        len + 1
                    )));
                }
                let position = (index - 1) as usize;
                text.splice(position..position, insert.text.encode_utf16());
                Ok(BatchUpdateReply::default())
            }
            EditRequest::DeleteContentRange(delete) => {
                let (start, end) = (delete.range.start_index, delete.range.end_index);
                if start < 1 || end <= start {
                    return Err(Self::bad_request(format!(
                        "Invalid deletion range [{}, {}).",
                        start, end
                    )));
                }
                if end > len {
                    return Err(Self::bad_request(
                        "The range cannot include the newline character at the end of the segment.",
                    ));
                }
                text.drain((start - 1) as usize..(end - 1) as usize);
                Ok(BatchUpdateReply::default())
            }
            EditRequest::ReplaceAllText(replace) => {
                let current = String::from_utf16_lossy(text);
                let (updated, count) = replace_all(
                    &current,
                    &replace.contains_text.text,
                    &replace.replace_text,
                    replace.contains_text.match_case,
                );
                *text = updated.encode_utf16().collect();
                Ok(BatchUpdateReply {
                    replace_all_text: Some(ReplaceAllTextReply {
                        occurrences_changed: Some(count),
                    }),
                })
            }
        }
    }
}

impl Default for InMemoryDocsBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn replace_all(text: &str, search: &str, replace: &str, match_case: bool) -> (String, i64) {
    if search.is_empty() {
        return (text.to_string(), 0);
    }

    // ASCII folding keeps byte offsets identical between haystack and text.
    let (haystack, needle) = if match_case {
        (text.to_string(), search.to_string())
    } else {
        (text.to_ascii_lowercase(), search.to_ascii_lowercase())
    };

    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;
    for (position, _) in haystack.match_indices(needle.as_str()) {
        output.push_str(&text[last..position]);
        output.push_str(replace);
        last = position + needle.len();
        count += 1;
    }
    output.push_str(&text[last..]);

    (output, count)
}

#[async_trait]
impl DocsBackend for InMemoryDocsBackend {
    async fn create_document(&self, title: &str) -> Result<Document, DocsError> {
        self.record_call();
        let id = self.next_id("doc");
        let stored = StoredDocument {
            title: title.to_string(),
            text: "\n".encode_utf16().collect(),
            revision: 1,
            comments: Vec::new(),
            permissions: Vec::new(),
        };
        let document = Self::to_document(&id, &stored);
        self.documents.insert(id, stored);
        Ok(document)
    }

    async fn get_document(&self, document_id: &str) -> Result<Document, DocsError> {
        self.record_call();
        self.documents
            .get(document_id)
            .map(|stored| Self::to_document(document_id, &stored))
            .ok_or_else(|| Self::not_found("Document", document_id))
    }

    async fn batch_update(
        &self,
        document_id: &str,
        requests: &[EditRequest],
        required_revision_id: Option<&str>,
    ) -> Result<BatchUpdateResponse, DocsError> {
        self.record_call();
        self.batch_updates.fetch_add(1, Ordering::SeqCst);
        *self.last_required_revision.lock().unwrap() = required_revision_id.map(str::to_string);

        let mut stored = self
            .documents
            .get_mut(document_id)
            .ok_or_else(|| Self::not_found("Document", document_id))?;

        if let Some(required) = required_revision_id {
            if required != stored.revision_id() {
                return Err(Self::bad_request(format!(
                    "The required revision ID '{}' does not match the latest revision.",
                    required
                )));
            }
        }

        let mut scratch = stored.text.clone();
        let mut replies = Vec::with_capacity(requests.len());
        for request in requests {
            replies.push(Self::apply(&mut scratch, request)?);
        }

        stored.text = scratch;
        stored.revision += 1;

        Ok(BatchUpdateResponse {
            document_id: document_id.to_string(),
            replies,
            write_control: Some(WriteControl {
                required_revision_id: Some(stored.revision_id()),
            }),
        })
    }

    async fn share_with_domain(
        &self,
        document_id: &str,
        domain: &str,
        role: &str,
    ) -> Result<(), DocsError> {
        self.record_call();
        let mut stored = self
            .documents
            .get_mut(document_id)
            .ok_or_else(|| Self::not_found("File", document_id))?;
        stored
            .permissions
            .push((domain.to_string(), role.to_string()));
        Ok(())
    }

    async fn list_comments(&self, document_id: &str) -> Result<Vec<Comment>, DocsError> {
        self.record_call();
        self.documents
            .get(document_id)
            .map(|stored| stored.comments.clone())
            .ok_or_else(|| Self::not_found("File", document_id))
    }

    async fn create_comment(
        &self,
        document_id: &str,
        content: &str,
        anchor: Option<&str>,
    ) -> Result<Comment, DocsError> {
        self.record_call();
        self.comment_creates.fetch_add(1, Ordering::SeqCst);
        *self.last_anchor.lock().unwrap() = anchor.map(str::to_string);

        let comment = Comment {
            id: self.next_id("comment"),
            content: content.to_string(),
            ..Default::default()
        };
        let mut stored = self
            .documents
            .get_mut(document_id)
            .ok_or_else(|| Self::not_found("File", document_id))?;
        stored.comments.push(comment.clone());
        Ok(comment)
    }

    async fn create_reply(
        &self,
        document_id: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<Reply, DocsError> {
        self.record_call();
        let reply = Reply {
            id: self.next_id("reply"),
            content: content.to_string(),
            ..Default::default()
        };
        let mut stored = self
            .documents
            .get_mut(document_id)
            .ok_or_else(|| Self::not_found("File", document_id))?;
        let comment = stored
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| Self::not_found("Comment", comment_id))?;
        comment.replies.push(reply.clone());
        Ok(reply)
    }

    async fn delete_reply(
        &self,
        document_id: &str,
        comment_id: &str,
        reply_id: &str,
    ) -> Result<(), DocsError> {
        self.record_call();
        let mut stored = self
            .documents
            .get_mut(document_id)
            .ok_or_else(|| Self::not_found("File", document_id))?;
        let comment = stored
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| Self::not_found("Comment", comment_id))?;
        let before = comment.replies.len();
        comment.replies.retain(|r| r.id != reply_id);
        if comment.replies.len() == before {
            return Err(Self::not_found("Reply", reply_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_all_respects_case_flag() {
        assert_eq!(
            replace_all("FOO foo", "foo", "BAR", false),
            ("BAR BAR".to_string(), 2)
        );
        assert_eq!(
            replace_all("FOO foo", "foo", "BAR", true),
            ("FOO BAR".to_string(), 1)
        );
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_document_untouched() {
        let backend = InMemoryDocsBackend::new();
        let doc = backend.create_document("t").await.unwrap();

        let result = backend
            .batch_update(
                &doc.document_id,
                &[
                    EditRequest::insert_text(1, "kept?"),
                    EditRequest::delete_content_range(1, 100),
                ],
                None,
            )
            .await;

        assert!(result.is_err());
        let after = backend.get_document(&doc.document_id).await.unwrap();
        assert_eq!(after.body_end_index(), 2);
        assert_eq!(after.revision_id, doc.revision_id);
    }

    #[tokio::test]
    async fn test_final_newline_cannot_be_deleted() {
        let backend = InMemoryDocsBackend::new();
        let doc = backend.create_document("t").await.unwrap();
        backend
            .batch_update(&doc.document_id, &[EditRequest::insert_text(1, "ab")], None)
            .await
            .unwrap();

        let result = backend
            .batch_update(
                &doc.document_id,
                &[EditRequest::delete_content_range(1, 4)],
                None,
            )
            .await;

        assert!(matches!(result, Err(DocsError::Api { status: 400, .. })));
    }
}

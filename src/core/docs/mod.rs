pub mod docs_models;
pub mod docs_service;
pub mod text_extraction;

pub use docs_models::{
    BatchUpdateResponse, Comment, CommentAnchor, Document, EditRequest, Reply, WriteControl,
};
pub use docs_service::{DocsBackend, DocsError, DocsService};

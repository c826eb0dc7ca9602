// =============================================================================
// GOOGLE DOCS MODULE
// =============================================================================
//
// Talks to Google on behalf of the core layer:
// - `google_auth.rs` turns the credentials/token files into bearer tokens
// - `google_docs_client.rs` implements `DocsBackend` over the Docs and Drive
//   REST APIs
// - `in_memory.rs` is a test double with the same batchUpdate semantics

pub mod google_auth;
pub mod google_docs_client;

#[cfg(test)]
pub mod in_memory;

pub use google_auth::GoogleAuth;
pub use google_docs_client::GoogleDocsClient;

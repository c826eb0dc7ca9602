// The infra module contains implementations of core traits.

#[path = "google_docs/mod.rs"]
pub mod google_docs;

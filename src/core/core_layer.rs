// The core module contains all domain logic.
// Nothing in here knows about HTTP or about the MCP wire format.

#[path = "docs/mod.rs"]
pub mod docs;

#[path = "tools/mod.rs"]
pub mod tools;

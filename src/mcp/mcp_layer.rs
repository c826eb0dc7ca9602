// MCP layer - the stdio adapter between MCP clients and the tool dispatcher.

#[path = "transport.rs"]
pub mod transport;

#[path = "server.rs"]
pub mod server;

pub use server::McpServer;

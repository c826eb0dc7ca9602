// This is the entry point of the Google Docs MCP server.
//
// **Architecture Overview:**
// - `core/` = Document/comment operations and the tool dispatcher (transport-agnostic)
// - `infra/` = Implementations of core traits (Google auth, Docs/Drive REST)
// - `mcp/` = MCP stdio adapter (JSON-RPC framing, tools/list, tools/call)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Serve MCP over stdin/stdout until the client hangs up

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "mcp/mcp_layer.rs"]
mod mcp;

mod config;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::config::Cli;
use crate::core::docs::DocsService;
use crate::core::tools::ToolDispatcher;
use crate::infra::google_docs::{GoogleAuth, GoogleDocsClient};
use crate::mcp::McpServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so clap's env fallbacks can see it
    dotenv::dotenv().ok();

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => Cli::command()
            .error(ErrorKind::MissingRequiredArgument, e)
            .exit(),
    };

    let auth = GoogleAuth::from_files(&config.creds_file_path, &config.token_path)
        .await
        .with_context(|| {
            format!(
                "Failed to load Google credentials from {}",
                config.creds_file_path.display()
            )
        })?;

    if let Some(share) = &config.share {
        tracing::info!(domain = %share.domain, role = %share.role, "New documents will be shared");
    }

    let client = GoogleDocsClient::new(auth).context("Failed to build Google API client")?;
    let docs = DocsService::new(client);
    let dispatcher = ToolDispatcher::new(docs).with_domain_share(config.share);
    let server = McpServer::new(dispatcher);

    tracing::info!(server = mcp::server::SERVER_NAME, "MCP server listening on stdio");
    server.run().await.context("MCP stdio transport failed")?;

    Ok(())
}

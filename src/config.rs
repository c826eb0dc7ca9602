// Command line / environment configuration.
//
// Every flag has an environment variable fallback, and `.env` is loaded before
// parsing so values can live there too.

use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

use crate::core::docs::docs_service::DEFAULT_SHARE_ROLE;
use crate::core::tools::tool_dispatcher::DomainShare;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "You must supply --creds-file-path and --token-path, or set GOOGLE_CREDS_FILE and \
         GOOGLE_TOKEN_FILE environment variables."
    )]
    MissingPaths,

    #[error("Cannot resolve relative path {path}: {source}")]
    ResolvePath {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Parser)]
#[command(name = "google-docs-mcp", version, about = "Google Docs API MCP Server")]
pub struct Cli {
    /// OAuth 2.0 credentials file path (or set GOOGLE_CREDS_FILE env variable)
    #[arg(long = "creds-file-path", alias = "creds_file_path", env = "GOOGLE_CREDS_FILE")]
    pub creds_file_path: Option<PathBuf>,

    /// File path to store/retrieve tokens (or set GOOGLE_TOKEN_FILE env variable)
    #[arg(long = "token-path", alias = "token_path", env = "GOOGLE_TOKEN_FILE")]
    pub token_path: Option<PathBuf>,

    /// Share newly created documents with this organisation domain
    #[arg(long, env = "GOOGLE_SHARE_DOMAIN")]
    pub share_domain: Option<String>,

    /// Role granted to the share domain
    #[arg(long, env = "GOOGLE_SHARE_ROLE", default_value = DEFAULT_SHARE_ROLE)]
    pub share_role: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub creds_file_path: PathBuf,
    pub token_path: PathBuf,
    pub share: Option<DomainShare>,
}

impl Cli {
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let (Some(creds), Some(token)) = (self.creds_file_path, self.token_path) else {
            return Err(ConfigError::MissingPaths);
        };

        let share = self
            .share_domain
            .filter(|d| !d.trim().is_empty())
            .map(|domain| DomainShare {
                domain,
                role: self.share_role,
            });

        Ok(Config {
            creds_file_path: absolute(&creds)?,
            token_path: absolute(&token)?,
            share,
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| ConfigError::ResolvePath {
            path: path.to_path_buf(),
            source,
        })
}

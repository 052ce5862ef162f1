use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] otpsync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Connection is not configured. Run `otpsync config test --base-url URL --api-key KEY` first."
    )]
    NotConfigured,
    #[error("No icon found for {0}")]
    IconNotFound(String),
    #[error("Site not found: {0}")]
    SiteNotFound(String),
    #[error("Position must be between 1 and {max}, got {given}")]
    InvalidPosition { given: usize, max: usize },
    #[error("Confirmation required; re-run with --yes")]
    ConfirmationRequired,
    #[error("Aborted")]
    Aborted,
}

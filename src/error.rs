//! Error types for commitcast modules using thiserror.

use thiserror::Error;

/// Errors from validating the run configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GIT_REPO_PATH environment variable is not set.")]
    MissingRepoPath,

    #[error("GIT_REPO_PATH '{0}' does not exist or is not a directory.")]
    RepoNotDirectory(String),

    #[error("GEMINI_API_KEY environment variable is not set. AI summarization will fail.")]
    MissingApiKey,

    #[error("Critical configuration error(s):\n- {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n- "))]
    Multiple(Vec<ConfigError>),
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to find branch '{0}': {1}")]
    BranchNotFound(String, #[source] git2::Error),

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to compute diff: {0}")]
    DiffFailed(#[source] git2::Error),
}

/// Errors from the text-generation endpoint.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Failed to reach text-generation endpoint: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Text-generation endpoint rejected the API key (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("Text-generation endpoint responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Text-generation endpoint returned invalid JSON: {0}")]
    InvalidResponse(String),

    #[error("Text-generation response contained no completion content")]
    MissingContent,
}

/// Errors from posting a chunk to the chat webhook.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to reach webhook: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Webhook responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Errors from composing or sending a failure email.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid email address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("Failed to build email: {0}")]
    Compose(#[source] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[source] lettre::transport::smtp::Error),
}

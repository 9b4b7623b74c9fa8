//! commitcast - A CLI tool that summarizes recent commits into a chat announcement.
//!
//! # Overview
//!
//! commitcast reads the commits of a git branch since a cutoff, asks an
//! OpenAI-compatible chat-completions endpoint to turn them into a user-facing
//! announcement (falling back to a plain commit list), splits the result into
//! chat-sized chunks, and posts them to a webhook. Unrecoverable failures are
//! reported by email.

pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod notify;
pub mod pipeline;
pub mod publish;
pub mod runlog;
pub mod summary;

// Re-export commonly used types
pub use config::{Config, Frequency, NotifyConfig};
pub use error::{ConfigError, GitError, LlmError, NotifyError, PublishError};
pub use git::CommitRecord;
pub use notify::{FailureNotifier, NotifyOutcome};
pub use pipeline::{Pipeline, RunReport};
pub use publish::{PublishOutcome, WebhookPublisher, segment};
pub use runlog::{MarkdownRunLog, MemoryRunLog, NullRunLog, RunLog};
pub use summary::{FallbackReason, Summary};

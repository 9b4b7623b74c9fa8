//! Announcement writing: AI-generated with a deterministic fallback.
//!
//! [`summarize`] never fails. Every problem on the AI path (no credential, no
//! commits, transport or response errors) routes to [`fallback::format_basic`],
//! and the returned [`Summary`] says which path produced the text.

pub mod context;
pub mod fallback;
pub mod prompt;

use std::fmt;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::config::Frequency;
use crate::git::CommitRecord;
use crate::llm::{CompletionRequest, TextGenerator};
use crate::runlog::RunLog;

pub use context::read_project_context;
pub use fallback::{NO_ACTIVITY, format_basic};
pub use prompt::{build_system_prompt, build_user_prompt, format_commits_for_prompt};

/// Why the deterministic formatter was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    NoCommits,
    MissingCredential,
    Generation(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoCommits => f.write_str("no new commits"),
            FallbackReason::MissingCredential => f.write_str("no API key configured"),
            FallbackReason::Generation(detail) => write!(f, "generation failed: {}", detail),
        }
    }
}

/// A summary message tagged with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Generated(String),
    Fallback { text: String, reason: FallbackReason },
}

impl Summary {
    pub fn text(&self) -> &str {
        match self {
            Summary::Generated(text) => text,
            Summary::Fallback { text, .. } => text,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Summary::Generated(_))
    }
}

/// Inputs to one summary.
pub struct SummaryInput<'a> {
    pub commits: &'a [CommitRecord],
    pub project_context: Option<&'a str>,
    pub frequency: Frequency,
    /// Date printed in the fallback header.
    pub today: NaiveDate,
}

/// Summarize commits, preferring the generator when one is available.
///
/// `generator` is `None` when no API key is configured.
pub async fn summarize(
    input: &SummaryInput<'_>,
    generator: Option<&dyn TextGenerator>,
    runlog: &dyn RunLog,
) -> Summary {
    if input.commits.is_empty() {
        runlog.record("AI Summarization Skipped", "No new commits found.");
        return Summary::Fallback {
            text: NO_ACTIVITY.to_string(),
            reason: FallbackReason::NoCommits,
        };
    }

    runlog.record(
        "Project Context Provided to AI",
        input.project_context.unwrap_or("None"),
    );

    let Some(generator) = generator else {
        warn!("No API key configured. Falling back to basic formatting.");
        runlog.record(
            "AI Summarization Skipped",
            "No API key configured. Falling back to basic formatting.",
        );
        return fallback(input, FallbackReason::MissingCredential);
    };

    let formatted = format_commits_for_prompt(input.commits);
    runlog.record("Formatted Commits & Diffs for User Prompt", &formatted);

    let request = CompletionRequest {
        system: build_system_prompt(input.project_context),
        user: build_user_prompt(&formatted, input.frequency),
    };
    runlog.record("System Prompt Sent to AI", &request.system);
    runlog.record("User Prompt Sent to AI", &request.user);

    info!(
        "Sending {} commits with diff summaries to the text-generation endpoint...",
        input.commits.len()
    );

    match generator.complete(&request).await {
        Ok(completion) => {
            runlog.record_block("Raw AI Response", "json", &completion.raw);
            runlog.record("Extracted AI Summary", &completion.content);
            info!("Received summary from the text-generation endpoint.");
            Summary::Generated(completion.content)
        }
        Err(e) => {
            error!("Text generation failed: {}", e);
            runlog.record("Error: AI Generation Failed", &e.to_string());
            warn!("Falling back to basic formatting.");
            fallback(input, FallbackReason::Generation(e.to_string()))
        }
    }
}

fn fallback(input: &SummaryInput<'_>, reason: FallbackReason) -> Summary {
    Summary::Fallback {
        text: format_basic(input.commits, input.today),
        reason,
    }
}

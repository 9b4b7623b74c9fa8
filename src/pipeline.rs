//! One summary run: read history, write the announcement, publish it.
//!
//! Each stage degrades instead of failing (empty batch, fallback text, partial
//! delivery); only I/O on the caller's output stream can abort the run.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::config::Config;
use crate::git::{CommitRecord, read_history};
use crate::llm::TextGenerator;
use crate::publish::{PublishOutcome, WebhookPublisher};
use crate::runlog::{RunLog, to_json};
use crate::summary::{Summary, SummaryInput, read_project_context, summarize};

/// What a run did.
#[derive(Debug)]
pub struct RunReport {
    pub cutoff: DateTime<Local>,
    pub commit_count: usize,
    pub summary: Summary,
    /// `None` when no webhook is configured and the summary was printed.
    pub publish: Option<PublishOutcome>,
}

/// Commit fields written to the run log.
#[derive(Serialize)]
struct CommitLogEntry<'a> {
    hexsha: &'a str,
    message: &'a str,
    author: &'a str,
    date: String,
    diff_summary: &'a str,
}

impl<'a> From<&'a CommitRecord> for CommitLogEntry<'a> {
    fn from(c: &'a CommitRecord) -> Self {
        Self {
            hexsha: &c.hash,
            message: c.message.trim(),
            author: &c.author,
            date: c.timestamp.to_rfc3339(),
            diff_summary: &c.diff_summary,
        }
    }
}

/// Collaborators for one run.
pub struct Pipeline<'a> {
    pub config: &'a Config,
    /// `None` when no API key is configured.
    pub generator: Option<&'a dyn TextGenerator>,
    /// `None` when no webhook is configured; the summary is printed instead.
    pub publisher: Option<&'a WebhookPublisher>,
    pub runlog: &'a dyn RunLog,
}

impl Pipeline<'_> {
    /// Run one pass over `repo_path` as of `now`, printing to `out` when unpublished.
    pub async fn run(
        &self,
        repo_path: &Path,
        now: DateTime<Local>,
        out: &mut dyn Write,
    ) -> Result<RunReport> {
        let frequency = self.config.frequency;
        let cutoff = frequency.cutoff_from(now);
        self.runlog.record("Calculated Start Date", &cutoff.to_rfc3339());
        info!(
            "Fetching commits since {} based on '{}' frequency.",
            cutoff.format("%Y-%m-%d"),
            frequency
        );

        let commits = read_history(repo_path, &self.config.branch, cutoff.with_timezone(&Utc));
        let log_entries: Vec<CommitLogEntry> = commits.iter().map(CommitLogEntry::from).collect();
        self.runlog
            .record_json("Fetched Commits Data (Summary)", &to_json(&log_entries));

        let project_context = self.load_project_context(repo_path);

        let input = SummaryInput {
            commits: &commits,
            project_context: project_context.as_deref(),
            frequency,
            today: now.date_naive(),
        };
        let summary = summarize(&input, self.generator, self.runlog).await;
        self.runlog
            .record("Final Summary Message (Before Sending)", summary.text());

        let publish = match self.publisher {
            Some(publisher) => {
                let outcome = publisher.publish(summary.text(), self.runlog).await;
                if let PublishOutcome::Partial { sent, total, error } = &outcome {
                    error!(
                        "Failed to send one or more message parts ({} of {} sent): {}",
                        sent, total, error
                    );
                    self.runlog.record(
                        "Webhook Sending Issue",
                        &format!("Sent {} of {} parts before failing: {}", sent, total, error),
                    );
                }
                Some(outcome)
            }
            None => {
                info!("Webhook URL not provided. Printing summary instead.");
                writeln!(out, "--- Summary Start ---")
                    .and_then(|_| writeln!(out, "{}", summary.text()))
                    .and_then(|_| writeln!(out, "--- Summary End ---"))
                    .context("Failed to print summary")?;
                self.runlog.record(
                    "Webhook Sending Skipped",
                    "Webhook URL not provided. Printed to stdout.",
                );
                None
            }
        };

        self.runlog.record("Run Finished Successfully", "------");
        info!("commitcast run finished.");

        Ok(RunReport {
            cutoff,
            commit_count: commits.len(),
            summary,
            publish,
        })
    }

    fn load_project_context(&self, repo_path: &Path) -> Option<String> {
        match read_project_context(repo_path) {
            Ok(Some(text)) => {
                info!("Read start of project README.md for context.");
                self.runlog
                    .record("Read README Context (First 1000 chars)", &text);
                Some(text)
            }
            Ok(None) => {
                info!("Project README.md not found. Proceeding without project context.");
                self.runlog.record("README Context", "README.md not found.");
                None
            }
            Err(e) => {
                error!("Error reading project README.md: {}", e);
                self.runlog.record("Error Reading README", &e.to_string());
                None
            }
        }
    }
}

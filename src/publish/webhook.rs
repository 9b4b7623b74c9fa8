//! Chat webhook delivery.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::PublishError;
use crate::runlog::{RunLog, to_json};

use super::segment::segment;

/// Hard per-message character limit of the chat service.
pub const CHAR_LIMIT: usize = 2000;

/// Room left in each chunk for the " (Part i/N)" suffix.
pub const SUFFIX_RESERVE: usize = 20;

/// Pause between consecutive chunk posts.
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(1500);

/// Result of publishing one message.
#[derive(Debug)]
pub enum PublishOutcome {
    /// Every chunk was accepted.
    Delivered { chunks: usize },
    /// `sent` chunks were accepted before `error` aborted the rest.
    Partial {
        sent: usize,
        total: usize,
        error: PublishError,
    },
    /// The message was empty after trimming; nothing was sent.
    Empty,
}

impl PublishOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, PublishOutcome::Delivered { .. })
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Posts messages to a chat webhook, one chunk at a time.
pub struct WebhookPublisher {
    http: Client,
    url: String,
    chunk_delay: Duration,
}

impl WebhookPublisher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            chunk_delay: DEFAULT_CHUNK_DELAY,
        }
    }

    /// Override the pause between chunks.
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Segment `message` and post each part in order.
    ///
    /// Stops at the first failed post; chunks already sent stay sent.
    pub async fn publish(&self, message: &str, runlog: &dyn RunLog) -> PublishOutcome {
        let chunks = segment(message, CHAR_LIMIT - SUFFIX_RESERVE);
        let total = chunks.len();
        runlog.record_json(
            &format!("Message Splitting (Into {} Chunks)", total),
            &to_json(&chunks),
        );

        if total == 0 {
            warn!("Attempted to send an empty or whitespace-only message.");
            runlog.record("Webhook Sending Skipped", "Attempted to send empty message.");
            return PublishOutcome::Empty;
        }

        for (i, chunk) in chunks.iter().enumerate() {
            let part = i + 1;
            let body = with_part_suffix(chunk, part, total);
            runlog.record(&format!("Sending Chunk {}/{} to Webhook", part, total), &body);

            if let Err(e) = self.post(&body).await {
                error!("Failed to send part {}/{} to webhook: {}", part, total, e);
                runlog.record(
                    &format!("Error Sending Chunk {}/{} to Webhook", part, total),
                    &e.to_string(),
                );
                return PublishOutcome::Partial {
                    sent: i,
                    total,
                    error: e,
                };
            }

            info!("Sent part {}/{} to webhook.", part, total);
            if part < total {
                tokio::time::sleep(self.chunk_delay).await;
            }
        }

        PublishOutcome::Delivered { chunks: total }
    }

    async fn post(&self, content: &str) -> Result<(), PublishError> {
        let response = self
            .http
            .post(&self.url)
            .json(&WebhookPayload { content })
            .send()
            .await
            .map_err(PublishError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(PublishError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Append " (Part i/N)" when there is more than one chunk, truncating the body
/// with "..." if the suffix would push it past [`CHAR_LIMIT`].
pub fn with_part_suffix(chunk: &str, part: usize, total: usize) -> String {
    if total <= 1 {
        return chunk.to_string();
    }

    let suffix = format!(" (Part {}/{})", part, total);
    let chunk_len = chunk.chars().count();
    let suffix_len = suffix.chars().count();

    if chunk_len + suffix_len > CHAR_LIMIT {
        let keep = CHAR_LIMIT.saturating_sub(suffix_len + 3);
        let truncated: String = chunk.chars().take(keep).collect();
        format!("{}...{}", truncated, suffix)
    } else {
        format!("{}{}", chunk, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk_has_no_suffix() {
        assert_eq!(with_part_suffix("hello", 1, 1), "hello");
    }

    #[test]
    fn test_suffix_appended() {
        assert_eq!(with_part_suffix("hello", 2, 3), "hello (Part 2/3)");
    }

    #[test]
    fn test_oversized_chunk_truncated_with_ellipsis() {
        let chunk = "a".repeat(1995);
        let out = with_part_suffix(&chunk, 1, 2);
        assert_eq!(out.chars().count(), CHAR_LIMIT);
        assert!(out.ends_with("... (Part 1/2)"));
    }

    #[test]
    fn test_reserved_chunk_fits_with_suffix() {
        let chunk = "a".repeat(CHAR_LIMIT - SUFFIX_RESERVE);
        let out = with_part_suffix(&chunk, 10, 99);
        assert!(out.chars().count() <= CHAR_LIMIT);
        assert!(!out.contains("..."));
    }
}

//! Deterministic plain-text summary used whenever AI generation is unavailable.

use chrono::NaiveDate;

use crate::git::CommitRecord;

/// Sentence used when a run found no commits.
pub const NO_ACTIVITY: &str = "No new commits found in the specified period.";

/// Format commits as a dated list. Never fails.
pub fn format_basic(commits: &[CommitRecord], date: NaiveDate) -> String {
    if commits.is_empty() {
        return NO_ACTIVITY.to_string();
    }

    let mut summary = format!("**Commit Summary ({})**\n\n", date.format("%Y-%m-%d"));
    summary.push_str(&format!("Found {} commits:\n", commits.len()));
    for commit in commits {
        summary.push_str(&format!(
            "- `{}`: {} (by {})\n",
            commit.short_hash(),
            commit.subject(),
            commit.author
        ));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn commit(hash: &str, author: &str, message: &str) -> CommitRecord {
        CommitRecord {
            hash: hash.to_string(),
            author: author.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
            diff_summary: String::new(),
        }
    }

    #[test]
    fn test_empty_batch_is_no_activity() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(format_basic(&[], date), NO_ACTIVITY);
    }

    #[test]
    fn test_basic_format() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let commits = vec![
            commit("abcdef0123", "Ada", "feat: add export\n\nbody text"),
            commit("9876543210", "Bob", "fix: crash on start"),
        ];

        assert_eq!(
            format_basic(&commits, date),
            "**Commit Summary (2024-01-02)**\n\n\
             Found 2 commits:\n\
             - `abcdef0`: feat: add export (by Ada)\n\
             - `9876543`: fix: crash on start (by Bob)\n"
        );
    }
}

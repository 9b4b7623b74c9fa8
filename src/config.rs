//! Run configuration.
//!
//! Every setting can come from a CLI flag or its environment variable (see
//! `main.rs`); the binary folds them into one [`Config`] that is passed to each
//! component explicitly.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone};
use tracing::warn;

use crate::error::ConfigError;

/// Default branch whose history is summarized.
pub const DEFAULT_BRANCH: &str = "main";

/// Default chat-completions model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default OpenAI-compatible API base (Gemini beta endpoint).
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Default SMTP submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// How far back each run looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Frequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// The period noun used in prompts ("changes from the last week").
    pub fn period(&self) -> &'static str {
        match self {
            Frequency::Daily => "day",
            Frequency::Weekly => "week",
            Frequency::Monthly => "month",
        }
    }

    /// Length of the lookback window. A month is approximated as 30 days.
    pub fn lookback(&self) -> Duration {
        match self {
            Frequency::Daily => Duration::days(1),
            Frequency::Weekly => Duration::weeks(1),
            Frequency::Monthly => Duration::days(30),
        }
    }

    /// Cutoff instant for a run starting at `now`.
    pub fn cutoff_from<Tz: TimeZone>(&self, now: DateTime<Tz>) -> DateTime<Tz> {
        now - self.lookback()
    }

    /// Parse a frequency, falling back to weekly with a warning on unknown values.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            warn!("Unknown frequency '{}', defaulting to weekly.", value);
            Frequency::Weekly
        })
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SMTP settings for failure notifications.
///
/// Does not derive Debug so the password never lands in a log line.
#[derive(Clone, Default)]
pub struct NotifyConfig {
    pub enabled: bool,
    pub server: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub sender: Option<String>,
    pub recipient: Option<String>,
}

impl NotifyConfig {
    /// Sender address, defaulting to the SMTP user.
    pub fn effective_sender(&self) -> Option<&str> {
        non_empty(self.sender.as_deref()).or_else(|| non_empty(self.user.as_deref()))
    }

    /// Names of the variables that are required for sending but unset.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if non_empty(self.server.as_deref()).is_none() {
            missing.push("SMTP_SERVER");
        }
        if self.port.is_none() {
            missing.push("SMTP_PORT");
        }
        if non_empty(self.user.as_deref()).is_none() {
            missing.push("SMTP_USER");
        }
        if non_empty(self.password.as_deref()).is_none() {
            missing.push("SMTP_PASSWORD");
        }
        if self.effective_sender().is_none() {
            missing.push("EMAIL_SENDER");
        }
        if non_empty(self.recipient.as_deref()).is_none() {
            missing.push("EMAIL_RECEIVER");
        }
        missing
    }
}

/// Parse the email enable flag. Only "true" (any case) enables.
pub fn parse_enable_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Everything one run needs.
#[derive(Clone)]
pub struct Config {
    pub repo_path: Option<PathBuf>,
    pub branch: String,
    pub webhook_url: Option<String>,
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub frequency: Frequency,
    pub log_dir: PathBuf,
    pub notify: NotifyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo_path: None,
            branch: DEFAULT_BRANCH.to_string(),
            webhook_url: None,
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            frequency: Frequency::Weekly,
            log_dir: PathBuf::from("logs"),
            notify: NotifyConfig::default(),
        }
    }
}

impl Config {
    /// Check the settings a run cannot start without.
    ///
    /// Returns the repository path on success. All problems are reported at
    /// once in [`ConfigError::Multiple`].
    pub fn validate(&self) -> Result<&Path, ConfigError> {
        let mut errors = Vec::new();

        let repo = match self.repo_path.as_deref() {
            Some(p) if p.as_os_str().is_empty() => {
                errors.push(ConfigError::MissingRepoPath);
                None
            }
            Some(p) if !p.is_dir() => {
                errors.push(ConfigError::RepoNotDirectory(p.display().to_string()));
                None
            }
            Some(p) => Some(p),
            None => {
                errors.push(ConfigError::MissingRepoPath);
                None
            }
        };

        if non_empty(self.api_key.as_deref()).is_none() {
            errors.push(ConfigError::MissingApiKey);
        }

        match repo {
            Some(path) if errors.is_empty() => Ok(path),
            _ => Err(ConfigError::Multiple(errors)),
        }
    }

    /// The webhook URL, ignoring empty values.
    pub fn webhook_url(&self) -> Option<&str> {
        non_empty(self.webhook_url.as_deref())
    }

    /// The API key, ignoring empty values.
    pub fn api_key(&self) -> Option<&str> {
        non_empty(self.api_key.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_cutoff_daily() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let cutoff = Frequency::Daily.cutoff_from(now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_cutoff_weekly() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let cutoff = Frequency::Weekly.cutoff_from(now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 3, 3, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_cutoff_monthly_is_thirty_days() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let cutoff = Frequency::Monthly.cutoff_from(now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 2, 9, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_unknown_frequency_defaults_to_weekly() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let frequency = Frequency::parse_lenient("fortnightly");
        assert_eq!(frequency, Frequency::Weekly);
        assert_eq!(frequency.cutoff_from(now), now - Duration::days(7));
    }

    #[test]
    fn test_frequency_parse_is_case_insensitive() {
        assert_eq!(Frequency::parse_lenient("DAILY"), Frequency::Daily);
        assert_eq!(Frequency::parse_lenient(" Monthly "), Frequency::Monthly);
    }

    #[test]
    fn test_enable_flag_only_true_enables() {
        assert!(parse_enable_flag(Some("true")));
        assert!(parse_enable_flag(Some("TRUE")));
        assert!(!parse_enable_flag(Some("yes")));
        assert!(!parse_enable_flag(Some("1")));
        assert!(!parse_enable_flag(None));
    }

    #[test]
    fn test_validate_reports_all_missing_settings() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::Multiple(vec![ConfigError::MissingRepoPath, ConfigError::MissingApiKey])
        );
        let text = err.to_string();
        assert!(text.starts_with("Critical configuration error(s):"));
        assert!(text.contains("GIT_REPO_PATH"));
        assert!(text.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_validate_rejects_missing_directory() {
        let config = Config {
            repo_path: Some(PathBuf::from("/definitely/not/a/real/dir")),
            api_key: Some("key".to_string()),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Multiple(ref errs) if matches!(errs[0], ConfigError::RepoNotDirectory(_))
        ));
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            repo_path: Some(dir.path().to_path_buf()),
            api_key: Some("key".to_string()),
            ..Config::default()
        };
        assert_eq!(config.validate().unwrap(), dir.path());
    }

    #[test]
    fn test_empty_api_key_counts_as_missing() {
        let config = Config {
            api_key: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_sender_defaults_to_user() {
        let notify = NotifyConfig {
            user: Some("bot@example.com".to_string()),
            ..NotifyConfig::default()
        };
        assert_eq!(notify.effective_sender(), Some("bot@example.com"));
    }

    #[test]
    fn test_missing_fields_lists_every_gap() {
        let notify = NotifyConfig {
            enabled: true,
            server: Some("smtp.example.com".to_string()),
            port: Some(587),
            ..NotifyConfig::default()
        };
        assert_eq!(
            notify.missing_fields(),
            vec!["SMTP_USER", "SMTP_PASSWORD", "EMAIL_SENDER", "EMAIL_RECEIVER"]
        );
    }
}

//! commitcast - CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use commitcast::config::{
    Config, DEFAULT_API_BASE, DEFAULT_BRANCH, DEFAULT_MODEL, Frequency, NotifyConfig,
    parse_enable_flag,
};
use commitcast::llm::{ChatCompletionsClient, TextGenerator};
use commitcast::notify::FailureNotifier;
use commitcast::pipeline::{Pipeline, RunReport};
use commitcast::publish::{PublishOutcome, WebhookPublisher};
use commitcast::runlog::{MarkdownRunLog, RunLog};
use commitcast::summary::Summary;

/// Summarize recent commits and post them to a chat webhook.
#[derive(Parser, Debug)]
#[command(name = "commitcast")]
#[command(about = "Summarize recent commits and post them to a chat webhook")]
#[command(version)]
struct Cli {
    /// Path to the git working copy
    #[arg(long = "repo", env = "GIT_REPO_PATH")]
    repo: Option<PathBuf>,

    /// Chat webhook URL (summary is printed when absent)
    #[arg(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    webhook_url: Option<String>,

    /// API key for the text-generation endpoint
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Lookback window: daily, weekly or monthly
    #[arg(long, env = "SUMMARY_FREQUENCY", default_value = "weekly")]
    frequency: String,

    /// Branch to read history from
    #[arg(long, env = "SUMMARY_BRANCH", default_value = DEFAULT_BRANCH)]
    branch: String,

    /// Model name sent to the text-generation endpoint
    #[arg(long, env = "SUMMARY_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of the OpenAI-compatible endpoint
    #[arg(long, env = "SUMMARY_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Directory for per-run markdown logs
    #[arg(long, env = "SUMMARY_LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// SMTP relay host for failure emails
    #[arg(long, env = "SMTP_SERVER")]
    smtp_server: Option<String>,

    /// SMTP relay port
    #[arg(long, env = "SMTP_PORT", default_value = "587")]
    smtp_port: String,

    /// SMTP login user
    #[arg(long, env = "SMTP_USER")]
    smtp_user: Option<String>,

    /// SMTP login password
    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    smtp_password: Option<String>,

    /// From address (defaults to the SMTP user)
    #[arg(long, env = "EMAIL_SENDER")]
    email_sender: Option<String>,

    /// Recipient of failure emails
    #[arg(long, env = "EMAIL_RECEIVER")]
    email_receiver: Option<String>,

    /// Send failure emails ("true" to enable)
    #[arg(long, env = "ENABLE_EMAIL_NOTIFICATION")]
    enable_email: Option<String>,
}

impl Cli {
    fn into_config(self) -> Config {
        let port = match self.smtp_port.trim().parse::<u16>() {
            Ok(port) => Some(port),
            Err(_) => {
                warn!("Invalid SMTP_PORT '{}'. Ignoring it.", self.smtp_port);
                None
            }
        };

        Config {
            repo_path: self.repo,
            branch: self.branch,
            webhook_url: self.webhook_url,
            api_key: self.api_key,
            api_base: self.api_base,
            model: self.model,
            frequency: Frequency::parse_lenient(&self.frequency),
            log_dir: self.log_dir,
            notify: NotifyConfig {
                enabled: parse_enable_flag(self.enable_email.as_deref()),
                server: self.smtp_server,
                port,
                user: self.smtp_user,
                password: self.smtp_password,
                sender: self.email_sender,
                recipient: self.email_receiver,
            },
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("commitcast=info"));
    // stdout carries the printed summary
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Some(e) = dotenv_problem(dotenv) {
        warn!("Failed to load .env file: {}", e);
    }

    let config = Cli::parse().into_config();
    let started = Local::now();
    let runlog = MarkdownRunLog::for_run(&config.log_dir, started);
    let notifier = FailureNotifier::new(config.notify.clone());

    run_to_exit(&config, &runlog, &notifier, started).await
}

/// A missing .env file is normal; anything else is worth reporting.
fn dotenv_problem<T>(result: dotenvy::Result<T>) -> Option<dotenvy::Error> {
    match result {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(e),
    }
}

/// Run once and map the result to the process exit code.
///
/// Errors reaching this point are logged, recorded and emailed.
async fn run_to_exit(
    config: &Config,
    runlog: &MarkdownRunLog,
    notifier: &FailureNotifier,
    started: DateTime<Local>,
) -> ExitCode {
    match execute(config, runlog, notifier, started).await {
        Ok(code) => code,
        Err(e) => {
            let details = format!(
                "Timestamp: {}\nError: {:#}\n\nError chain:\n{:?}",
                Local::now().to_rfc3339(),
                e,
                e
            );
            error!("CRITICAL ERROR during run: {:#}", e);
            runlog.record("CRITICAL RUN FAILURE", &details);
            notifier
                .notify(&format!("Critical Error: {}", e), &details, runlog)
                .await;
            ExitCode::FAILURE
        }
    }
}

async fn execute(
    config: &Config,
    runlog: &MarkdownRunLog,
    notifier: &FailureNotifier,
    started: DateTime<Local>,
) -> Result<ExitCode> {
    runlog.ensure_dir().with_context(|| {
        format!(
            "Failed to create log directory '{}'",
            config.log_dir.display()
        )
    })?;
    info!("Logging run details to: {}", runlog.path().display());
    runlog.record(
        "Run Started",
        &format!(
            "Timestamp: {}\nFrequency: {}\nBranch: {}",
            started.to_rfc3339(),
            config.frequency,
            config.branch
        ),
    );

    let repo_path = match config.validate() {
        Ok(path) => path,
        Err(e) => {
            error!("{}", e);
            runlog.record("Configuration Error", &e.to_string());
            notifier
                .notify("Configuration Error", &e.to_string(), runlog)
                .await;
            return Ok(ExitCode::FAILURE);
        }
    };
    info!("Repository: {}", repo_path.display());

    let client = config
        .api_key()
        .map(|key| ChatCompletionsClient::new(&config.api_base, key, &config.model));
    if let Some(client) = &client {
        info!("Using model {} at {}", client.model(), config.api_base);
    }
    let publisher = config.webhook_url().map(WebhookPublisher::new);

    let pipeline = Pipeline {
        config,
        generator: client.as_ref().map(|c| c as &dyn TextGenerator),
        publisher: publisher.as_ref(),
        runlog,
    };

    let mut stdout = std::io::stdout();
    let report = pipeline.run(repo_path, started, &mut stdout).await?;
    log_report(&report);

    Ok(ExitCode::SUCCESS)
}

fn log_report(report: &RunReport) {
    info!(
        "{} commit(s) since {}.",
        report.commit_count,
        report.cutoff.format("%Y-%m-%d %H:%M")
    );

    if let Summary::Fallback { reason, .. } = &report.summary {
        info!("Used fallback summary: {}", reason);
    }

    match &report.publish {
        Some(PublishOutcome::Delivered { chunks }) => {
            info!("Delivered summary in {} part(s).", chunks)
        }
        Some(PublishOutcome::Partial { sent, total, .. }) => {
            warn!("Summary only partially delivered ({}/{}).", sent, total)
        }
        Some(PublishOutcome::Empty) => warn!("Summary was empty; nothing posted."),
        None => {}
    }
}

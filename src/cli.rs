//! Command-line interface

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use crate::auth::{self, ConsoleCodeProvider, GmailHub};
use crate::client::{GmailClient, ProductionGmailClient};
use crate::config::{Config, MailboxConfig};
use crate::error::Result;
use crate::processor::{MessageProcessor, ProcessingStats};
use crate::scanner::list_all_matching;
use crate::summary::{summarize, RunSummary};
use crate::token_store::FileTokenRepository;

#[derive(Parser, Debug)]
#[command(name = "gmail-mark-read")]
#[command(version)]
#[command(about = "Mark every unread Gmail message as read", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Path to OAuth2 credentials file
    #[arg(long, default_value = "credentials.json")]
    pub credentials: PathBuf,

    /// Path to token cache file
    #[arg(long, default_value = "token.json")]
    pub token_cache: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Defaults to `run`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List unread messages, print them and mark them as read
    Run,

    /// Authenticate with Gmail API
    Auth {
        /// Force re-authentication even if token exists
        #[arg(long)]
        force: bool,
    },

    /// Generate example configuration file
    InitConfig {
        /// Path to create config file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Run)
    }
}

/// Outcome of a full run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub initial_unread: usize,
    pub stats: ProcessingStats,
    /// `None` when nothing was unread and the second listing was skipped
    pub summary: Option<RunSummary>,
}

impl Report {
    pub fn marked_read(&self) -> usize {
        self.stats.marked_read
    }
}

/// List, report and mark every matching message, then summarize
///
/// Listing failures (before or after processing) are returned as errors.
/// Per-message failures are logged and counted in [`ProcessingStats`].
pub async fn mark_all_read<C, W>(client: &C, mailbox: &MailboxConfig, out: &mut W) -> Result<Report>
where
    C: GmailClient + ?Sized,
    W: Write,
{
    let unread = list_all_matching(client, &mailbox.query, mailbox.page_size).await?;
    writeln!(out, "📩 Total unread emails: {}", unread.len())?;

    if unread.is_empty() {
        writeln!(out, "✅ No unread messages found.")?;
        return Ok(Report {
            initial_unread: 0,
            stats: ProcessingStats::default(),
            summary: None,
        });
    }

    let processor = MessageProcessor::new(client, mailbox.remove_label.as_str());
    let stats = processor.process_all(&unread, out).await?;
    info!(
        "Processed {} messages: {} marked, {} skipped, {} failed to mark",
        stats.processed, stats.marked_read, stats.skipped, stats.mark_failed
    );

    let summary = summarize(client, &mailbox.query, mailbox.page_size, stats.marked_read).await?;
    summary.write_to(out)?;

    Ok(Report {
        initial_unread: unread.len(),
        stats,
        summary: Some(summary),
    })
}

/// Authenticate using the CLI's credential and token paths
///
/// Prompts on the console when no cached token is usable.
pub async fn connect(cli: &Cli) -> Result<GmailHub> {
    auth::initialize_gmail_hub(
        &cli.credentials,
        Box::new(FileTokenRepository::new(&cli.token_cache)),
        Box::new(ConsoleCodeProvider),
    )
    .await
}

/// Authenticate, then run [`mark_all_read`] against stdout
pub async fn run_pipeline(cli: &Cli, config: &Config) -> Result<Report> {
    let hub = connect(cli).await?;
    let client = ProductionGmailClient::new(hub, config.mailbox.user_id.as_str());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    mark_all_read(&client, &config.mailbox, &mut out).await
}

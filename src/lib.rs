//! Gmail Mark-as-Read
//!
//! Lists every unread message in a Gmail mailbox, prints its subject and
//! received date, removes the `UNREAD` label, and reports how many messages
//! were marked and how many are still unread afterwards.
//!
//! # Example Usage
//!
//! ```no_run
//! use gmail_mark_read::{auth, cli, client::ProductionGmailClient, config::Config};
//! use gmail_mark_read::auth::ConsoleCodeProvider;
//! use gmail_mark_read::token_store::FileTokenRepository;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml".as_ref()).await?;
//!
//!     let hub = auth::initialize_gmail_hub(
//!         "credentials.json".as_ref(),
//!         Box::new(FileTokenRepository::new("token.json")),
//!         Box::new(ConsoleCodeProvider),
//!     )
//!     .await?;
//!
//!     let client = ProductionGmailClient::new(hub, "me");
//!     let report = cli::mark_all_read(&client, &config.mailbox, &mut std::io::stdout()).await?;
//!     println!("{} marked", report.marked_read());
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`auth`] - OAuth2 installed-app flow and Gmail hub construction
//! - [`token_store`] - Token cache abstraction and file/in-memory backends
//! - [`client`] - The three Gmail calls used: list page, get headers, remove label
//! - [`scanner`] - Paginated listing of all matching messages
//! - [`processor`] - Per-message fetch, report and mark-as-read
//! - [`summary`] - Post-run unread count and summary output
//! - [`cli`] - Command-line interface and pipeline orchestration
//! - [`config`] - Configuration management
//! - [`error`] - Error types and result aliases
//! - [`models`] - Core data structures

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod processor;
pub mod scanner;
pub mod summary;
pub mod token_store;

// Re-export commonly used types for convenience
pub use error::{GmailError, Result};

pub use models::{MessageHeader, MessageMetadata, MessagePage};

pub use auth::{CodeProvider, ConsoleCodeProvider};
pub use token_store::{FileTokenRepository, InMemoryTokenRepository, StoredToken, TokenRepository};

pub use client::{GmailClient, ProductionGmailClient};

pub use processor::{MessageOutcome, MessageProcessor, ProcessingStats};
pub use summary::RunSummary;

pub use config::{Config, MailboxConfig};

pub use cli::{Cli, Commands, Report};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::client::DEFAULT_USER_ID;
use crate::error::{GmailError, Result};
use crate::models::{UNREAD_LABEL, UNREAD_QUERY};
use crate::scanner::MAX_PAGE_SIZE;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub mailbox: MailboxConfig,
}

/// Which messages to list and which label to remove
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_query")]
    pub query: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_remove_label")]
    pub remove_label: String,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            query: default_query(),
            page_size: default_page_size(),
            remove_label: default_remove_label(),
        }
    }
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

fn default_query() -> String {
    UNREAD_QUERY.to_string()
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_remove_label() -> String {
    UNREAD_LABEL.to_string()
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        // If file doesn't exist, return default config with warning
        if !path.exists() {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GmailError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| GmailError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    GmailError::ConfigError(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| GmailError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| GmailError::ConfigError(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let mailbox = &self.mailbox;

        if mailbox.user_id.trim().is_empty() {
            return Err(GmailError::ConfigError(
                "mailbox.user_id cannot be empty".to_string(),
            ));
        }
        if mailbox.query.trim().is_empty() {
            return Err(GmailError::ConfigError(
                "mailbox.query cannot be empty".to_string(),
            ));
        }
        if mailbox.remove_label.trim().is_empty() {
            return Err(GmailError::ConfigError(
                "mailbox.remove_label cannot be empty".to_string(),
            ));
        }

        // Gmail caps messages.list at 500 results per page
        if mailbox.page_size == 0 {
            return Err(GmailError::ConfigError(
                "mailbox.page_size must be at least 1".to_string(),
            ));
        }
        if mailbox.page_size > MAX_PAGE_SIZE {
            return Err(GmailError::ConfigError(format!(
                "mailbox.page_size cannot exceed {}",
                MAX_PAGE_SIZE
            )));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Create an example configuration file
    pub async fn create_example(path: &Path) -> Result<()> {
        let config = Self::default();
        config.save(path).await
    }
}

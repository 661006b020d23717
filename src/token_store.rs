//! OAuth2 token persistence
//!
//! A [`TokenRepository`] holds exactly one token. [`RepositoryStorage`] plugs a
//! repository into yup-oauth2 so that the authenticator reads the cached token
//! on startup and writes back whatever it obtains or refreshes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use google_gmail1::yup_oauth2::storage::{TokenInfo, TokenStorage};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::error::{GmailError, Result};

/// Cached OAuth2 token as written to `token.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Convert a token handed out by the authenticator
    pub fn from_token_info(info: TokenInfo) -> Result<Self> {
        let access_token = info
            .access_token
            .ok_or_else(|| GmailError::AuthError("Token has no access token".to_string()))?;

        let expiry = info
            .expires_at
            .and_then(|at| DateTime::from_timestamp(at.unix_timestamp(), at.nanosecond()));

        Ok(Self {
            access_token,
            refresh_token: info.refresh_token,
            expiry,
        })
    }

    pub fn into_token_info(self) -> TokenInfo {
        TokenInfo {
            access_token: Some(self.access_token),
            refresh_token: self.refresh_token,
            expires_at: self
                .expiry
                .and_then(|at| time::OffsetDateTime::from_unix_timestamp(at.timestamp()).ok()),
            id_token: None,
        }
    }
}

/// Load/save interface for the single cached token
pub trait TokenRepository: Send + Sync {
    /// Read the cached token. Errors mean "no usable token".
    fn load(&self) -> Result<StoredToken>;

    /// Persist a token, replacing any previous one
    fn save(&self, token: &StoredToken) -> Result<()>;
}

/// Token cache backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileTokenRepository {
    path: PathBuf,
}

impl FileTokenRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenRepository for FileTokenRepository {
    fn load(&self) -> Result<StoredToken> {
        let content = std::fs::read_to_string(&self.path)?;
        let token = serde_json::from_str(&content)?;
        Ok(token)
    }

    fn save(&self, token: &StoredToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!("Saving token file: {}", self.path.display());
        let json = serde_json::to_string_pretty(token)?;
        write_owner_only(&self.path, json.as_bytes())
    }
}

/// Token cache that lives only as long as the process
#[derive(Debug, Default)]
pub struct InMemoryTokenRepository {
    token: Mutex<Option<StoredToken>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: StoredToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

impl TokenRepository for InMemoryTokenRepository {
    fn load(&self) -> Result<StoredToken> {
        self.token
            .lock()
            .map_err(|_| GmailError::AuthError("Token lock poisoned".to_string()))?
            .clone()
            .ok_or_else(|| GmailError::AuthError("No token stored".to_string()))
    }

    fn save(&self, token: &StoredToken) -> Result<()> {
        *self
            .token
            .lock()
            .map_err(|_| GmailError::AuthError("Token lock poisoned".to_string()))? =
            Some(token.clone());
        Ok(())
    }
}

/// Adapter exposing a [`TokenRepository`] as yup-oauth2 token storage
///
/// The repository holds a single token, so the requested scopes are ignored.
pub struct RepositoryStorage {
    repository: Box<dyn TokenRepository>,
}

impl RepositoryStorage {
    pub fn new(repository: Box<dyn TokenRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl TokenStorage for RepositoryStorage {
    async fn set(&self, _scopes: &[&str], token: TokenInfo) -> anyhow::Result<()> {
        let token = StoredToken::from_token_info(token)?;
        self.repository.save(&token)?;
        Ok(())
    }

    async fn get(&self, _scopes: &[&str]) -> Option<TokenInfo> {
        match self.repository.load() {
            Ok(token) => Some(token.into_token_info()),
            Err(e) => {
                debug!("No cached token available: {}", e);
                None
            }
        }
    }
}

/// Write `contents` to a file that is never readable by other users
///
/// New files are created with mode 0600. A file that already exists keeps its
/// mode across `open`, so it is tightened before anything is written.
fn write_owner_only(path: &Path, contents: &[u8]) -> Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    secure_token_file(path)?;
    file.write_all(contents)?;
    file.flush()?;
    Ok(())
}

/// Restrict the token file to owner read/write (0600)
#[cfg(unix)]
fn secure_token_file(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

/// Windows relies on ACLs; the file keeps its inherited permissions
#[cfg(not(unix))]
fn secure_token_file(_path: &Path) -> Result<()> {
    Ok(())
}

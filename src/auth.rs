//! OAuth2 authentication management for Gmail API

use async_trait::async_trait;
use google_gmail1::{hyper_rustls, hyper_util, yup_oauth2, Gmail};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use yup_oauth2::authenticator::Authenticator;
use yup_oauth2::authenticator_delegate::InstalledFlowDelegate;
use yup_oauth2::ApplicationSecret;

use crate::error::{GmailError, Result};
use crate::token_store::{RepositoryStorage, TokenRepository};

/// Read/write access without permanent deletion; enough to remove labels
pub const GMAIL_MODIFY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.modify";

/// Scopes requested during authorization
pub const REQUIRED_SCOPES: &[&str] = &[GMAIL_MODIFY_SCOPE];

/// HTTPS connector used by both the authenticator and the Gmail hub
pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;

/// Type alias for Gmail Hub to simplify type signatures
pub type GmailHub = Gmail<HttpsConnector>;

/// Authenticator bound to our token repository
pub type GmailAuthenticator = Authenticator<HttpsConnector>;

/// Source of the one-time authorization code for the installed-app flow
#[async_trait]
pub trait CodeProvider: Send + Sync {
    /// Show `url` to the user and return the code they obtained from it
    async fn authorization_code(&self, url: &str) -> Result<String>;
}

/// Prints the authorization URL and reads the code from stdin
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleCodeProvider;

#[async_trait]
impl CodeProvider for ConsoleCodeProvider {
    async fn authorization_code(&self, url: &str) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(format!("Open this link and authenticate: \n{}\n", url).as_bytes())
            .await?;
        stdout.write_all(b"Enter the code: ").await?;
        stdout.flush().await?;

        read_code(BufReader::new(tokio::io::stdin())).await
    }
}

/// Read a single line containing the authorization code
pub async fn read_code<R>(mut reader: R) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    let code = line.trim();
    if code.is_empty() {
        return Err(GmailError::AuthError(
            "No authorization code entered".to_string(),
        ));
    }
    Ok(code.to_string())
}

/// Bridges a [`CodeProvider`] into yup-oauth2's installed flow
pub struct CodeProviderDelegate {
    provider: Box<dyn CodeProvider>,
    redirect_uri: Option<String>,
}

impl CodeProviderDelegate {
    pub fn new(provider: Box<dyn CodeProvider>) -> Self {
        Self {
            provider,
            redirect_uri: None,
        }
    }

    /// Redirect URI placed in the authorization URL
    ///
    /// Without one the flow falls back to the out-of-band URI, which Google
    /// no longer accepts.
    pub fn with_redirect_uri(mut self, redirect_uri: Option<String>) -> Self {
        self.redirect_uri = redirect_uri;
        self
    }
}

impl InstalledFlowDelegate for CodeProviderDelegate {
    fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    fn present_user_url<'a>(
        &'a self,
        url: &'a str,
        need_code: bool,
    ) -> Pin<Box<dyn Future<Output = std::result::Result<String, String>> + Send + 'a>> {
        Box::pin(async move {
            if !need_code {
                tracing::info!("Open this link and authenticate: {}", url);
                return Ok(String::new());
            }
            self.provider
                .authorization_code(url)
                .await
                .map_err(|e| e.to_string())
        })
    }
}

/// Load OAuth2 application credentials (`credentials.json`)
///
/// Accepts Google's "installed" and "web" client formats.
pub async fn load_application_secret(credentials_path: &Path) -> Result<ApplicationSecret> {
    yup_oauth2::read_application_secret(credentials_path)
        .await
        .map_err(|e| {
            GmailError::AuthError(format!(
                "Failed to read credentials from {}: {}",
                credentials_path.display(),
                e
            ))
        })
}

/// Build an authenticator and make sure it holds a token for [`REQUIRED_SCOPES`]
///
/// A token already in `repository` is reused (and refreshed when expired).
/// Otherwise the authorization URL goes to `code_provider`, the returned code
/// is exchanged, and the new token is saved to `repository`. A failed exchange
/// or a failed save is returned as [`GmailError::AuthError`].
pub async fn authenticate(
    secret: ApplicationSecret,
    repository: Box<dyn TokenRepository>,
    code_provider: Box<dyn CodeProvider>,
) -> Result<GmailAuthenticator> {
    let delegate = CodeProviderDelegate::new(code_provider)
        .with_redirect_uri(secret.redirect_uris.first().cloned());

    let auth = yup_oauth2::InstalledFlowAuthenticator::builder(
        secret,
        yup_oauth2::InstalledFlowReturnMethod::Interactive,
    )
    .with_storage(Box::new(RepositoryStorage::new(repository)))
    .flow_delegate(Box::new(delegate))
    .build()
    .await
    .map_err(|e| GmailError::AuthError(format!("Failed to build authenticator: {}", e)))?;

    // Pre-authenticate so the token is cached before the first API call
    auth.token(REQUIRED_SCOPES)
        .await
        .map_err(|e| GmailError::AuthError(format!("Could not get token: {}", e)))?;

    Ok(auth)
}

/// Create the Gmail hub bound to `auth`
///
/// No request is sent here; token problems surface on the first API call.
pub fn build_hub(auth: GmailAuthenticator) -> Result<GmailHub> {
    // HTTP/1 works better with google-gmail1
    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()
                .map_err(|e| GmailError::AuthError(format!("Failed to load TLS roots: {}", e)))?
                .https_or_http()
                .enable_http1()
                .build(),
        );

    Ok(Gmail::new(client, auth))
}

/// Load credentials and token, then build the hub
pub async fn initialize_gmail_hub(
    credentials_path: &Path,
    repository: Box<dyn TokenRepository>,
    code_provider: Box<dyn CodeProvider>,
) -> Result<GmailHub> {
    let secret = load_application_secret(credentials_path).await?;
    let auth = authenticate(secret, repository, code_provider).await?;
    build_hub(auth)
}

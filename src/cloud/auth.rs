//! OAuth credential lifecycle for Google Drive
//!
//! Stored credentials go through one of three paths on every run:
//!
//! - no credential on disk: interactive authorization in the browser
//! - access token expired: refresh against the token endpoint
//! - still valid: reused as-is
//!
//! Whatever comes out is written back to the credential file.

use crate::error::{AppError, ErrorContext, Result};
use crate::logging::Logger;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};
use tiny_http::{Header, Response, Server, StatusCode};
use url::Url;
use uuid::Uuid;

/// Tokens this close to expiry are treated as expired
const EXPIRY_SKEW_SECS: i64 = 60;

/// Poll interval of the redirect listener
const CALLBACK_POLL_INTERVAL: StdDuration = StdDuration::from_millis(100);

fn default_token_uri() -> String {
    crate::defaults::OAUTH_TOKEN_URI.to_string()
}

fn default_auth_uri() -> String {
    crate::defaults::OAUTH_AUTH_URI.to_string()
}

/// Credential persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// `None` means the token carries no expiry and is always reused
    #[serde(default)]
    pub token_expiry: Option<DateTime<Utc>>,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl StoredCredential {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.token_expiry {
            Some(expiry) => expiry <= now + Duration::seconds(EXPIRY_SKEW_SECS),
            None => false,
        }
    }
}

/// Where a run starts from, decided by what is on disk
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Unauthenticated,
    Expired(StoredCredential),
    Valid(StoredCredential),
}

impl AuthState {
    pub fn classify(credential: Option<StoredCredential>, now: DateTime<Utc>) -> Self {
        match credential {
            None => Self::Unauthenticated,
            Some(credential) if credential.is_expired_at(now) => Self::Expired(credential),
            Some(credential) => Self::Valid(credential),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Expired(_) => "expired",
            Self::Valid(_) => "valid",
        }
    }
}

/// OAuth client registration ("installed application" secrets)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Load a `client_secrets.json` as downloaded from the Google console
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::auth(format!(
                "No stored credentials and client secrets '{}' could not be read: {}",
                path.display(),
                e
            ))
        })?;

        let file: ClientSecretsFile = serde_json::from_str(&content)
            .with_context(|| format!("Invalid client secrets file '{}'", path.display()))?;

        file.installed
            .or(file.web)
            .ok_or_else(|| AppError::auth(format!(
                "Client secrets '{}' has neither an 'installed' nor a 'web' section",
                path.display()
            )))
    }
}

/// File-backed credential storage
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no credential file exists yet
    pub fn load(&self) -> Result<Option<StoredCredential>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credentials '{}'", self.path.display()))?;

        let credential = serde_json::from_str(&content).map_err(|e| {
            AppError::auth(format!(
                "Stored credentials '{}' are unreadable ({}); delete the file to authorize again",
                self.path.display(),
                e
            ))
        })?;

        Ok(Some(credential))
    }

    pub fn save(&self, credential: &StoredCredential) -> Result<()> {
        let content = serde_json::to_string_pretty(credential)?;
        write_private(&self.path, content.as_bytes())
            .with_context(|| format!("Failed to save credentials '{}'", self.path.display()))
    }
}

/// Credential files are readable by the owner only
#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, content)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Client for the OAuth token endpoint
#[derive(Debug, Clone)]
pub struct TokenClient {
    client: Client,
}

impl TokenClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(format!("speedtest-logger/{}", crate::VERSION))
            .build()
            .map_err(|e| AppError::auth(format!("Failed to create OAuth client: {}", e)))?;

        Ok(Self { client })
    }

    /// Obtain a fresh access token using the stored refresh token
    pub async fn refresh(&self, credential: &StoredCredential) -> Result<StoredCredential> {
        let refresh_token = credential.refresh_token.as_deref().ok_or_else(|| {
            AppError::auth("Access token expired and no refresh token is stored; delete the credentials file to authorize again")
        })?;

        let response = self
            .request_token(
                &credential.token_uri,
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token),
                    ("client_id", &credential.client_id),
                    ("client_secret", &credential.client_secret),
                ],
            )
            .await?;

        Ok(StoredCredential {
            access_token: response.access_token,
            // Google usually omits the refresh token on refresh
            refresh_token: response.refresh_token.or_else(|| credential.refresh_token.clone()),
            token_expiry: expiry_from(response.expires_in),
            client_id: credential.client_id.clone(),
            client_secret: credential.client_secret.clone(),
            token_uri: credential.token_uri.clone(),
        })
    }

    /// Trade an authorization code for tokens
    pub async fn exchange_code(
        &self,
        secrets: &ClientSecrets,
        code: &str,
        redirect_uri: &str,
    ) -> Result<StoredCredential> {
        let response = self
            .request_token(
                &secrets.token_uri,
                &[
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", redirect_uri),
                    ("client_id", &secrets.client_id),
                    ("client_secret", &secrets.client_secret),
                ],
            )
            .await?;

        Ok(StoredCredential {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_expiry: expiry_from(response.expires_in),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            token_uri: secrets.token_uri.clone(),
        })
    }

    async fn request_token(&self, token_uri: &str, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .client
            .post(token_uri)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::auth(format!("Token request to {} failed: {}", token_uri, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::auth(format!("Failed to read token response: {}", e)))?;

        if !status.is_success() {
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => body.trim().to_string(),
            };
            return Err(AppError::auth(format!("Token endpoint returned {}: {}", status, detail)));
        }

        serde_json::from_str(&body)
            .map_err(|e| AppError::auth(format!("Unexpected token response: {}", e)))
    }
}

fn expiry_from(expires_in: Option<i64>) -> Option<DateTime<Utc>> {
    expires_in.map(|secs| Utc::now() + Duration::seconds(secs))
}

/// Way of obtaining a credential when none is stored
#[async_trait]
pub trait AuthorizationFlow: Send + Sync {
    async fn authorize(&self) -> Result<StoredCredential>;
}

/// Browser authorization with a loopback redirect listener
pub struct LocalWebserverFlow {
    secrets_path: PathBuf,
    ports: Vec<u16>,
    callback_timeout: StdDuration,
    token_client: TokenClient,
}

impl LocalWebserverFlow {
    pub fn new(secrets_path: impl Into<PathBuf>, token_client: TokenClient) -> Self {
        Self {
            secrets_path: secrets_path.into(),
            ports: crate::defaults::OAUTH_REDIRECT_PORTS.to_vec(),
            callback_timeout: StdDuration::from_secs(crate::defaults::OAUTH_CALLBACK_TIMEOUT_SECS),
            token_client,
        }
    }
}

#[async_trait]
impl AuthorizationFlow for LocalWebserverFlow {
    async fn authorize(&self) -> Result<StoredCredential> {
        let secrets = ClientSecrets::load(&self.secrets_path)?;
        let listener = RedirectListener::bind(&self.ports)?;
        let redirect_uri = format!("http://localhost:{}/", listener.port());
        let state = Uuid::new_v4().to_string();

        let auth_url = authorization_url(&secrets, &redirect_uri, &state)?;
        println!("Your browser needs to authorize access to Google Drive.");
        println!("Open the following link:\n\n    {}\n", auth_url);

        let code = listener.wait_for_code(&state, self.callback_timeout).await?;
        println!("Authentication successful.");

        self.token_client.exchange_code(&secrets, &code, &redirect_uri).await
    }
}

/// Consent page URL for the Drive scope
pub fn authorization_url(secrets: &ClientSecrets, redirect_uri: &str, state: &str) -> Result<Url> {
    Url::parse_with_params(
        &secrets.auth_uri,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", crate::defaults::DRIVE_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state),
        ],
    )
    .map_err(|e| AppError::auth(format!("Invalid auth URI '{}': {}", secrets.auth_uri, e)))
}

/// Interpret one redirect request target such as `/?code=abc&state=xyz`.
/// `Ok(None)` for unrelated requests (favicon and the like).
pub fn parse_callback(request_target: &str, expected_state: &str) -> Result<Option<String>> {
    let url = Url::parse("http://localhost")?.join(request_target)?;
    let mut code = None;
    let mut state = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => return Err(AppError::auth(format!("Authorization was denied: {}", value))),
            _ => {}
        }
    }

    match code {
        None => Ok(None),
        Some(_) if state.as_deref() != Some(expected_state) => {
            Err(AppError::auth("Authorization response state did not match the request"))
        }
        Some(code) => Ok(Some(code)),
    }
}

/// Loopback HTTP server receiving the authorization redirect.
///
/// Connections are read on tiny_http's worker threads, so a browser that
/// preconnects and stays idle does not hold up the real callback.
pub struct RedirectListener {
    server: Arc<Server>,
    port: u16,
}

impl RedirectListener {
    /// Bind the first free port from `ports`, then any free port
    pub fn bind(ports: &[u16]) -> Result<Self> {
        for &port in ports.iter().chain(std::iter::once(&0)) {
            let Ok(server) = Server::http(format!("127.0.0.1:{}", port)) else {
                continue;
            };
            let Some(addr) = server.server_addr().to_ip() else {
                continue;
            };
            return Ok(Self {
                server: Arc::new(server),
                port: addr.port(),
            });
        }
        Err(AppError::auth("Could not bind a local port for the authorization redirect"))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve redirect requests until one carries an authorization code or an error
    pub async fn wait_for_code(&self, expected_state: &str, timeout: StdDuration) -> Result<String> {
        let server = Arc::clone(&self.server);
        let expected_state = expected_state.to_string();

        tokio::task::spawn_blocking(move || serve_until_code(&server, &expected_state, timeout))
            .await
            .map_err(|e| AppError::internal(format!("Redirect listener task failed: {}", e)))?
    }
}

fn serve_until_code(server: &Server, expected_state: &str, timeout: StdDuration) -> Result<String> {
    let deadline = Instant::now() + timeout;

    while Instant::now() < deadline {
        let Some(request) = server.recv_timeout(CALLBACK_POLL_INTERVAL)? else {
            continue;
        };

        let outcome = parse_callback(request.url(), expected_state);
        let (status, body) = match &outcome {
            Ok(Some(_)) => (200, "Authentication complete. You may close this window."),
            Ok(None) => (404, "Not found."),
            Err(_) => (400, "Authentication failed. Check the terminal for details."),
        };

        let mut response = Response::from_string(body).with_status_code(StatusCode(status));
        if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..]) {
            response = response.with_header(header);
        }
        // The browser going away does not change the outcome
        let _ = request.respond(response);

        if let Some(code) = outcome? {
            return Ok(code);
        }
    }

    Err(AppError::auth(format!(
        "No authorization response within {} seconds",
        timeout.as_secs()
    )))
}

/// Runs the load → classify → obtain → save cycle
pub struct Authenticator {
    store: CredentialStore,
    token_client: TokenClient,
    flow: Box<dyn AuthorizationFlow>,
    logger: Logger,
}

impl Authenticator {
    pub fn new(
        store: CredentialStore,
        token_client: TokenClient,
        flow: Box<dyn AuthorizationFlow>,
        logger: Logger,
    ) -> Self {
        Self { store, token_client, flow, logger }
    }

    /// Return a usable credential, persisting it before returning
    pub async fn authenticate(&self) -> Result<StoredCredential> {
        let state = AuthState::classify(self.store.load()?, Utc::now());
        self.logger
            .debug("Loaded stored credentials")
            .field("state", state.name())
            .field("path", self.store.path().display().to_string())
            .log()
            .await;

        let credential = match state {
            AuthState::Unauthenticated => {
                self.logger.info("No stored credentials, starting authorization").log().await;
                self.flow.authorize().await?
            }
            AuthState::Expired(credential) => {
                self.logger.info("Access token expired, refreshing").log().await;
                self.token_client.refresh(&credential).await?
            }
            AuthState::Valid(credential) => credential,
        };

        self.store.save(&credential)?;
        Ok(credential)
    }
}

use super::api::{token_status_error, transport_error};
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sheetlink_core::error::{Result, StorageError};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME: SignedDuration = SignedDuration::from_hours(1);
/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN: SignedDuration = SignedDuration::from_secs(60);

/// Source of bearer tokens for the Sheets API.
#[async_trait]
pub trait TokenProvider: Send + Sync + 'static {
    /// Returns a bearer token valid for at least one request.
    async fn access_token(&self) -> Result<String>;
}

/// A pre-issued bearer token used as-is.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// Service-identity credentials, as found in a downloaded JSON key file.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Builds a key from individual values.
    ///
    /// Escaped `\n` sequences in `private_key` are turned into newlines, so a
    /// PEM squeezed into a single environment variable still parses.
    pub fn new(
        client_email: impl Into<String>,
        client_id: Option<String>,
        private_key: impl AsRef<str>,
    ) -> Self {
        Self {
            client_email: client_email.into(),
            client_id,
            private_key_id: None,
            private_key: private_key.as_ref().replace("\\n", "\n"),
            token_uri: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| StorageError::Configuration(format!("invalid service account key: {e}")))
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            StorageError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: Timestamp,
}

impl AccessToken {
    fn is_fresh(&self, now: Timestamp) -> bool {
        now + REFRESH_MARGIN < self.expires_at
    }
}

/// Exchanges a signed service-account assertion for an OAuth access token.
///
/// The token is cached for the lifetime of the provider and refreshed
/// lazily once it gets within a minute of expiry. Concurrent callers that
/// find the cache stale wait on the same refresh.
pub struct ServiceAccountTokenProvider {
    client: reqwest::Client,
    client_email: String,
    key_id: Option<String>,
    encoding_key: EncodingKey,
    token_uri: String,
    scope: String,
    cached: Mutex<Option<AccessToken>>,
}

impl ServiceAccountTokenProvider {
    /// Creates a provider for `key` requesting `scopes`.
    ///
    /// Fails if the private key is not a valid RSA PEM.
    pub fn new<I, S>(client: reqwest::Client, key: ServiceAccountKey, scopes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| StorageError::Configuration(format!("invalid private key: {e}")))?;
        let scope = scopes
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(Self {
            client,
            client_email: key.client_email,
            key_id: key.private_key_id,
            encoding_key,
            token_uri: key
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            scope,
            cached: Mutex::new(None),
        })
    }

    /// Overrides the token endpoint from the key file.
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }

    fn assertion(&self, now: Timestamp) -> Result<String> {
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.token_uri.clone(),
            iat: now.as_second(),
            exp: (now + ASSERTION_LIFETIME).as_second(),
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();

        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| StorageError::Configuration(format!("cannot sign assertion: {e}")))
    }

    async fn fetch(&self, now: Timestamp) -> Result<AccessToken> {
        let assertion = self.assertion(now)?;

        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(token_status_error(status, &body));
        }

        let token: TokenResponse = response.json().await.map_err(transport_error)?;
        debug!(
            client_email = %self.client_email,
            expires_in = token.expires_in,
            "obtained access token"
        );

        let expires_at = now
            .checked_add(SignedDuration::from_secs(token.expires_in))
            .map_err(|e| {
                StorageError::InvalidData(format!(
                    "token lifetime of {}s is out of range: {e}",
                    token.expires_in
                ))
            })?;

        Ok(AccessToken {
            token: token.access_token,
            expires_at,
        })
    }
}

impl std::fmt::Debug for ServiceAccountTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountTokenProvider")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Timestamp::now();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.token.clone());
        }

        let token = self.fetch(now).await?;
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }
}

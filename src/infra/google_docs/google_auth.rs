// =============================================================================
// GOOGLE OAUTH2 ACCESS TOKENS
// =============================================================================
//
// Produces bearer tokens for the Docs and Drive APIs from the two files the
// server is started with.
//
// **Credentials file formats:**
//
// 1. **Service account key** (`"type": "service_account"`):
//    A JWT signed with the account's private key is exchanged for a token.
//    The document must be shared with the service account email.
//
// 2. **OAuth client secrets** (`{"installed": {...}}` or `{"web": {...}}`):
//    The token file holds an authorised-user token with a refresh token, in
//    the layout written by Google's client libraries. Expired tokens are
//    refreshed and written back to the token file. Running the consent flow
//    to obtain the first refresh token is not done here.
//
// Tokens are cached in memory and refreshed a minute before they expire.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::core::docs::DocsError;

const SCOPES: &str = "https://www.googleapis.com/auth/documents https://www.googleapis.com/auth/drive";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Service account credentials from the JSON key file.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountCredentials {
    /// The service account email (used as issuer in JWT).
    client_email: String,

    /// The private key in PEM format.
    private_key: String,

    #[serde(default = "default_token_uri")]
    token_uri: String,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<OAuthClientSecrets>,
    web: Option<OAuthClientSecrets>,
}

#[derive(Debug, Clone, Deserialize)]
struct OAuthClientSecrets {
    client_id: String,
    client_secret: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

/// Authorised-user token as stored in the token file.
///
/// Unknown keys are carried through so rewriting the file after a refresh
/// does not drop anything another tool put there.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiry: Option<DateTime<Utc>>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// JWT claims for Google OAuth2.
#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// Response from Google's token endpoint.
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
enum CredentialSource {
    ServiceAccount(ServiceAccountCredentials),
    OAuthClient(OAuthClientSecrets),
}

/// Cached access token with expiration.
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at > Utc::now() + Duration::seconds(60)
    }
}

pub struct GoogleAuth {
    source: CredentialSource,
    token_path: PathBuf,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl GoogleAuth {
    /// Loads the credentials file. The token file is only read when a token
    /// is first needed.
    pub async fn from_files(creds_path: &Path, token_path: &Path) -> Result<Self, DocsError> {
        let content = tokio::fs::read_to_string(creds_path).await.map_err(|e| {
            DocsError::Auth(format!(
                "cannot read credentials file {}: {}",
                creds_path.display(),
                e
            ))
        })?;
        Self::from_credentials_json(&content, token_path)
    }

    pub fn from_credentials_json(json: &str, token_path: &Path) -> Result<Self, DocsError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| DocsError::Auth(format!("credentials file is not valid JSON: {}", e)))?;

        let source = if value.get("type").and_then(|t| t.as_str()) == Some("service_account") {
            let credentials: ServiceAccountCredentials = serde_json::from_value(value)
                .map_err(|e| DocsError::Auth(format!("invalid service account key: {}", e)))?;
            CredentialSource::ServiceAccount(credentials)
        } else {
            let secrets: ClientSecretsFile = serde_json::from_value(value)
                .map_err(|e| DocsError::Auth(format!("invalid OAuth client secrets: {}", e)))?;
            let client = secrets.installed.or(secrets.web).ok_or_else(|| {
                DocsError::Auth(
                    "credentials file is neither a service account key nor OAuth client secrets"
                        .to_string(),
                )
            })?;
            CredentialSource::OAuthClient(client)
        };

        Ok(Self {
            source,
            token_path: token_path.to_path_buf(),
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Auth that hands out `token` for a day without touching any file.
    #[cfg(test)]
    pub fn with_cached_token(token: &str) -> Self {
        Self {
            source: CredentialSource::OAuthClient(OAuthClientSecrets {
                client_id: "test-client".to_string(),
                client_secret: "test-secret".to_string(),
                token_uri: default_token_uri(),
            }),
            token_path: PathBuf::new(),
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(Some(CachedToken {
                token: token.to_string(),
                expires_at: Utc::now() + Duration::days(1),
            }))),
        }
    }

    /// Gets a valid access token, refreshing if necessary.
    pub async fn access_token(&self) -> Result<String, DocsError> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
                return Ok(token.token.clone());
            }
        }

        let new_token = match &self.source {
            CredentialSource::ServiceAccount(credentials) => {
                self.fetch_service_account_token(credentials).await?
            }
            CredentialSource::OAuthClient(secrets) => self.load_or_refresh_user_token(secrets).await?,
        };

        let token = new_token.token.clone();
        *self.cached_token.write().await = Some(new_token);
        Ok(token)
    }

    async fn fetch_service_account_token(
        &self,
        credentials: &ServiceAccountCredentials,
    ) -> Result<CachedToken, DocsError> {
        let now = Utc::now().timestamp();

        let claims = JwtClaims {
            iss: credentials.client_email.clone(),
            scope: SCOPES.to_string(),
            aud: credentials.token_uri.clone(),
            iat: now,
            exp: now + 3600,
        };

        let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
            .map_err(|e| DocsError::Auth(format!("invalid service account private key: {}", e)))?;
        let jwt = encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| DocsError::Auth(e.to_string()))?;

        tracing::debug!(account = %credentials.client_email, "Requesting service account token");
        let response = self
            .exchange(
                &credentials.token_uri,
                &[
                    ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                    ("assertion", jwt.as_str()),
                ],
            )
            .await?;

        Ok(CachedToken {
            token: response.access_token,
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
        })
    }

    async fn load_or_refresh_user_token(
        &self,
        secrets: &OAuthClientSecrets,
    ) -> Result<CachedToken, DocsError> {
        let mut stored = self.read_token_file().await?;

        if let (Some(token), Some(expiry)) = (&stored.token, stored.expiry) {
            let candidate = CachedToken {
                token: token.clone(),
                expires_at: expiry,
            };
            if candidate.is_fresh() {
                return Ok(candidate);
            }
        }

        let token_uri = stored
            .token_uri
            .clone()
            .unwrap_or_else(|| secrets.token_uri.clone());
        let client_id = stored
            .client_id
            .clone()
            .unwrap_or_else(|| secrets.client_id.clone());
        let client_secret = stored
            .client_secret
            .clone()
            .unwrap_or_else(|| secrets.client_secret.clone());

        tracing::info!("Refreshing OAuth access token");
        let response = self
            .exchange(
                &token_uri,
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", stored.refresh_token.as_str()),
                    ("client_id", client_id.as_str()),
                    ("client_secret", client_secret.as_str()),
                ],
            )
            .await?;

        let expires_at = Utc::now() + Duration::seconds(response.expires_in);
        stored.token = Some(response.access_token.clone());
        stored.expiry = Some(expires_at);
        if let Err(e) = self.write_token_file(&stored).await {
            // The token is still usable for this process.
            tracing::warn!("Failed to persist refreshed token: {}", e);
        }

        Ok(CachedToken {
            token: response.access_token,
            expires_at,
        })
    }

    async fn exchange(
        &self,
        token_uri: &str,
        form: &[(&str, &str)],
    ) -> Result<TokenResponse, DocsError> {
        let response = self
            .client
            .post(token_uri)
            .form(form)
            .send()
            .await
            .map_err(|e| DocsError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DocsError::Auth(format!(
                "token exchange failed ({}): {}",
                status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DocsError::Auth(format!("unexpected token response: {}", e)))
    }

    async fn read_token_file(&self) -> Result<StoredToken, DocsError> {
        let content = tokio::fs::read_to_string(&self.token_path)
            .await
            .map_err(|e| {
                DocsError::Auth(format!(
                    "cannot read token file {} ({}); authorise the OAuth client first",
                    self.token_path.display(),
                    e
                ))
            })?;
        serde_json::from_str(&content)
            .map_err(|e| DocsError::Auth(format!("invalid token file: {}", e)))
    }

    async fn write_token_file(&self, token: &StoredToken) -> Result<(), DocsError> {
        let json = serde_json::to_string_pretty(token)
            .map_err(|e| DocsError::Auth(e.to_string()))?;
        tokio::fs::write(&self.token_path, json)
            .await
            .map_err(|e| DocsError::Auth(e.to_string()))
    }
}

//! Process-wide cached access token with refresh-grant renewal.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::RwLock;

use super::tokens::{self, TokenCache};

/// Safety margin applied to expiry checks.
const EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Delegated permissions the agent needs on Graph.
const SCOPES: &[&str] = &[
    "OnlineMeetingTranscript.Read.All",
    "User.Read.All",
    "Tasks.ReadWrite",
    "Chat.ReadWrite",
    "offline_access",
];

/// Hands out valid Graph access tokens, refreshing the cached pair when it
/// nears expiry. Overlapping refreshes are tolerated; the second writer
/// simply overwrites with an equally valid token.
pub struct TokenProvider {
    http: reqwest::Client,
    client_id: String,
    tenant_id: String,
    token_path: PathBuf,
    cache: RwLock<Option<TokenCache>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Lifetime in seconds.
    expires_in: i64,
}

impl TokenProvider {
    /// Create a provider, seeding the in-memory cache from disk if a token
    /// file exists.
    pub fn new(client_id: String, tenant_id: String, token_path: PathBuf) -> Self {
        let cached = tokens::load_tokens(&token_path);
        if cached.is_none() {
            tracing::info!(
                "no token cache at {}, sign-in required before Graph calls succeed",
                token_path.display()
            );
        }
        Self {
            http: reqwest::Client::new(),
            client_id,
            tenant_id,
            token_path,
            cache: RwLock::new(cached),
        }
    }

    /// Return a currently valid access token, refreshing if necessary.
    pub async fn access_token(&self) -> anyhow::Result<String> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if !cached.is_expired(EXPIRY_BUFFER) {
                return Ok(cached.access_token.clone());
            }
        }

        let refresh_token = {
            let cache = self.cache.read().await;
            match cache.as_ref() {
                Some(c) if !c.refresh_token.is_empty() => c.refresh_token.clone(),
                _ => anyhow::bail!(
                    "no cached credentials; sign in and place the token pair at {}",
                    self.token_path.display()
                ),
            }
        };

        let renewed = self.refresh(&refresh_token).await?;
        let token = renewed.access_token.clone();

        if let Err(e) = tokens::save_tokens(&renewed, &self.token_path) {
            tracing::warn!("failed to persist refreshed tokens: {}", e);
        }
        *self.cache.write().await = Some(renewed);

        Ok(token)
    }

    /// Exchange a refresh token for a new token pair.
    async fn refresh(&self, refresh_token: &str) -> anyhow::Result<TokenCache> {
        let url = format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            self.tenant_id
        );
        let scope = SCOPES.join(" ");
        let params = [
            ("client_id", self.client_id.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("scope", scope.as_str()),
        ];

        let response = self.http.post(&url).form(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("token refresh failed with status {}: {}", status, body);
        }

        let parsed: TokenResponse = response.json().await?;
        let expires_at =
            chrono::Utc::now().timestamp_millis() + parsed.expires_in.saturating_mul(1000);

        tracing::debug!("access token refreshed, valid for {}s", parsed.expires_in);

        Ok(TokenCache {
            access_token: parsed.access_token,
            // The endpoint may rotate the refresh token; keep the old one
            // when it does not.
            refresh_token: parsed
                .refresh_token
                .unwrap_or_else(|| refresh_token.to_string()),
            expires_at,
        })
    }
}

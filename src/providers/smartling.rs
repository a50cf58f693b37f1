/*!
 * Smartling machine-translation client.
 *
 * Authentication tokens are cached process-wide and refreshed when fewer
 * than 30 seconds of validity remain. The cache sits behind an async mutex
 * held across the refresh call, so concurrent callers racing on an expired
 * token serialize into a single refresh; an expired token is never handed
 * out.
 */

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use url::Url;

use crate::app_config::SmartlingConfig;
use crate::errors::ProviderError;
use crate::providers::{MachineTranslator, TranslatedItem, TranslationItem};

/// Refresh the token when fewer than this many seconds remain.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Token lifetime assumed when the auth response omits `expiresIn`.
const DEFAULT_TOKEN_TTL_SECS: u64 = 480;

/// A cached bearer token with its absolute expiry.
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// Whether the token still has more than the refresh margin left.
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.saturating_duration_since(now) > TOKEN_EXPIRY_MARGIN
    }
}

/// Smartling client for the auth and MT router APIs
pub struct Smartling {
    /// HTTP client for API requests
    client: Client,
    /// API base URL
    base_url: String,
    /// Auth user identifier
    user_identifier: String,
    /// Auth user secret
    user_secret: String,
    /// Account uid for the MT endpoint path
    account_uid: String,
    /// Process-wide token cache; the mutex doubles as the refresh
    /// single-flight guard
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for Smartling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Credentials stay out of Debug output
        f.debug_struct("Smartling")
            .field("base_url", &self.base_url)
            .field("account_uid", &self.account_uid)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthRequest<'a> {
    user_identifier: &'a str,
    user_secret: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    response: AuthResponseBody,
}

#[derive(Deserialize)]
struct AuthResponseBody {
    data: Option<AuthData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthData {
    access_token: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MtRequest<'a> {
    source_locale_id: &'a str,
    target_locale_id: &'a str,
    items: &'a [TranslationItem],
}

#[derive(Deserialize)]
struct MtResponse {
    response: MtResponseBody,
}

#[derive(Deserialize)]
struct MtResponseBody {
    code: Option<String>,
    data: Option<MtData>,
}

#[derive(Deserialize)]
struct MtData {
    items: Option<Vec<TranslatedItem>>,
}

impl Smartling {
    /// Create a new Smartling client
    pub fn new(config: &SmartlingConfig, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_identifier: config.user_identifier.clone(),
            user_secret: config.user_secret.clone(),
            account_uid: config.account_uid.clone(),
            token: Mutex::new(None),
        }
    }

    /// Build the MT endpoint URL with the account uid as a percent-encoded
    /// path segment.
    fn mt_url(&self) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ProviderError::RequestFailed(format!(
                "Invalid Smartling base URL {}: {}",
                self.base_url, e
            ))
        })?;
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ProviderError::RequestFailed(format!(
                    "Smartling base URL cannot-be-a-base: {}",
                    self.base_url
                ))
            })?;
            segments.extend([
                "mt-router-api",
                "v2",
                "accounts",
                self.account_uid.as_str(),
                "smartling-mt",
            ]);
        }
        Ok(url)
    }

    /// Return a valid bearer token, refreshing the cache if needed.
    async fn bearer_token(&self) -> Result<String, ProviderError> {
        let mut cache = self.token.lock().await;

        if let Some(cached) = cache.as_ref() {
            if cached.is_fresh(Instant::now()) {
                return Ok(cached.access_token.clone());
            }
        }

        debug!("Refreshing Smartling auth token");
        let auth_url = format!("{}/auth-api/v2/authenticate", self.base_url);
        let response = self
            .client
            .post(&auth_url)
            .json(&AuthRequest {
                user_identifier: &self.user_identifier,
                user_secret: &self.user_secret,
            })
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Smartling auth request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Smartling auth error ({}): {}", status, error_text);
            return Err(ProviderError::AuthenticationError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Smartling auth response: {}", e)))?;

        let data = auth
            .response
            .data
            .ok_or_else(|| ProviderError::AuthenticationError("missing response data".to_string()))?;
        let access_token = match data.access_token {
            Some(token) if !token.is_empty() => token,
            _ => {
                return Err(ProviderError::AuthenticationError(
                    "missing accessToken".to_string(),
                ));
            }
        };
        let ttl = data.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        *cache = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(ttl),
        });
        Ok(access_token)
    }
}

#[async_trait]
impl MachineTranslator for Smartling {
    async fn translate(
        &self,
        source_locale_id: &str,
        target_locale_id: &str,
        items: &[TranslationItem],
    ) -> Result<Vec<TranslatedItem>, ProviderError> {
        let token = self.bearer_token().await?;

        let mt_url = self.mt_url()?;
        let response = self
            .client
            .post(mt_url)
            .bearer_auth(&token)
            .json(&MtRequest {
                source_locale_id,
                target_locale_id,
                items,
            })
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Smartling MT request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Smartling MT error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let mt: MtResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Smartling MT response: {}", e)))?;

        let code = mt.response.code.as_deref().unwrap_or("UNKNOWN");
        if code != "SUCCESS" {
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: format!("Smartling MT failed (code={})", code),
            });
        }

        Ok(mt.response.data.and_then(|d| d.items).unwrap_or_default())
    }
}

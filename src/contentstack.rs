/*!
 * CMS (Contentstack) collaborator client.
 *
 * Four fixed contracts: fetch the draft snapshot (management API), fetch
 * the published snapshot (delivery API, scoped to an environment), apply a
 * localized patch, and advance an entry's workflow stage. Every call
 * carries the client's fixed timeout; non-2xx responses surface as
 * [`AppError::Upstream`] with the upstream status, URL and a truncated
 * body.
 */

use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::{Client, RequestBuilder};
use serde_json::{Map, Value, json};
use url::Url;

use crate::app_config::ContentstackConfig;
use crate::errors::AppError;
use crate::text_utils::truncate_for_log;

/// Upstream error bodies are cut to this length before being embedded in
/// error responses.
const UPSTREAM_BODY_LIMIT: usize = 5000;

/// CMS collaborator contract used by the pipeline orchestrator
#[async_trait]
pub trait CmsClient: Send + Sync {
    /// Fetch the working-copy snapshot of an entry
    async fn fetch_draft_entry(
        &self,
        content_type_uid: &str,
        entry_uid: &str,
        locale: Option<&str>,
    ) -> Result<Value, AppError>;

    /// Fetch the live-environment snapshot of an entry
    async fn fetch_published_entry(
        &self,
        content_type_uid: &str,
        entry_uid: &str,
        locale: Option<&str>,
    ) -> Result<Value, AppError>;

    /// Apply a patch document to the entry for one locale
    async fn localize_entry(
        &self,
        content_type_uid: &str,
        entry_uid: &str,
        locale_code: &str,
        entry_patch: &Map<String, Value>,
    ) -> Result<Value, AppError>;

    /// Move the entry+locale to a workflow stage with an audit comment
    async fn set_workflow_stage(
        &self,
        content_type_uid: &str,
        entry_uid: &str,
        locale_code: &str,
        workflow_stage_uid: &str,
        comment: &str,
    ) -> Result<Value, AppError>;
}

/// Contentstack HTTP client
pub struct Contentstack {
    /// HTTP client for API requests
    client: Client,
    /// Management API base URL
    cma_base_url: String,
    /// Delivery API base URL
    cda_base_url: String,
    /// Stack API key
    api_key: String,
    /// Management token
    management_token: String,
    /// Delivery token
    delivery_token: String,
    /// Environment the published snapshot is read from
    environment: String,
}

impl Contentstack {
    /// Create a new Contentstack client
    pub fn new(config: &ContentstackConfig, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            cma_base_url: config.cma_base_url.clone(),
            cda_base_url: config.cda_base_url.clone(),
            api_key: config.api_key.clone(),
            management_token: config.management_token.clone(),
            delivery_token: config.delivery_token.clone(),
            environment: config.environment.clone(),
        }
    }

    /// Build `{base}/v3/content_types/{ct}/entries/{uid}[/...]` with
    /// percent-encoded path segments.
    fn entry_url(
        &self,
        base: &str,
        content_type_uid: &str,
        entry_uid: &str,
        trailing: Option<&str>,
    ) -> Result<Url, AppError> {
        let mut url = Url::parse(base)
            .map_err(|e| AppError::Config(format!("Invalid CMS base URL {}: {}", base, e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| AppError::Config(format!("CMS base URL cannot-be-a-base: {}", base)))?;
            segments.extend(["v3", "content_types", content_type_uid, "entries", entry_uid]);
            if let Some(extra) = trailing {
                segments.push(extra);
            }
        }
        Ok(url)
    }

    /// Execute a request and decode the JSON body, mapping any failure to
    /// [`AppError::Upstream`].
    async fn request_json(&self, request: RequestBuilder, url: &Url) -> Result<Value, AppError> {
        let response = request.send().await.map_err(|e| {
            let status = e.status().map(|s| s.as_u16()).unwrap_or(502);
            AppError::Upstream {
                status,
                url: url.to_string(),
                body: None,
                message: format!("Request error: {}", e),
            }
        })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            error!("Contentstack API error ({}) url={}", status, url);
            return Err(AppError::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
                body: Some(truncate_for_log(&text, UPSTREAM_BODY_LIMIT)),
                message: format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                ),
            });
        }

        if text.is_empty() {
            return Ok(json!({}));
        }
        serde_json::from_str(&text).map_err(|e| AppError::Upstream {
            status: 502,
            url: url.to_string(),
            body: Some(truncate_for_log(&text, UPSTREAM_BODY_LIMIT)),
            message: format!("Invalid JSON from upstream: {}", e),
        })
    }
}

#[async_trait]
impl CmsClient for Contentstack {
    async fn fetch_draft_entry(
        &self,
        content_type_uid: &str,
        entry_uid: &str,
        locale: Option<&str>,
    ) -> Result<Value, AppError> {
        let mut url = self.entry_url(&self.cma_base_url, content_type_uid, entry_uid, None)?;
        if let Some(locale) = locale {
            url.query_pairs_mut().append_pair("locale", locale);
        }

        let request = self
            .client
            .get(url.clone())
            .header("api_key", &self.api_key)
            .header("authorization", &self.management_token)
            .header("accept", "application/json");
        self.request_json(request, &url).await
    }

    async fn fetch_published_entry(
        &self,
        content_type_uid: &str,
        entry_uid: &str,
        locale: Option<&str>,
    ) -> Result<Value, AppError> {
        let mut url = self.entry_url(&self.cda_base_url, content_type_uid, entry_uid, None)?;
        url.query_pairs_mut()
            .append_pair("environment", &self.environment);
        if let Some(locale) = locale {
            url.query_pairs_mut().append_pair("locale", locale);
        }

        let request = self
            .client
            .get(url.clone())
            .header("api_key", &self.api_key)
            .header("access_token", &self.delivery_token)
            .header("accept", "application/json");
        self.request_json(request, &url).await
    }

    async fn localize_entry(
        &self,
        content_type_uid: &str,
        entry_uid: &str,
        locale_code: &str,
        entry_patch: &Map<String, Value>,
    ) -> Result<Value, AppError> {
        let mut url = self.entry_url(&self.cma_base_url, content_type_uid, entry_uid, None)?;
        url.query_pairs_mut().append_pair("locale", locale_code);

        let request = self
            .client
            .put(url.clone())
            .header("api_key", &self.api_key)
            .header("authorization", &self.management_token)
            .header("accept", "application/json")
            .json(&json!({ "entry": entry_patch }));
        self.request_json(request, &url).await
    }

    async fn set_workflow_stage(
        &self,
        content_type_uid: &str,
        entry_uid: &str,
        locale_code: &str,
        workflow_stage_uid: &str,
        comment: &str,
    ) -> Result<Value, AppError> {
        let mut url =
            self.entry_url(&self.cma_base_url, content_type_uid, entry_uid, Some("workflow"))?;
        url.query_pairs_mut().append_pair("locale", locale_code);

        let request = self
            .client
            .post(url.clone())
            .header("api_key", &self.api_key)
            .header("authorization", &self.management_token)
            .header("accept", "application/json")
            .json(&json!({
                "workflow": {
                    "workflow_stage": {
                        "comment": comment,
                        "uid": workflow_stage_uid,
                    }
                }
            }));
        self.request_json(request, &url).await
    }
}

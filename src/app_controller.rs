/*!
 * Pipeline orchestrator.
 *
 * Sequences one webhook notification end to end: validate, fetch draft and
 * published snapshots concurrently, redact and diff, then hand the changed
 * fields to a background task that translates and localizes each configured
 * target locale in turn. The webhook response is produced right after the
 * diff; translation work never blocks it.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::app_config::Config;
use crate::contentstack::{CmsClient, Contentstack};
use crate::entry_diff::{ChangedField, changed_field_maps, diff_leaf_values, redact_system_fields};
use crate::entry_patch::{build_entry_patch, collect_translatable};
use crate::errors::AppError;
use crate::locale_utils::{to_cms_locale_code, to_provider_locale_id};
use crate::providers::MachineTranslator;
use crate::providers::smartling::Smartling;
use crate::text_utils::{format_date_for_comment, truncate_for_log};
use crate::webhook::{WorkflowIds, extract_workflow_ids};

/// Locale assumed when the webhook does not carry one.
pub const DEFAULT_LOCALE: &str = "en-us";

/// Successful webhook response body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    /// Always true on success
    pub ok: bool,
    /// The notification was accepted
    pub received: bool,
    /// Identifiers extracted from the payload
    pub extracted: WorkflowIds,
    /// Locale the snapshots were fetched for
    pub locale: String,
    /// The diff, as single-entry `{path: value}` maps
    pub changed_fields: Vec<Map<String, Value>>,
}

/// Identifiers and context threaded through one entry's locale loop.
#[derive(Debug, Clone)]
pub struct EntryContext {
    /// Content type of the entry being localized
    pub content_type_uid: String,
    /// The entry being localized
    pub entry_uid: String,
    /// CMS locale the draft/published snapshots were fetched for
    pub cms_locale: String,
    /// Provider locale id the source text is in
    pub source_locale_id: String,
    /// Draft `_version` when the snapshot carried one
    pub draft_version: Option<u64>,
}

/// Main controller wiring the collaborators behind one webhook handler
#[derive(Clone)]
pub struct Controller {
    /// Service configuration
    config: Arc<Config>,
    /// CMS collaborator
    cms: Arc<dyn CmsClient>,
    /// Machine translation provider
    translator: Arc<dyn MachineTranslator>,
    /// Client for best-effort callback notifications
    http: Client,
}

impl Controller {
    /// Create a controller with production collaborators
    pub fn new(config: Config) -> Self {
        let timeout = Duration::from_millis(config.http_timeout_ms);
        let cms = Arc::new(Contentstack::new(&config.contentstack, timeout));
        let translator = Arc::new(Smartling::new(&config.smartling, timeout));
        Self::with_clients(config, cms, translator)
    }

    /// Create a controller with explicit collaborators (used by tests)
    pub fn with_clients(
        config: Config,
        cms: Arc<dyn CmsClient>,
        translator: Arc<dyn MachineTranslator>,
    ) -> Self {
        let timeout = Duration::from_millis(config.http_timeout_ms);
        Self {
            config: Arc::new(config),
            cms,
            translator,
            http: Client::builder().timeout(timeout).build().unwrap_or_default(),
        }
    }

    /// Service configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle one workflow webhook notification.
    ///
    /// Returns the response body to send back to the webhook caller. When
    /// the diff is non-empty and target locales are configured, the
    /// translation work continues in a background task after this returns.
    pub async fn handle_webhook(
        &self,
        request_id: u64,
        payload: &Value,
    ) -> Result<WebhookResponse, AppError> {
        let ids = extract_workflow_ids(payload).ok_or_else(|| {
            AppError::Validation("expected a workflow webhook with content-type and entry uids".to_string())
        })?;
        if ids.module != "workflow" {
            return Err(AppError::Validation(format!(
                "unsupported webhook module: {}",
                ids.module
            )));
        }

        info!(
            "[{}] workflow event={} contentTypeUid={} entryUid={}{}",
            request_id,
            ids.event,
            ids.content_type_uid,
            ids.entry_uid,
            ids.locale
                .as_deref()
                .map(|l| format!(" locale={}", l))
                .unwrap_or_default()
        );

        let locale = ids.locale.clone().unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        // Both snapshots are needed before diffing; either failing aborts
        // the request with the upstream status.
        let (draft_res, published_res) = futures::try_join!(
            self.cms
                .fetch_draft_entry(&ids.content_type_uid, &ids.entry_uid, Some(&locale)),
            self.cms
                .fetch_published_entry(&ids.content_type_uid, &ids.entry_uid, Some(&locale)),
        )?;

        let draft_raw = draft_res.get("entry").cloned().unwrap_or_else(|| json!({}));
        let published_raw = published_res.get("entry").cloned().unwrap_or_else(|| json!({}));
        debug!(
            "[{}] draft snapshot: {}",
            request_id,
            truncate_for_log(&draft_raw.to_string(), self.config.log_truncate_max)
        );
        debug!(
            "[{}] published snapshot: {}",
            request_id,
            truncate_for_log(&published_raw.to_string(), self.config.log_truncate_max)
        );

        // Version is bookkeeping and about to be redacted away; keep it for
        // the stage comment.
        let draft_version = draft_raw
            .get("_version")
            .or_else(|| draft_raw.get("version"))
            .and_then(Value::as_u64);

        let draft = redact_system_fields(&draft_raw);
        let published = redact_system_fields(&published_raw);

        let changes: Vec<ChangedField> = diff_leaf_values(Some(&published), Some(&draft))
            .into_iter()
            .filter(|change| !change.path.is_empty())
            .collect();
        let changed_fields = changed_field_maps(&changes);

        info!("[{}] diff changedFields={}", request_id, changes.len());
        debug!(
            "[{}] diff: {}",
            request_id,
            truncate_for_log(
                &serde_json::to_string(&changed_fields).unwrap_or_default(),
                self.config.log_truncate_max
            )
        );

        let targets = &self.config.smartling.target_locale_ids;
        if changes.is_empty() {
            info!("[{}] translation: diff empty (skipping)", request_id);
        } else if targets.is_empty() {
            info!("[{}] translation: no target locales configured (skipping)", request_id);
        } else {
            let source_locale_id = self
                .config
                .smartling
                .source_locale_id
                .clone()
                .unwrap_or_else(|| to_provider_locale_id(&locale));
            let ctx = EntryContext {
                content_type_uid: ids.content_type_uid.clone(),
                entry_uid: ids.entry_uid.clone(),
                cms_locale: locale.clone(),
                source_locale_id,
                draft_version,
            };
            let controller = self.clone();
            tokio::spawn(async move {
                controller.process_locales(request_id, ctx, changes).await;
            });
        }

        Ok(WebhookResponse {
            ok: true,
            received: true,
            extracted: ids,
            locale,
            changed_fields,
        })
    }

    /// Translate and localize the changed fields for every configured
    /// target locale, sequentially. One locale's failure is logged and the
    /// loop moves on; nothing here can fail the webhook response.
    pub async fn process_locales(
        &self,
        request_id: u64,
        ctx: EntryContext,
        changed_fields: Vec<ChangedField>,
    ) {
        let items = collect_translatable(&changed_fields);
        if items.is_empty() {
            info!(
                "[{}] translation: no translatable string changes (skipping)",
                request_id
            );
            return;
        }

        let targets = self.config.smartling.target_locale_ids.clone();
        info!(
            "[{}] translating {} strings to {} locales",
            request_id,
            items.len(),
            targets.len()
        );

        for target_locale_id in &targets {
            if let Err(e) = self
                .process_one_locale(request_id, &ctx, &changed_fields, target_locale_id)
                .await
            {
                error!(
                    "[{}] translation pipeline failed locale={} err={}",
                    request_id, target_locale_id, e
                );
            }
        }
    }

    /// One target locale: translate, patch, localize, advance workflow,
    /// notify the callback.
    async fn process_one_locale(
        &self,
        request_id: u64,
        ctx: &EntryContext,
        changed_fields: &[ChangedField],
        target_locale_id: &str,
    ) -> Result<(), AppError> {
        let items = collect_translatable(changed_fields);
        let translated = self
            .translator
            .translate(&ctx.source_locale_id, target_locale_id, &items)
            .await?;

        let translations: HashMap<String, String> = translated
            .into_iter()
            .map(|item| (item.key, item.translation_text))
            .collect();
        debug!(
            "[{}] translations locale={}: {}",
            request_id,
            target_locale_id,
            truncate_for_log(
                &serde_json::to_string(&translations).unwrap_or_default(),
                self.config.log_truncate_max
            )
        );

        let locale_code = to_cms_locale_code(target_locale_id);
        let entry_patch = build_entry_patch(changed_fields, &translations);
        if entry_patch.is_empty() {
            info!(
                "[{}] localize skipped locale={} reason=empty_entry_patch",
                request_id, locale_code
            );
            return Ok(());
        }

        let updated = self
            .cms
            .localize_entry(&ctx.content_type_uid, &ctx.entry_uid, &locale_code, &entry_patch)
            .await?;
        info!(
            "[{}] localized locale={}: {}",
            request_id,
            locale_code,
            truncate_for_log(&updated.to_string(), self.config.log_truncate_max)
        );

        let version = ctx
            .draft_version
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let comment = format!(
            "Translated from Smartling on {} from version {}",
            format_date_for_comment(),
            version
        );
        let stage_uid = &self.config.contentstack.review_stage_uid;
        info!(
            "[{}] workflow locale={} stage={} comment={:?}",
            request_id, locale_code, stage_uid, comment
        );
        self.cms
            .set_workflow_stage(&ctx.content_type_uid, &ctx.entry_uid, &locale_code, stage_uid, &comment)
            .await?;

        self.notify_callback(request_id, ctx, target_locale_id, &translations);
        Ok(())
    }

    /// Fire the optional callback notification as a detached task. Failure
    /// is logged and never propagates.
    fn notify_callback(
        &self,
        request_id: u64,
        ctx: &EntryContext,
        target_locale_id: &str,
        translations: &HashMap<String, String>,
    ) {
        let Some(callback_url) = self.config.smartling.callback_url.clone() else {
            return;
        };
        let payload = json!({
            "contentTypeUid": ctx.content_type_uid,
            "entryUid": ctx.entry_uid,
            "contentstackLocale": ctx.cms_locale,
            "draftVersion": ctx.draft_version,
            "sourceLocaleId": ctx.source_locale_id,
            "targetLocaleId": target_locale_id,
            "translations": translations,
        });
        let client = self.http.clone();
        tokio::spawn(async move {
            let result = client.post(&callback_url).json(&payload).send().await;
            match result {
                Ok(response) if !response.status().is_success() => error!(
                    "[{}] callback post failed url={} status={}",
                    request_id,
                    callback_url,
                    response.status()
                ),
                Err(e) => error!(
                    "[{}] callback post failed url={} err={}",
                    request_id, callback_url, e
                ),
                Ok(_) => {}
            }
        });
    }
}

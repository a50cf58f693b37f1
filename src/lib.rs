/*!
 * # stackling
 *
 * A webhook-triggered bridge between a Contentstack stack and Smartling
 * machine translation. When an entry moves through the editorial workflow,
 * the service diffs the draft against the published version, sends the
 * changed strings to Smartling for each configured target locale, writes
 * the translations back as localized entries, and advances the review
 * workflow stage.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Environment-driven configuration
 * - `entry_diff`: System-field redaction and the structural leaf diff
 * - `entry_patch`: Translation request building and nested patch assembly
 * - `webhook`: Inbound workflow payload extraction
 * - `contentstack`: CMS collaborator client (fetch, localize, workflow)
 * - `providers`: Machine translation clients:
 *   - `providers::smartling`: Smartling MT router API with token caching
 *   - `providers::mock`: Deterministic translator for tests
 * - `app_controller`: The pipeline orchestrator
 * - `server`: HTTP listener (webhook, health check, provider callback)
 * - `locale_utils`: CMS/provider locale id conversion
 * - `text_utils`: Log truncation, header redaction, JSON helpers
 * - `errors`: Custom error types for the service
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod contentstack;
pub mod entry_diff;
pub mod entry_patch;
pub mod errors;
pub mod locale_utils;
pub mod providers;
pub mod server;
pub mod text_utils;
pub mod webhook;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, WebhookResponse};
pub use entry_diff::{ChangedField, diff_leaf_values, redact_system_fields};
pub use entry_patch::{build_entry_patch, collect_translatable};
pub use errors::{AppError, ProviderError};
pub use webhook::{WorkflowIds, extract_workflow_ids};

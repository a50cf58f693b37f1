/*!
 * Inbound webhook payload extraction.
 *
 * The CMS posts a workflow event whose interesting identifiers live under
 * `data.workflow`. Extraction is tolerant of extra fields but strict about
 * the two identifiers the pipeline cannot run without: the content-type uid
 * and the entry uid.
 */

use serde::Serialize;
use serde_json::Value;

use crate::text_utils::{as_non_empty_str, get_path};

/// Identifiers extracted from a workflow webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowIds {
    /// Webhook module; only `workflow` events are processed
    pub module: String,
    /// Event name, defaults to `update`
    pub event: String,
    /// Content type of the affected entry
    pub content_type_uid: String,
    /// The affected entry
    pub entry_uid: String,
    /// Locale the workflow event fired for, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Display name of the workflow stage the entry moved to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_stage_name: Option<String>,
    /// Uid of the workflow stage the entry moved to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_stage_uid: Option<String>,
}

/// Pull the workflow identifiers out of a webhook payload.
///
/// Returns `None` when the content-type uid or entry uid is missing, which
/// callers must treat as an unsupported payload.
pub fn extract_workflow_ids(payload: &Value) -> Option<WorkflowIds> {
    let content_type_uid =
        as_non_empty_str(get_path(payload, &["data", "workflow", "content_type", "uid"]))?;
    let entry_uid = as_non_empty_str(get_path(payload, &["data", "workflow", "entry", "uid"]))?;

    Some(WorkflowIds {
        module: as_non_empty_str(payload.get("module")).unwrap_or_else(|| "workflow".to_string()),
        event: as_non_empty_str(payload.get("event")).unwrap_or_else(|| "update".to_string()),
        content_type_uid,
        entry_uid,
        locale: as_non_empty_str(get_path(payload, &["data", "workflow", "locale", "code"])),
        workflow_stage_name: as_non_empty_str(get_path(payload, &["data", "workflow", "log", "name"])),
        workflow_stage_uid: as_non_empty_str(get_path(payload, &["data", "workflow", "log", "uid"])),
    })
}

//! Outbound payload sanitation.
//!
//! Objects read back from the API carry server-managed fields (ids,
//! timestamps, creator info, permission flags, layout metadata). Echoing them
//! in a write makes the server reject or misread it, so they are stripped
//! before transmission.

use serde_json::Value;

/// Server-managed keys removed from outbound payloads at every depth.
pub const DENY_LIST: &[&str] = &[
    "TEXT",
    "MEDIA",
    "LAYOUT",
    "REPORTS",
    "dashboard_id",
    "last_modified_by_name",
    "last_modified_by_id",
    "last_modified_by_email",
    "id",
    "is_private",
    "creator",
    "creator_id",
    "creator_name",
    "creator_email",
    "is_restricted",
    "modified",
    "is_favorited",
    "pinned_date",
    "generation_type",
    "layout_version",
    "can_see_grid_chameleon",
    "can_update_basic",
    "can_view",
    "allow_staff_override",
    "is_superadmin",
    "can_share",
    "can_pin_dashboards",
    "can_update_restricted",
    "can_update_visibility",
    "created",
    "project_id",
    "workspace_id",
    "original_type",
    "include_in_dashboard",
    "is_default",
    "metadata",
    "dashboard",
    "is_visibility_restricted",
    "is_modification_restricted",
    "count",
    "created_by",
    "data_group_id",
    "last_edited",
    "last_queried",
    "referenced_by",
    "referenced_directly_by",
    "active_integrations",
    "user",
    "customPropertyId",
    "canUpdateBasic",
    "referencedBy",
    "referencedDirectlyBy",
    "referencedRawEventProperties",
    "project",
    "is_shared_with_project",
    "template_type",
];

/// Strip every [`DENY_LIST`] key from `payload`, recursing into nested
/// objects and arrays.
pub fn sanitize_payload(payload: &mut Value) {
    match payload {
        Value::Object(map) => {
            map.retain(|key, _| !DENY_LIST.contains(&key.as_str()));
            for value in map.values_mut() {
                sanitize_payload(value);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(sanitize_payload),
        _ => {}
    }
}

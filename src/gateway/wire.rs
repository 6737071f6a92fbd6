//! Wire record normalization
//!
//! The backend keys records by `_id` and may ship foreign keys either as
//! bare id strings or as embedded objects keyed by `_id`. Every
//! ingestion path funnels through [`normalize_record`] so the cache only
//! ever sees `id` plus bare foreign keys with the embedded object moved
//! to its snapshot field.

use serde_json::Value;

/// Foreign-key field → embedded snapshot field
const FK_FIELDS: &[(&str, &str)] = &[
    ("company_id", "company"),
    ("contact_id", "contact"),
    ("opportunity_id", "opportunity"),
];

/// Fields the client must never send on create/update
const SERVER_FIELDS: &[&str] = &[
    "id",
    "_id",
    "created_at",
    "updated_at",
    "company",
    "contact",
    "opportunity",
];

/// Normalize a wire record in place: `_id` becomes `id`, and embedded
/// foreign-key objects are split into bare id + snapshot. Embedded
/// objects are normalized recursively (an embedded contact may itself
/// embed its company).
pub fn normalize_record(value: &mut Value) {
    let Some(map) = value.as_object_mut() else {
        return;
    };

    if let Some(wire_id) = map.remove("_id") {
        map.insert("id".to_string(), wire_id);
    }

    for (fk, embed) in FK_FIELDS {
        if !map.get(*fk).map(Value::is_object).unwrap_or(false) {
            continue;
        }
        if let Some(mut embedded) = map.remove(*fk) {
            normalize_record(&mut embedded);
            let bare_id = embedded.get("id").cloned().unwrap_or(Value::Null);
            map.insert(fk.to_string(), bare_id);
            map.insert(embed.to_string(), embedded);
        }
    }
}

/// Strip identity, timestamps and denormalized snapshots from a draft
/// before it goes to the gateway.
pub fn strip_server_fields(value: &mut Value) {
    if let Some(map) = value.as_object_mut() {
        for field in SERVER_FIELDS {
            map.remove(*field);
        }
    }
}

/// Shallow-merge `patch`'s keys onto `target` (both must be objects for
/// anything to happen). Mirrors how the backend applies partial updates.
pub fn merge_shallow(target: &mut Value, patch: &Value) {
    if let (Some(target_map), Some(patch_map)) = (target.as_object_mut(), patch.as_object()) {
        for (k, v) in patch_map {
            target_map.insert(k.clone(), v.clone());
        }
    }
}

//! Shared test utilities for the nsguard workspace.
//!
//! Kept as a regular crate (not `#[cfg(test)]` code) so integration tests in several crates
//! and the fuzz harness can share it.

use camino::Utf8PathBuf;
use serde_json::Value;

/// Placeholder written over machine-specific values.
pub const VERSION_PLACEHOLDER: &str = "__VERSION__";
pub const TIMESTAMP_PLACEHOLDER: &str = "__TIMESTAMP__";
pub const CONFIG_LOCATION_PLACEHOLDER: &str = "__CONFIG_LOCATION__";

/// Normalize non-deterministic JSON fields for golden-file comparison.
///
/// 1. **Root-only**: when the root object is a report envelope (has `schema`, `tool`,
///    `status`, `issues`, and `data`), `tool.version` and `data.config_location` are
///    replaced. Nested objects of the same shape inside issue payloads are left alone.
///
/// 2. **Recursive**: `started_at` and `finished_at` are replaced at any depth.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_envelope = ["schema", "tool", "status", "issues", "data"]
            .iter()
            .all(|k| obj.contains_key(*k));
        if is_envelope {
            if let Some(tool) = obj.get_mut("tool").and_then(Value::as_object_mut)
                && tool.contains_key("version")
            {
                tool.insert(
                    "version".to_string(),
                    Value::String(VERSION_PLACEHOLDER.to_string()),
                );
            }
            if let Some(data) = obj.get_mut("data").and_then(Value::as_object_mut)
                && data.contains_key("config_location")
            {
                data.insert(
                    "config_location".to_string(),
                    Value::String(CONFIG_LOCATION_PLACEHOLDER.to_string()),
                );
            }
        }
    }
    normalize_timestamps_recursive(&mut value);
    value
}

fn normalize_timestamps_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in ["started_at", "finished_at"] {
                if map.contains_key(key) {
                    map.insert(
                        key.to_string(),
                        Value::String(TIMESTAMP_PLACEHOLDER.to_string()),
                    );
                }
            }
            for val in map.values_mut() {
                normalize_timestamps_recursive(val);
            }
        }
        Value::Array(arr) => {
            for val in arr.iter_mut() {
                normalize_timestamps_recursive(val);
            }
        }
        _ => {}
    }
}

/// Repo root `tests/fixtures`, resolved from a crate's `CARGO_MANIFEST_DIR`.
pub fn fixtures_dir(manifest_dir: &str) -> Utf8PathBuf {
    let crate_dir = Utf8PathBuf::from(manifest_dir);
    // crates/<name> -> crates -> repo root
    crate_dir
        .parent()
        .and_then(|p| p.parent())
        .map(|root| root.join("tests").join("fixtures"))
        .unwrap_or_else(|| crate_dir.join("tests").join("fixtures"))
}

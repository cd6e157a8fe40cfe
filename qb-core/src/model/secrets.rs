use serde_json as json;

use crate::jsonutils;

// Replaces every secret value with a placeholder derived from a hash of the
// value, so diffs reveal whether a secret changed without revealing contents.
// Equal values map to equal placeholders across both sides of a diff.
pub fn hide_secrets(doc: &mut json::Value) {
    let is_secret = doc.get("apiVersion").and_then(|v| v.as_str()) == Some("v1")
        && doc.get("kind").and_then(|v| v.as_str()) == Some("Secret");
    if !is_secret {
        return;
    }

    for section in ["data", "stringData"] {
        if let Some(values) = doc.get_mut(section).and_then(|d| d.as_object_mut()) {
            for (_, v) in values.iter_mut() {
                *v = json::Value::String(format!("redacted.{:016x}", jsonutils::hash(v)));
            }
        }
    }
}

use serde_json::{
    Map,
    Value,
};

// Computes the RFC 7386 merge patch that transforms `orig` into `target`.
// Applying the result with json_patch::merge recovers `target` exactly, with
// one standard caveat: arrays are replaced wholesale, never spliced.  Keys
// present in `orig` but absent from `target` become explicit nulls so the
// patch carries deletions, which is the whole point of diffing against the
// pristine version instead of just sending the local object.
pub fn diff(orig: &Value, target: &Value) -> Value {
    match (orig, target) {
        (Value::Object(o), Value::Object(t)) => {
            let mut patch = Map::new();
            for (k, tv) in t {
                match o.get(k) {
                    Some(ov) if ov == tv => (),
                    Some(ov) => {
                        patch.insert(k.clone(), diff(ov, tv));
                    },
                    None => {
                        patch.insert(k.clone(), tv.clone());
                    },
                }
            }
            for k in o.keys() {
                if !t.contains_key(k) {
                    patch.insert(k.clone(), Value::Null);
                }
            }
            Value::Object(patch)
        },
        _ => target.clone(),
    }
}

use std::fmt;
use std::io::{
    Read,
    Write,
};

use base64::prelude::*;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde_json as json;
use tracing::*;

use super::ModelError;
use crate::constants::*;
use crate::errors::*;
use crate::k8s::strip_runtime_fields;

// Which source produced the pristine version of a server object.  Diff prints
// this in its headers so users know whether they're comparing against real
// intent or a best-effort reconstruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PristineSource {
    V1Annotation,
    V0Annotation,
    LiveObject,
}

impl fmt::Display for PristineSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PristineSource::V1Annotation => write!(f, "source: {PRISTINE_ANNOTATION_KEY}"),
            PristineSource::V0Annotation => write!(f, "source: {PRISTINE_ANNOTATION_KEY_V0}"),
            PristineSource::LiveObject => write!(f, "source: live object (pristine annotation not found)"),
        }
    }
}

// The pristine form of a document: runtime fields gone, along with the
// pristine annotations themselves (a pristine containing its own pristine
// would grow without bound).
pub fn pristine_of(doc: &json::Value) -> json::Value {
    let mut p = doc.clone();
    strip_runtime_fields(&mut p);

    if let Some(meta) = p.pointer_mut("/metadata").and_then(|m| m.as_object_mut()) {
        let mut drop_annotations = false;
        if let Some(ann) = meta.get_mut("annotations").and_then(|a| a.as_object_mut()) {
            ann.remove(PRISTINE_ANNOTATION_KEY);
            ann.remove(PRISTINE_ANNOTATION_KEY_V0);
            drop_annotations = ann.is_empty();
        }
        if drop_annotations {
            meta.remove("annotations");
        }
    }
    p
}

pub fn encode(doc: &json::Value) -> anyhow::Result<String> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(&json::to_vec(doc)?)?;
    Ok(BASE64_STANDARD.encode(enc.finish()?))
}

pub fn decode_v1(value: &str) -> anyhow::Result<json::Value> {
    let compressed = BASE64_STANDARD
        .decode(value)
        .map_err(|e| ModelError::bad_pristine(&format!("base64: {e}")))?;
    let mut dec = GzDecoder::new(&compressed[..]);
    let mut raw = Vec::new();
    dec.read_to_end(&mut raw).map_err(|e| ModelError::bad_pristine(&format!("gzip: {e}")))?;
    json::from_slice(&raw).map_err(|e| ModelError::bad_pristine(&format!("json: {e}")).into())
}

// The document actually sent to the cluster: the local intent plus an
// annotation recording that intent, so the next apply/diff can recover it.
// Always writes v1; v0 only exists for reading objects written long ago.
pub fn attach(doc: &json::Value) -> anyhow::Result<json::Value> {
    attach_with(doc, &pristine_of(doc))
}

// Updates record the merged document but annotate it with the *local* intent;
// drift owned by other controllers must not leak into the recorded intent.
pub fn attach_with(doc: &json::Value, pristine: &json::Value) -> anyhow::Result<json::Value> {
    let encoded = encode(pristine)?;
    let mut out = doc.clone();

    let meta = out
        .pointer_mut("/metadata")
        .and_then(|m| m.as_object_mut())
        .ok_or_else(|| anyhow!("object has no metadata"))?;
    let annotations = meta
        .entry("annotations")
        .or_insert_with(|| json::Value::Object(Default::default()))
        .as_object_mut()
        .ok_or_else(|| anyhow!("metadata.annotations is not an object"))?;
    annotations.insert(PRISTINE_ANNOTATION_KEY.into(), json::Value::String(encoded));
    annotations.remove(PRISTINE_ANNOTATION_KEY_V0);
    Ok(out)
}

// Recover the previous intent from a server object.  Bad annotations are
// logged and treated as absent rather than failing the whole sync.
pub fn extract(server_doc: &json::Value) -> (json::Value, PristineSource) {
    let annotations = server_doc.pointer("/metadata/annotations").and_then(|a| a.as_object());

    if let Some(v1) = annotations.and_then(|a| a.get(PRISTINE_ANNOTATION_KEY)).and_then(|v| v.as_str()) {
        match decode_v1(v1) {
            Ok(doc) => return (doc, PristineSource::V1Annotation),
            Err(err) => warn!("discarding unreadable {PRISTINE_ANNOTATION_KEY} annotation: {err:#}"),
        }
    }

    if let Some(v0) = annotations.and_then(|a| a.get(PRISTINE_ANNOTATION_KEY_V0)).and_then(|v| v.as_str()) {
        match json::from_str(v0) {
            Ok(doc) => return (doc, PristineSource::V0Annotation),
            Err(err) => warn!("discarding unreadable {PRISTINE_ANNOTATION_KEY_V0} annotation: {err:#}"),
        }
    }

    (pristine_of(server_doc), PristineSource::LiveObject)
}

use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use qb_core::errors::*;
use qb_engine::eval::{
    ComponentObjects,
    EvalContext,
    Evaluator,
};
use serde_json as json;

// Renders JSON and YAML component files.  A component file may hold a single
// object, a k8s List, an array, or (for YAML) multiple documents; all of
// them flatten to the same thing: a list of raw objects.
pub struct FileEvaluator {
    components_dir: PathBuf,
}

impl FileEvaluator {
    pub fn new(components_dir: PathBuf) -> FileEvaluator {
        FileEvaluator { components_dir }
    }

    fn component_path(&self, component: &str) -> anyhow::Result<PathBuf> {
        for ext in ["json", "yaml", "yml"] {
            let candidate = self.components_dir.join(format!("{component}.{ext}"));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        Err(usage_error(format!("no source file found for component {component:?}")))
    }

    fn load_docs(path: &Path) -> anyhow::Result<Vec<json::Value>> {
        let raw = fs::read_to_string(path)
            .map_err(|e| anyhow!("unable to read {}: {e}", path.display()))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let docs = match ext {
            "json" => vec![json::from_str(&raw).map_err(|e| anyhow!("invalid JSON in {}: {e}", path.display()))?],
            _ => {
                let mut docs = vec![];
                for doc in serde_yaml::Deserializer::from_str(&raw) {
                    let value: json::Value = serde::Deserialize::deserialize(doc)
                        .map_err(|e| anyhow!("invalid YAML in {}: {e}", path.display()))?;
                    docs.push(value);
                }
                docs
            },
        };
        Ok(docs)
    }

    // unwrap arrays and k8s List objects recursively, drop nulls (a YAML
    // file ending in --- renders an empty document)
    fn flatten(value: json::Value, out: &mut Vec<json::Value>) {
        match value {
            json::Value::Null => (),
            json::Value::Array(items) => {
                for item in items {
                    Self::flatten(item, out);
                }
            },
            json::Value::Object(ref map) if map.get("kind").and_then(|k| k.as_str()) == Some("List") => {
                if let Some(json::Value::Array(items)) = map.get("items").cloned() {
                    for item in items {
                        Self::flatten(item, out);
                    }
                }
            },
            other => out.push(other),
        }
    }
}

#[async_trait::async_trait]
impl Evaluator for FileEvaluator {
    async fn components(&self, components: &[String], _ctx: &EvalContext) -> anyhow::Result<Vec<ComponentObjects>> {
        let mut results = vec![];
        for component in components {
            let path = self.component_path(component)?;
            let mut objects = vec![];
            for doc in Self::load_docs(&path)? {
                Self::flatten(doc, &mut objects);
            }
            results.push(ComponentObjects { component: component.clone(), objects });
        }
        Ok(results)
    }

    async fn eval_file(&self, path: &Path, _ctx: &EvalContext) -> anyhow::Result<String> {
        let mut objects = vec![];
        for doc in Self::load_docs(path)? {
            Self::flatten(doc, &mut objects);
        }
        let out = match objects.len() {
            1 => objects.into_iter().next().unwrap(),
            _ => json::Value::Array(objects),
        };
        Ok(json::to_string_pretty(&out)?)
    }
}

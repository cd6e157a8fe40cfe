use std::collections::BTreeMap;
use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use qb_core::errors::*;
use qb_core::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json as json;

pub const MANIFEST_BASENAME: &str = "qbec.yaml";

// The application manifest, loaded from qbec.yaml at the root of an app
// directory.  Everything the CLI knows about environments and component
// discovery comes from here.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppManifest {
    pub api_version: String,
    pub kind: String,
    pub metadata: AppMetadata,
    pub spec: AppSpec,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppMetadata {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSpec {
    pub environments: BTreeMap<String, Environment>,

    #[serde(default = "default_components_dir")]
    pub components_dir: String,

    // components excluded from every environment unless re-included
    #[serde(default)]
    pub excludes: Vec<String>,

    #[serde(default)]
    pub base_properties: json::Value,
}

fn default_components_dir() -> String {
    "components".into()
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    #[serde(default)]
    pub server: Option<String>,

    #[serde(default)]
    pub context: Option<String>,

    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    #[serde(default)]
    pub includes: Vec<String>,

    #[serde(default)]
    pub excludes: Vec<String>,

    #[serde(default)]
    pub properties: json::Value,
}

fn default_namespace() -> String {
    "default".into()
}

#[derive(Clone, Debug)]
pub struct App {
    manifest: AppManifest,
    root: PathBuf,
    tag: Option<String>,
}

impl App {
    pub fn load(root: &Path, tag: Option<String>) -> anyhow::Result<App> {
        let path = root.join(MANIFEST_BASENAME);
        let raw = fs::read_to_string(&path)
            .map_err(|e| usage_error(format!("unable to read {}: {e}", path.display())))?;
        let manifest: AppManifest = serde_yaml::from_str(&raw)
            .map_err(|e| usage_error(format!("invalid app manifest {}: {e}", path.display())))?;

        let app = App { manifest, root: root.to_path_buf(), tag };
        app.validate()?;
        Ok(app)
    }

    fn validate(&self) -> EmptyResult {
        if self.manifest.kind != "App" {
            return Err(usage_error(format!("unsupported manifest kind {:?}", self.manifest.kind)));
        }
        if self.manifest.metadata.name.is_empty() {
            return Err(usage_error("app name may not be empty"));
        }
        if self.manifest.spec.environments.is_empty() {
            return Err(usage_error("app defines no environments"));
        }
        if self.manifest.spec.environments.contains_key(BASELINE_ENVIRONMENT) {
            return Err(usage_error(format!("environment name {BASELINE_ENVIRONMENT:?} is reserved for the baseline")));
        }
        if let Some(tag) = &self.tag {
            let valid = !tag.is_empty()
                && tag.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
                && !tag.starts_with('-')
                && !tag.ends_with('-');
            if !valid {
                return Err(usage_error(format!("invalid app tag {tag:?}, must be a valid DNS label fragment")));
            }
        }
        for (name, env) in &self.manifest.spec.environments {
            if !env.includes.is_empty() && !env.excludes.is_empty() {
                return Err(usage_error(format!(
                    "environment {name}: cannot include as well as exclude components"
                )));
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.manifest.metadata.name
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn components_dir(&self) -> PathBuf {
        self.root.join(&self.manifest.spec.components_dir)
    }

    pub fn environment_names(&self) -> Vec<String> {
        self.manifest.spec.environments.keys().cloned().collect()
    }

    // the baseline is a valid lookup for read-only comparison commands; it
    // has no server and the default namespace
    pub fn environment(&self, name: &str) -> anyhow::Result<Environment> {
        if name == BASELINE_ENVIRONMENT {
            return Ok(Environment::default());
        }
        self.manifest
            .spec
            .environments
            .get(name)
            .cloned()
            .ok_or_else(|| usage_error(format!("invalid environment {name:?}")))
    }

    // components on disk, minus global excludes, adjusted per environment
    pub fn components_for(&self, env_name: &str) -> anyhow::Result<Vec<String>> {
        let env = self.environment(env_name)?;
        let mut all = self.discover_components()?;

        if !env.includes.is_empty() {
            for inc in &env.includes {
                if !all.contains(inc) && !self.manifest.spec.excludes.contains(inc) {
                    return Err(usage_error(format!("environment {env_name} includes unknown component {inc:?}")));
                }
            }
            all.retain(|c| env.includes.contains(c) || !self.manifest.spec.excludes.contains(c));
        } else {
            all.retain(|c| !self.manifest.spec.excludes.contains(c));
            all.retain(|c| !env.excludes.contains(c));
        }
        Ok(all)
    }

    fn discover_components(&self) -> anyhow::Result<Vec<String>> {
        let dir = self.components_dir();
        let entries = fs::read_dir(&dir)
            .map_err(|e| usage_error(format!("unable to read components directory {}: {e}", dir.display())))?;

        let mut names = vec![];
        for entry in entries {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
            if !matches!(ext, "json" | "yaml" | "yml") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    // properties as seen by the evaluator: base properties overridden by the
    // environment's own
    pub fn properties_for(&self, env_name: &str) -> anyhow::Result<json::Value> {
        let env = self.environment(env_name)?;
        let mut props = self.manifest.spec.base_properties.clone();
        if props.is_null() {
            return Ok(env.properties.clone());
        }
        if !env.properties.is_null() {
            json_patch::merge(&mut props, &env.properties);
        }
        Ok(props)
    }
}

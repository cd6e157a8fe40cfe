use std::path::Path;

use serde_json as json;

// Inputs every component evaluation sees, regardless of the file format that
// backs the component.
#[derive(Clone, Debug)]
pub struct EvalContext {
    pub environment: String,
    pub default_namespace: String,
    pub properties: json::Value,
}

#[derive(Clone, Debug)]
pub struct ComponentObjects {
    pub component: String,
    pub objects: Vec<json::Value>,
}

// The seam between the engine and whatever turns component sources into
// object trees.  The engine only ever sees flat lists of raw documents.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait Evaluator: Send + Sync {
    // evaluate the named components, in the given order
    async fn components(&self, components: &[String], ctx: &EvalContext) -> anyhow::Result<Vec<ComponentObjects>>;

    // evaluate a single file to its JSON rendering, for `qbec eval`
    async fn eval_file(&self, path: &Path, ctx: &EvalContext) -> anyhow::Result<String>;
}

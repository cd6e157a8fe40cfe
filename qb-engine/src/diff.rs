use std::collections::HashSet;
use std::sync::{
    Arc,
    Mutex,
};

use anyhow::Context;
use console::style;
use qb_core::errors::*;
use qb_core::filter::ObjectFilter;
use qb_core::model::hide_secrets;
use qb_core::model::pristine;
use qb_core::prelude::*;
use serde::Serialize;
use serde_json as json;
use similar::TextDiff;
use tracing::*;

use crate::client::{
    ClusterClient,
    EnvScope,
};
use crate::eval::{
    EvalContext,
    Evaluator,
};
use crate::generate::generate_objects;
use crate::lister::RemoteLister;
use crate::worker;

#[derive(Clone, Debug)]
pub struct DiffOptions {
    pub context_lines: usize,
    pub show_deletions: bool,
    pub show_secrets: bool,
    pub error_exit: bool,
    pub parallelism: usize,
    pub colorize: bool,
    pub ignore_all_labels: bool,
    pub ignore_labels: Vec<String>,
    pub ignore_all_annotations: bool,
    pub ignore_annotations: Vec<String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions {
            context_lines: 3,
            show_deletions: true,
            show_secrets: false,
            error_exit: false,
            parallelism: 5,
            colorize: false,
            ignore_all_labels: false,
            ignore_labels: vec![],
            ignore_all_annotations: false,
            ignore_annotations: vec![],
        }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct DiffStats {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub same: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deletions: Vec<String>,
}

impl DiffStats {
    pub fn findings(&self) -> usize {
        self.changes.len() + self.additions.len() + self.deletions.len()
    }
}

// Compare every local object against the server's recorded intent, then
// (optionally) every server extra against nothing.  All comparisons run to
// completion even if some fail, so the stats always reflect the full set.
#[allow(clippy::too_many_arguments)]
pub async fn run(
    client: Arc<dyn ClusterClient>,
    evaluator: &dyn Evaluator,
    components: &[String],
    filter: &ObjectFilter,
    scope: &EnvScope,
    ctx: &EvalContext,
    opts: &DiffOptions,
    stats: &mut DiffStats,
) -> EmptyResult {
    let r#gen = generate_objects(components, evaluator, client.as_ref(), filter, scope, ctx).await?;

    let mut lister = opts.show_deletions.then(|| RemoteLister::start(client.clone(), &r#gen, scope));

    let stats_lock = Mutex::new(std::mem::take(stats));
    let print_lock = Mutex::new(());

    let objects = r#gen.objects.clone();
    let diff_result = worker::run_parallel(objects, opts.parallelism, |obj| {
        let client = client.clone();
        let (stats_lock, print_lock) = (&stats_lock, &print_lock);
        let r#gen = &r#gen;
        async move {
            let display = obj.display_name();
            let namespaced = r#gen.scope_of(obj.gvk()).unwrap_or(true);
            let ns = namespaced.then(|| obj.namespace_or(&scope.default_namespace).to_string());

            let mut local = obj.to_json()?;
            if let Some(ns) = &ns {
                local["metadata"]["namespace"] = json::Value::String(ns.clone());
            }
            let right = reduced(&pristine::pristine_of(&local), opts);

            let server = match obj.name() {
                Some(name) => client
                    .get(obj.gvk(), ns.as_deref(), name)
                    .await
                    .with_context(|| format!("fetching {display} failed"))?,
                None => None,
            };

            match server {
                None => {
                    let text = render_diff("<none>", &format!("{display} (local)"), "", &to_yaml(&right)?, opts);
                    let _hold = print_lock.lock().unwrap();
                    println!("{text}");
                    stats_lock.lock().unwrap().additions.push(display);
                },
                Some(server) => {
                    let server_doc = json::to_value(&server)?;
                    let (previous, source) = pristine::extract(&server_doc);
                    let left = reduced(&previous, opts);

                    let (left_text, right_text) = (to_yaml(&left)?, to_yaml(&right)?);
                    if left_text == right_text {
                        stats_lock.lock().unwrap().same.push(display);
                    } else {
                        let text = render_diff(
                            &format!("{display} ({source})"),
                            &format!("{display} (local)"),
                            &left_text,
                            &right_text,
                            opts,
                        );
                        let _hold = print_lock.lock().unwrap();
                        println!("{text}");
                        stats_lock.lock().unwrap().changes.push(display);
                    }
                },
            }
            Ok(())
        }
    })
    .await;

    if let Some(lister) = &mut lister {
        let extras = lister.deletions(&r#gen, &HashSet::new(), filter).await?;
        for rem in extras {
            let display = rem.display_name();
            let server_doc = json::to_value(&rem.obj)?;
            let (previous, source) = pristine::extract(&server_doc);
            let left = reduced(&previous, opts);

            let text = render_diff(&format!("{display} ({source})"), "<none>", &to_yaml(&left)?, "", opts);
            let _hold = print_lock.lock().unwrap();
            println!("{text}");
            stats_lock.lock().unwrap().deletions.push(display);
        }
    }

    *stats = stats_lock.into_inner().unwrap();
    diff_result?;

    if opts.error_exit && stats.findings() > 0 {
        warn!("{} object(s) differ from the cluster", stats.findings());
        bail!("{} object(s) differ", stats.findings());
    }
    Ok(())
}

// Strip everything the user asked diff to be blind to, then hide secret
// values unless they asked to see them.
fn reduced(doc: &json::Value, opts: &DiffOptions) -> json::Value {
    let mut out = doc.clone();

    for (section, drop_all, drop_named) in [
        ("labels", opts.ignore_all_labels, &opts.ignore_labels),
        ("annotations", opts.ignore_all_annotations, &opts.ignore_annotations),
    ] {
        if let Some(meta) = out.pointer_mut("/metadata").and_then(|m| m.as_object_mut()) {
            if drop_all {
                meta.remove(section);
            } else if let Some(map) = meta.get_mut(section).and_then(|s| s.as_object_mut()) {
                for name in drop_named {
                    map.remove(name);
                }
            }
        }
    }

    if !opts.show_secrets {
        hide_secrets(&mut out);
    }
    out
}

fn to_yaml(doc: &json::Value) -> anyhow::Result<String> {
    Ok(serde_yaml::to_string(doc)?)
}

fn render_diff(left_name: &str, right_name: &str, left: &str, right: &str, opts: &DiffOptions) -> String {
    let diff = TextDiff::from_lines(left, right);
    let text = diff
        .unified_diff()
        .context_radius(opts.context_lines)
        .header(left_name, right_name)
        .to_string();

    if !opts.colorize {
        return text;
    }
    text.lines()
        .map(|line| {
            if line.starts_with('+') {
                style(line).green().to_string()
            } else if line.starts_with('-') {
                style(line).red().to_string()
            } else if line.starts_with("@@") {
                style(line).cyan().to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

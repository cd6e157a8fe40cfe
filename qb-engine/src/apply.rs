use std::collections::HashSet;
use std::sync::{
    Arc,
    Mutex,
};
use std::time::Duration;

use anyhow::Context;
use qb_core::errors::*;
use qb_core::filter::ObjectFilter;
use qb_core::model::{
    ObjectKey,
    Policy,
};
use qb_core::prelude::*;
use qb_core::sort;
use serde::Serialize;
use tracing::*;

use crate::client::{
    ClusterClient,
    EnvScope,
    SyncAction,
    SyncOptions,
};
use crate::delete;
use crate::eval::{
    EvalContext,
    Evaluator,
};
use crate::generate::generate_objects;
use crate::lister::RemoteLister;
use crate::prompt::Prompter;
use crate::rollout::{
    self,
    WaitTarget,
};
use crate::worker;

#[derive(Clone, Debug, Default, Serialize)]
pub struct ApplyStats {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub same: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub created: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub updated: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<String>,
}

impl ApplyStats {
    pub fn record(&mut self, action: SyncAction, name: String) {
        match action {
            SyncAction::Identical => self.same.push(name),
            SyncAction::Created => self.created.push(name),
            SyncAction::Updated => self.updated.push(name),
            SyncAction::Skip => self.skipped.push(name),
            SyncAction::Deleted => self.deleted.push(name),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApplyOptions {
    pub dry_run: bool,
    pub gc: bool,
    pub wait: bool,
    pub wait_all: bool,
    pub wait_timeout: Duration,
    pub parallelism: usize,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        ApplyOptions {
            dry_run: false,
            gc: true,
            wait: false,
            wait_all: false,
            wait_timeout: Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECONDS),
            parallelism: 1,
        }
    }
}

// The apply driver: generate -> confirm -> sync (sorted, possibly parallel)
// -> garbage collect -> wait for rollouts.  Stats accumulate into the
// caller's struct even when a stage fails, so whatever happened before the
// failure is still reported.
#[allow(clippy::too_many_arguments)]
pub async fn run(
    client: Arc<dyn ClusterClient>,
    evaluator: &dyn Evaluator,
    components: &[String],
    filter: &ObjectFilter,
    scope: &EnvScope,
    ctx: &EvalContext,
    prompter: &dyn Prompter,
    opts: &ApplyOptions,
    stats: &mut ApplyStats,
) -> EmptyResult {
    if scope.environment == BASELINE_ENVIRONMENT {
        return Err(usage_error("cannot apply the baseline environment"));
    }

    let r#gen = generate_objects(components, evaluator, client.as_ref(), filter, scope, ctx).await?;
    if r#gen.objects.is_empty() {
        warn!("no objects to apply");
        return Ok(());
    }

    if !opts.dry_run {
        prompter.confirm(&format!(
            "will synchronize {} object(s) to {}",
            r#gen.objects.len(),
            client.display_name()
        ))?;
    }

    // the GC list goes out before the first sync so it overlaps the sync loop
    let mut lister = if opts.gc { Some(RemoteLister::start(client.clone(), &r#gen, scope)) } else { None };

    let mut objects = r#gen.objects.clone();
    sort::sort_for_apply(&mut objects, &r#gen.scopes);

    let dry = if opts.dry_run { "[dry-run] " } else { "" };
    let stats_lock = Mutex::new(std::mem::take(stats));
    let retain_lock: Mutex<HashSet<ObjectKey>> = Mutex::new(HashSet::new());
    let wait_lock: Mutex<Vec<WaitTarget>> = Mutex::new(vec![]);

    let sync_opts = SyncOptions { dry_run: opts.dry_run, disable_create: false };
    let sync_result = worker::run_parallel(objects, opts.parallelism, |obj| {
        let client = client.clone();
        let (stats_lock, retain_lock, wait_lock) = (&stats_lock, &retain_lock, &wait_lock);
        let r#gen = &r#gen;
        async move {
            let res = client
                .sync(&obj, &scope.default_namespace, sync_opts)
                .await
                .with_context(|| format!("{dry}sync {} failed", obj.display_name()))?;

            let namespaced = r#gen.scope_of(obj.gvk()).unwrap_or(true);
            let name = res.generated_name.clone().or_else(|| obj.name().map(String::from)).unwrap_or_default();
            let disp = if namespaced {
                format!("{} {}/{}", obj.kind(), obj.namespace_or(&scope.default_namespace), name)
            } else {
                format!("{} {}", obj.kind(), name)
            };
            info!("{dry}sync {disp}: {}", res.details);

            if res.generated_name.is_some() {
                retain_lock.lock().unwrap().insert(ObjectKey {
                    group: obj.gvk().group.clone(),
                    kind: obj.kind().into(),
                    namespace: if namespaced { obj.namespace_or(&scope.default_namespace).into() } else { String::new() },
                    name: name.clone(),
                });
            }

            let changed = matches!(res.action, SyncAction::Created | SyncAction::Updated);
            if (opts.wait && changed || opts.wait_all)
                && obj.update_policy() != Policy::Never
                && !name.is_empty()
            {
                wait_lock.lock().unwrap().push(WaitTarget {
                    gvk: obj.gvk().clone(),
                    namespace: namespaced.then(|| obj.namespace_or(&scope.default_namespace).to_string()),
                    name,
                });
            }

            stats_lock.lock().unwrap().record(res.action, disp);
            Ok(())
        }
    })
    .await;

    *stats = stats_lock.into_inner().unwrap();
    sync_result?;

    if let Some(lister) = &mut lister {
        let retain = retain_lock.into_inner().unwrap();
        let deletions = lister.deletions(&r#gen, &retain, filter).await?;
        if !deletions.is_empty() {
            if !opts.dry_run {
                prompter.confirm(&format!("will delete {} object(s)", deletions.len()))?;
            }
            let protected = lister.protected_namespaces().await?;
            delete::delete_objects(client.clone(), deletions, &protected, opts.dry_run, stats).await?;
        }
    }

    if (opts.wait || opts.wait_all) && !opts.dry_run {
        let targets = wait_lock.into_inner().unwrap();
        if !targets.is_empty() {
            info!("waiting up to {:?} for {} object(s) to roll out", opts.wait_timeout, targets.len());
            rollout::wait(client.clone(), targets, opts.wait_timeout).await?;
        }
    }

    Ok(())
}

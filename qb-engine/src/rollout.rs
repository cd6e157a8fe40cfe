use std::collections::HashMap;
use std::sync::{
    Arc,
    Mutex,
};
use std::time::Duration;

use futures::StreamExt;
use qb_core::errors::*;
use qb_core::prelude::*;
use serde_json as json;
use tokio::task::JoinSet;
use tracing::*;

use crate::client::ClusterClient;

const RECONNECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
pub struct WaitTarget {
    pub gvk: GVK,
    pub namespace: Option<String>,
    pub name: String,
}

impl WaitTarget {
    fn display(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{} {ns}/{}", self.gvk.kind, self.name),
            None => format!("{} {}", self.gvk.kind, self.name),
        }
    }
}

// Watch every target until its reducer reports done, or until the deadline.
// Cancellation/timeout tears the watches down but never reverts anything
// that was applied.
pub async fn wait(client: Arc<dyn ClusterClient>, targets: Vec<WaitTarget>, timeout: Duration) -> EmptyResult {
    let pending: Arc<Mutex<HashMap<String, String>>> = Arc::new(Mutex::new(
        targets.iter().map(|t| (t.display(), "waiting for first status".to_string())).collect(),
    ));

    let mut js = JoinSet::new();
    for target in targets {
        let client = client.clone();
        let pending = pending.clone();
        js.spawn(async move { watch_until_done(client, target, pending).await });
    }

    let drain = async {
        while let Some(res) = js.join_next().await {
            res??;
        }
        Ok(())
    };

    match tokio::time::timeout(timeout, drain).await {
        Ok(res) => res,
        Err(_) => {
            let remaining: Vec<String> = pending
                .lock()
                .unwrap()
                .iter()
                .map(|(name, status)| format!("{name}: {status}"))
                .collect();
            bail!("rollout did not complete within {timeout:?}; still pending:\n{}", remaining.join("\n"));
        },
    }
}

async fn watch_until_done(
    client: Arc<dyn ClusterClient>,
    target: WaitTarget,
    pending: Arc<Mutex<HashMap<String, String>>>,
) -> EmptyResult {
    let disp = target.display();
    loop {
        let mut stream = client
            .watch_object(&target.gvk, target.namespace.as_deref(), &target.name)
            .await?;

        while let Some(evt) = stream.next().await {
            match evt {
                Ok(obj) => {
                    let (done, descr) = reduce_status(&target.gvk.kind, &obj);
                    info!("{disp}: {descr}");
                    if done {
                        pending.lock().unwrap().remove(&disp);
                        return Ok(());
                    }
                    pending.lock().unwrap().insert(disp.clone(), descr);
                },
                Err(err) => {
                    warn!("watch error for {disp}: {err:#}");
                    break;
                },
            }
        }

        // the watch dropped; re-subscribing re-delivers current state, so no
        // status change can be missed
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

fn int_at(doc: &json::Value, ptr: &str) -> i64 {
    doc.pointer(ptr).and_then(|v| v.as_i64()).unwrap_or(0)
}

fn condition_true(doc: &json::Value, cond_type: &str) -> bool {
    doc.pointer("/status/conditions")
        .and_then(|c| c.as_array())
        .is_some_and(|conds| {
            conds.iter().any(|c| {
                c.get("type").and_then(|t| t.as_str()) == Some(cond_type)
                    && c.get("status").and_then(|s| s.as_str()) == Some("True")
            })
        })
}

// Pure per-kind status reduction: (kind, current object) -> (done, description).
// Unknown kinds finish immediately since we have no way to judge them.
pub fn reduce_status(kind: &str, obj: &DynamicObject) -> (bool, String) {
    let doc = match serde_json::to_value(obj) {
        Ok(d) => d,
        Err(_) => return (true, "status unreadable; assumed done".into()),
    };
    let generation = obj.metadata.generation.unwrap_or(0);
    let observed = int_at(&doc, "/status/observedGeneration");

    match kind {
        "Deployment" => {
            if observed < generation {
                return (false, "waiting for spec update to be observed".into());
            }
            let desired = doc.pointer("/spec/replicas").and_then(|v| v.as_i64()).unwrap_or(1);
            let updated = int_at(&doc, "/status/updatedReplicas");
            let available = int_at(&doc, "/status/availableReplicas");
            (
                updated >= desired && available >= desired,
                format!("{available} of {desired} replica(s) available, {updated} updated"),
            )
        },
        "StatefulSet" => {
            if observed < generation {
                return (false, "waiting for spec update to be observed".into());
            }
            let desired = doc.pointer("/spec/replicas").and_then(|v| v.as_i64()).unwrap_or(1);
            let updated = int_at(&doc, "/status/updatedReplicas");
            let ready = int_at(&doc, "/status/readyReplicas");
            (
                updated >= desired && ready >= desired,
                format!("{ready} of {desired} replica(s) ready, {updated} updated"),
            )
        },
        "DaemonSet" => {
            if observed < generation {
                return (false, "waiting for spec update to be observed".into());
            }
            let desired = int_at(&doc, "/status/desiredNumberScheduled");
            let ready = int_at(&doc, "/status/numberReady");
            (ready >= desired, format!("{ready} of {desired} pod(s) ready"))
        },
        "Job" => {
            if condition_true(&doc, "Complete") {
                (true, "succeeded".into())
            } else if condition_true(&doc, "Failed") {
                (true, "failed".into())
            } else {
                let active = int_at(&doc, "/status/active");
                (false, format!("{active} pod(s) active"))
            }
        },
        "Pod" => {
            if condition_true(&doc, "Ready") {
                (true, "ready".into())
            } else {
                let phase = doc
                    .pointer("/status/phase")
                    .and_then(|p| p.as_str())
                    .unwrap_or("unknown")
                    .to_string();
                (false, phase)
            }
        },
        _ => (true, "rollout status not tracked for this kind".into()),
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret reconciler - keeps autoprovisioned Secrets filled with a fresh service account token.

use crate::constants::{fields, timing};
use crate::error::{Result, TokenRotateError};
use crate::kubernetes::ClientResolver;
use crate::token::{mint, needs_refresh, Clock, KubeTokenAuthority};
use crate::types::{AutoprovisionIntent, ClusterConfigList};
use base64::{engine::general_purpose::STANDARD, Engine};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{Patch, PatchParams},
    runtime::{controller::Action, Controller},
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Why a Secret was left alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The Secret no longer exists
    Gone,
    NoAnnotation,
    InvalidAnnotation(String),
    /// No config entry for this identity; another controller instance may own it
    NoMatchingConfig(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Completed { minted: bool },
    Ignored(IgnoreReason),
}

impl ReconcileOutcome {
    /// When the controller should look at the Secret again
    pub fn action(&self) -> Action {
        match self {
            ReconcileOutcome::Completed { .. } => {
                Action::requeue(Duration::from_secs(timing::REQUEUE_SECS))
            }
            ReconcileOutcome::Ignored(_) => Action::await_change(),
        }
    }
}

pub struct SecretReconciler {
    garden_client: Client,
    resolver: Arc<dyn ClientResolver>,
    clock: Arc<dyn Clock>,
    config_path: PathBuf,
    /// Consecutive failed reconciliations per `namespace/name`
    failures: Mutex<HashMap<String, u32>>,
}

impl SecretReconciler {
    pub fn new(
        garden_client: Client,
        resolver: Arc<dyn ClientResolver>,
        clock: Arc<dyn Clock>,
        config_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            garden_client,
            resolver,
            clock,
            config_path: config_path.into(),
            failures: Mutex::new(HashMap::new()),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let secrets: Api<Secret> = Api::all(self.garden_client.clone());
        let context = Arc::new(self);

        Controller::new(secrets, WatcherConfig::default())
            .shutdown_on_signal()
            .run(reconcile, error_policy, context)
            .for_each(|res| async move {
                match res {
                    Ok(o) => debug!("Reconciled secret: {:?}", o),
                    Err(e) => warn!("Reconciliation error: {:?}", e),
                }
            })
            .await;

        Ok(())
    }

    /// Bring the Secret `namespace/name` in line with its autoprovision annotation
    #[instrument(skip(self), fields(secret = %format!("{}/{}", namespace, name)))]
    pub async fn reconcile_secret(&self, namespace: &str, name: &str) -> Result<ReconcileOutcome> {
        let config = ClusterConfigList::load(&self.config_path)?;

        let secrets: Api<Secret> = Api::namespaced(self.garden_client.clone(), namespace);
        let Some(secret) = secrets.get_opt(name).await? else {
            debug!("Secret no longer exists, skipping");
            return Ok(ReconcileOutcome::Ignored(IgnoreReason::Gone));
        };

        let intent = match AutoprovisionIntent::from_secret(&secret) {
            None => {
                debug!("Secret has no autoprovision annotation, skipping");
                return Ok(ReconcileOutcome::Ignored(IgnoreReason::NoAnnotation));
            }
            Some(Err(e)) => {
                warn!("Skipping secret with invalid autoprovision annotation: {}", e);
                return Ok(ReconcileOutcome::Ignored(IgnoreReason::InvalidAnnotation(
                    e.to_string(),
                )));
            }
            Some(Ok(intent)) => intent,
        };

        let Some(cluster) = config.find_by_identity(&intent.identity) else {
            warn!(
                "Skipping secret without matching config for identity '{}'",
                intent.identity
            );
            return Ok(ReconcileOutcome::Ignored(IgnoreReason::NoMatchingConfig(
                intent.identity,
            )));
        };
        debug!("Found matching config for identity '{}'", intent.identity);

        let metal_client = self.resolver.resolve(cluster).await?;
        let authority = KubeTokenAuthority::new(metal_client);

        let current_token = data_field(&secret, fields::TOKEN);
        let minted = needs_refresh(&current_token, &authority, self.clock.as_ref()).await?;
        let token = if minted {
            mint(
                &authority,
                &cluster.service_account(),
                cluster.expiration_seconds,
            )
            .await?
        } else {
            debug!("Token is still fresh");
            current_token
        };

        let desired = [
            (fields::TOKEN, token),
            (fields::USERNAME, cluster.service_account_name.clone()),
            (fields::NAMESPACE, intent.namespace),
        ];
        match managed_fields_patch(&secret, &desired) {
            Some(patch) => {
                secrets
                    .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
                    .await?;
                info!("Patched secret (token minted: {})", minted);
            }
            None => debug!("Secret already up to date"),
        }

        Ok(ReconcileOutcome::Completed { minted })
    }

    /// Count another failure of `key` and return the new streak length
    fn record_failure(&self, key: &str) -> u32 {
        let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        let count = failures.entry(key.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    fn clear_failures(&self, key: &str) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Retry delay after `failures` consecutive errors: doubles from the base
/// delay up to the cap
fn error_backoff(failures: u32) -> Duration {
    let exponent = failures.saturating_sub(1).min(16);
    let secs = timing::ERROR_REQUEUE_SECS
        .saturating_mul(1 << exponent)
        .min(timing::ERROR_REQUEUE_MAX_SECS);
    Duration::from_secs(secs)
}

fn object_key(secret: &Secret) -> String {
    format!("{}/{}", secret.namespace().unwrap_or_default(), secret.name_any())
}

fn data_field(secret: &Secret, key: &str) -> String {
    secret
        .data
        .as_ref()
        .and_then(|d| d.get(key))
        .map(|v| String::from_utf8_lossy(&v.0).into_owned())
        .unwrap_or_default()
}

/// Merge patch asserting only the managed data fields, guarded by the
/// observed resourceVersion. `None` when nothing would change.
fn managed_fields_patch(secret: &Secret, desired: &[(&str, String)]) -> Option<serde_json::Value> {
    let current = secret.data.as_ref();
    let unchanged = desired.iter().all(|(key, value)| {
        current
            .and_then(|d| d.get(*key))
            .is_some_and(|v| v.0 == value.as_bytes())
    });
    if unchanged {
        return None;
    }

    let data: serde_json::Map<String, serde_json::Value> = desired
        .iter()
        .map(|(key, value)| (key.to_string(), STANDARD.encode(value).into()))
        .collect();

    let mut patch = serde_json::json!({ "data": data });
    if let Some(resource_version) = secret.resource_version() {
        patch["metadata"] = serde_json::json!({ "resourceVersion": resource_version });
    }
    Some(patch)
}

async fn reconcile(secret: Arc<Secret>, ctx: Arc<SecretReconciler>) -> Result<Action> {
    let name = secret.name_any();
    let namespace = secret.namespace().unwrap_or_default();

    let deadline = Duration::from_secs(timing::RECONCILE_TIMEOUT_SECS);
    let outcome = tokio::time::timeout(deadline, ctx.reconcile_secret(&namespace, &name))
        .await
        .map_err(|_| TokenRotateError::Timeout(deadline))??;

    ctx.clear_failures(&object_key(&secret));
    Ok(outcome.action())
}

fn error_policy(secret: Arc<Secret>, error: &TokenRotateError, ctx: Arc<SecretReconciler>) -> Action {
    let key = object_key(&secret);
    let failures = ctx.record_failure(&key);
    let delay = error_backoff(failures);
    error!(
        "Reconciliation of secret {} failed ({} in a row), retrying in {:?}: {}",
        key, failures, delay, error
    );
    Action::requeue(delay)
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::DEFAULT_CONFIG_PATH;
use crate::types::ObjectKey;
use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Token configuration file, re-read on every reconciliation
    pub config_path: PathBuf,
    /// Context of the local kubeconfig to use, defaults to the current context
    pub kube_context: Option<String>,
    /// API server of the garden cluster; the local cluster is used when unset
    pub garden_cluster_address: Option<String>,
    /// Secret holding the kubeconfig of the default metal cluster
    pub target_secret: Option<ObjectKey>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let config_path = non_empty("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let target_secret = match non_empty("TARGET_SECRET") {
            Some(value) => Some(parse_target_secret(&value)?),
            None => None,
        };

        Ok(Config {
            config_path,
            kube_context: non_empty("KUBECONTEXT"),
            garden_cluster_address: non_empty("GARDEN_CLUSTER_ADDRESS"),
            target_secret,
        })
    }
}

fn parse_target_secret(value: &str) -> Result<ObjectKey> {
    match value.split('/').collect::<Vec<_>>().as_slice() {
        [namespace, name] if !namespace.is_empty() && !name.is_empty() => {
            Ok(ObjectKey::new(*namespace, *name))
        }
        _ => bail!("invalid TARGET_SECRET '{}', expected <namespace>/<name>", value),
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Per-identity token configuration, read from a JSON file.

use crate::constants::DEFAULT_EXPIRATION_SECONDS;
use crate::error::{Result, TokenRotateError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Namespaced reference to a Kubernetes object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Token settings for one identity
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    pub identity: String,
    pub service_account_name: String,
    pub service_account_namespace: String,
    #[serde(default)]
    pub expiration_seconds: i64,
    /// Secret holding the kubeconfig of the cluster the service account lives in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_secret_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_secret_namespace: Option<String>,
}

impl ClusterConfig {
    /// The service account tokens are issued for
    pub fn service_account(&self) -> ObjectKey {
        ObjectKey::new(&self.service_account_namespace, &self.service_account_name)
    }

    /// The kubeconfig Secret to resolve the downstream cluster from, if any
    pub fn target_secret(&self) -> Option<ObjectKey> {
        match (non_empty(&self.target_secret_namespace), non_empty(&self.target_secret_name)) {
            (Some(namespace), Some(name)) => Some(ObjectKey::new(namespace, name)),
            _ => None,
        }
    }

    fn normalize(mut self) -> Result<Self> {
        if self.identity.is_empty() {
            return Err(TokenRotateError::InvalidConfig("identity is required".to_string()));
        }
        if self.service_account_name.is_empty() {
            return Err(TokenRotateError::InvalidConfig(format!(
                "serviceAccountName is required for identity '{}'",
                self.identity
            )));
        }
        if self.service_account_namespace.is_empty() {
            return Err(TokenRotateError::InvalidConfig(format!(
                "serviceAccountNamespace is required for identity '{}'",
                self.identity
            )));
        }
        let has_name = non_empty(&self.target_secret_name).is_some();
        let has_namespace = non_empty(&self.target_secret_namespace).is_some();
        if has_name != has_namespace {
            return Err(TokenRotateError::InvalidConfig(format!(
                "targetSecretName and targetSecretNamespace must be set together for identity '{}'",
                self.identity
            )));
        }
        if self.expiration_seconds <= 0 {
            self.expiration_seconds = DEFAULT_EXPIRATION_SECONDS;
        }
        Ok(self)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// The full configuration file
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ClusterConfigList {
    pub items: Vec<ClusterConfig>,
}

impl ClusterConfigList {
    /// Read and validate the configuration file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            TokenRotateError::ConfigLoad(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_slice(&data)
    }

    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let list: ClusterConfigList = serde_json::from_slice(data)
            .map_err(|e| TokenRotateError::ConfigLoad(format!("failed to unmarshal config: {}", e)))?;
        if list.items.is_empty() {
            return Err(TokenRotateError::InvalidConfig(
                "config contains no items".to_string(),
            ));
        }

        let items = list
            .items
            .into_iter()
            .map(ClusterConfig::normalize)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { items })
    }

    /// First entry configured for `identity`
    pub fn find_by_identity(&self, identity: &str) -> Option<&ClusterConfig> {
        self.items.iter().find(|c| c.identity == identity)
    }
}

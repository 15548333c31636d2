// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Selection of the cluster a config entry's service account lives in.

use crate::error::Result;
use crate::kubernetes::client::{create_client_from_kubeconfig, get_kubeconfig_from_secret};
use crate::types::ClusterConfig;
use async_trait::async_trait;
use kube::Client;
use tracing::{debug, instrument};

/// Produces the client to issue and review tokens with for a config entry
#[async_trait]
pub trait ClientResolver: Send + Sync {
    async fn resolve(&self, cluster: &ClusterConfig) -> Result<Client>;
}

/// Always hands out the same client
#[derive(Clone)]
pub struct StaticClientResolver {
    client: Client,
}

impl StaticClientResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClientResolver for StaticClientResolver {
    async fn resolve(&self, _cluster: &ClusterConfig) -> Result<Client> {
        Ok(self.client.clone())
    }
}

/// Builds a client from the kubeconfig Secret named by the config entry,
/// falling back to the default client for entries that name none.
#[derive(Clone)]
pub struct KubeconfigSecretResolver {
    /// Client the kubeconfig Secrets are read with
    local_client: Client,
    default_client: Client,
}

impl KubeconfigSecretResolver {
    pub fn new(local_client: Client, default_client: Client) -> Self {
        Self {
            local_client,
            default_client,
        }
    }
}

#[async_trait]
impl ClientResolver for KubeconfigSecretResolver {
    #[instrument(skip(self, cluster), fields(identity = %cluster.identity))]
    async fn resolve(&self, cluster: &ClusterConfig) -> Result<Client> {
        let Some(secret_ref) = cluster.target_secret() else {
            debug!("No target secret configured, using default client");
            return Ok(self.default_client.clone());
        };

        let kubeconfig = get_kubeconfig_from_secret(&self.local_client, &secret_ref).await?;
        create_client_from_kubeconfig(&kubeconfig).await
    }
}

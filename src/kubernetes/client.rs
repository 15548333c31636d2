// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client creation for the local, garden and metal clusters

use crate::constants::{fields, garden};
use crate::error::{Result, TokenRotateError};
use crate::types::ObjectKey;
use k8s_openapi::api::core::v1::Secret;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config as KConfig};
use tracing::{info, instrument};

/// Create a client for the cluster the controller runs in, optionally using a
/// named context of the local kubeconfig
pub async fn create_local_client(kube_context: Option<&str>) -> Result<Client> {
    let Some(context) = kube_context else {
        return Ok(Client::try_default().await?);
    };

    let options = KubeConfigOptions {
        context: Some(context.to_string()),
        ..Default::default()
    };
    let config = KConfig::from_kubeconfig(&options).await.map_err(|e| {
        TokenRotateError::KubeconfigError(format!("Failed to load context {}: {}", context, e))
    })?;

    Client::try_from(config)
        .map_err(|e| TokenRotateError::KubeconfigError(format!("Failed to create client: {}", e)))
}

/// Create a client for the garden cluster from the mounted bearer token and CA bundle
pub async fn create_garden_client(api_address: &str) -> Result<Client> {
    if api_address.is_empty() {
        return Err(TokenRotateError::KubeconfigError(
            "garden api address is empty".to_string(),
        ));
    }

    let kubeconfig = garden_kubeconfig(api_address, garden::TOKEN_FILE, garden::ROOT_CA_FILE)?;
    client_from_parsed_kubeconfig(kubeconfig).await
}

fn garden_kubeconfig(api_address: &str, token_file: &str, ca_file: &str) -> Result<Kubeconfig> {
    let kubeconfig = serde_json::json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{
            "name": "garden",
            "cluster": {
                "server": api_address,
                "certificate-authority": ca_file
            }
        }],
        "users": [{
            "name": "garden",
            "user": { "tokenFile": token_file }
        }],
        "contexts": [{
            "name": "garden",
            "context": { "cluster": "garden", "user": "garden" }
        }],
        "current-context": "garden"
    });

    serde_json::from_value(kubeconfig).map_err(|e| {
        TokenRotateError::KubeconfigError(format!("Failed to build garden kubeconfig: {}", e))
    })
}

/// Read the kubeconfig stored under the `kubeconfig` key of a Secret
#[instrument(skip(client), fields(secret = %secret_ref))]
pub async fn get_kubeconfig_from_secret(client: &Client, secret_ref: &ObjectKey) -> Result<String> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), &secret_ref.namespace);

    info!("Getting kubeconfig secret '{}'...", secret_ref);

    let secret = secrets.get(&secret_ref.name).await?;

    let Some(kubeconfig_data) = secret
        .data
        .as_ref()
        .and_then(|data| data.get(fields::KUBECONFIG))
    else {
        return Err(TokenRotateError::MissingKubeconfigKey(secret_ref.to_string()));
    };

    String::from_utf8(kubeconfig_data.0.clone()).map_err(|e| {
        TokenRotateError::KubeconfigError(format!(
            "Failed to decode kubeconfig from secret {}: {}",
            secret_ref, e
        ))
    })
}

/// Create a Kubernetes client from a kubeconfig string
pub async fn create_client_from_kubeconfig(kubeconfig: &str) -> Result<Client> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig).map_err(|e| {
        TokenRotateError::KubeconfigError(format!("Failed to parse kubeconfig: {}", e))
    })?;

    client_from_parsed_kubeconfig(kubeconfig_parsed).await
}

async fn client_from_parsed_kubeconfig(kubeconfig: Kubeconfig) -> Result<Client> {
    let client_config = KConfig::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| TokenRotateError::KubeconfigError(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| TokenRotateError::KubeconfigError(format!("Failed to create client: {}", e)))
}

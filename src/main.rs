// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use metal_token_rotate::config::Config;
use metal_token_rotate::kubernetes::client::get_kubeconfig_from_secret;
use metal_token_rotate::kubernetes::{
    create_client_from_kubeconfig, create_garden_client, create_local_client,
    KubeconfigSecretResolver,
};
use metal_token_rotate::reconcilers::SecretReconciler;
use metal_token_rotate::token::SystemClock;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting metal token rotator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: config_path={}",
        config.config_path.display()
    );

    let local_client = create_local_client(config.kube_context.as_deref()).await?;
    info!(
        "Connected to local cluster (context: {})",
        config.kube_context.as_deref().unwrap_or("current")
    );

    // Tokens are issued on the local cluster unless a target secret points elsewhere
    let metal_client = match &config.target_secret {
        Some(secret_ref) => {
            let kubeconfig = get_kubeconfig_from_secret(&local_client, secret_ref).await?;
            info!("Using metal cluster kubeconfig from secret {}", secret_ref);
            create_client_from_kubeconfig(&kubeconfig).await?
        }
        None => local_client.clone(),
    };

    let garden_client = match &config.garden_cluster_address {
        Some(address) => {
            info!("Connecting to garden cluster at {}", address);
            create_garden_client(address).await?
        }
        None => {
            warn!("GARDEN_CLUSTER_ADDRESS not set, watching secrets on the local cluster");
            local_client.clone()
        }
    };

    let reconciler = SecretReconciler::new(
        garden_client,
        Arc::new(KubeconfigSecretResolver::new(local_client, metal_client)),
        Arc::new(SystemClock),
        config.config_path,
    );

    info!("Starting secret reconciler...");
    reconciler.run().await?;

    info!("Received shutdown signal, see you later");
    Ok(())
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation and downstream cluster resolution.

pub mod client;
pub mod resolver;

pub use client::{create_client_from_kubeconfig, create_garden_client, create_local_client};
pub use resolver::{ClientResolver, KubeconfigSecretResolver, StaticClientResolver};

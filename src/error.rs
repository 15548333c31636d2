// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenRotateError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to load config: {0}")]
    ConfigLoad(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    #[error("Failed to parse kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Secret {0} does not contain a kubeconfig key")]
    MissingKubeconfigKey(String),

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Token request failed: {0}")]
    TokenRequest(String),

    #[error("Reconciliation did not finish within {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, TokenRotateError>;

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The provisioning intent a Secret declares through its annotation.

use crate::constants::annotations;
use crate::error::{Result, TokenRotateError};
use k8s_openapi::api::core::v1::Secret;
use std::str::FromStr;

/// Parsed `<identity>/<namespace>` annotation value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoprovisionIntent {
    /// Key of the cluster config entry governing this Secret
    pub identity: String,
    /// Namespace written into the Secret's `namespace` field
    pub namespace: String,
}

impl AutoprovisionIntent {
    /// Read the intent from a Secret's annotations.
    ///
    /// Returns `None` when the annotation is absent.
    pub fn from_secret(secret: &Secret) -> Option<Result<Self>> {
        secret
            .metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(annotations::AUTOPROVISION))
            .map(|v| v.parse())
    }
}

impl FromStr for AutoprovisionIntent {
    type Err = TokenRotateError;

    fn from_str(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.split('/').collect();
        match parts.as_slice() {
            [identity, namespace] if !identity.is_empty() && !namespace.is_empty() => Ok(Self {
                identity: identity.to_string(),
                namespace: namespace.to_string(),
            }),
            _ => Err(TokenRotateError::InvalidAnnotation(format!(
                "expected <identity>/<namespace>, got '{}'",
                value
            ))),
        }
    }
}

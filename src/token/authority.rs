// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Token review and token request against the cluster that owns the service account.

use crate::error::{Result, TokenRotateError};
use crate::types::ObjectKey;
use async_trait::async_trait;
use k8s_openapi::api::authentication::v1::{
    TokenRequest, TokenRequestSpec, TokenReview, TokenReviewSpec,
};
use k8s_openapi::api::core::v1::ServiceAccount;
use kube::{api::PostParams, Api, Client};
use tracing::{info, instrument};

/// Cluster-side token operations
#[async_trait]
pub trait TokenAuthority: Send + Sync {
    /// Whether the cluster currently accepts `token`
    async fn review(&self, token: &str) -> Result<bool>;

    /// Issue a new token for `service_account`
    async fn request_token(&self, service_account: &ObjectKey, expiration_seconds: i64)
        -> Result<String>;
}

/// [`TokenAuthority`] backed by the authentication API of a cluster
#[derive(Clone)]
pub struct KubeTokenAuthority {
    client: Client,
}

impl KubeTokenAuthority {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenAuthority for KubeTokenAuthority {
    async fn review(&self, token: &str) -> Result<bool> {
        let reviews: Api<TokenReview> = Api::all(self.client.clone());
        let review = TokenReview {
            metadata: Default::default(),
            spec: TokenReviewSpec {
                token: Some(token.to_string()),
                audiences: None,
            },
            status: None,
        };

        let result = reviews.create(&PostParams::default(), &review).await?;
        Ok(result
            .status
            .and_then(|s| s.authenticated)
            .unwrap_or(false))
    }

    async fn request_token(
        &self,
        service_account: &ObjectKey,
        expiration_seconds: i64,
    ) -> Result<String> {
        let accounts: Api<ServiceAccount> =
            Api::namespaced(self.client.clone(), &service_account.namespace);
        let request = TokenRequest {
            metadata: Default::default(),
            spec: TokenRequestSpec {
                audiences: vec![],
                expiration_seconds: Some(expiration_seconds),
                bound_object_ref: None,
            },
            status: None,
        };

        let result = accounts
            .create_token_request(&service_account.name, &PostParams::default(), &request)
            .await?;

        let token = result
            .status
            .map(|s| s.token)
            .ok_or_else(|| TokenRotateError::TokenRequest("response missing status".to_string()))?;
        if token.is_empty() {
            return Err(TokenRotateError::TokenRequest(
                "server returned empty token".to_string(),
            ));
        }
        Ok(token)
    }
}

/// Issue a fresh token for `service_account`
#[instrument(skip(authority, service_account), fields(service_account = %service_account))]
pub async fn mint(
    authority: &dyn TokenAuthority,
    service_account: &ObjectKey,
    expiration_seconds: i64,
) -> Result<String> {
    let token = authority
        .request_token(service_account, expiration_seconds)
        .await?;
    info!("Issued token valid for {}s", expiration_seconds);
    Ok(token)
}

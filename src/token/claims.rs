// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Unverified decoding of the timing claims of a service account JWT.
//!
//! The signature is never checked here; the issuing cluster's TokenReview
//! is the authority on whether a token is valid.

use crate::error::{Result, TokenRotateError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Issued at, Unix seconds
    pub iat: i64,
    /// Expiry, Unix seconds
    pub exp: i64,
}

impl TokenClaims {
    pub fn decode(token: &str) -> Result<Self> {
        let parts: Vec<&str> = token.split('.').collect();
        let [_, payload, _] = parts.as_slice() else {
            return Err(TokenRotateError::MalformedToken(format!(
                "expected 3 segments, found {}",
                parts.len()
            )));
        };

        let decoded = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| TokenRotateError::MalformedToken(format!("failed to decode payload: {}", e)))?;

        serde_json::from_slice(&decoded)
            .map_err(|e| TokenRotateError::MalformedToken(format!("failed to unmarshal claims: {}", e)))
    }

    /// Seconds the token was issued for
    pub fn lifetime_secs(&self) -> i64 {
        self.exp.saturating_sub(self.iat)
    }

    /// Seconds since issuance at `now_millis`
    pub fn age_secs(&self, now_millis: i64) -> i64 {
        (now_millis / 1000).saturating_sub(self.iat)
    }

    /// True once more than half the lifetime has passed at `now_millis`
    pub fn past_half_life(&self, now_millis: i64) -> bool {
        let age_millis = i128::from(now_millis) - i128::from(self.iat) * 1000;
        let lifetime_millis = (i128::from(self.exp) - i128::from(self.iat)) * 1000;
        age_millis * 2 > lifetime_millis
    }
}

#[cfg(test)]
pub(crate) fn encode_test_token(iat: i64, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","kid":"test"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({
            "iss": "https://kubernetes.default.svc",
            "sub": "system:serviceaccount:metal:token-rotate",
            "iat": iat,
            "exp": exp,
        })
        .to_string(),
    );
    format!("{}.{}.c2lnbmF0dXJl", header, payload)
}

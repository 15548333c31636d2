// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Decides whether the token stored in a Secret must be replaced.

use crate::error::Result;
use crate::token::{Clock, TokenAuthority, TokenClaims};
use tracing::debug;

/// A token is replaced when there is none, when the issuing cluster no
/// longer accepts it, or once more than half of its lifetime has passed.
///
/// A token that is accepted but cannot be decoded is an error.
pub async fn needs_refresh(
    current_token: &str,
    authority: &dyn TokenAuthority,
    clock: &dyn Clock,
) -> Result<bool> {
    if current_token.is_empty() {
        debug!("No token present");
        return Ok(true);
    }

    if !authority.review(current_token).await? {
        debug!("Token review reports token as not authenticated");
        return Ok(true);
    }

    let claims = TokenClaims::decode(current_token)?;
    let now_millis = clock.now_unix_millis();
    debug!(
        age_seconds = claims.age_secs(now_millis),
        lifetime_seconds = claims.lifetime_secs(),
        "Evaluated token age"
    );
    Ok(claims.past_half_life(now_millis))
}

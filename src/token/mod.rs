// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Token inspection, freshness policy and issuance.

pub mod authority;
pub mod claims;
pub mod clock;
pub mod freshness;

pub use authority::{mint, KubeTokenAuthority, TokenAuthority};
pub use claims::TokenClaims;
pub use clock::{Clock, SystemClock};
pub use freshness::needs_refresh;

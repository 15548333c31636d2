// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Configuration and annotation types.

pub mod cluster;
pub mod intent;

pub use cluster::{ClusterConfig, ClusterConfigList, ObjectKey};
pub use intent::AutoprovisionIntent;

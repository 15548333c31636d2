// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys used by the token rotator
pub mod annotations {
    /// `<identity>/<namespace>`: marks a Secret for token provisioning
    pub const AUTOPROVISION: &str = "metal.ironcore.dev/autoprovision";
}

/// Data fields written into a managed Secret
pub mod fields {
    pub const TOKEN: &str = "token";
    pub const USERNAME: &str = "username";
    pub const NAMESPACE: &str = "namespace";
    /// Key holding a kubeconfig inside a target cluster Secret
    pub const KUBECONFIG: &str = "kubeconfig";
}

/// Reconciliation timing
pub mod timing {
    /// Delay before a successfully reconciled Secret is checked again
    pub const REQUEUE_SECS: u64 = 120;
    /// Delay before the first retry of a failed reconciliation
    pub const ERROR_REQUEUE_SECS: u64 = 30;
    /// Upper bound of the doubling retry delay
    pub const ERROR_REQUEUE_MAX_SECS: u64 = 300;
    /// Deadline for a single reconciliation
    pub const RECONCILE_TIMEOUT_SECS: u64 = 60;
}

/// Token expiration used when a config entry sets none
pub const DEFAULT_EXPIRATION_SECONDS: i64 = 3600;

/// Location of the token configuration file unless `CONFIG_PATH` overrides it
pub const DEFAULT_CONFIG_PATH: &str = "/etc/metal-token-rotate/config.json";

/// Credentials mounted for the garden cluster
pub mod garden {
    pub const TOKEN_FILE: &str = "/var/run/garden/token/token";
    pub const ROOT_CA_FILE: &str = "/var/run/garden/ca/bundle.crt";
}

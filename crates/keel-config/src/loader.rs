// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./keel.toml` > `~/.config/keel/keel.toml` > `/etc/keel/keel.toml`
//! with environment variable overrides via `KEEL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::KeelConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/keel/keel.toml` (system-wide)
/// 3. `~/.config/keel/keel.toml` (user XDG config)
/// 4. `./keel.toml` (local directory)
/// 5. `KEEL_*` environment variables
pub fn load_config() -> Result<KeelConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<KeelConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeelConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KeelConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KeelConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(KeelConfig::default()))
        .merge(Toml::file("/etc/keel/keel.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("keel/keel.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("keel.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `KEEL_STORE_MAX_HIERARCHY_DEPTH` must map to
/// `store.max_hierarchy_depth`, not `store.max.hierarchy.depth`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("KEEL_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("engine_", "engine.", 1)
            .replacen("store_", "store.", 1)
            .replacen("duplicates_", "duplicates.", 1)
            .replacen("kpi_", "kpi.", 1)
            .replacen("import_", "import.", 1);
        mapped.into()
    })
}

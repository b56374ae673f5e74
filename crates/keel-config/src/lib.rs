// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Keel account engine.
//!
//! TOML files are layered over compiled defaults (system, user and local
//! `keel.toml`), `KEEL_*` environment variables override them, and every
//! failure comes back as a miette diagnostic with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use keel_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("duplicate threshold: {}", config.duplicates.threshold);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    DuplicateConfig, EngineConfig, ImportConfig, KeelConfig, KpiConfig, StoreConfig,
};

/// Load configuration from the standard locations and validate it.
pub fn load_and_validate() -> Result<KeelConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load configuration from an inline TOML document and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<KeelConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<KeelConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

fn finish(
    loaded: Result<KeelConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<KeelConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(
                log_level = %config.engine.log_level,
                threshold = config.duplicates.threshold,
                "configuration loaded"
            );
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Read whichever `keel.toml` files exist so diagnostics can show spans.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = Vec::new();
    candidates.push(
        std::env::current_dir()
            .map(|d| d.join("keel.toml"))
            .unwrap_or_else(|_| "keel.toml".into()),
    );
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("keel/keel.toml"));
    }
    candidates.push("/etc/keel/keel.toml".into());

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}

// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the semantic ranges serde cannot express: duplicate weights must
//! not exceed 100 in total, the threshold must be reachable, and so on.

use crate::diagnostic::ConfigError;
use crate::model::KeelConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// One hundred years.
const MAX_RECENT_ACTIVITY_DAYS: i64 = 36_500;

/// Validate a deserialized configuration.
///
/// Collects every problem instead of failing on the first one.
pub fn validate_config(config: &KeelConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.engine.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "engine.log_level `{}` is not one of {}",
            config.engine.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    let prefix = config.engine.id_prefix.trim();
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push(ConfigError::validation(format!(
            "engine.id_prefix must be non-empty and alphanumeric, got `{}`",
            config.engine.id_prefix
        )));
    }

    if config.engine.actor.trim().is_empty() {
        errors.push(ConfigError::validation("engine.actor must not be empty"));
    }

    if config.store.max_hierarchy_depth < 1 {
        errors.push(ConfigError::validation(
            "store.max_hierarchy_depth must be at least 1",
        ));
    }

    let dup = &config.duplicates;
    if dup.total_weight() > 100 {
        errors.push(ConfigError::validation(format!(
            "duplicates weights must sum to at most 100, got {}",
            dup.total_weight()
        )));
    }
    if dup.threshold == 0 || dup.threshold > 100 {
        errors.push(ConfigError::validation(format!(
            "duplicates.threshold must be between 1 and 100, got {}",
            dup.threshold
        )));
    } else if u32::from(dup.threshold) > dup.total_weight() {
        errors.push(ConfigError::validation(format!(
            "duplicates.threshold {} can never be reached with total weight {}",
            dup.threshold,
            dup.total_weight()
        )));
    }

    if config.kpi.top_accounts < 1 {
        errors.push(ConfigError::validation("kpi.top_accounts must be at least 1"));
    }
    if !(0.0..=100.0).contains(&config.kpi.at_risk_threshold) {
        errors.push(ConfigError::validation(format!(
            "kpi.at_risk_threshold must be within 0..=100, got {}",
            config.kpi.at_risk_threshold
        )));
    }
    if !(1..=MAX_RECENT_ACTIVITY_DAYS).contains(&config.kpi.recent_activity_days) {
        errors.push(ConfigError::validation(format!(
            "kpi.recent_activity_days must be between 1 and {MAX_RECENT_ACTIVITY_DAYS}, got {}",
            config.kpi.recent_activity_days
        )));
    }

    if config.import.batch_size < 1 {
        errors.push(ConfigError::validation("import.batch_size must be at least 1"));
    }
    if let Some(owner) = &config.import.default_owner_id {
        if owner.trim().is_empty() {
            errors.push(ConfigError::validation(
                "import.default_owner_id must not be blank when set",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

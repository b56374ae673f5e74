// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Keel account engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Keel configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeelConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Account store behaviour.
    #[serde(default)]
    pub store: StoreConfig,

    /// Duplicate detection weights and threshold.
    #[serde(default)]
    pub duplicates: DuplicateConfig,

    /// KPI aggregation settings.
    #[serde(default)]
    pub kpi: KpiConfig,

    /// CSV import settings.
    #[serde(default)]
    pub import: ImportConfig,
}

/// Process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prefix of generated account ids (`<prefix>_<millis>_<random>`).
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// Actor name stamped into `created_by`/`updated_by`.
    #[serde(default = "default_actor")]
    pub actor: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            id_prefix: default_id_prefix(),
            actor: default_actor(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_id_prefix() -> String {
    "acc".to_string()
}

fn default_actor() -> String {
    "system".to_string()
}

/// Account store behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Maximum number of parent links followed when walking a hierarchy.
    #[serde(default = "default_max_hierarchy_depth")]
    pub max_hierarchy_depth: usize,

    /// Delete activities, notes, documents and links together with their account.
    /// When false they are kept as orphans and hidden from account-scoped reads.
    #[serde(default = "default_cascade_on_delete")]
    pub cascade_on_delete: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_hierarchy_depth: default_max_hierarchy_depth(),
            cascade_on_delete: default_cascade_on_delete(),
        }
    }
}

fn default_max_hierarchy_depth() -> usize {
    32
}

fn default_cascade_on_delete() -> bool {
    true
}

/// Duplicate detection weights. A pair is flagged when the summed weight
/// of matching fields reaches `threshold`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DuplicateConfig {
    #[serde(default = "default_name_weight")]
    pub name_weight: u8,

    #[serde(default = "default_email_weight")]
    pub email_weight: u8,

    #[serde(default = "default_phone_weight")]
    pub phone_weight: u8,

    #[serde(default = "default_website_weight")]
    pub website_weight: u8,

    /// Minimum summed score (1-100) for a pair to be reported.
    #[serde(default = "default_duplicate_threshold")]
    pub threshold: u8,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            name_weight: default_name_weight(),
            email_weight: default_email_weight(),
            phone_weight: default_phone_weight(),
            website_weight: default_website_weight(),
            threshold: default_duplicate_threshold(),
        }
    }
}

impl DuplicateConfig {
    /// Sum of all field weights, i.e. the best possible score.
    pub fn total_weight(&self) -> u32 {
        u32::from(self.name_weight)
            + u32::from(self.email_weight)
            + u32::from(self.phone_weight)
            + u32::from(self.website_weight)
    }
}

fn default_name_weight() -> u8 {
    40
}

fn default_email_weight() -> u8 {
    30
}

fn default_phone_weight() -> u8 {
    20
}

fn default_website_weight() -> u8 {
    10
}

fn default_duplicate_threshold() -> u8 {
    50
}

/// KPI aggregation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KpiConfig {
    /// Length of the top-by-revenue ranking.
    #[serde(default = "default_top_accounts")]
    pub top_accounts: usize,

    /// Accounts with a health score strictly below this are "at risk".
    #[serde(default = "default_at_risk_threshold")]
    pub at_risk_threshold: f64,

    /// Trailing window for "recent activity", in days.
    #[serde(default = "default_recent_activity_days")]
    pub recent_activity_days: i64,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            top_accounts: default_top_accounts(),
            at_risk_threshold: default_at_risk_threshold(),
            recent_activity_days: default_recent_activity_days(),
        }
    }
}

fn default_top_accounts() -> usize {
    10
}

fn default_at_risk_threshold() -> f64 {
    50.0
}

fn default_recent_activity_days() -> i64 {
    30
}

/// CSV import settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    /// Rows applied per store lock acquisition in background imports.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Owner assigned to imported rows that do not map an owner column.
    #[serde(default)]
    pub default_owner_id: Option<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            default_owner_id: None,
        }
    }
}

fn default_batch_size() -> usize {
    500
}

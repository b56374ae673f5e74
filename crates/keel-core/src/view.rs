// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filter specifications and saved views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AccountSize, AccountStatus, AccountType, Rating, SortDirection};

/// Inclusive numeric bounds; a missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// A conjunction of optional predicate groups. Empty lists and `None`
/// mean "no constraint"; values inside one list are alternatives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountFilter {
    /// Case-insensitive substring over name, description, industry, email.
    pub search: Option<String>,
    pub types: Vec<AccountType>,
    pub industries: Vec<String>,
    pub sizes: Vec<AccountSize>,
    pub statuses: Vec<AccountStatus>,
    pub ratings: Vec<Rating>,
    pub owner_ids: Vec<String>,
    /// Passes when the account shares at least one tag.
    pub tags: Vec<String>,
    pub health_score_range: Option<NumericRange>,
    pub revenue_range: Option<NumericRange>,
}

impl AccountFilter {
    /// True when no predicate is set.
    pub fn is_empty(&self) -> bool {
        self.search.as_deref().is_none_or(|s| s.trim().is_empty())
            && self.types.is_empty()
            && self.industries.is_empty()
            && self.sizes.is_empty()
            && self.statuses.is_empty()
            && self.ratings.is_empty()
            && self.owner_ids.is_empty()
            && self.tags.is_empty()
            && self.health_score_range.is_none()
            && self.revenue_range.is_none()
    }
}

/// Sort key of a saved view. `field` uses the names accepted by
/// `Account::field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// A named, saved filter + column + sort configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub filter: AccountFilter,
    pub columns: Vec<String>,
    pub sort: Option<SortSpec>,
    pub is_default: bool,
    pub is_shared: bool,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a saved view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewView {
    pub name: String,
    pub description: Option<String>,
    pub filter: AccountFilter,
    pub columns: Vec<String>,
    pub sort: Option<SortSpec>,
    pub is_default: bool,
    pub is_shared: bool,
    pub owner_id: String,
}

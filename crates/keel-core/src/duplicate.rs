// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Detected duplicate candidate pairs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::account::Account;
use crate::types::DuplicateStatus;

/// A field that contributed to a duplicate score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    Name,
    Email,
    Phone,
    Website,
}

/// A candidate pair of accounts that may describe the same organisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountDuplicate {
    pub id: String,
    pub account_id_1: String,
    pub account_id_2: String,
    /// Snapshot of the first account at detection time.
    pub account_1: Account,
    /// Snapshot of the second account at detection time.
    pub account_2: Account,
    /// 0-100.
    pub confidence_score: u8,
    /// In weight-table order: name, email, phone, website.
    pub matching_fields: Vec<MatchField>,
    pub status: DuplicateStatus,
    pub detected_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
}

impl AccountDuplicate {
    /// Whether either side of the pair is `account_id`.
    pub fn involves(&self, account_id: &str) -> bool {
        self.account_id_1 == account_id || self.account_id_2 == account_id
    }
}

// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Closed classification enums shared by every Keel entity.
//!
//! Every enum renders and parses as `snake_case` both through serde and
//! through `Display`/`FromStr`, so the same spelling is used in JSON,
//! CSV imports, workflow conditions and configuration.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Relationship category of an account.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString,
    EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Not yet buying.
    #[default]
    Prospect,
    /// Has an active or past contract.
    Customer,
    /// Resells, integrates or co-sells.
    Partner,
    /// Supplies us.
    Vendor,
    /// Tracked for competitive intelligence.
    Competitor,
}

/// Company size bucket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum AccountSize {
    /// Early stage, typically under 10 employees.
    Startup,
    /// Up to 50 employees.
    Small,
    /// Up to 500 employees.
    Medium,
    /// Up to 5,000 employees.
    Large,
    /// Above 5,000 employees.
    Enterprise,
}

/// Lifecycle status of an account.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString,
    EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Counted as active in KPIs.
    #[default]
    Active,
    /// No current engagement.
    Inactive,
    /// Kept for history only.
    Archived,
    /// Temporarily on hold (billing, legal).
    Suspended,
}

/// Qualitative temperature of an account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    /// Ready to buy or expand.
    Hot,
    /// Engaged but not committed.
    Warm,
    /// Little or no engagement.
    Cold,
}

/// Priority shared by accounts and activities.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString,
    EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Kind of interaction logged against an account.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Call,
    Email,
    Meeting,
    #[default]
    Task,
    Demo,
    Proposal,
    FollowUp,
    Other,
}

/// Progress of an activity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

/// Discriminator for account notes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    #[default]
    General,
    Meeting,
    Call,
    Risk,
    Opportunity,
    Competitive,
    Internal,
}

/// Discriminator for account documents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Contract,
    Proposal,
    Invoice,
    Presentation,
    Report,
    #[default]
    Other,
}

/// Confidentiality of a document.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Shareable outside the company.
    Public,
    /// Any signed-in user.
    #[default]
    Internal,
    /// The account team only.
    Confidential,
    /// Named users only.
    Restricted,
}

/// How much sway a linked contact has over the account.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum InfluenceLevel {
    Low,
    #[default]
    Medium,
    High,
    DecisionMaker,
}

/// Review state of a detected duplicate pair.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateStatus {
    /// Awaiting review.
    #[default]
    Pending,
    /// A reviewer agreed the pair is a duplicate.
    Confirmed,
    /// A reviewer rejected the pair.
    NotDuplicate,
    /// The pair was marked merged.
    Merged,
    /// Dismissed without a decision.
    Ignored,
}

/// Reviewer decision applied to a duplicate candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateAction {
    /// Mark the pair merged; the merge itself is separate.
    Merge,
    /// Reject the pair.
    NotDuplicate,
    /// Dismiss the pair.
    Ignore,
}

impl DuplicateAction {
    /// The status a duplicate record moves to under this decision.
    pub fn resulting_status(self) -> DuplicateStatus {
        match self {
            DuplicateAction::Merge => DuplicateStatus::Merged,
            DuplicateAction::NotDuplicate => DuplicateStatus::NotDuplicate,
            DuplicateAction::Ignore => DuplicateStatus::Ignored,
        }
    }
}

/// Ordering direction of a saved view's sort key.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duplicate detection and merge resolution.
//!
//! Detection scores every unordered account pair by summing configured
//! weights of the fields that match (name, email, phone, website) and
//! reports pairs at or above the threshold. Merging folds N secondary
//! accounts into a primary according to a per-entity strategy.
//!
//! Detection compares all pairs: O(n^2) with no blocking or index. That is
//! fine for in-memory account volumes; it is the engine's scaling limit.

pub mod detector;
pub mod merge;
pub mod scoring;

pub use detector::DuplicateDetector;
pub use merge::{
    merge_accounts, CustomFieldStrategy, MergeReport, MergeRequest, MergeStrategy, MovedCounts,
    RecordStrategy,
};
pub use scoring::{score_pair, MatchScore};

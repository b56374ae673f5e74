// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! All-pairs duplicate detection.

use chrono::{DateTime, Utc};
use keel_config::DuplicateConfig;
use keel_core::{Account, AccountDuplicate, DuplicateStatus, IdGenerator};
use tracing::{debug, info};

use crate::scoring::{score_pair, MatchScore};

/// Id prefix of duplicate candidates.
pub const DUPLICATE_PREFIX: &str = "dup";

/// Weighted pairwise duplicate detector.
#[derive(Debug, Clone, Default)]
pub struct DuplicateDetector {
    config: DuplicateConfig,
}

impl DuplicateDetector {
    pub fn new(config: &DuplicateConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.config.threshold
    }

    pub fn score(&self, a: &Account, b: &Account) -> MatchScore {
        score_pair(a, b, &self.config)
    }

    pub fn is_duplicate(&self, a: &Account, b: &Account) -> bool {
        self.score(a, b).score >= self.config.threshold
    }

    /// Scan every unordered pair `(i, j)`, `i < j`, and emit a pending
    /// candidate for each pair at or above the threshold. Output order
    /// follows the pair order, so the same input yields the same scores and
    /// fields on every run; only ids and `detected_at` differ.
    pub fn detect(
        &self,
        accounts: &[Account],
        ids: &dyn IdGenerator,
        now: DateTime<Utc>,
    ) -> Vec<AccountDuplicate> {
        let mut found = Vec::new();
        for (i, a) in accounts.iter().enumerate() {
            for b in &accounts[i + 1..] {
                let MatchScore { score, fields } = self.score(a, b);
                if score < self.config.threshold {
                    continue;
                }
                debug!(
                    account_id_1 = %a.id,
                    account_id_2 = %b.id,
                    score,
                    "duplicate candidate"
                );
                found.push(AccountDuplicate {
                    id: ids.next_id(DUPLICATE_PREFIX, now),
                    account_id_1: a.id.clone(),
                    account_id_2: b.id.clone(),
                    account_1: a.clone(),
                    account_2: b.clone(),
                    confidence_score: score,
                    matching_fields: fields,
                    status: DuplicateStatus::Pending,
                    detected_at: now,
                    resolved_at: None,
                    resolved_by: None,
                });
            }
        }
        info!(
            accounts = accounts.len(),
            candidates = found.len(),
            threshold = self.config.threshold,
            "duplicate detection finished"
        );
        found
    }

    /// Existing accounts that `candidate` would duplicate, best score first.
    pub fn find_matches<'a>(
        &self,
        candidate: &Account,
        accounts: &'a [Account],
    ) -> Vec<(&'a Account, MatchScore)> {
        let mut matches: Vec<(&Account, MatchScore)> = accounts
            .iter()
            .filter(|existing| existing.id != candidate.id)
            .map(|existing| (existing, self.score(candidate, existing)))
            .filter(|(_, s)| s.score >= self.config.threshold)
            .collect();
        matches.sort_by(|a, b| b.1.score.cmp(&a.1.score));
        matches
    }
}

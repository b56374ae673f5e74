// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pairwise similarity score.

use keel_config::DuplicateConfig;
use keel_core::{Account, MatchField};

/// Score of one account pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchScore {
    /// Sum of matching weights, capped at 100.
    pub score: u8,
    /// Matching fields in weight-table order.
    pub fields: Vec<MatchField>,
}

/// Score `a` against `b`. Symmetric by construction: every comparison is.
///
/// A field matches only when both sides have a non-blank value. Name,
/// email and website compare case-insensitively, phone exactly.
pub fn score_pair(a: &Account, b: &Account, weights: &DuplicateConfig) -> MatchScore {
    let checks = [
        (
            MatchField::Name,
            weights.name_weight,
            same_ci(Some(a.name.as_str()), Some(b.name.as_str())),
        ),
        (
            MatchField::Email,
            weights.email_weight,
            same_ci(a.email.as_deref(), b.email.as_deref()),
        ),
        (
            MatchField::Phone,
            weights.phone_weight,
            same_exact(a.phone.as_deref(), b.phone.as_deref()),
        ),
        (
            MatchField::Website,
            weights.website_weight,
            same_ci(a.website.as_deref(), b.website.as_deref()),
        ),
    ];

    let mut total: u32 = 0;
    let mut fields = Vec::new();
    for (field, weight, matched) in checks {
        if matched {
            total += u32::from(weight);
            fields.push(field);
        }
    }
    MatchScore {
        score: total.min(100) as u8,
        fields,
    }
}

/// Blank values never match; others compare as stored.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn same_ci(a: Option<&str>, b: Option<&str>) -> bool {
    match (present(a), present(b)) {
        (Some(x), Some(y)) => x.to_lowercase() == y.to_lowercase(),
        _ => false,
    }
}

fn same_exact(a: Option<&str>, b: Option<&str>) -> bool {
    match (present(a), present(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

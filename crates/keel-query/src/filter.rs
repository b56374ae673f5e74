// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The account filter predicate.
//!
//! A filter is a conjunction of predicate groups; inside one group the
//! listed values are alternatives. Unset groups always pass.

use keel_core::{Account, AccountFilter, NumericRange};

/// Accounts passing `filter`, in input order.
pub fn filter_accounts<'a, I>(accounts: I, filter: &AccountFilter) -> Vec<&'a Account>
where
    I: IntoIterator<Item = &'a Account>,
{
    if filter.is_empty() {
        return accounts.into_iter().collect();
    }
    let search = search_needle(filter);
    accounts
        .into_iter()
        .filter(|account| passes(account, filter, search.as_deref()))
        .collect()
}

/// Whether a single account passes every predicate of `filter`.
pub fn matches(account: &Account, filter: &AccountFilter) -> bool {
    let search = search_needle(filter);
    passes(account, filter, search.as_deref())
}

/// The lowercased search text, as typed. A blank search is no search.
fn search_needle(filter: &AccountFilter) -> Option<String> {
    filter
        .search
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_lowercase)
}

fn passes(account: &Account, filter: &AccountFilter, search: Option<&str>) -> bool {
    if let Some(needle) = search {
        if !matches_search(account, needle) {
            return false;
        }
    }
    any_of(&filter.types, |t| *t == account.account_type)
        && any_of(&filter.industries, |i| account.industry.as_deref() == Some(i.as_str()))
        && any_of(&filter.sizes, |s| account.account_size == Some(*s))
        && any_of(&filter.statuses, |s| *s == account.status)
        && any_of(&filter.ratings, |r| account.rating == Some(*r))
        && any_of(&filter.owner_ids, |o| *o == account.owner_id)
        && any_of(&filter.tags, |t| account.has_tag(t))
        && in_range(filter.health_score_range, account.health_score)
        && in_range(filter.revenue_range, account.annual_revenue)
}

/// Empty groups are unset and pass.
fn any_of<T>(allowed: &[T], pred: impl Fn(&T) -> bool) -> bool {
    allowed.is_empty() || allowed.iter().any(pred)
}

/// Absent values count as 0.
fn in_range(range: Option<NumericRange>, value: Option<f64>) -> bool {
    range.is_none_or(|r| r.contains(value.unwrap_or(0.0)))
}

/// `needle` is already lowercased.
fn matches_search(account: &Account, needle: &str) -> bool {
    let hit = |text: &str| text.to_lowercase().contains(needle);
    hit(&account.name)
        || account.description.as_deref().is_some_and(hit)
        || account.industry.as_deref().is_some_and(hit)
        || account.email.as_deref().is_some_and(hit)
}

#[cfg(test)]
mod tests {
    use keel_core::{AccountStatus, AccountType, NumericRange};
    use keel_test_utils::AccountBuilder;

    use super::*;

    #[test]
    fn empty_filter_keeps_everything_in_order() {
        let accounts = vec![
            AccountBuilder::new("B").build(),
            AccountBuilder::new("A").build(),
        ];
        let names: Vec<&str> = filter_accounts(&accounts, &AccountFilter::default())
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let accounts = vec![
            AccountBuilder::new("Acme").build(),
            AccountBuilder::new("Globex").industry("Aerospace").build(),
            AccountBuilder::new("Initech").email("ops@ACME-partners.io").build(),
            AccountBuilder::new("Hooli").description("search company").build(),
        ];
        let filter = AccountFilter {
            search: Some("acme".into()),
            ..Default::default()
        };
        let names: Vec<&str> = filter_accounts(&accounts, &filter)
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["Acme", "Initech"]);

        let filter = AccountFilter {
            search: Some("AERO".into()),
            ..Default::default()
        };
        assert_eq!(filter_accounts(&accounts, &filter).len(), 1);
    }

    #[test]
    fn search_text_is_not_trimmed() {
        let accounts = vec![
            AccountBuilder::new("Acme Corp").build(),
            AccountBuilder::new("Acmecorp").build(),
        ];
        let filter = AccountFilter {
            search: Some(" corp".into()),
            ..Default::default()
        };
        let names: Vec<&str> = filter_accounts(&accounts, &filter)
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["Acme Corp"]);

        let blank = AccountFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(filter_accounts(&accounts, &blank).len(), 2);
    }

    #[test]
    fn values_within_a_group_are_alternatives() {
        let accounts = vec![
            AccountBuilder::new("A").account_type(AccountType::Customer).build(),
            AccountBuilder::new("B").account_type(AccountType::Partner).build(),
            AccountBuilder::new("C").account_type(AccountType::Vendor).build(),
        ];
        let filter = AccountFilter {
            types: vec![AccountType::Customer, AccountType::Vendor],
            ..Default::default()
        };
        assert_eq!(filter_accounts(&accounts, &filter).len(), 2);
    }

    #[test]
    fn tags_need_nonempty_intersection() {
        let accounts = vec![
            AccountBuilder::new("A").tags(&["VIP", "renewal"]).build(),
            AccountBuilder::new("B").tags(&["expansion"]).build(),
            AccountBuilder::new("C").build(),
        ];
        let filter = AccountFilter {
            tags: vec!["vip".into(), "churn".into()],
            ..Default::default()
        };
        let names: Vec<&str> = filter_accounts(&accounts, &filter)
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["A"]);
    }

    #[test]
    fn missing_score_counts_as_zero() {
        let unscored = AccountBuilder::new("A").build();
        let at_most = AccountFilter {
            health_score_range: Some(NumericRange::at_most(10.0)),
            ..Default::default()
        };
        assert!(matches(&unscored, &at_most));
        let at_least = AccountFilter {
            health_score_range: Some(NumericRange::at_least(1.0)),
            ..Default::default()
        };
        assert!(!matches(&unscored, &at_least));
    }

    #[test]
    fn revenue_bounds_are_inclusive() {
        let account = AccountBuilder::new("A").revenue(1_000_000.0).build();
        let filter = AccountFilter {
            revenue_range: Some(NumericRange::between(1_000_000.0, 2_000_000.0)),
            ..Default::default()
        };
        assert!(matches(&account, &filter));
    }

    #[test]
    fn active_high_health_scenario() {
        let accounts: Vec<_> = [92.0, 85.0, 78.0, 88.0, 58.0]
            .iter()
            .enumerate()
            .map(|(i, score)| {
                AccountBuilder::new(&format!("Account {i}"))
                    .status(AccountStatus::Active)
                    .health(*score)
                    .build()
            })
            .collect();
        let filter = AccountFilter {
            statuses: vec![AccountStatus::Active],
            health_score_range: Some(NumericRange::at_least(80.0)),
            ..Default::default()
        };
        let scores: Vec<f64> = filter_accounts(&accounts, &filter)
            .iter()
            .filter_map(|a| a.health_score)
            .collect();
        assert_eq!(scores, vec![92.0, 85.0, 88.0]);
    }
}

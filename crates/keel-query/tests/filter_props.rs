// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for the filter engine.

use keel_core::{
    Account, AccountFilter, AccountStatus, AccountType, AccountView, NumericRange, SortSpec,
};
use keel_query::{apply_view, filter_accounts};
use keel_test_utils::{fixed_now, sample_accounts, AccountBuilder};
use proptest::prelude::*;

const STATUSES: [AccountStatus; 4] = [
    AccountStatus::Active,
    AccountStatus::Inactive,
    AccountStatus::Archived,
    AccountStatus::Suspended,
];
const TYPES: [AccountType; 3] = [
    AccountType::Prospect,
    AccountType::Customer,
    AccountType::Partner,
];
const TAGS: [&str; 3] = ["vip", "renewal", "expansion"];

fn account_strategy() -> impl Strategy<Value = (usize, usize, Option<u8>, usize)> {
    (0..4usize, 0..3usize, proptest::option::of(0..=100u8), 0..4usize)
}

fn build(i: usize, (status, kind, health, tag): (usize, usize, Option<u8>, usize)) -> Account {
    let mut builder = AccountBuilder::new(&format!("Account {i}"))
        .status(STATUSES[status])
        .account_type(TYPES[kind]);
    if let Some(h) = health {
        builder = builder.health(f64::from(h));
    }
    if tag < TAGS.len() {
        builder = builder.tags(&[TAGS[tag]]);
    }
    builder.build()
}

fn filter_strategy() -> impl Strategy<Value = AccountFilter> {
    (
        proptest::sample::subsequence(STATUSES.to_vec(), 0..=2),
        proptest::sample::subsequence(TYPES.to_vec(), 0..=2),
        proptest::option::of((0..=100u8, 0..=100u8)),
        proptest::sample::subsequence(TAGS.to_vec(), 0..=2),
    )
        .prop_map(|(statuses, types, range, tags)| AccountFilter {
            statuses,
            types,
            health_score_range: range.map(|(a, b)| {
                NumericRange::between(f64::from(a.min(b)), f64::from(a.max(b)))
            }),
            tags: tags.into_iter().map(String::from).collect(),
            ..Default::default()
        })
}

/// Split one filter into two independent halves.
fn split(filter: &AccountFilter) -> (AccountFilter, AccountFilter) {
    let first = AccountFilter {
        statuses: filter.statuses.clone(),
        health_score_range: filter.health_score_range,
        ..Default::default()
    };
    let second = AccountFilter {
        types: filter.types.clone(),
        tags: filter.tags.clone(),
        ..Default::default()
    };
    (first, second)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

    #[test]
    fn conjunction_equals_sequential_filtering(
        specs in proptest::collection::vec(account_strategy(), 0..40),
        filter in filter_strategy(),
    ) {
        let accounts: Vec<Account> = specs.into_iter().enumerate().map(|(i, s)| build(i, s)).collect();
        let (p1, p2) = split(&filter);

        let combined: Vec<&str> = filter_accounts(&accounts, &filter)
            .iter().map(|a| a.id.as_str()).collect();
        let staged = filter_accounts(&accounts, &p1);
        let sequential: Vec<&str> = filter_accounts(staged, &p2)
            .iter().map(|a| a.id.as_str()).collect();

        prop_assert_eq!(combined, sequential);
    }

    #[test]
    fn filtered_result_is_an_ordered_subset(
        seed in any::<u64>(),
        filter in filter_strategy(),
    ) {
        let accounts = sample_accounts(30, seed);
        let result = filter_accounts(&accounts, &filter);
        let mut cursor = accounts.iter();
        for kept in result {
            prop_assert!(cursor.any(|a| std::ptr::eq(a, kept)), "order not preserved");
        }
    }
}

#[test]
fn view_filters_then_sorts() {
    let accounts = [
        AccountBuilder::new("Low").health(81.0).build(),
        AccountBuilder::new("Out").health(20.0).build(),
        AccountBuilder::new("High").health(99.0).build(),
    ];
    let view = AccountView {
        id: "view_1".into(),
        name: "Healthy".into(),
        description: None,
        filter: AccountFilter {
            health_score_range: Some(NumericRange::at_least(80.0)),
            ..Default::default()
        },
        columns: vec!["name".into(), "health_score".into()],
        sort: Some(SortSpec::desc("healthScore")),
        is_default: false,
        is_shared: true,
        owner_id: "u1".into(),
        created_at: fixed_now(),
        updated_at: fixed_now(),
    };
    let names: Vec<&str> = apply_view(&accounts, &view)
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["High", "Low"]);
}

// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for duplicate detection and merging.

use keel_config::DuplicateConfig;
use keel_core::{
    Account, ContactLink, FieldValue, KeelError, NewActivity, NewNote, SequentialIds,
};
use keel_dedupe::{
    merge_accounts, score_pair, CustomFieldStrategy, DuplicateDetector, MergeRequest,
    MergeStrategy, RecordStrategy,
};
use keel_store::AccountStore;
use keel_test_utils::{fixed_now, sample_accounts, AccountBuilder};
use proptest::prelude::*;

fn field_strategy() -> BoxedStrategy<Option<String>> {
    proptest::option::of(prop_oneof![
        Just("Acme".to_string()),
        Just("acme".to_string()),
        Just("Globex".to_string()),
        Just(" ".to_string()),
    ])
    .boxed()
}

fn account_from(id: &str, fields: [Option<String>; 4]) -> Account {
    let [name, email, phone, website] = fields;
    let mut account = AccountBuilder::new(name.as_deref().unwrap_or("")).id(id).build();
    account.email = email;
    account.phone = phone;
    account.website = website;
    account
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, ..ProptestConfig::default() })]

    #[test]
    fn score_is_symmetric(
        a in proptest::array::uniform4(field_strategy()),
        b in proptest::array::uniform4(field_strategy()),
    ) {
        let x = account_from("x", a);
        let y = account_from("y", b);
        let weights = DuplicateConfig::default();
        prop_assert_eq!(score_pair(&x, &y, &weights), score_pair(&y, &x, &weights));
    }

    #[test]
    fn detection_is_idempotent(seed in any::<u64>()) {
        let accounts = sample_accounts(30, seed);
        let detector = DuplicateDetector::default();
        let summarize = |run: Vec<keel_core::AccountDuplicate>| {
            run.into_iter()
                .map(|d| (d.account_id_1, d.account_id_2, d.confidence_score, d.matching_fields))
                .collect::<Vec<_>>()
        };
        let first = summarize(detector.detect(&accounts, &SequentialIds::new(), fixed_now()));
        let second = summarize(detector.detect(&accounts, &SequentialIds::new(), fixed_now()));
        prop_assert_eq!(first, second);
    }
}

fn store_with(accounts: Vec<Account>) -> AccountStore {
    let mut store = AccountStore::default();
    store.restore_accounts(accounts).expect("restore");
    store
}

#[test]
fn merge_removes_secondaries_and_keeps_primary() {
    let mut store = store_with(vec![
        AccountBuilder::new("A").id("a").build(),
        AccountBuilder::new("B").id("b").build(),
        AccountBuilder::new("C").id("c").build(),
    ]);
    let report = merge_accounts(
        &mut store,
        &MergeRequest {
            primary_account_id: "a".into(),
            secondary_account_ids: vec!["b".into(), "c".into()],
            ..Default::default()
        },
    )
    .expect("merge");

    assert!(store.get_account("b").is_none());
    assert!(store.get_account("c").is_none());
    assert!(store.get_account("a").is_some());
    assert_eq!(report.merged_ids, vec!["b".to_string(), "c".to_string()]);
}

#[test]
fn merge_with_missing_primary_is_not_found() {
    let mut store = store_with(vec![AccountBuilder::new("B").id("b").build()]);
    let err = merge_accounts(
        &mut store,
        &MergeRequest {
            primary_account_id: "ghost".into(),
            secondary_account_ids: vec!["b".into()],
            ..Default::default()
        },
    )
    .expect_err("primary missing");
    assert!(matches!(err, KeelError::NotFound { .. }), "got: {err}");
    assert!(store.get_account("b").is_some());
}

#[test]
fn merge_moves_or_drops_records_per_strategy() {
    let mut store = store_with(vec![
        AccountBuilder::new("A").id("a").build(),
        AccountBuilder::new("B").id("b").build(),
        AccountBuilder::new("Kid").id("kid").parent("b").build(),
    ]);
    store
        .add_activity(NewActivity {
            account_id: "b".into(),
            subject: "QBR".into(),
            ..Default::default()
        })
        .unwrap();
    store
        .add_note(NewNote {
            account_id: "b".into(),
            content: "old note".into(),
            ..Default::default()
        })
        .unwrap();
    store.link_contact("b", "contact_1", ContactLink::default()).unwrap();

    let report = merge_accounts(
        &mut store,
        &MergeRequest {
            primary_account_id: "a".into(),
            secondary_account_ids: vec!["b".into(), "zzz".into(), "a".into()],
            strategy: MergeStrategy {
                notes: RecordStrategy::KeepPrimary,
                ..Default::default()
            },
            preserve_history: true,
        },
    )
    .unwrap();

    assert_eq!(report.missing_ids, vec!["zzz".to_string()]);
    assert_eq!(report.moved.activities, 1);
    assert_eq!(report.moved.contacts, 1);
    assert_eq!(report.moved.notes, 0);
    assert_eq!(report.moved.children, 1);
    assert_eq!(store.activities_for("a").len(), 1);
    assert_eq!(store.contacts_for("a").len(), 1);
    assert_eq!(
        store.get_account("kid").unwrap().parent_account_id.as_deref(),
        Some("a")
    );
    let notes: Vec<&str> = store
        .notes_for("a")
        .iter()
        .map(|n| n.content.as_str())
        .collect();
    assert_eq!(notes, vec!["Merged account B (b)"]);
}

#[test]
fn prefer_secondary_overwrites_custom_fields() {
    let mut store = store_with(vec![
        AccountBuilder::new("A").id("a").custom("tier", "gold").build(),
        AccountBuilder::new("B")
            .id("b")
            .custom("tier", "silver")
            .custom("region", "emea")
            .build(),
    ]);
    let report = merge_accounts(
        &mut store,
        &MergeRequest {
            primary_account_id: "a".into(),
            secondary_account_ids: vec!["b".into()],
            strategy: MergeStrategy {
                custom_fields: CustomFieldStrategy::PreferSecondary,
                ..Default::default()
            },
            preserve_history: false,
        },
    )
    .unwrap();
    assert_eq!(report.account.custom_fields["tier"], FieldValue::from("silver"));
    assert_eq!(report.account.custom_fields["region"], FieldValue::from("emea"));
}

#[test]
fn merge_request_deserializes_with_defaults() {
    let request: MergeRequest = serde_json::from_str(
        r#"{"primary_account_id":"a","secondary_account_ids":["b"],
            "strategy":{"documents":"keep_primary","custom_fields":"merge"}}"#,
    )
    .unwrap();
    assert_eq!(request.strategy.documents, RecordStrategy::KeepPrimary);
    assert_eq!(request.strategy.contacts, RecordStrategy::MoveAll);
    assert_eq!(request.strategy.custom_fields, CustomFieldStrategy::Merge);
    assert!(!request.preserve_history);
}

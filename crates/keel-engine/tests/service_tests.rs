// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of the account service.

use std::sync::Arc;

use keel_config::{load_and_validate_str, KeelConfig};
use keel_core::{
    AccountFilter, AccountPatch, AccountStatus, ActionKind, ConditionOperator, DuplicateAction,
    DuplicateStatus, FieldValue, MatchField, NewWorkflow, NumericRange, SequentialIds,
    TriggerType, WorkflowCondition, WorkflowTrigger,
};
use keel_engine::{
    AccountService, ExecutionOutcome, FieldMapping, ImportOptions, LoggingDispatcher,
    MergeRequest, SharedAccountService,
};
use keel_store::AccountStore;
use keel_test_utils::{fixed_clock, AccountBuilder};
use tracing_test::traced_test;

fn service() -> AccountService {
    let config = KeelConfig::default();
    let store = AccountStore::new(&config.store, &config.engine)
        .with_clock(fixed_clock())
        .with_ids(Arc::new(SequentialIds::new()));
    AccountService::with_store(store, &config)
}

#[test]
fn acme_pair_is_detected_and_merged() {
    let mut service = service();
    let a = service
        .create_account(AccountBuilder::new("Acme").email("a@acme.com").draft())
        .unwrap();
    let b = service
        .create_account(AccountBuilder::new("Acme").email("a@acme.com").draft())
        .unwrap();

    let found = service.detect_duplicates();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].confidence_score, 70);
    assert_eq!(found[0].matching_fields, vec![MatchField::Name, MatchField::Email]);

    assert!(service.resolve_duplicate(&found[0].id, DuplicateAction::Merge));
    assert_eq!(
        service.store().get_duplicate(&found[0].id).unwrap().status,
        DuplicateStatus::Merged
    );

    let report = service
        .merge_accounts(&MergeRequest {
            primary_account_id: a.id.clone(),
            secondary_account_ids: vec![b.id.clone()],
            ..Default::default()
        })
        .unwrap();
    assert_eq!(report.merged_ids, vec![b.id.clone()]);
    assert!(service.get_account(&b.id).is_none());
    assert!(service.get_account(&a.id).is_some());
}

#[test]
fn health_filter_scenario() {
    let mut service = service();
    for (i, health) in [92.0, 85.0, 78.0, 88.0, 58.0].into_iter().enumerate() {
        service
            .create_account(
                AccountBuilder::new(&format!("Account {i}"))
                    .health(health)
                    .draft(),
            )
            .unwrap();
    }
    service.apply_filter(AccountFilter {
        statuses: vec![AccountStatus::Active],
        health_score_range: Some(NumericRange {
            min: Some(80.0),
            max: None,
        }),
        ..Default::default()
    });
    let scores: Vec<f64> = service
        .filtered_accounts()
        .iter()
        .filter_map(|a| a.health_score)
        .collect();
    assert_eq!(scores, vec![92.0, 85.0, 88.0]);
    assert_eq!(service.filtered_kpis().total_accounts, 3);
    assert_eq!(service.kpis().total_accounts, 5);
}

#[test]
#[traced_test]
fn store_mutations_fire_workflows() {
    let dispatcher = Arc::new(LoggingDispatcher::new());
    let mut service = service().with_dispatcher(dispatcher.clone());
    service
        .create_workflow(NewWorkflow {
            name: "welcome".into(),
            trigger: WorkflowTrigger::on(TriggerType::Created),
            actions: vec![ActionKind::SendEmail {
                to: None,
                subject: "Welcome aboard".into(),
                body: None,
            }
            .into()],
            is_active: true,
            ..Default::default()
        })
        .unwrap();
    let churn = service
        .create_workflow(NewWorkflow {
            name: "churn watch".into(),
            trigger: WorkflowTrigger::on(TriggerType::StatusChanged),
            conditions: vec![WorkflowCondition::new(
                "status",
                ConditionOperator::Equals,
                Some(FieldValue::from("suspended")),
            )],
            actions: vec![ActionKind::AddTag {
                tag: "churn-risk".into(),
            }
            .into()],
            is_active: true,
            ..Default::default()
        })
        .unwrap();

    let account = service
        .create_account(AccountBuilder::new("Acme").email("ops@acme.com").draft())
        .unwrap();
    assert_eq!(dispatcher.dispatched().len(), 1);

    service
        .update_account(
            &account.id,
            AccountPatch {
                status: Some(AccountStatus::Suspended),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(service.get_account(&account.id).unwrap().has_tag("churn-risk"));

    let executions = service.drain_executions();
    assert_eq!(executions.len(), 2);
    assert!(executions
        .iter()
        .all(|r| r.outcome == ExecutionOutcome::Succeeded));
    assert_eq!(
        service
            .store()
            .get_workflow(&churn.id)
            .unwrap()
            .stats
            .success_count(),
        1
    );
    assert!(service.drain_executions().is_empty());
    assert!(logs_contain("workflow executed"));
}

#[test]
fn configured_threshold_changes_detection() {
    let config = load_and_validate_str("[duplicates]\nthreshold = 40\n").unwrap();
    let mut service = AccountService::new(&config);
    service
        .create_account(AccountBuilder::new("Acme").draft())
        .unwrap();
    service
        .create_account(AccountBuilder::new("ACME").draft())
        .unwrap();
    assert_eq!(service.detect_duplicates().len(), 1);
}

#[tokio::test]
async fn background_import_runs_in_batches() {
    let mut config = KeelConfig::default();
    config.import.batch_size = 2;
    let shared = SharedAccountService::new(AccountService::new(&config));

    let mut csv = String::from("name,industry\n");
    for i in 0..5 {
        csv.push_str(&format!("Company {i},Retail\n"));
    }
    let handle = shared.spawn_import(
        csv,
        FieldMapping::new(),
        ImportOptions {
            default_owner_id: Some("user_1".into()),
            ..Default::default()
        },
    );
    let result = handle.await.unwrap().unwrap();
    assert_eq!(result.imported, 5);
    assert_eq!(shared.read().await.store().len(), 5);
    assert_eq!(shared.read().await.kpis().accounts_by_industry["Retail"], 5);
}

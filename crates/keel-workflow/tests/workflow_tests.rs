// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for workflow execution against a live store.

use std::sync::Arc;

use keel_core::{
    AccountStatus, ActionKind, ConditionOperator, FieldValue, KeelError, NewWorkflow,
    TriggerType, WorkflowAction, WorkflowCondition, WorkflowTrigger,
};
use keel_store::AccountStore;
use keel_test_utils::{fixed_clock, AccountBuilder};
use keel_workflow::{
    AccountEvent, ActionDispatcher, DispatchedAction, ExecutionOutcome, LoggingDispatcher,
    WorkflowEngine,
};
use proptest::prelude::*;
use tracing_test::traced_test;

struct RejectingDispatcher;

impl ActionDispatcher for RejectingDispatcher {
    fn dispatch(&self, _action: &DispatchedAction) -> Result<(), KeelError> {
        Err(KeelError::Internal("gateway down".into()))
    }
}

fn store() -> AccountStore {
    let mut store = AccountStore::default().with_clock(fixed_clock());
    store
        .restore_accounts(vec![
            AccountBuilder::new("Acme").health(35.0).email("ops@acme.com").build(),
            AccountBuilder::new("Globex").health(90.0).build(),
        ])
        .unwrap();
    store
}

fn workflow(
    store: &mut AccountStore,
    trigger: WorkflowTrigger,
    conditions: Vec<WorkflowCondition>,
    actions: Vec<WorkflowAction>,
) -> String {
    store
        .create_workflow(NewWorkflow {
            name: "test".into(),
            trigger,
            conditions,
            actions,
            is_active: true,
            ..Default::default()
        })
        .unwrap()
        .id
}

fn at_risk() -> WorkflowCondition {
    WorkflowCondition::new(
        "health_score",
        ConditionOperator::LessThan,
        Some(FieldValue::Number(50.0)),
    )
}

#[test]
fn low_health_update_tags_and_creates_task() {
    let mut store = store();
    let engine = WorkflowEngine::default();
    let wf = workflow(
        &mut store,
        WorkflowTrigger::on_field_change("healthScore"),
        vec![at_risk()],
        vec![
            ActionKind::AddTag { tag: "at-risk".into() }.into(),
            ActionKind::CreateTask {
                subject: "Review account".into(),
                due_in_days: Some(2),
                assignee: None,
            }
            .into(),
        ],
    );

    let update = store
        .set_scores("acc_acme", Some(20.0), None)
        .unwrap()
        .unwrap();
    let reports = engine.handle_event(&mut store, &AccountEvent::Updated(update));
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, ExecutionOutcome::Succeeded);
    assert_eq!(reports[0].actions_run, 2);
    assert!(store.get_account("acc_acme").unwrap().has_tag("at-risk"));
    assert_eq!(store.activities_for("acc_acme").len(), 1);

    let stats = &store.get_workflow(&wf).unwrap().stats;
    assert_eq!(stats.success_count(), 1);
    assert_eq!(stats.execution_count(), 1);
}

#[test]
fn unmet_conditions_are_not_counted() {
    let mut store = store();
    let engine = WorkflowEngine::default();
    let wf = workflow(
        &mut store,
        WorkflowTrigger::on(TriggerType::Manual),
        vec![at_risk()],
        vec![ActionKind::AddTag { tag: "x".into() }.into()],
    );
    let report = engine.run_workflow(&mut store, &wf, "acc_globex").unwrap();
    assert_eq!(report.outcome, ExecutionOutcome::ConditionsNotMet);
    assert_eq!(store.get_workflow(&wf).unwrap().stats.execution_count(), 0);
}

#[test]
#[traced_test]
fn failing_action_stops_the_run_and_records_the_error() {
    let mut store = store();
    let engine = WorkflowEngine::new(Arc::new(RejectingDispatcher));
    let wf = workflow(
        &mut store,
        WorkflowTrigger::on(TriggerType::Manual),
        vec![],
        vec![
            ActionKind::AddTag { tag: "first".into() }.into(),
            ActionKind::Webhook {
                url: "https://hooks.example.com/acct".into(),
                method: None,
            }
            .into(),
            ActionKind::AddTag { tag: "never".into() }.into(),
        ],
    );
    let report = engine.run_workflow(&mut store, &wf, "acc_acme").unwrap();
    assert!(matches!(report.outcome, ExecutionOutcome::Failed(_)));
    assert_eq!(report.actions_run, 1);

    let account = store.get_account("acc_acme").unwrap();
    assert!(account.has_tag("first"));
    assert!(!account.has_tag("never"));

    let stats = &store.get_workflow(&wf).unwrap().stats;
    assert_eq!(stats.failure_count(), 1);
    assert!(stats.last_error().unwrap().contains("webhook failed"));
    assert!(logs_contain("workflow execution failed"));

    assert!(matches!(
        report.into_result(),
        Err(KeelError::ExecutionFailure { .. })
    ));
}

#[test]
fn out_of_range_task_due_date_is_recorded_as_failure() {
    let mut store = store();
    let engine = WorkflowEngine::default();
    let wf = workflow(
        &mut store,
        WorkflowTrigger::on(TriggerType::Manual),
        vec![],
        vec![ActionKind::CreateTask {
            subject: "Far future".into(),
            due_in_days: Some(1_000_000_000_000),
            assignee: None,
        }
        .into()],
    );
    let report = engine.run_workflow(&mut store, &wf, "acc_acme").unwrap();
    assert!(matches!(report.outcome, ExecutionOutcome::Failed(_)));
    assert!(store.activities_for("acc_acme").is_empty());

    let stats = &store.get_workflow(&wf).unwrap().stats;
    assert_eq!(stats.failure_count(), 1);
    assert_eq!(stats.execution_count(), 1);
    assert!(stats.last_error().unwrap().contains("out of range"));
}

#[test]
fn action_guard_skips_single_actions() {
    let mut store = store();
    let dispatcher = Arc::new(LoggingDispatcher::new());
    let engine = WorkflowEngine::new(dispatcher.clone());
    let mut guarded: WorkflowAction = ActionKind::SendEmail {
        to: None,
        subject: "Check-in".into(),
        body: None,
    }
    .into();
    guarded.condition = Some(WorkflowCondition::new("email", ConditionOperator::IsNotEmpty, None));
    let wf = workflow(
        &mut store,
        WorkflowTrigger::on(TriggerType::TimeBased),
        vec![],
        vec![guarded, ActionKind::AddTag { tag: "pinged".into() }.into()],
    );

    let reports = engine.run_scheduled(&mut store);
    assert_eq!(reports.len(), 2);
    let globex = reports.iter().find(|r| r.account_id == "acc_globex").unwrap();
    assert_eq!(globex.actions_skipped, 1);
    assert_eq!(globex.actions_run, 1);
    assert_eq!(dispatcher.dispatched().len(), 1);
    assert_eq!(store.get_workflow(&wf).unwrap().stats.success_count(), 2);
}

#[test]
fn inactive_workflows_do_not_fire() {
    let mut store = store();
    let engine = WorkflowEngine::default();
    let wf = workflow(
        &mut store,
        WorkflowTrigger::on(TriggerType::StatusChanged),
        vec![],
        vec![ActionKind::AddTag { tag: "moved".into() }.into()],
    );
    store.update_workflow(
        &wf,
        keel_core::WorkflowPatch {
            is_active: Some(false),
            ..Default::default()
        },
    );
    let update = store
        .modify_account("acc_acme", |a| {
            a.status = AccountStatus::Inactive;
            Ok(())
        })
        .unwrap()
        .unwrap();
    assert!(engine
        .handle_event(&mut store, &AccountEvent::Updated(update))
        .is_empty());
    assert!(matches!(
        engine.run_workflow(&mut store, &wf, "acc_acme"),
        Err(KeelError::Validation(_))
    ));
}

#[test]
fn workflow_mutations_do_not_retrigger() {
    let mut store = store();
    let engine = WorkflowEngine::default();
    let wf = workflow(
        &mut store,
        WorkflowTrigger::on(TriggerType::Updated),
        vec![],
        vec![ActionKind::AddTag { tag: "touched".into() }.into()],
    );
    let update = store
        .modify_account("acc_acme", |a| {
            a.industry = Some("Retail".into());
            Ok(())
        })
        .unwrap()
        .unwrap();
    engine.handle_event(&mut store, &AccountEvent::Updated(update));
    assert_eq!(store.get_workflow(&wf).unwrap().stats.execution_count(), 1);
}

#[test]
fn manual_run_reports_missing_records() {
    let mut store = store();
    let engine = WorkflowEngine::default();
    assert!(matches!(
        engine.run_workflow(&mut store, "wf_missing", "acc_acme"),
        Err(KeelError::NotFound { .. })
    ));
    let wf = workflow(&mut store, WorkflowTrigger::default(), vec![], vec![]);
    assert!(matches!(
        engine.run_workflow(&mut store, &wf, "acc_missing"),
        Err(KeelError::NotFound { .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

    /// execution_count == success_count + failure_count after any mix of
    /// runs, and every run that passes its conditions is counted once.
    #[test]
    fn counters_stay_consistent(runs in proptest::collection::vec((any::<bool>(), any::<bool>()), 0..24)) {
        let mut store = store();
        let engine = WorkflowEngine::new(Arc::new(RejectingDispatcher));
        let ok = workflow(
            &mut store,
            WorkflowTrigger::default(),
            vec![at_risk()],
            vec![ActionKind::AddTag { tag: "ok".into() }.into()],
        );
        let failing = workflow(
            &mut store,
            WorkflowTrigger::default(),
            vec![at_risk()],
            vec![ActionKind::SendNotification { recipient: "user_1".into(), message: "hi".into() }.into()],
        );

        let mut counted = 0u64;
        for (use_failing, at_risk_account) in runs {
            let wf = if use_failing { &failing } else { &ok };
            let account = if at_risk_account { "acc_acme" } else { "acc_globex" };
            let report = engine.run_workflow(&mut store, wf, account).unwrap();
            if report.outcome != ExecutionOutcome::ConditionsNotMet {
                counted += 1;
            }
        }

        let mut total = 0;
        for id in [&ok, &failing] {
            let stats = &store.get_workflow(id).unwrap().stats;
            prop_assert_eq!(stats.execution_count(), stats.success_count() + stats.failure_count());
            total += stats.execution_count();
        }
        prop_assert_eq!(total, counted);
    }
}

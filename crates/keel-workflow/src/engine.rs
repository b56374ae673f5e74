// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trigger matching and workflow execution.

use std::sync::Arc;

use keel_core::account::canonical_field_name;
use keel_core::{Account, AccountWorkflow, KeelError, TriggerType, WorkflowTrigger};
use keel_store::{AccountStore, AccountUpdate};
use serde::Serialize;
use strum::Display;
use tracing::{debug, info, warn};

use crate::action::{execute_action, ActionDispatcher, LoggingDispatcher};
use crate::condition::{evaluate_condition, evaluate_conditions};

/// Something that happened to an account and may start workflows.
#[derive(Debug, Clone)]
pub enum AccountEvent {
    Created(Account),
    Updated(AccountUpdate),
}

impl AccountEvent {
    pub fn account_id(&self) -> &str {
        match self {
            AccountEvent::Created(account) => &account.id,
            AccountEvent::Updated(update) => &update.after.id,
        }
    }
}

/// How one workflow execution ended.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case", tag = "outcome", content = "error")]
pub enum ExecutionOutcome {
    Succeeded,
    Failed(String),
    /// The condition list did not hold; nothing ran and nothing was counted.
    ConditionsNotMet,
}

/// Result of running one workflow against one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub workflow_id: String,
    pub account_id: String,
    pub outcome: ExecutionOutcome,
    /// Actions that ran to completion.
    pub actions_run: usize,
    /// Actions whose own guard condition was false.
    pub actions_skipped: usize,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> bool {
        self.outcome == ExecutionOutcome::Succeeded
    }

    /// Convert a failed execution into [`KeelError::ExecutionFailure`].
    pub fn into_result(self) -> Result<Self, KeelError> {
        match &self.outcome {
            ExecutionOutcome::Failed(message) => Err(KeelError::ExecutionFailure {
                workflow_id: self.workflow_id,
                message: message.clone(),
            }),
            _ => Ok(self),
        }
    }
}

/// Runs workflows stored in an [`AccountStore`].
#[derive(Clone)]
pub struct WorkflowEngine {
    dispatcher: Arc<dyn ActionDispatcher>,
}

impl Default for WorkflowEngine {
    fn default() -> Self {
        Self::new(Arc::new(LoggingDispatcher::new()))
    }
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine").finish_non_exhaustive()
    }
}

impl WorkflowEngine {
    pub fn new(dispatcher: Arc<dyn ActionDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Ids of active workflows whose trigger matches `event`.
    pub fn matching_workflows(store: &AccountStore, event: &AccountEvent) -> Vec<String> {
        store
            .workflows()
            .iter()
            .filter(|w| w.is_active && trigger_matches(&w.trigger, event))
            .map(|w| w.id.clone())
            .collect()
    }

    /// Run every active workflow triggered by `event`.
    pub fn handle_event(&self, store: &mut AccountStore, event: &AccountEvent) -> Vec<ExecutionReport> {
        let matched = Self::matching_workflows(store, event);
        if !matched.is_empty() {
            debug!(
                account_id = %event.account_id(),
                workflows = matched.len(),
                "event matched workflows"
            );
        }
        matched
            .iter()
            .filter_map(|id| self.execute(store, id, event.account_id()))
            .collect()
    }

    /// Manually run one workflow against one account.
    ///
    /// Inactive workflows are rejected; the trigger type is not checked.
    pub fn run_workflow(
        &self,
        store: &mut AccountStore,
        workflow_id: &str,
        account_id: &str,
    ) -> Result<ExecutionReport, KeelError> {
        let workflow = store
            .get_workflow(workflow_id)
            .ok_or_else(|| KeelError::not_found("workflow", workflow_id))?;
        if !workflow.is_active {
            return Err(KeelError::Validation(format!(
                "workflow {workflow_id} is inactive"
            )));
        }
        if !store.contains_account(account_id) {
            return Err(KeelError::not_found("account", account_id));
        }
        self.execute(store, workflow_id, account_id)
            .ok_or_else(|| KeelError::Internal(format!("workflow {workflow_id} vanished")))
    }

    /// One scheduler tick: run every active `time_based` workflow against
    /// every account.
    pub fn run_scheduled(&self, store: &mut AccountStore) -> Vec<ExecutionReport> {
        let workflow_ids: Vec<String> = store
            .workflows()
            .iter()
            .filter(|w| w.is_active && w.trigger.trigger_type == TriggerType::TimeBased)
            .map(|w| w.id.clone())
            .collect();
        let account_ids: Vec<String> = store.accounts().iter().map(|a| a.id.clone()).collect();
        let mut reports = Vec::new();
        for workflow_id in &workflow_ids {
            for account_id in &account_ids {
                reports.extend(self.execute(store, workflow_id, account_id));
            }
        }
        info!(
            workflows = workflow_ids.len(),
            accounts = account_ids.len(),
            executed = reports.iter().filter(|r| r.outcome != ExecutionOutcome::ConditionsNotMet).count(),
            "scheduled workflows run"
        );
        reports
    }

    /// Evaluate conditions, run actions in order, count the outcome.
    ///
    /// Returns `None` when the workflow or account no longer exists.
    fn execute(
        &self,
        store: &mut AccountStore,
        workflow_id: &str,
        account_id: &str,
    ) -> Option<ExecutionReport> {
        let workflow: AccountWorkflow = store.get_workflow(workflow_id)?.clone();
        let account = store.get_account(account_id)?;

        let mut report = ExecutionReport {
            workflow_id: workflow.id.clone(),
            account_id: account_id.to_string(),
            outcome: ExecutionOutcome::ConditionsNotMet,
            actions_run: 0,
            actions_skipped: 0,
        };
        if !evaluate_conditions(account, &workflow.conditions) {
            debug!(workflow_id, account_id, "conditions not met");
            return Some(report);
        }

        for action in &workflow.actions {
            if let Some(delay) = action.delay_minutes {
                debug!(workflow_id, delay_minutes = delay, "delay requested, running now");
            }
            if let Some(guard) = &action.condition {
                let holds = store
                    .get_account(account_id)
                    .is_some_and(|current| evaluate_condition(current, guard));
                if !holds {
                    report.actions_skipped += 1;
                    continue;
                }
            }
            if let Err(e) =
                execute_action(store, self.dispatcher.as_ref(), workflow_id, account_id, &action.kind)
            {
                let message = format!("{} failed: {e}", action.kind.action_type());
                warn!(workflow_id, account_id, error = %message, "workflow execution failed");
                store.record_workflow_outcome(workflow_id, Some(&message));
                report.outcome = ExecutionOutcome::Failed(message);
                return Some(report);
            }
            report.actions_run += 1;
        }

        store.record_workflow_outcome(workflow_id, None);
        info!(
            workflow_id,
            account_id,
            actions = report.actions_run,
            skipped = report.actions_skipped,
            "workflow executed"
        );
        report.outcome = ExecutionOutcome::Succeeded;
        Some(report)
    }
}

/// Whether `trigger` fires for `event`.
///
/// `updated` fires on any update, `status_changed` only when the status
/// moved, and `field_changed` when its field (any field if unset) is among
/// the changed ones. `time_based` and `manual` never fire on events.
pub fn trigger_matches(trigger: &WorkflowTrigger, event: &AccountEvent) -> bool {
    match (trigger.trigger_type, event) {
        (TriggerType::Created, AccountEvent::Created(_)) => true,
        (TriggerType::Updated, AccountEvent::Updated(_)) => true,
        (TriggerType::StatusChanged, AccountEvent::Updated(update)) => update.status_changed(),
        (TriggerType::FieldChanged, AccountEvent::Updated(update)) => {
            let changed = update.changed_fields();
            match &trigger.field {
                Some(field) => {
                    let watched = watched_field(field);
                    changed.iter().any(|c| *c == watched)
                }
                None => !changed.is_empty(),
            }
        }
        _ => false,
    }
}

/// Custom keys keep their `custom.` prefix; built-ins are canonicalized.
fn watched_field(field: &str) -> String {
    let field = field.trim();
    if field.starts_with("custom.") {
        field.to_string()
    } else {
        canonical_field_name(field)
    }
}

#[cfg(test)]
mod tests {
    use keel_core::{AccountStatus, WorkflowTrigger};
    use keel_test_utils::AccountBuilder;

    use super::*;

    fn update(edit: impl FnOnce(&mut Account)) -> AccountEvent {
        let before = AccountBuilder::new("Acme").build();
        let mut after = before.clone();
        edit(&mut after);
        AccountEvent::Updated(AccountUpdate { before, after })
    }

    #[test]
    fn created_trigger_only_fires_on_create() {
        let trigger = WorkflowTrigger::on(TriggerType::Created);
        assert!(trigger_matches(
            &trigger,
            &AccountEvent::Created(AccountBuilder::new("Acme").build())
        ));
        assert!(!trigger_matches(&trigger, &update(|a| a.industry = Some("Retail".into()))));
    }

    #[test]
    fn status_trigger_needs_a_status_change() {
        let trigger = WorkflowTrigger::on(TriggerType::StatusChanged);
        assert!(trigger_matches(&trigger, &update(|a| a.status = AccountStatus::Inactive)));
        assert!(!trigger_matches(&trigger, &update(|a| a.industry = Some("Retail".into()))));
    }

    #[test]
    fn field_trigger_accepts_camel_case_names() {
        let trigger = WorkflowTrigger::on_field_change("healthScore");
        assert!(trigger_matches(&trigger, &update(|a| a.health_score = Some(10.0))));
        assert!(!trigger_matches(&trigger, &update(|a| a.engagement_score = Some(10.0))));
        assert!(!trigger_matches(
            &trigger,
            &AccountEvent::Created(AccountBuilder::new("Acme").build())
        ));
    }

    #[test]
    fn scheduled_and_manual_triggers_ignore_events() {
        for kind in [TriggerType::TimeBased, TriggerType::Manual] {
            let trigger = WorkflowTrigger::on(kind);
            assert!(!trigger_matches(&trigger, &update(|a| a.status = AccountStatus::Inactive)));
        }
    }

    #[test]
    fn failed_report_converts_to_execution_failure() {
        let report = ExecutionReport {
            workflow_id: "wf_1".into(),
            account_id: "acc_1".into(),
            outcome: ExecutionOutcome::Failed("webhook failed: boom".into()),
            actions_run: 0,
            actions_skipped: 0,
        };
        assert!(matches!(
            report.into_result(),
            Err(KeelError::ExecutionFailure { workflow_id, .. }) if workflow_id == "wf_1"
        ));
    }
}

// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Action execution.
//!
//! Actions that change account data write through the store. Actions that
//! reach outside the engine are handed to an [`ActionDispatcher`] with their
//! parameters resolved against the account.

use std::sync::Mutex;

use chrono::Duration;
use keel_core::{
    Account, ActionKind, ActivityStatus, ActivityType, KeelError, NewActivity, Priority,
};
use keel_store::AccountStore;
use serde::Serialize;
use tracing::{debug, info};

/// An outbound action ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchedAction {
    pub workflow_id: String,
    pub account_id: String,
    /// Parameters after defaults were filled in (e.g. the email recipient).
    pub kind: ActionKind,
}

/// Delivery seam for outbound actions: `send_email`, `send_notification`,
/// `webhook` and `create_deal`.
///
/// An `Err` fails the action and, with it, the workflow execution.
pub trait ActionDispatcher: Send + Sync {
    fn dispatch(&self, action: &DispatchedAction) -> Result<(), KeelError>;
}

/// Dispatcher that logs each action and keeps it in memory.
#[derive(Debug, Default)]
pub struct LoggingDispatcher {
    sent: Mutex<Vec<DispatchedAction>>,
}

impl LoggingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything dispatched so far, oldest first.
    pub fn dispatched(&self) -> Vec<DispatchedAction> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ActionDispatcher for LoggingDispatcher {
    fn dispatch(&self, action: &DispatchedAction) -> Result<(), KeelError> {
        info!(
            workflow_id = %action.workflow_id,
            account_id = %action.account_id,
            action = action.kind.action_type(),
            "action dispatched"
        );
        self.sent
            .lock()
            .map_err(|_| KeelError::Internal("dispatch log lock poisoned".into()))?
            .push(action.clone());
        Ok(())
    }
}

/// Run a single action for `account_id` on behalf of `workflow_id`.
pub fn execute_action(
    store: &mut AccountStore,
    dispatcher: &dyn ActionDispatcher,
    workflow_id: &str,
    account_id: &str,
    kind: &ActionKind,
) -> Result<(), KeelError> {
    debug!(workflow_id, account_id, action = kind.action_type(), "running action");
    match kind {
        ActionKind::CreateTask {
            subject,
            due_in_days,
            assignee,
        } => {
            let scheduled_at = match due_in_days {
                Some(days) => Some(
                    Duration::try_days(*days)
                        .and_then(|delta| store.now().checked_add_signed(delta))
                        .ok_or_else(|| {
                            KeelError::Validation(format!("task due in {days} days is out of range"))
                        })?,
                ),
                None => None,
            };
            store.add_activity(NewActivity {
                account_id: account_id.to_string(),
                activity_type: ActivityType::Task,
                subject: subject.clone(),
                scheduled_at,
                status: ActivityStatus::Planned,
                priority: Priority::Medium,
                participants: assignee.iter().cloned().collect(),
                ..Default::default()
            })?;
        }
        ActionKind::CreateActivity {
            activity_type,
            subject,
            description,
        } => {
            store.add_activity(NewActivity {
                account_id: account_id.to_string(),
                activity_type: *activity_type,
                subject: subject.clone(),
                description: description.clone(),
                status: ActivityStatus::Completed,
                ..Default::default()
            })?;
        }
        ActionKind::AssignUser { user_id } => {
            if user_id.trim().is_empty() {
                return Err(KeelError::Validation("assign_user needs a user id".into()));
            }
            modify(store, account_id, |account| {
                account.owner_id.clone_from(user_id);
                Ok(())
            })?;
        }
        ActionKind::UpdateField { field, value } => {
            modify(store, account_id, |account| {
                account.set_field(field, value.clone())
            })?;
        }
        ActionKind::UpdateStatus { status } => {
            modify(store, account_id, |account| {
                account.status = *status;
                Ok(())
            })?;
        }
        ActionKind::AddTag { tag } => {
            modify(store, account_id, |account| {
                account.add_tag(tag);
                Ok(())
            })?;
        }
        ActionKind::SendEmail { to, subject, body } => {
            let account = require(store, account_id)?;
            let recipient = to
                .clone()
                .filter(|t| !t.trim().is_empty())
                .or_else(|| account.email.clone())
                .ok_or_else(|| {
                    KeelError::Validation(format!(
                        "send_email: account {account_id} has no email address"
                    ))
                })?;
            let kind = ActionKind::SendEmail {
                to: Some(recipient),
                subject: subject.clone(),
                body: body.clone(),
            };
            dispatch(dispatcher, workflow_id, account_id, kind)?;
        }
        ActionKind::SendNotification { .. }
        | ActionKind::Webhook { .. }
        | ActionKind::CreateDeal { .. } => {
            require(store, account_id)?;
            dispatch(dispatcher, workflow_id, account_id, kind.clone())?;
        }
    }
    Ok(())
}

fn require<'a>(store: &'a AccountStore, account_id: &str) -> Result<&'a Account, KeelError> {
    store
        .get_account(account_id)
        .ok_or_else(|| KeelError::not_found("account", account_id))
}

fn modify<F>(store: &mut AccountStore, account_id: &str, edit: F) -> Result<(), KeelError>
where
    F: FnOnce(&mut Account) -> Result<(), KeelError>,
{
    store
        .modify_account(account_id, edit)?
        .map(|_| ())
        .ok_or_else(|| KeelError::not_found("account", account_id))
}

fn dispatch(
    dispatcher: &dyn ActionDispatcher,
    workflow_id: &str,
    account_id: &str,
    kind: ActionKind,
) -> Result<(), KeelError> {
    dispatcher.dispatch(&DispatchedAction {
        workflow_id: workflow_id.to_string(),
        account_id: account_id.to_string(),
        kind,
    })
}

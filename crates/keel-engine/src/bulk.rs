// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk actions over a list of account ids.

use keel_core::{AccountPatch, AccountStatus, KeelError};
use keel_workflow::AccountEvent;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::service::AccountService;

/// The change applied to every selected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BulkOperation {
    UpdateStatus { status: AccountStatus },
    UpdateOwner { owner_id: String },
    AddTags { tags: Vec<String> },
    Delete,
}

impl BulkOperation {
    fn name(&self) -> &'static str {
        match self {
            BulkOperation::UpdateStatus { .. } => "update_status",
            BulkOperation::UpdateOwner { .. } => "update_owner",
            BulkOperation::AddTags { .. } => "add_tags",
            BulkOperation::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkAction {
    pub account_ids: Vec<String>,
    #[serde(flatten)]
    pub operation: BulkOperation,
}

/// An id the operation was rejected for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFailure {
    pub account_id: String,
    pub message: String,
}

/// Per-id outcome of a bulk action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkActionReport {
    pub succeeded: Vec<String>,
    pub missing: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

impl BulkActionReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }
}

impl AccountService {
    /// Apply `action` to each id in order. Updates fire workflows exactly
    /// like single updates do. Repeated ids are processed once.
    pub fn execute_bulk_action(&mut self, action: &BulkAction) -> BulkActionReport {
        let mut report = BulkActionReport::default();
        let mut seen: Vec<&str> = Vec::with_capacity(action.account_ids.len());
        for id in &action.account_ids {
            if seen.contains(&id.as_str()) {
                continue;
            }
            seen.push(id);
            match self.apply_bulk(id, &action.operation) {
                Ok(true) => report.succeeded.push(id.clone()),
                Ok(false) => report.missing.push(id.clone()),
                Err(e) => {
                    warn!(account_id = %id, error = %e, "bulk action rejected");
                    report.failed.push(BulkFailure {
                        account_id: id.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
        info!(
            operation = action.operation.name(),
            succeeded = report.succeeded.len(),
            missing = report.missing.len(),
            failed = report.failed.len(),
            "bulk action executed"
        );
        report
    }

    /// `Ok(false)` when the account does not exist.
    fn apply_bulk(&mut self, id: &str, operation: &BulkOperation) -> Result<bool, KeelError> {
        let update = match operation {
            BulkOperation::Delete => return Ok(self.store.delete_account(id).is_some()),
            BulkOperation::UpdateStatus { status } => self.store.update_account(
                id,
                AccountPatch {
                    status: Some(*status),
                    ..Default::default()
                },
            )?,
            BulkOperation::UpdateOwner { owner_id } => {
                if owner_id.trim().is_empty() {
                    return Err(KeelError::Validation("owner id must not be empty".into()));
                }
                self.store.update_account(
                    id,
                    AccountPatch {
                        owner_id: Some(owner_id.clone()),
                        ..Default::default()
                    },
                )?
            }
            BulkOperation::AddTags { tags } => self.store.modify_account(id, |account| {
                for tag in tags {
                    account.add_tag(tag);
                }
                Ok(())
            })?,
        };
        let Some(update) = update else {
            return Ok(false);
        };
        self.fire(AccountEvent::Updated(update));
        Ok(true)
    }
}

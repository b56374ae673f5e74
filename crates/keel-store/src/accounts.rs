// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account CRUD, hierarchy walks and delete cascade.

use std::collections::HashSet;

use keel_core::{Account, AccountPatch, KeelError, NewAccount};
use tracing::{debug, info, warn};

use crate::AccountStore;

/// Before/after snapshots of one successful account mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountUpdate {
    pub before: Account,
    pub after: Account,
}

impl AccountUpdate {
    /// Fields whose value changed, audit fields excluded.
    pub fn changed_fields(&self) -> Vec<String> {
        self.after.changed_fields(&self.before)
    }

    pub fn status_changed(&self) -> bool {
        self.before.status != self.after.status
    }
}

impl AccountStore {
    /// All accounts in insertion order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn get_account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn contains_account(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.accounts.iter().position(|a| a.id == id)
    }

    /// Create an account with a generated id and `created_at == updated_at == now`.
    ///
    /// Fails with [`KeelError::Validation`] when a score is out of range or
    /// the parent does not exist.
    pub fn create_account(&mut self, draft: NewAccount) -> Result<Account, KeelError> {
        let account = Account::from_new(self.mint_account_id(), draft, self.actor(), self.now());
        account.validate()?;
        if let Some(parent) = &account.parent_account_id {
            self.check_parent(&account.id, parent)?;
        }
        info!(account_id = %account.id, name = %account.name, "account created");
        self.accounts.push(account.clone());
        Ok(account)
    }

    /// Load already-materialized accounts (e.g. from a JSON snapshot),
    /// keeping their ids and audit fields.
    ///
    /// The batch is rejected as a whole when an id repeats, a record is
    /// invalid, or a parent link dangles or cycles.
    pub fn restore_accounts(&mut self, accounts: Vec<Account>) -> Result<usize, KeelError> {
        let mut seen: HashSet<String> = self.accounts.iter().map(|a| a.id.clone()).collect();
        for account in &accounts {
            account.validate()?;
            if !seen.insert(account.id.clone()) {
                return Err(KeelError::Validation(format!(
                    "duplicate account id {}",
                    account.id
                )));
            }
        }

        let start = self.accounts.len();
        let count = accounts.len();
        self.accounts.extend(accounts);
        for index in start..self.accounts.len() {
            let account = &self.accounts[index];
            if let Some(parent) = &account.parent_account_id {
                if let Err(err) = self.check_parent(&account.id, parent) {
                    self.accounts.truncate(start);
                    return Err(err);
                }
            }
        }
        info!(count, "accounts restored");
        Ok(count)
    }

    /// Merge `patch` into an existing account.
    ///
    /// A missing id is a no-op returning `Ok(None)`.
    pub fn update_account(
        &mut self,
        id: &str,
        patch: AccountPatch,
    ) -> Result<Option<AccountUpdate>, KeelError> {
        self.modify_account(id, |account| {
            patch.apply_to(account);
            Ok(())
        })
    }

    /// Apply an arbitrary edit to an account, then re-check its invariants
    /// and refresh `updated_at`/`updated_by`. Identity and creation audit
    /// fields are restored if the edit touched them.
    ///
    /// Nothing is written when `edit` or validation fails.
    pub fn modify_account<F>(&mut self, id: &str, edit: F) -> Result<Option<AccountUpdate>, KeelError>
    where
        F: FnOnce(&mut Account) -> Result<(), KeelError>,
    {
        let Some(index) = self.position(id) else {
            debug!(account_id = %id, "update skipped: account not found");
            return Ok(None);
        };
        let before = self.accounts[index].clone();
        let mut after = before.clone();
        edit(&mut after)?;

        after.id.clone_from(&before.id);
        after.created_at = before.created_at;
        after.created_by.clone_from(&before.created_by);
        after.validate()?;
        if after.parent_account_id != before.parent_account_id {
            if let Some(parent) = &after.parent_account_id {
                self.check_parent(&after.id, parent)?;
            }
        }
        after.updated_at = self.now();
        after.updated_by = self.actor().to_string();

        self.accounts[index] = after.clone();
        let update = AccountUpdate { before, after };
        info!(
            account_id = %id,
            changed = update.changed_fields().len(),
            "account updated"
        );
        Ok(Some(update))
    }

    /// Set health and/or engagement scores. `None` leaves a score as is.
    pub fn set_scores(
        &mut self,
        id: &str,
        health: Option<f64>,
        engagement: Option<f64>,
    ) -> Result<Option<AccountUpdate>, KeelError> {
        self.modify_account(id, |account| {
            if health.is_some() {
                account.health_score = health;
            }
            if engagement.is_some() {
                account.engagement_score = engagement;
            }
            Ok(())
        })
    }

    /// Remove an account.
    ///
    /// Child accounts are always detached. When `cascade_on_delete` is set,
    /// activities, notes, documents and contact/deal links of the account
    /// are removed too. Duplicate candidates involving it are dropped.
    /// A missing id is a no-op returning `None`.
    pub fn delete_account(&mut self, id: &str) -> Option<Account> {
        let Some(index) = self.position(id) else {
            debug!(account_id = %id, "delete skipped: account not found");
            return None;
        };
        let removed = self.accounts.remove(index);
        let now = self.now();
        let actor = self.actor().to_string();

        let mut detached = 0usize;
        for child in self
            .accounts
            .iter_mut()
            .filter(|a| a.parent_account_id.as_deref() == Some(id))
        {
            child.parent_account_id = None;
            child.updated_at = now;
            child.updated_by.clone_from(&actor);
            detached += 1;
        }

        let mut cascaded = 0usize;
        if self.config.cascade_on_delete {
            let before = self.activities.len()
                + self.notes.len()
                + self.documents.len()
                + self.contacts.len()
                + self.deals.len();
            self.activities.retain(|r| r.account_id != id);
            self.notes.retain(|r| r.account_id != id);
            self.documents.retain(|r| r.account_id != id);
            self.contacts.retain(|r| r.account_id != id);
            self.deals.retain(|r| r.account_id != id);
            cascaded = before
                - (self.activities.len()
                    + self.notes.len()
                    + self.documents.len()
                    + self.contacts.len()
                    + self.deals.len());
        }
        self.duplicates.retain(|d| !d.involves(id));

        info!(account_id = %id, detached, cascaded, "account deleted");
        Some(removed)
    }

    /// Direct children of `parent_id`.
    pub fn child_accounts(&self, parent_id: &str) -> Vec<&Account> {
        self.accounts
            .iter()
            .filter(|a| a.parent_account_id.as_deref() == Some(parent_id))
            .collect()
    }

    /// The parent chain of `id`, root first and `id` last.
    ///
    /// Stops at `max_hierarchy_depth` entries or at the first revisited
    /// account, so a corrupted hierarchy still terminates. Unknown ids
    /// yield an empty chain.
    pub fn account_hierarchy(&self, id: &str) -> Vec<&Account> {
        let mut chain: Vec<&Account> = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = self.get_account(id);
        while let Some(account) = cursor {
            if !visited.insert(account.id.as_str()) {
                warn!(account_id = %id, revisited = %account.id, "cycle in account hierarchy");
                break;
            }
            if chain.len() >= self.config.max_hierarchy_depth {
                warn!(account_id = %id, depth = chain.len(), "hierarchy walk hit depth cap");
                break;
            }
            chain.push(account);
            cursor = account
                .parent_account_id
                .as_deref()
                .and_then(|parent| self.get_account(parent));
        }
        chain.reverse();
        chain
    }

    pub fn accounts_by_owner(&self, owner_id: &str) -> Vec<&Account> {
        self.accounts.iter().filter(|a| a.owner_id == owner_id).collect()
    }

    /// Point every child of `from` at `to`. Children that would form a
    /// cycle under `to` (or are `to` itself) are left alone. Returns how many
    /// were moved.
    pub fn reparent_children(&mut self, from: &str, to: &str) -> usize {
        let candidates: Vec<String> = self
            .child_accounts(from)
            .into_iter()
            .map(|a| a.id.clone())
            .filter(|child| child != to)
            .collect();
        let now = self.now();
        let actor = self.actor().to_string();
        let mut moved = 0;
        for child_id in candidates {
            if self.check_parent(&child_id, to).is_err() {
                continue;
            }
            if let Some(index) = self.position(&child_id) {
                let child = &mut self.accounts[index];
                child.parent_account_id = Some(to.to_string());
                child.updated_at = now;
                child.updated_by.clone_from(&actor);
                moved += 1;
            }
        }
        moved
    }

    /// `parent` must exist, differ from `id` and not have `id` among its
    /// ancestors.
    fn check_parent(&self, id: &str, parent: &str) -> Result<(), KeelError> {
        if parent == id {
            return Err(KeelError::Validation(format!(
                "account {id} cannot be its own parent"
            )));
        }
        if !self.contains_account(parent) {
            return Err(KeelError::Validation(format!(
                "parent account {parent} does not exist"
            )));
        }
        let mut visited = HashSet::new();
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == id {
                return Err(KeelError::Validation(format!(
                    "parent {parent} would create a cycle through {id}"
                )));
            }
            if !visited.insert(current) {
                break;
            }
            cursor = self
                .get_account(current)
                .and_then(|a| a.parent_account_id.as_deref());
        }
        Ok(())
    }
}

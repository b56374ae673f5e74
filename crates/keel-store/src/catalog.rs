// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Saved views, workflow definitions and the duplicate candidate set.

use keel_core::{
    AccountDuplicate, AccountView, AccountWorkflow, DuplicateAction, KeelError, NewView,
    NewWorkflow, WorkflowPatch,
};
use tracing::{debug, info};

use crate::{prefix, AccountStore};

impl AccountStore {
    // --- views ---

    /// Save a view. A default view replaces the owner's previous default.
    pub fn create_view(&mut self, draft: NewView) -> Result<AccountView, KeelError> {
        if draft.name.trim().is_empty() {
            return Err(KeelError::Validation("view name must not be empty".into()));
        }
        let now = self.now();
        if draft.is_default {
            self.clear_default_view(&draft.owner_id);
        }
        let view = AccountView {
            id: self.mint_id(prefix::VIEW),
            name: draft.name,
            description: draft.description,
            filter: draft.filter,
            columns: draft.columns,
            sort: draft.sort,
            is_default: draft.is_default,
            is_shared: draft.is_shared,
            owner_id: draft.owner_id,
            created_at: now,
            updated_at: now,
        };
        info!(view_id = %view.id, name = %view.name, "view saved");
        self.views.push(view.clone());
        Ok(view)
    }

    /// Replace a view's editable content. A missing id yields `Ok(None)`.
    pub fn update_view(&mut self, id: &str, draft: NewView) -> Result<Option<AccountView>, KeelError> {
        if draft.name.trim().is_empty() {
            return Err(KeelError::Validation("view name must not be empty".into()));
        }
        if !self.views.iter().any(|v| v.id == id) {
            debug!(view_id = %id, "update skipped: view not found");
            return Ok(None);
        }
        if draft.is_default {
            self.clear_default_view(&draft.owner_id);
        }
        let now = self.now();
        let Some(view) = self.views.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        view.name = draft.name;
        view.description = draft.description;
        view.filter = draft.filter;
        view.columns = draft.columns;
        view.sort = draft.sort;
        view.is_default = draft.is_default;
        view.is_shared = draft.is_shared;
        view.owner_id = draft.owner_id;
        view.updated_at = now;
        Ok(Some(view.clone()))
    }

    pub fn delete_view(&mut self, id: &str) -> bool {
        let before = self.views.len();
        self.views.retain(|v| v.id != id);
        before != self.views.len()
    }

    pub fn get_view(&self, id: &str) -> Option<&AccountView> {
        self.views.iter().find(|v| v.id == id)
    }

    pub fn views(&self) -> &[AccountView] {
        &self.views
    }

    /// Views `owner_id` can use: their own plus every shared view.
    pub fn views_visible_to(&self, owner_id: &str) -> Vec<&AccountView> {
        self.views
            .iter()
            .filter(|v| v.owner_id == owner_id || v.is_shared)
            .collect()
    }

    fn clear_default_view(&mut self, owner_id: &str) {
        for view in self.views.iter_mut().filter(|v| v.owner_id == owner_id) {
            view.is_default = false;
        }
    }

    // --- workflows ---

    pub fn create_workflow(&mut self, draft: NewWorkflow) -> Result<AccountWorkflow, KeelError> {
        if draft.name.trim().is_empty() {
            return Err(KeelError::Validation("workflow name must not be empty".into()));
        }
        let now = self.now();
        let workflow = AccountWorkflow {
            id: self.mint_id(prefix::WORKFLOW),
            name: draft.name,
            description: draft.description,
            trigger: draft.trigger,
            conditions: draft.conditions,
            actions: draft.actions,
            is_active: draft.is_active,
            stats: Default::default(),
            created_at: now,
            updated_at: now,
            created_by: self.actor().to_string(),
        };
        info!(
            workflow_id = %workflow.id,
            trigger = %workflow.trigger.trigger_type,
            actions = workflow.actions.len(),
            "workflow created"
        );
        self.workflows.push(workflow.clone());
        Ok(workflow)
    }

    /// Patch a workflow definition. Counters are untouched. Missing id is a no-op.
    pub fn update_workflow(&mut self, id: &str, patch: WorkflowPatch) -> Option<AccountWorkflow> {
        let now = self.now();
        let Some(workflow) = self.workflows.iter_mut().find(|w| w.id == id) else {
            debug!(workflow_id = %id, "update skipped: workflow not found");
            return None;
        };
        patch.apply_to(workflow);
        workflow.updated_at = now;
        info!(workflow_id = %id, active = workflow.is_active, "workflow updated");
        Some(workflow.clone())
    }

    pub fn delete_workflow(&mut self, id: &str) -> bool {
        let before = self.workflows.len();
        self.workflows.retain(|w| w.id != id);
        let removed = before != self.workflows.len();
        if removed {
            info!(workflow_id = %id, "workflow deleted");
        }
        removed
    }

    pub fn get_workflow(&self, id: &str) -> Option<&AccountWorkflow> {
        self.workflows.iter().find(|w| w.id == id)
    }

    pub fn workflows(&self) -> &[AccountWorkflow] {
        &self.workflows
    }

    /// Count one execution attempt: a success when `error` is `None`,
    /// otherwise a failure carrying `error` as `last_error`.
    pub fn record_workflow_outcome(&mut self, id: &str, error: Option<&str>) -> bool {
        let now = self.now();
        let Some(workflow) = self.workflows.iter_mut().find(|w| w.id == id) else {
            return false;
        };
        match error {
            None => workflow.stats.record_success(now),
            Some(message) => workflow.stats.record_failure(now, message),
        }
        true
    }

    // --- duplicates ---

    /// Replace the candidate set with a fresh detection run.
    pub fn replace_duplicates(&mut self, duplicates: Vec<AccountDuplicate>) {
        info!(
            previous = self.duplicates.len(),
            current = duplicates.len(),
            "duplicate candidates replaced"
        );
        self.duplicates = duplicates;
    }

    pub fn duplicates(&self) -> &[AccountDuplicate] {
        &self.duplicates
    }

    pub fn get_duplicate(&self, id: &str) -> Option<&AccountDuplicate> {
        self.duplicates.iter().find(|d| d.id == id)
    }

    /// Move a candidate to the status implied by `action`. Does not merge.
    /// Returns false for an unknown id.
    pub fn resolve_duplicate(&mut self, id: &str, action: DuplicateAction) -> bool {
        let now = self.now();
        let actor = self.actor().to_string();
        let Some(duplicate) = self.duplicates.iter_mut().find(|d| d.id == id) else {
            debug!(duplicate_id = %id, "resolve skipped: duplicate not found");
            return false;
        };
        duplicate.status = action.resulting_status();
        duplicate.resolved_at = Some(now);
        duplicate.resolved_by = Some(actor);
        info!(duplicate_id = %id, status = %duplicate.status, "duplicate resolved");
        true
    }
}

#[cfg(test)]
mod tests {
    use keel_core::{
        ActionKind, DuplicateStatus, TriggerType, WorkflowTrigger,
    };
    use keel_test_utils::{fixed_now, AccountBuilder};

    use super::*;

    fn duplicate(id: &str) -> AccountDuplicate {
        let a = AccountBuilder::new("Acme").id("a").build();
        let b = AccountBuilder::new("Acme").id("b").build();
        AccountDuplicate {
            id: id.to_string(),
            account_id_1: a.id.clone(),
            account_id_2: b.id.clone(),
            account_1: a,
            account_2: b,
            confidence_score: 40,
            matching_fields: vec![keel_core::MatchField::Name],
            status: DuplicateStatus::Pending,
            detected_at: fixed_now(),
            resolved_at: None,
            resolved_by: None,
        }
    }

    #[test]
    fn resolve_transitions_status() {
        let mut store = AccountStore::default();
        store.replace_duplicates(vec![duplicate("dup_1")]);
        assert!(store.resolve_duplicate("dup_1", DuplicateAction::NotDuplicate));
        let resolved = store.get_duplicate("dup_1").unwrap();
        assert_eq!(resolved.status, DuplicateStatus::NotDuplicate);
        assert_eq!(resolved.resolved_by.as_deref(), Some("system"));
        assert!(!store.resolve_duplicate("dup_missing", DuplicateAction::Ignore));
    }

    #[test]
    fn default_view_is_unique_per_owner() {
        let mut store = AccountStore::default();
        let first = store
            .create_view(NewView {
                name: "Mine".into(),
                owner_id: "u1".into(),
                is_default: true,
                ..Default::default()
            })
            .unwrap();
        store
            .create_view(NewView {
                name: "Hot".into(),
                owner_id: "u1".into(),
                is_default: true,
                ..Default::default()
            })
            .unwrap();
        assert!(!store.get_view(&first.id).unwrap().is_default);
        assert_eq!(store.views_visible_to("u1").len(), 2);
        assert!(store.views_visible_to("u2").is_empty());
    }

    #[test]
    fn workflow_patch_keeps_counters() {
        let mut store = AccountStore::default();
        let wf = store
            .create_workflow(NewWorkflow {
                name: "Tag new".into(),
                trigger: WorkflowTrigger::on(TriggerType::Created),
                actions: vec![ActionKind::AddTag { tag: "new".into() }.into()],
                is_active: true,
                ..Default::default()
            })
            .unwrap();
        assert!(store.record_workflow_outcome(&wf.id, None));
        assert!(store.record_workflow_outcome(&wf.id, Some("boom")));

        let patched = store
            .update_workflow(
                &wf.id,
                WorkflowPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!patched.is_active);
        assert_eq!(patched.stats.execution_count(), 2);
        assert_eq!(patched.stats.failure_count(), 1);
        assert_eq!(patched.stats.last_error(), Some("boom"));
        assert!(store.update_workflow("wf_missing", WorkflowPatch::default()).is_none());
    }

    #[test]
    fn blank_workflow_name_rejected() {
        let mut store = AccountStore::default();
        assert!(store.create_workflow(NewWorkflow::default()).is_err());
    }
}

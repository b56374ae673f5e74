// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The account service facade.

use std::collections::VecDeque;
use std::sync::Arc;

use keel_config::{ImportConfig, KeelConfig, KpiConfig};
use keel_core::{
    Account, AccountDuplicate, AccountFilter, AccountPatch, AccountWorkflow, DuplicateAction,
    KeelError, NewAccount, NewWorkflow, SortSpec, WorkflowPatch,
};
use keel_dedupe::{merge_accounts, DuplicateDetector, MergeReport, MergeRequest};
use keel_io::{export_accounts, ExportFormat};
use keel_kpi::{compute_kpis, AccountKpi};
use keel_query::{filter_accounts, sort_accounts};
use keel_store::AccountStore;
use keel_workflow::{AccountEvent, ActionDispatcher, ExecutionReport, WorkflowEngine};
use tracing::{debug, info};

/// Execution reports kept for [`AccountService::drain_executions`].
const EXECUTION_LOG_CAPACITY: usize = 1024;

/// Account operations with workflow triggering and derived reads.
#[derive(Debug)]
pub struct AccountService {
    pub(crate) store: AccountStore,
    pub(crate) detector: DuplicateDetector,
    workflows: WorkflowEngine,
    kpi: KpiConfig,
    pub(crate) import: ImportConfig,
    filter: AccountFilter,
    sort: Option<SortSpec>,
    executions: VecDeque<ExecutionReport>,
}

impl AccountService {
    pub fn new(config: &KeelConfig) -> Self {
        Self::with_store(AccountStore::new(&config.store, &config.engine), config)
    }

    /// Build around an existing store (e.g. one with an injected clock).
    pub fn with_store(store: AccountStore, config: &KeelConfig) -> Self {
        Self {
            store,
            detector: DuplicateDetector::new(&config.duplicates),
            workflows: WorkflowEngine::default(),
            kpi: config.kpi.clone(),
            import: config.import.clone(),
            filter: AccountFilter::default(),
            sort: None,
            executions: VecDeque::new(),
        }
    }

    /// Route outbound workflow actions to `dispatcher`.
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn ActionDispatcher>) -> Self {
        self.workflows = WorkflowEngine::new(dispatcher);
        self
    }

    /// Read access to everything the store holds.
    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    /// Direct store access for related records (activities, notes,
    /// documents, links, views). Account changes made here do not fire
    /// workflows.
    pub fn store_mut(&mut self) -> &mut AccountStore {
        &mut self.store
    }

    // --- accounts ---

    pub fn create_account(&mut self, draft: NewAccount) -> Result<Account, KeelError> {
        let account = self.store.create_account(draft)?;
        self.fire(AccountEvent::Created(account.clone()));
        Ok(account)
    }

    /// Apply `patch`. `Ok(None)` when the account does not exist.
    pub fn update_account(
        &mut self,
        id: &str,
        patch: AccountPatch,
    ) -> Result<Option<Account>, KeelError> {
        let Some(update) = self.store.update_account(id, patch)? else {
            return Ok(None);
        };
        self.fire(AccountEvent::Updated(update));
        Ok(self.store.get_account(id).cloned())
    }

    /// Set health and/or engagement scores, firing update workflows.
    pub fn set_scores(
        &mut self,
        id: &str,
        health: Option<f64>,
        engagement: Option<f64>,
    ) -> Result<Option<Account>, KeelError> {
        let Some(update) = self.store.set_scores(id, health, engagement)? else {
            return Ok(None);
        };
        self.fire(AccountEvent::Updated(update));
        Ok(self.store.get_account(id).cloned())
    }

    pub fn delete_account(&mut self, id: &str) -> Option<Account> {
        self.store.delete_account(id)
    }

    pub fn get_account(&self, id: &str) -> Option<&Account> {
        self.store.get_account(id)
    }

    pub fn account_hierarchy(&self, id: &str) -> Vec<&Account> {
        self.store.account_hierarchy(id)
    }

    pub fn child_accounts(&self, parent_id: &str) -> Vec<&Account> {
        self.store.child_accounts(parent_id)
    }

    pub fn merge_accounts(&mut self, request: &MergeRequest) -> Result<MergeReport, KeelError> {
        merge_accounts(&mut self.store, request)
    }

    // --- filtering ---

    /// Replace the current filter. The sort order is kept.
    pub fn apply_filter(&mut self, filter: AccountFilter) {
        debug!(active = !filter.is_empty(), "filter applied");
        self.filter = filter;
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
    }

    /// Load filter and sort from a saved view.
    pub fn apply_view(&mut self, view_id: &str) -> Result<(), KeelError> {
        let view = self
            .store
            .get_view(view_id)
            .ok_or_else(|| KeelError::not_found("view", view_id))?;
        self.filter = view.filter.clone();
        self.sort = view.sort.clone();
        info!(view_id, "view applied");
        Ok(())
    }

    pub fn clear_filter(&mut self) {
        self.filter = AccountFilter::default();
        self.sort = None;
    }

    pub fn current_filter(&self) -> &AccountFilter {
        &self.filter
    }

    /// Accounts passing the current filter, in the current sort order.
    pub fn filtered_accounts(&self) -> Vec<&Account> {
        let mut accounts = filter_accounts(self.store.accounts(), &self.filter);
        if let Some(sort) = &self.sort {
            sort_accounts(&mut accounts, sort);
        }
        accounts
    }

    // --- duplicates ---

    /// Run detection over all accounts and replace the stored candidates.
    pub fn detect_duplicates(&mut self) -> Vec<AccountDuplicate> {
        let found = self.detector.detect(
            self.store.accounts(),
            self.store.id_generator(),
            self.store.now(),
        );
        self.store.replace_duplicates(found.clone());
        found
    }

    /// Record a decision on a candidate. `Merge` only marks the record;
    /// the merge itself is a separate [`Self::merge_accounts`] call.
    pub fn resolve_duplicate(&mut self, id: &str, action: DuplicateAction) -> bool {
        self.store.resolve_duplicate(id, action)
    }

    // --- workflows ---

    pub fn create_workflow(&mut self, draft: NewWorkflow) -> Result<AccountWorkflow, KeelError> {
        self.store.create_workflow(draft)
    }

    pub fn update_workflow(&mut self, id: &str, patch: WorkflowPatch) -> Option<AccountWorkflow> {
        self.store.update_workflow(id, patch)
    }

    pub fn delete_workflow(&mut self, id: &str) -> bool {
        self.store.delete_workflow(id)
    }

    /// Run a workflow by hand against one account.
    pub fn run_workflow(
        &mut self,
        workflow_id: &str,
        account_id: &str,
    ) -> Result<ExecutionReport, KeelError> {
        let report = self
            .workflows
            .run_workflow(&mut self.store, workflow_id, account_id)?;
        self.log_executions([report.clone()]);
        Ok(report)
    }

    /// One tick of the `time_based` workflows.
    pub fn run_scheduled_workflows(&mut self) -> Vec<ExecutionReport> {
        let reports = self.workflows.run_scheduled(&mut self.store);
        self.log_executions(reports.iter().cloned());
        reports
    }

    /// Take the execution reports collected since the last call, oldest
    /// first. Only the most recent reports are retained.
    pub fn drain_executions(&mut self) -> Vec<ExecutionReport> {
        self.executions.drain(..).collect()
    }

    pub(crate) fn fire(&mut self, event: AccountEvent) {
        let reports = self.workflows.handle_event(&mut self.store, &event);
        self.log_executions(reports);
    }

    fn log_executions(&mut self, reports: impl IntoIterator<Item = ExecutionReport>) {
        for report in reports {
            if self.executions.len() == EXECUTION_LOG_CAPACITY {
                self.executions.pop_front();
            }
            self.executions.push_back(report);
        }
    }

    // --- reporting ---

    /// KPIs over every account.
    pub fn kpis(&self) -> AccountKpi {
        compute_kpis(self.store.accounts(), self.store.now(), &self.kpi)
    }

    /// KPIs over the accounts passing the current filter.
    pub fn filtered_kpis(&self) -> AccountKpi {
        let subset: Vec<Account> = self.filtered_accounts().into_iter().cloned().collect();
        compute_kpis(&subset, self.store.now(), &self.kpi)
    }

    /// Export the given accounts in store order; an empty id list exports
    /// everything. Unknown ids are skipped.
    pub fn export_accounts(
        &self,
        account_ids: &[String],
        format: ExportFormat,
    ) -> Result<String, KeelError> {
        let accounts = self.store.accounts();
        if account_ids.is_empty() {
            return export_accounts(accounts, format);
        }
        let selected: Vec<&Account> = accounts
            .iter()
            .filter(|a| account_ids.contains(&a.id))
            .collect();
        if selected.len() < account_ids.len() {
            debug!(
                requested = account_ids.len(),
                found = selected.len(),
                "export skipped unknown ids"
            );
        }
        export_accounts(selected, format)
    }
}

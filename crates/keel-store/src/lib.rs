// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory account store for the Keel account engine.
//!
//! [`AccountStore`] is the only owner of the entity collections: accounts,
//! activities, notes, documents, contact/deal links, saved views, workflows
//! and the current duplicate candidate set. Every mutation goes through it
//! so ids and timestamps come from one [`Clock`] and one [`IdGenerator`].
//!
//! The store is a plain synchronous value. Sharing it between tasks is the
//! caller's job (see `keel-engine`'s shared handle).

pub mod accounts;
pub mod catalog;
pub mod links;
pub mod related;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use keel_config::model::{EngineConfig, StoreConfig};
use keel_core::{
    Account, AccountContact, AccountDeal, AccountDuplicate, AccountView, AccountWorkflow,
    Activity, Clock, Document, IdGenerator, Note, RandomIds, SystemClock,
};

pub use accounts::AccountUpdate;

/// Id prefixes for records the store mints itself.
pub(crate) mod prefix {
    pub const ACTIVITY: &str = "act";
    pub const NOTE: &str = "note";
    pub const DOCUMENT: &str = "doc";
    pub const CONTACT_LINK: &str = "acon";
    pub const DEAL_LINK: &str = "adeal";
    pub const VIEW: &str = "view";
    pub const WORKFLOW: &str = "wf";
}

/// The authoritative collection of accounts and everything attached to them.
///
/// Collections keep insertion order, which is the order every unsorted read
/// path returns.
pub struct AccountStore {
    pub(crate) accounts: Vec<Account>,
    pub(crate) activities: Vec<Activity>,
    pub(crate) notes: Vec<Note>,
    pub(crate) documents: Vec<Document>,
    pub(crate) contacts: Vec<AccountContact>,
    pub(crate) deals: Vec<AccountDeal>,
    pub(crate) views: Vec<AccountView>,
    pub(crate) workflows: Vec<AccountWorkflow>,
    pub(crate) duplicates: Vec<AccountDuplicate>,

    pub(crate) config: StoreConfig,
    id_prefix: String,
    actor: String,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl std::fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStore")
            .field("accounts", &self.accounts.len())
            .field("workflows", &self.workflows.len())
            .field("duplicates", &self.duplicates.len())
            .field("actor", &self.actor)
            .finish_non_exhaustive()
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new(&StoreConfig::default(), &EngineConfig::default())
    }
}

impl AccountStore {
    /// Create an empty store using the wall clock and random ids.
    pub fn new(store: &StoreConfig, engine: &EngineConfig) -> Self {
        Self {
            accounts: Vec::new(),
            activities: Vec::new(),
            notes: Vec::new(),
            documents: Vec::new(),
            contacts: Vec::new(),
            deals: Vec::new(),
            views: Vec::new(),
            workflows: Vec::new(),
            duplicates: Vec::new(),
            config: store.clone(),
            id_prefix: engine.id_prefix.clone(),
            actor: engine.actor.clone(),
            clock: Arc::new(SystemClock),
            ids: Arc::new(RandomIds),
        }
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the id source.
    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Name stamped into `created_by` / `updated_by`.
    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn set_actor(&mut self, actor: impl Into<String>) {
        self.actor = actor.into();
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Current time according to the store clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The id generator, for derived records minted outside the store
    /// (duplicate candidates).
    pub fn id_generator(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    /// Mint a `prefix_timestamp_suffix` id at the current instant.
    pub fn mint_id(&self, prefix: &str) -> String {
        self.ids.next_id(prefix, self.clock.now())
    }

    pub(crate) fn mint_account_id(&self) -> String {
        self.mint_id(&self.id_prefix)
    }
}

// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON account snapshots on disk.

use std::path::Path;

use keel_config::KeelConfig;
use keel_core::{Account, KeelError};
use keel_engine::AccountService;
use keel_store::AccountStore;
use tracing::debug;

/// Read a snapshot: a JSON array of accounts.
pub fn read_accounts(path: &Path) -> Result<Vec<Account>, KeelError> {
    let raw = std::fs::read_to_string(path)?;
    let accounts: Vec<Account> = serde_json::from_str(&raw).map_err(KeelError::serialization)?;
    debug!(path = %path.display(), count = accounts.len(), "snapshot loaded");
    Ok(accounts)
}

/// Build a service holding the accounts of `path`, or an empty one.
pub fn load_service(path: Option<&Path>, config: &KeelConfig) -> Result<AccountService, KeelError> {
    let mut store = AccountStore::new(&config.store, &config.engine);
    if let Some(path) = path {
        store.restore_accounts(read_accounts(path)?)?;
    }
    Ok(AccountService::with_store(store, config))
}

/// Write `accounts` as pretty JSON to `path`.
pub fn write_accounts(path: &Path, accounts: &[Account]) -> Result<(), KeelError> {
    let json = serde_json::to_string_pretty(accounts).map_err(KeelError::serialization)?;
    std::fs::write(path, json + "\n")?;
    debug!(path = %path.display(), count = accounts.len(), "snapshot written");
    Ok(())
}

// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared, concurrently usable handle to an [`AccountService`].
//!
//! All mutations go through a single write lock, so the service keeps its
//! single-writer semantics while readers proceed in parallel.

use std::sync::Arc;

use keel_core::KeelError;
use keel_io::{parse_csv, FieldMapping, ImportOptions, ImportResult};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::service::AccountService;

#[derive(Clone)]
pub struct SharedAccountService {
    inner: Arc<RwLock<AccountService>>,
}

impl SharedAccountService {
    pub fn new(service: AccountService) -> Self {
        Self {
            inner: Arc::new(RwLock::new(service)),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, AccountService> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, AccountService> {
        self.inner.write().await
    }

    /// Run an import in the background.
    ///
    /// Rows are applied in batches of `import.batch_size`, releasing the
    /// write lock between batches so reads are not starved. There is no
    /// cancellation: aborting the task leaves the batches applied so far.
    pub fn spawn_import(
        &self,
        csv: String,
        mapping: FieldMapping,
        options: ImportOptions,
    ) -> JoinHandle<Result<ImportResult, KeelError>> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let parsed = parse_csv(&csv, &mapping)?;
            let mut result = ImportResult {
                total_rows: parsed.total_rows(),
                errors: parsed.rejected,
                dry_run: options.dry_run,
                ..Default::default()
            };
            let batch_size = inner.read().await.import_batch_size();
            for (batch, rows) in parsed.rows.chunks(batch_size).enumerate() {
                let mut service = inner.write().await;
                for row in rows {
                    service.import_row(row, &options, &mut result);
                }
                debug!(batch, rows = rows.len(), "import batch applied");
            }
            inner.read().await.finish_import(&result);
            Ok::<_, KeelError>(result)
        })
    }
}

impl std::fmt::Debug for SharedAccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedAccountService").finish_non_exhaustive()
    }
}

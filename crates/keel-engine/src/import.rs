// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Applying parsed CSV rows to the store.
//!
//! A row "matches" an existing account when the duplicate detector would
//! flag the pair. Matching rows are updated, skipped or imported as new
//! accounts depending on [`ImportOptions`].

use keel_core::{Account, KeelError};
use keel_io::{parse_csv, FieldMapping, ImportError, ImportOptions, ImportResult, ImportRow};
use keel_workflow::AccountEvent;
use tracing::{info, warn};

use crate::service::AccountService;

impl AccountService {
    /// Import a CSV document.
    ///
    /// Fails only when the document as a whole is unusable (no header,
    /// mapping to an unknown field). Row problems are collected in
    /// [`ImportResult::errors`] and the remaining rows still import.
    pub fn import_accounts(
        &mut self,
        csv: &str,
        mapping: &FieldMapping,
        options: &ImportOptions,
    ) -> Result<ImportResult, KeelError> {
        let parsed = parse_csv(csv, mapping)?;
        let mut result = ImportResult {
            total_rows: parsed.total_rows(),
            errors: parsed.rejected,
            dry_run: options.dry_run,
            ..Default::default()
        };
        for row in &parsed.rows {
            self.import_row(row, options, &mut result);
        }
        self.finish_import(&result);
        Ok(result)
    }

    /// Owner applied to rows without one.
    pub(crate) fn default_owner(&self, options: &ImportOptions) -> Option<String> {
        options
            .default_owner_id
            .clone()
            .or_else(|| self.import.default_owner_id.clone())
    }

    pub(crate) fn import_batch_size(&self) -> usize {
        self.import.batch_size.max(1)
    }

    pub(crate) fn import_row(
        &mut self,
        row: &ImportRow,
        options: &ImportOptions,
        result: &mut ImportResult,
    ) {
        let owner = self.default_owner(options);
        let draft = match row.to_draft(owner.as_deref()) {
            Ok(draft) => draft,
            Err(e) => return reject(result, e),
        };

        let existing = if options.update_existing || options.skip_duplicates {
            let candidate = Account::from_new(String::new(), draft.clone(), "", self.store.now());
            self.detector
                .find_matches(&candidate, self.store.accounts())
                .first()
                .map(|(account, _)| account.id.clone())
        } else {
            None
        };

        match existing {
            Some(id) if options.update_existing => {
                if !options.dry_run {
                    let updated = self.store.modify_account(&id, |account| {
                        row.apply_to(account).map_err(KeelError::from)
                    });
                    match updated {
                        Ok(Some(update)) => self.fire(AccountEvent::Updated(update)),
                        Ok(None) => return reject(result, row.error("matched account vanished")),
                        Err(e) => return reject(result, row.error(e.to_string())),
                    }
                }
                result.updated += 1;
            }
            Some(id) => {
                info!(row = row.row, account_id = %id, "import row skipped as duplicate");
                result.skipped += 1;
            }
            None => {
                if !options.dry_run {
                    match self.store.create_account(draft) {
                        Ok(account) => self.fire(AccountEvent::Created(account)),
                        Err(e) => return reject(result, row.error(e.to_string())),
                    }
                }
                result.imported += 1;
            }
        }
    }

    pub(crate) fn finish_import(&self, result: &ImportResult) {
        info!(
            total = result.total_rows,
            imported = result.imported,
            updated = result.updated,
            skipped = result.skipped,
            failed = result.failed(),
            dry_run = result.dry_run,
            "import finished"
        );
    }
}

fn reject(result: &mut ImportResult, error: ImportError) {
    warn!(row = error.row, error = %error.message, "import row rejected");
    result.errors.push(error);
}

// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::io::Write;
use std::path::Path;

use keel_config::KeelConfig;
use keel_core::{AccountFilter, KeelError};
use keel_engine::{FieldMapping, ImportOptions, MergeRequest, SharedAccountService};
use serde::Serialize;
use tracing::info;

use crate::snapshot::{load_service, write_accounts};
use crate::Commands;

pub(crate) async fn run(command: Commands, config: &KeelConfig) -> Result<(), KeelError> {
    match command {
        Commands::Duplicates { accounts } => {
            let mut service = load_service(Some(&accounts), config)?;
            print_json(&service.detect_duplicates())
        }
        Commands::Kpis {
            accounts,
            status,
            industry,
        } => {
            let mut service = load_service(Some(&accounts), config)?;
            service.apply_filter(AccountFilter {
                statuses: status,
                industries: industry,
                ..Default::default()
            });
            print_json(&service.filtered_kpis())
        }
        Commands::Export {
            accounts,
            ids,
            format,
            output,
        } => {
            let service = load_service(Some(&accounts), config)?;
            let document = service.export_accounts(&ids, format)?;
            emit(output.as_deref(), &document)
        }
        Commands::Import {
            csv,
            accounts,
            mappings,
            skip_duplicates,
            update_existing,
            dry_run,
            owner,
            output,
        } => {
            let document = std::fs::read_to_string(&csv)?;
            let mapping = mappings
                .into_iter()
                .fold(FieldMapping::new(), |m, (column, field)| m.map(column, field));
            let options = ImportOptions {
                skip_duplicates,
                update_existing,
                dry_run,
                default_owner_id: owner,
            };

            let shared = SharedAccountService::new(load_service(accounts.as_deref(), config)?);
            let result = shared
                .spawn_import(document, mapping, options)
                .await
                .map_err(|e| KeelError::Internal(format!("import task failed: {e}")))??;

            if let Some(path) = output.as_deref().filter(|_| !dry_run) {
                write_accounts(path, shared.read().await.store().accounts())?;
            }
            print_json(&result)
        }
        Commands::Merge {
            accounts,
            primary,
            secondaries,
            keep_history,
            output,
        } => {
            let mut service = load_service(Some(&accounts), config)?;
            let report = service.merge_accounts(&MergeRequest {
                primary_account_id: primary,
                secondary_account_ids: secondaries,
                preserve_history: keep_history,
                ..Default::default()
            })?;
            write_accounts(output.as_deref().unwrap_or(&accounts), service.store().accounts())?;
            print_json(&report)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), KeelError> {
    let json = serde_json::to_string_pretty(value).map_err(KeelError::serialization)?;
    emit(None, &json)
}

/// Write to `path`, or stdout when there is none.
fn emit(path: Option<&Path>, text: &str) -> Result<(), KeelError> {
    match path {
        Some(path) => {
            std::fs::write(path, text)?;
            info!(path = %path.display(), bytes = text.len(), "output written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account export.

use keel_core::{Account, KeelError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::info;

/// Column header of every CSV export.
pub const EXPORT_HEADER: [&str; 6] = ["Name", "Type", "Industry", "Status", "Owner", "Created Date"];

/// Serialized export format.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    /// Accepted for compatibility; always [`KeelError::Unsupported`].
    Xlsx,
}

/// Serialize `accounts` in `format`.
///
/// Values containing commas, quotes or newlines are quoted, so every row
/// parses back into exactly six columns.
pub fn export_accounts<'a, I>(accounts: I, format: ExportFormat) -> Result<String, KeelError>
where
    I: IntoIterator<Item = &'a Account>,
{
    match format {
        ExportFormat::Csv => export_csv(accounts),
        ExportFormat::Xlsx => Err(KeelError::Unsupported(
            "xlsx export is not available; use csv".into(),
        )),
    }
}

fn export_csv<'a>(accounts: impl IntoIterator<Item = &'a Account>) -> Result<String, KeelError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(EXPORT_HEADER)
        .map_err(KeelError::serialization)?;

    let mut rows = 0usize;
    for account in accounts {
        let created = account.created_at.format("%Y-%m-%d").to_string();
        let account_type = account.account_type.to_string();
        let status = account.status.to_string();
        writer
            .write_record([
                account.name.as_str(),
                account_type.as_str(),
                account.industry.as_deref().unwrap_or(""),
                status.as_str(),
                account.owner_id.as_str(),
                created.as_str(),
            ])
            .map_err(KeelError::serialization)?;
        rows += 1;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| KeelError::serialization(e.into_error()))?;
    info!(rows, format = "csv", "accounts exported");
    String::from_utf8(bytes).map_err(KeelError::serialization)
}

// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV import parsing.
//!
//! Rows are numbered the way a spreadsheet shows them: the header is row 1,
//! the first data row is row 2.

use std::collections::BTreeMap;

use chrono::DateTime;
use keel_core::account::{canonical_field_name, is_writable_field};
use keel_core::{Account, FieldValue, KeelError, NewAccount};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Column header to account field name. `custom.<key>` targets a custom
/// field; an empty target ignores the column.
///
/// With an empty mapping every header is read as a field name
/// (`Health Score`, `healthScore` and `health_score` all work) and headers
/// that do not name a writable field are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(BTreeMap<String, String>);

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `column` to `field`.
    pub fn map(mut self, column: impl Into<String>, field: impl Into<String>) -> Self {
        self.0.insert(column.into(), field.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve `header` to a target field, or `None` to skip the column.
    fn target(&self, header: &str) -> Result<Option<String>, KeelError> {
        if self.is_empty() {
            let field = header_to_field(header);
            return Ok(is_writable_field(&field).then_some(field));
        }
        let header = header.trim();
        let mapped = self.0.get(header).or_else(|| {
            self.0
                .iter()
                .find(|(column, _)| column.trim().eq_ignore_ascii_case(header))
                .map(|(_, field)| field)
        });
        match mapped.map(|f| f.trim()) {
            None | Some("") => Ok(None),
            Some(field) if is_writable_field(field) => Ok(Some(field.to_string())),
            Some(field) => Err(KeelError::Validation(format!(
                "column `{header}` is mapped to unknown field `{field}`"
            ))),
        }
    }
}

/// `Created Date` -> `created_date`, `Owner` -> `owner_id`.
fn header_to_field(header: &str) -> String {
    let joined = header
        .split_whitespace()
        .map(canonical_field_name)
        .collect::<Vec<_>>()
        .join("_");
    canonical_field_name(&joined)
}

/// Import behaviour switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Skip rows that match an existing account.
    pub skip_duplicates: bool,
    /// Update the matching account instead of creating a new one. Takes
    /// precedence over `skip_duplicates`.
    pub update_existing: bool,
    /// Validate and count without writing anything.
    pub dry_run: bool,
    /// Owner for rows without an owner column value.
    pub default_owner_id: Option<String>,
}

/// A rejected row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportError {
    pub row: usize,
    pub message: String,
}

impl From<ImportError> for KeelError {
    fn from(e: ImportError) -> Self {
        KeelError::Import {
            row: e.row,
            message: e.message,
        }
    }
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub total_rows: usize,
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
    pub dry_run: bool,
}

impl ImportResult {
    pub fn failed(&self) -> usize {
        self.errors.len()
    }
}

/// Field assignments read from one data row. Blank cells are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub row: usize,
    pub values: Vec<(String, String)>,
}

impl ImportRow {
    /// Write every value into `account`.
    pub fn apply_to(&self, account: &mut Account) -> Result<(), ImportError> {
        for (field, raw) in &self.values {
            account
                .set_field(field, FieldValue::Text(raw.clone()))
                .map_err(|e| self.error(format!("{field}: {e}")))?;
        }
        Ok(())
    }

    /// Build a creation draft. `default_owner` fills a missing owner.
    pub fn to_draft(&self, default_owner: Option<&str>) -> Result<NewAccount, ImportError> {
        let mut scratch = Account::from_new(
            String::new(),
            NewAccount {
                owner_id: default_owner.unwrap_or_default().to_string(),
                ..Default::default()
            },
            "",
            DateTime::UNIX_EPOCH,
        );
        self.apply_to(&mut scratch)?;
        if scratch.name.trim().is_empty() {
            return Err(self.error("name is required"));
        }
        if scratch.owner_id.trim().is_empty() {
            return Err(self.error("owner is required; map an owner column or set a default owner"));
        }
        Ok(NewAccount::from(scratch))
    }

    pub fn error(&self, message: impl Into<String>) -> ImportError {
        ImportError {
            row: self.row,
            message: message.into(),
        }
    }
}

/// A parsed CSV document: rows ready to apply plus rows that could not be
/// read at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    pub rows: Vec<ImportRow>,
    pub rejected: Vec<ImportError>,
}

impl ParsedCsv {
    pub fn total_rows(&self) -> usize {
        self.rows.len() + self.rejected.len()
    }
}

/// Parse `input` with `mapping`.
///
/// A missing header or a mapping to an unknown field fails the whole
/// document; malformed rows are collected in [`ParsedCsv::rejected`].
pub fn parse_csv(input: &str, mapping: &FieldMapping) -> Result<ParsedCsv, KeelError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());
    let headers = reader.headers().map_err(KeelError::serialization)?.clone();
    if headers.is_empty() {
        return Err(KeelError::Validation("csv has no header row".into()));
    }

    let targets = headers
        .iter()
        .map(|h| mapping.target(h))
        .collect::<Result<Vec<_>, _>>()?;
    for (header, target) in headers.iter().zip(&targets) {
        if target.is_none() {
            debug!(column = header, "column ignored");
        }
    }

    let mut parsed = ParsedCsv::default();
    for (index, record) in reader.records().enumerate() {
        let fallback_row = index + 2;
        match record {
            Ok(record) => {
                let row = record
                    .position()
                    .map_or(fallback_row, |p| p.line() as usize);
                let values = targets
                    .iter()
                    .zip(record.iter())
                    .filter_map(|(target, cell)| {
                        let field = target.as_ref()?;
                        (!cell.is_empty()).then(|| (field.clone(), cell.to_string()))
                    })
                    .collect();
                parsed.rows.push(ImportRow { row, values });
            }
            Err(e) => {
                let row = e.position().map_or(fallback_row, |p| p.line() as usize);
                parsed.rejected.push(ImportError {
                    row,
                    message: e.to_string(),
                });
            }
        }
    }
    info!(
        rows = parsed.rows.len(),
        rejected = parsed.rejected.len(),
        "csv parsed"
    );
    Ok(parsed)
}

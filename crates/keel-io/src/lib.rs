// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV import and export of accounts.
//!
//! Export writes the fixed summary columns with proper CSV quoting.
//! Import parses a CSV document into per-row field assignments; applying
//! them to the store (and duplicate handling) is the engine's job.

pub mod export;
pub mod import;

pub use export::{export_accounts, ExportFormat, EXPORT_HEADER};
pub use import::{
    parse_csv, FieldMapping, ImportError, ImportOptions, ImportResult, ImportRow, ParsedCsv,
};

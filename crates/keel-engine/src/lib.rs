// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Keel account service.
//!
//! [`AccountService`] is the single entry point for callers: it owns the
//! [`keel_store::AccountStore`], keeps the current filter, and fires
//! workflows after every account mutation it performs. It is synchronous
//! and single-writer. [`SharedAccountService`] wraps it for concurrent use.

pub mod bulk;
pub mod import;
pub mod service;
pub mod shared;

pub use bulk::{BulkAction, BulkActionReport, BulkFailure, BulkOperation};
pub use service::AccountService;
pub use shared::SharedAccountService;

pub use keel_dedupe::{MergeReport, MergeRequest, MergeStrategy};
pub use keel_io::{ExportFormat, FieldMapping, ImportOptions, ImportResult};
pub use keel_kpi::AccountKpi;
pub use keel_workflow::{ActionDispatcher, ExecutionOutcome, ExecutionReport, LoggingDispatcher};

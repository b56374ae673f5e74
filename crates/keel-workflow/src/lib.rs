// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workflow automation for the Keel account engine.
//!
//! A workflow fires when its trigger matches an [`AccountEvent`], runs only
//! if its condition list holds for the account, and then executes its
//! actions in order. Each attempt that gets past the conditions is counted
//! exactly once as a success or a failure on the workflow record.
//!
//! Store-mutating actions write through [`keel_store::AccountStore`]
//! directly and never raise new events, so workflows cannot cascade.
//! Outbound actions (email, notification, webhook, deal creation) go to an
//! [`ActionDispatcher`].

pub mod action;
pub mod condition;
pub mod engine;

pub use action::{ActionDispatcher, DispatchedAction, LoggingDispatcher};
pub use condition::{evaluate_condition, evaluate_conditions};
pub use engine::{AccountEvent, ExecutionOutcome, ExecutionReport, WorkflowEngine};

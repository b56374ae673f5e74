// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Keel account engine.
//!
//! This crate provides the error type, the closed classification enums,
//! the entity records (accounts and everything hanging off them) and the
//! clock/id sources the store stamps records with. It has no behaviour
//! beyond per-record invariants; filtering, duplicate detection, merging,
//! workflows and KPIs live in their own crates.

pub mod account;
pub mod clock;
pub mod duplicate;
pub mod error;
pub mod records;
pub mod types;
pub mod value;
pub mod view;
pub mod workflow;

// Re-export key items at crate root for ergonomic imports.
pub use account::{Account, AccountPatch, Address, Consent, NewAccount};
pub use clock::{Clock, IdGenerator, ManualClock, RandomIds, SequentialIds, SystemClock};
pub use duplicate::{AccountDuplicate, MatchField};
pub use error::KeelError;
pub use records::{
    AccountContact, AccountDeal, Activity, ContactLink, DealLink, Document, NewActivity,
    NewDocument, NewNote, Note,
};
pub use types::{
    AccessLevel, AccountSize, AccountStatus, AccountType, ActivityStatus, ActivityType,
    DocumentType, DuplicateAction, DuplicateStatus, InfluenceLevel, NoteType, Priority, Rating,
    SortDirection,
};
pub use value::FieldValue;
pub use view::{AccountFilter, AccountView, NewView, NumericRange, SortSpec};
pub use workflow::{
    AccountWorkflow, ActionKind, ConditionOperator, LogicalOperator, NewWorkflow, TriggerType,
    WorkflowAction, WorkflowCondition, WorkflowPatch, WorkflowStats, WorkflowTrigger,
};

/// Convenience alias used throughout the workspace.
pub type Result<T, E = KeelError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keel_error_has_all_variants() {
        let _not_found = KeelError::not_found("account", "acc_1");
        let _validation = KeelError::Validation("test".into());
        let _execution = KeelError::ExecutionFailure {
            workflow_id: "wf_1".into(),
            message: "test".into(),
        };
        let _import = KeelError::Import {
            row: 2,
            message: "test".into(),
        };
        let _unsupported = KeelError::Unsupported("xlsx".into());
        let _io = KeelError::Io {
            source: std::io::Error::other("test"),
        };
        let _serialization = KeelError::serialization(std::io::Error::other("test"));
        let _config = KeelError::Config("test".into());
        let _internal = KeelError::Internal("test".into());
    }

    #[test]
    fn account_round_trips_through_json() {
        let now = chrono::Utc::now();
        let account = Account::from_new(
            "acc_1".into(),
            NewAccount {
                name: "Acme".into(),
                owner_id: "u1".into(),
                health_score: Some(72.0),
                ..Default::default()
            },
            "system",
            now,
        );
        let json = serde_json::to_string(&account).expect("should serialize");
        let parsed: Account = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(account, parsed);
    }
}

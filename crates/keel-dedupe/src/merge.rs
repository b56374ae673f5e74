// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folding secondary accounts into a primary account.
//!
//! For each secondary, in request order:
//! 1. related records are moved to the primary or left to be dropped,
//!    per entity type;
//! 2. child accounts are re-parented onto the primary;
//! 3. custom fields are combined per strategy and tags are unioned;
//! 4. optionally a history note is written on the primary;
//! 5. the secondary is deleted (with the store's delete cascade).

use std::collections::BTreeMap;

use keel_core::account::dedup_tags;
use keel_core::{Account, FieldValue, KeelError, NewNote, NoteType};
use keel_store::AccountStore;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{info, warn};

/// What happens to one kind of related record.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum RecordStrategy {
    /// Reassign the secondary's records to the primary.
    #[default]
    MoveAll,
    /// Keep only the primary's records; the secondary's go with it.
    KeepPrimary,
}

/// How custom-field maps are combined.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum CustomFieldStrategy {
    /// The primary's map is left as is.
    #[default]
    PreferPrimary,
    /// Secondary values overwrite and extend the primary's.
    PreferSecondary,
    /// Union of keys; the primary wins conflicts except list values,
    /// which are unioned.
    Merge,
}

/// Per-entity merge strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeStrategy {
    pub contacts: RecordStrategy,
    pub deals: RecordStrategy,
    pub activities: RecordStrategy,
    pub notes: RecordStrategy,
    pub documents: RecordStrategy,
    pub custom_fields: CustomFieldStrategy,
}

/// A request to fold `secondary_account_ids` into `primary_account_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeRequest {
    pub primary_account_id: String,
    pub secondary_account_ids: Vec<String>,
    pub strategy: MergeStrategy,
    /// Write a note on the primary recording each merged account.
    pub preserve_history: bool,
}

/// Records moved onto the primary, summed over all secondaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MovedCounts {
    pub contacts: usize,
    pub deals: usize,
    pub activities: usize,
    pub notes: usize,
    pub documents: usize,
    pub children: usize,
}

/// Outcome of a merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeReport {
    /// The surviving primary after the merge.
    pub account: Account,
    /// Secondaries that were folded in and deleted.
    pub merged_ids: Vec<String>,
    /// Requested secondaries that did not exist.
    pub missing_ids: Vec<String>,
    pub moved: MovedCounts,
}

/// Merge accounts inside `store`.
///
/// Fails with [`KeelError::NotFound`] when the primary does not exist.
/// Missing secondaries are skipped and reported; the primary listed as its
/// own secondary is ignored.
pub fn merge_accounts(
    store: &mut AccountStore,
    request: &MergeRequest,
) -> Result<MergeReport, KeelError> {
    let primary_id = request.primary_account_id.as_str();
    if !store.contains_account(primary_id) {
        return Err(KeelError::not_found("account", primary_id));
    }

    let mut merged_ids = Vec::new();
    let mut missing_ids = Vec::new();
    let mut moved = MovedCounts::default();
    let strategy = request.strategy;

    for secondary_id in &request.secondary_account_ids {
        if secondary_id == primary_id || merged_ids.contains(secondary_id) {
            continue;
        }
        let Some(secondary) = store.get_account(secondary_id).cloned() else {
            warn!(account_id = %secondary_id, "merge secondary not found, skipped");
            missing_ids.push(secondary_id.clone());
            continue;
        };

        if strategy.contacts == RecordStrategy::MoveAll {
            moved.contacts += store.reassign_contacts(secondary_id, primary_id);
        }
        if strategy.deals == RecordStrategy::MoveAll {
            moved.deals += store.reassign_deals(secondary_id, primary_id);
        }
        if strategy.activities == RecordStrategy::MoveAll {
            moved.activities += store.reassign_activities(secondary_id, primary_id);
        }
        if strategy.notes == RecordStrategy::MoveAll {
            moved.notes += store.reassign_notes(secondary_id, primary_id);
        }
        if strategy.documents == RecordStrategy::MoveAll {
            moved.documents += store.reassign_documents(secondary_id, primary_id);
        }
        moved.children += store.reparent_children(secondary_id, primary_id);

        store.modify_account(primary_id, |primary| {
            fold_into(primary, &secondary, strategy.custom_fields);
            Ok(())
        })?;

        if request.preserve_history {
            store.add_note(NewNote {
                account_id: primary_id.to_string(),
                content: format!("Merged account {} ({})", secondary.name, secondary.id),
                note_type: NoteType::Internal,
                ..Default::default()
            })?;
        }

        store.delete_account(secondary_id);
        merged_ids.push(secondary_id.clone());
    }

    let account = store
        .get_account(primary_id)
        .cloned()
        .ok_or_else(|| KeelError::Internal(format!("primary {primary_id} vanished during merge")))?;
    info!(
        account_id = %primary_id,
        merged = merged_ids.len(),
        missing = missing_ids.len(),
        "accounts merged"
    );
    Ok(MergeReport {
        account,
        merged_ids,
        missing_ids,
        moved,
    })
}

fn fold_into(primary: &mut Account, secondary: &Account, strategy: CustomFieldStrategy) {
    let mut tags = std::mem::take(&mut primary.tags);
    tags.extend(secondary.tags.iter().cloned());
    primary.tags = dedup_tags(tags);

    match strategy {
        CustomFieldStrategy::PreferPrimary => {}
        CustomFieldStrategy::PreferSecondary => {
            primary.custom_fields.extend(
                secondary
                    .custom_fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }
        CustomFieldStrategy::Merge => {
            merge_custom_fields(&mut primary.custom_fields, &secondary.custom_fields);
        }
    }
}

fn merge_custom_fields(
    primary: &mut BTreeMap<String, FieldValue>,
    secondary: &BTreeMap<String, FieldValue>,
) {
    for (key, incoming) in secondary {
        match primary.get_mut(key) {
            None => {
                primary.insert(key.clone(), incoming.clone());
            }
            Some(FieldValue::List(existing)) => {
                if let FieldValue::List(extra) = incoming {
                    for item in extra {
                        if !existing.contains(item) {
                            existing.push(item.clone());
                        }
                    }
                }
            }
            Some(_) => {}
        }
    }
}

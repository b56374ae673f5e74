// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Activities, notes and documents hanging off an account.
//!
//! All three require the owning account to exist at creation time. Reads
//! are scoped by account id and, for notes, skip soft-deleted entries.

use keel_core::{
    Activity, ActivityStatus, Document, KeelError, NewActivity, NewDocument, NewNote, Note,
};
use tracing::{debug, info};

use crate::{prefix, AccountStore};

impl AccountStore {
    fn require_account(&self, account_id: &str) -> Result<(), KeelError> {
        if self.contains_account(account_id) {
            Ok(())
        } else {
            Err(KeelError::not_found("account", account_id))
        }
    }

    /// Bump the account's `last_activity_date` without touching `updated_at`.
    fn mark_activity(&mut self, account_id: &str) {
        let now = self.now();
        if let Some(account) = self.accounts.iter_mut().find(|a| a.id == account_id) {
            account.last_activity_date = Some(now);
        }
    }

    // --- activities ---

    /// Log or schedule an activity. Also stamps the account's
    /// `last_activity_date`.
    pub fn add_activity(&mut self, draft: NewActivity) -> Result<Activity, KeelError> {
        self.require_account(&draft.account_id)?;
        let now = self.now();
        let activity = Activity {
            id: self.mint_id(prefix::ACTIVITY),
            account_id: draft.account_id,
            activity_type: draft.activity_type,
            subject: draft.subject,
            description: draft.description,
            scheduled_at: draft.scheduled_at,
            completed_at: (draft.status == ActivityStatus::Completed).then_some(now),
            duration_minutes: draft.duration_minutes,
            status: draft.status,
            priority: draft.priority,
            outcome: None,
            participants: draft.participants,
            attachments: draft.attachments,
            created_at: now,
            updated_at: now,
            created_by: self.actor().to_string(),
        };
        self.mark_activity(&activity.account_id);
        info!(
            activity_id = %activity.id,
            account_id = %activity.account_id,
            activity_type = %activity.activity_type,
            "activity added"
        );
        self.activities.push(activity.clone());
        Ok(activity)
    }

    pub fn get_activity(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub fn activities_for(&self, account_id: &str) -> Vec<&Activity> {
        self.activities
            .iter()
            .filter(|a| a.account_id == account_id)
            .collect()
    }

    /// Mark an activity completed with an optional outcome.
    pub fn complete_activity(&mut self, id: &str, outcome: Option<String>) -> Option<Activity> {
        let now = self.now();
        let Some(activity) = self.activities.iter_mut().find(|a| a.id == id) else {
            debug!(activity_id = %id, "complete skipped: activity not found");
            return None;
        };
        activity.status = ActivityStatus::Completed;
        activity.completed_at = Some(now);
        activity.updated_at = now;
        if outcome.is_some() {
            activity.outcome = outcome;
        }
        let activity = activity.clone();
        self.mark_activity(&activity.account_id);
        Some(activity)
    }

    /// Cancel a planned or in-progress activity.
    pub fn cancel_activity(&mut self, id: &str) -> Option<Activity> {
        let now = self.now();
        let activity = self.activities.iter_mut().find(|a| a.id == id)?;
        activity.status = ActivityStatus::Cancelled;
        activity.updated_at = now;
        Some(activity.clone())
    }

    /// Move every activity of `from` to `to`.
    pub fn reassign_activities(&mut self, from: &str, to: &str) -> usize {
        let now = self.now();
        let mut moved = 0;
        for activity in self.activities.iter_mut().filter(|a| a.account_id == from) {
            activity.account_id = to.to_string();
            activity.updated_at = now;
            moved += 1;
        }
        moved
    }

    // --- notes ---

    /// Add a note or, with `parent_note_id`, a reply. Replies must target a
    /// live note on the same account.
    pub fn add_note(&mut self, draft: NewNote) -> Result<Note, KeelError> {
        self.require_account(&draft.account_id)?;
        if let Some(parent_id) = &draft.parent_note_id {
            let parent = self
                .get_note(parent_id)
                .ok_or_else(|| KeelError::not_found("note", parent_id.clone()))?;
            if parent.account_id != draft.account_id {
                return Err(KeelError::Validation(format!(
                    "reply to note {parent_id} must belong to account {}",
                    parent.account_id
                )));
            }
        }
        let now = self.now();
        let note = Note {
            id: self.mint_id(prefix::NOTE),
            account_id: draft.account_id,
            content: draft.content,
            note_type: draft.note_type,
            is_pinned: draft.is_pinned,
            is_private: draft.is_private,
            mentions: draft.mentions,
            reactions: Default::default(),
            parent_note_id: draft.parent_note_id,
            created_at: now,
            updated_at: now,
            created_by: self.actor().to_string(),
            deleted_at: None,
        };
        info!(note_id = %note.id, account_id = %note.account_id, "note added");
        self.notes.push(note.clone());
        Ok(note)
    }

    /// A live note by id; soft-deleted notes read as absent.
    pub fn get_note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id && !n.is_deleted())
    }

    /// Live top-level and reply notes of an account, pinned first, otherwise
    /// in insertion order.
    pub fn notes_for(&self, account_id: &str) -> Vec<&Note> {
        let mut notes: Vec<&Note> = self
            .notes
            .iter()
            .filter(|n| n.account_id == account_id && !n.is_deleted())
            .collect();
        notes.sort_by_key(|n| !n.is_pinned);
        notes
    }

    /// Live replies to `note_id`, oldest first.
    pub fn note_replies(&self, note_id: &str) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|n| n.parent_note_id.as_deref() == Some(note_id) && !n.is_deleted())
            .collect()
    }

    /// Soft delete. The note stays in storage but disappears from reads.
    /// Returns false when the note is unknown or already deleted.
    pub fn delete_note(&mut self, id: &str) -> bool {
        let now = self.now();
        match self
            .notes
            .iter_mut()
            .find(|n| n.id == id && !n.is_deleted())
        {
            Some(note) => {
                note.deleted_at = Some(now);
                note.updated_at = now;
                info!(note_id = %id, "note soft-deleted");
                true
            }
            None => {
                debug!(note_id = %id, "delete skipped: note not found");
                false
            }
        }
    }

    pub fn set_note_pinned(&mut self, id: &str, pinned: bool) -> Option<Note> {
        let now = self.now();
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == id && !n.is_deleted())?;
        note.is_pinned = pinned;
        note.updated_at = now;
        Some(note.clone())
    }

    /// Toggle `user_id`'s `reaction` on a note. Empty reaction lists are
    /// removed from the map.
    pub fn toggle_reaction(&mut self, id: &str, reaction: &str, user_id: &str) -> Option<Note> {
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == id && !n.is_deleted())?;
        let users = note.reactions.entry(reaction.to_string()).or_default();
        if let Some(pos) = users.iter().position(|u| u == user_id) {
            users.remove(pos);
            if users.is_empty() {
                note.reactions.remove(reaction);
            }
        } else {
            users.push(user_id.to_string());
        }
        Some(note.clone())
    }

    /// Move every note (deleted ones included) of `from` to `to`.
    /// Returns the number of live notes moved.
    pub fn reassign_notes(&mut self, from: &str, to: &str) -> usize {
        let mut moved = 0;
        for note in self.notes.iter_mut().filter(|n| n.account_id == from) {
            note.account_id = to.to_string();
            if !note.is_deleted() {
                moved += 1;
            }
        }
        moved
    }

    // --- documents ---

    pub fn add_document(&mut self, draft: NewDocument) -> Result<Document, KeelError> {
        self.require_account(&draft.account_id)?;
        if draft.storage_ref.trim().is_empty() {
            return Err(KeelError::Validation(
                "document storage_ref must not be empty".to_string(),
            ));
        }
        let now = self.now();
        let document = Document {
            id: self.mint_id(prefix::DOCUMENT),
            account_id: draft.account_id,
            name: draft.name,
            document_type: draft.document_type,
            storage_ref: draft.storage_ref,
            mime_type: draft.mime_type,
            size_bytes: draft.size_bytes,
            access_level: draft.access_level,
            download_count: 0,
            last_accessed_at: None,
            uploaded_by: self.actor().to_string(),
            created_at: now,
            updated_at: now,
        };
        info!(document_id = %document.id, account_id = %document.account_id, "document added");
        self.documents.push(document.clone());
        Ok(document)
    }

    pub fn get_document(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn documents_for(&self, account_id: &str) -> Vec<&Document> {
        self.documents
            .iter()
            .filter(|d| d.account_id == account_id)
            .collect()
    }

    /// Count a download and stamp `last_accessed_at`.
    pub fn record_document_access(&mut self, id: &str) -> Option<Document> {
        let now = self.now();
        let document = self.documents.iter_mut().find(|d| d.id == id)?;
        document.download_count = document.download_count.saturating_add(1);
        document.last_accessed_at = Some(now);
        Some(document.clone())
    }

    pub fn reassign_documents(&mut self, from: &str, to: &str) -> usize {
        let now = self.now();
        let mut moved = 0;
        for document in self.documents.iter_mut().filter(|d| d.account_id == from) {
            document.account_id = to.to_string();
            document.updated_at = now;
            moved += 1;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use keel_core::{ActivityType, SequentialIds};
    use keel_test_utils::{fixed_clock, AccountBuilder};

    use super::*;

    fn store_with_account() -> (AccountStore, String) {
        let mut store = AccountStore::default()
            .with_clock(fixed_clock())
            .with_ids(Arc::new(SequentialIds::new()));
        let account = store
            .create_account(AccountBuilder::new("Acme").draft())
            .unwrap();
        (store, account.id)
    }

    #[test]
    fn activity_requires_account() {
        let (mut store, _) = store_with_account();
        let err = store
            .add_activity(NewActivity {
                account_id: "acc_missing".into(),
                subject: "Call".into(),
                ..Default::default()
            })
            .expect_err("unknown account");
        assert!(matches!(err, KeelError::NotFound { .. }), "got: {err}");
    }

    #[test]
    fn completing_activity_stamps_account() {
        let clock = fixed_clock();
        let mut store = AccountStore::default().with_clock(clock.clone());
        let account = store
            .create_account(AccountBuilder::new("Acme").draft())
            .unwrap();
        let activity = store
            .add_activity(NewActivity {
                account_id: account.id.clone(),
                activity_type: ActivityType::Call,
                subject: "Intro call".into(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(activity.status, ActivityStatus::Planned);
        assert!(activity.completed_at.is_none());

        clock.advance(Duration::days(1));
        let done = store
            .complete_activity(&activity.id, Some("went well".into()))
            .unwrap();
        assert_eq!(done.status, ActivityStatus::Completed);
        assert_eq!(done.outcome.as_deref(), Some("went well"));
        assert_eq!(
            store.get_account(&account.id).unwrap().last_activity_date,
            done.completed_at
        );
    }

    #[test]
    fn soft_deleted_notes_hidden_but_retained() {
        let (mut store, account_id) = store_with_account();
        let note = store
            .add_note(NewNote {
                account_id: account_id.clone(),
                content: "renewal risk".into(),
                ..Default::default()
            })
            .unwrap();
        assert!(store.delete_note(&note.id));
        assert!(!store.delete_note(&note.id));
        assert!(store.notes_for(&account_id).is_empty());
        assert!(store.get_note(&note.id).is_none());
        assert_eq!(store.notes.len(), 1);
    }

    #[test]
    fn pinned_notes_come_first_and_replies_thread() {
        let (mut store, account_id) = store_with_account();
        let first = store
            .add_note(NewNote {
                account_id: account_id.clone(),
                content: "first".into(),
                ..Default::default()
            })
            .unwrap();
        store
            .add_note(NewNote {
                account_id: account_id.clone(),
                content: "pinned".into(),
                is_pinned: true,
                ..Default::default()
            })
            .unwrap();
        store
            .add_note(NewNote {
                account_id: account_id.clone(),
                content: "reply".into(),
                parent_note_id: Some(first.id.clone()),
                ..Default::default()
            })
            .unwrap();

        let contents: Vec<&str> = store
            .notes_for(&account_id)
            .iter()
            .map(|n| n.content.as_str())
            .collect();
        assert_eq!(contents, vec!["pinned", "first", "reply"]);
        assert_eq!(store.note_replies(&first.id).len(), 1);
    }

    #[test]
    fn reply_to_unknown_note_fails() {
        let (mut store, account_id) = store_with_account();
        let err = store
            .add_note(NewNote {
                account_id,
                content: "reply".into(),
                parent_note_id: Some("note_missing".into()),
                ..Default::default()
            })
            .expect_err("dangling reply");
        assert!(matches!(err, KeelError::NotFound { entity: "note", .. }));
    }

    #[test]
    fn reactions_toggle() {
        let (mut store, account_id) = store_with_account();
        let note = store
            .add_note(NewNote {
                account_id,
                content: "won the deal".into(),
                ..Default::default()
            })
            .unwrap();
        let note = store.toggle_reaction(&note.id, "thumbs_up", "u1").unwrap();
        assert_eq!(note.reactions["thumbs_up"], vec!["u1".to_string()]);
        let note = store.toggle_reaction(&note.id, "thumbs_up", "u1").unwrap();
        assert!(note.reactions.is_empty());
    }

    #[test]
    fn document_access_is_counted() {
        let (mut store, account_id) = store_with_account();
        let doc = store
            .add_document(NewDocument {
                account_id,
                name: "MSA.pdf".into(),
                storage_ref: "blob://msa".into(),
                ..Default::default()
            })
            .unwrap();
        store.record_document_access(&doc.id);
        let doc = store.record_document_access(&doc.id).unwrap();
        assert_eq!(doc.download_count, 2);
        assert!(doc.last_accessed_at.is_some());
    }

    #[test]
    fn document_needs_storage_ref() {
        let (mut store, account_id) = store_with_account();
        assert!(store
            .add_document(NewDocument {
                account_id,
                name: "empty".into(),
                ..Default::default()
            })
            .is_err());
    }
}

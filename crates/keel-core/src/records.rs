// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Records owned by an account: activities, notes, documents and the
//! contact/deal link tables.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    AccessLevel, ActivityStatus, ActivityType, DocumentType, InfluenceLevel, NoteType, Priority,
};

/// A logged or scheduled interaction with an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub account_id: String,
    pub activity_type: ActivityType,
    pub subject: String,
    pub description: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<u32>,
    pub status: ActivityStatus,
    pub priority: Priority,
    pub outcome: Option<String>,
    pub participants: Vec<String>,
    /// Opaque references into external blob storage.
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

/// Caller-supplied fields for a new activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewActivity {
    pub account_id: String,
    pub activity_type: ActivityType,
    pub subject: String,
    pub description: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<u32>,
    pub status: ActivityStatus,
    pub priority: Priority,
    pub participants: Vec<String>,
    pub attachments: Vec<String>,
}

/// A free-text note on an account. Soft-deleted notes stay in storage but
/// are hidden from every read path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub account_id: String,
    pub content: String,
    pub note_type: NoteType,
    pub is_pinned: bool,
    pub is_private: bool,
    pub mentions: Vec<String>,
    /// reaction key (e.g. "thumbs_up") -> ids of users who reacted.
    pub reactions: BTreeMap<String, Vec<String>>,
    /// Set when this note is a reply in a thread.
    pub parent_note_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Note {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Caller-supplied fields for a new note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewNote {
    pub account_id: String,
    pub content: String,
    pub note_type: NoteType,
    pub is_pinned: bool,
    pub is_private: bool,
    pub mentions: Vec<String>,
    pub parent_note_id: Option<String>,
}

/// Metadata about a file attached to an account. The bytes live elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub document_type: DocumentType,
    /// Opaque reference into external blob storage.
    pub storage_ref: String,
    pub mime_type: Option<String>,
    pub size_bytes: Option<u64>,
    pub access_level: AccessLevel,
    pub download_count: u32,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub uploaded_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewDocument {
    pub account_id: String,
    pub name: String,
    pub document_type: DocumentType,
    pub storage_ref: String,
    pub mime_type: Option<String>,
    pub size_bytes: Option<u64>,
    pub access_level: AccessLevel,
}

/// Link between an account and an externally managed contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountContact {
    pub id: String,
    pub account_id: String,
    pub contact_id: String,
    pub role: Option<String>,
    pub is_primary: bool,
    pub influence_level: InfluenceLevel,
    pub relationship_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Relationship metadata supplied when linking a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactLink {
    pub role: Option<String>,
    pub is_primary: bool,
    pub influence_level: InfluenceLevel,
    pub relationship_type: Option<String>,
}

/// Link between an account and an externally managed deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDeal {
    pub id: String,
    pub account_id: String,
    pub deal_id: String,
    pub is_primary: bool,
    pub relationship_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Relationship metadata supplied when linking a deal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealLink {
    pub is_primary: bool,
    pub relationship_type: Option<String>,
}

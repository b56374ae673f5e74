// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The account record, its creation draft and partial-update patch.
//!
//! Besides plain struct access, accounts expose a small by-name field
//! surface ([`Account::field`], [`Account::set_field`]) used by workflow
//! conditions, `update_field` actions, view sorting and CSV import.
//! Field names are `snake_case`; camelCase spellings (`healthScore`,
//! `ownerId`) and the short alias `type` are accepted too.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::KeelError;
use crate::types::{AccountSize, AccountStatus, AccountType, Priority, Rating};
use crate::value::FieldValue;

/// A postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// Marketing and contact consent flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Consent {
    pub email_opt_in: bool,
    pub sms_opt_in: bool,
    pub do_not_call: bool,
}

/// A company or organisation the business has a relationship with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub account_number: Option<String>,
    pub name: String,
    pub parent_account_id: Option<String>,

    pub account_type: AccountType,
    pub industry: Option<String>,
    pub sub_industry: Option<String>,
    pub account_size: Option<AccountSize>,

    pub annual_revenue: Option<f64>,
    pub currency: Option<String>,
    pub employee_count: Option<u32>,

    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,

    pub description: Option<String>,
    pub business_model: Option<String>,
    pub founded_year: Option<i32>,

    pub status: AccountStatus,
    pub rating: Option<Rating>,
    pub priority: Priority,

    pub owner_id: String,
    pub team_id: Option<String>,
    pub custom_fields: BTreeMap<String, FieldValue>,
    pub tags: Vec<String>,

    /// 0-100, absent until computed.
    pub health_score: Option<f64>,
    /// 0-100, absent until computed.
    pub engagement_score: Option<f64>,

    pub first_contact_date: Option<DateTime<Utc>>,
    pub last_activity_date: Option<DateTime<Utc>>,
    pub last_contacted_date: Option<DateTime<Utc>>,
    pub next_follow_up_date: Option<DateTime<Utc>>,

    pub consent: Consent,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Caller-supplied fields for a new account. Identity and audit fields are
/// assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewAccount {
    pub account_number: Option<String>,
    pub name: String,
    pub parent_account_id: Option<String>,
    pub account_type: AccountType,
    pub industry: Option<String>,
    pub sub_industry: Option<String>,
    pub account_size: Option<AccountSize>,
    pub annual_revenue: Option<f64>,
    pub currency: Option<String>,
    pub employee_count: Option<u32>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
    pub description: Option<String>,
    pub business_model: Option<String>,
    pub founded_year: Option<i32>,
    pub status: AccountStatus,
    pub rating: Option<Rating>,
    pub priority: Priority,
    pub owner_id: String,
    pub team_id: Option<String>,
    pub custom_fields: BTreeMap<String, FieldValue>,
    pub tags: Vec<String>,
    pub health_score: Option<f64>,
    pub engagement_score: Option<f64>,
    pub first_contact_date: Option<DateTime<Utc>>,
    pub last_activity_date: Option<DateTime<Utc>>,
    pub last_contacted_date: Option<DateTime<Utc>>,
    pub next_follow_up_date: Option<DateTime<Utc>>,
    pub consent: Consent,
}

impl From<Account> for NewAccount {
    /// Strip identity and audit fields, keeping everything a caller may set.
    fn from(account: Account) -> Self {
        Self {
            account_number: account.account_number,
            name: account.name,
            parent_account_id: account.parent_account_id,
            account_type: account.account_type,
            industry: account.industry,
            sub_industry: account.sub_industry,
            account_size: account.account_size,
            annual_revenue: account.annual_revenue,
            currency: account.currency,
            employee_count: account.employee_count,
            website: account.website,
            phone: account.phone,
            email: account.email,
            billing_address: account.billing_address,
            shipping_address: account.shipping_address,
            description: account.description,
            business_model: account.business_model,
            founded_year: account.founded_year,
            status: account.status,
            rating: account.rating,
            priority: account.priority,
            owner_id: account.owner_id,
            team_id: account.team_id,
            custom_fields: account.custom_fields,
            tags: account.tags,
            health_score: account.health_score,
            engagement_score: account.engagement_score,
            first_contact_date: account.first_contact_date,
            last_activity_date: account.last_activity_date,
            last_contacted_date: account.last_contacted_date,
            next_follow_up_date: account.next_follow_up_date,
            consent: account.consent,
        }
    }
}

/// Partial update. `None` leaves a field untouched; for nullable fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountPatch {
    pub account_number: Option<Option<String>>,
    pub name: Option<String>,
    pub parent_account_id: Option<Option<String>>,
    pub account_type: Option<AccountType>,
    pub industry: Option<Option<String>>,
    pub sub_industry: Option<Option<String>>,
    pub account_size: Option<Option<AccountSize>>,
    pub annual_revenue: Option<Option<f64>>,
    pub currency: Option<Option<String>>,
    pub employee_count: Option<Option<u32>>,
    pub website: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub billing_address: Option<Option<Address>>,
    pub shipping_address: Option<Option<Address>>,
    pub description: Option<Option<String>>,
    pub business_model: Option<Option<String>>,
    pub founded_year: Option<Option<i32>>,
    pub status: Option<AccountStatus>,
    pub rating: Option<Option<Rating>>,
    pub priority: Option<Priority>,
    pub owner_id: Option<String>,
    pub team_id: Option<Option<String>>,
    /// Keys are upserted into the existing map; other keys are kept.
    pub custom_fields: Option<BTreeMap<String, FieldValue>>,
    /// Replaces the whole tag list.
    pub tags: Option<Vec<String>>,
    pub health_score: Option<Option<f64>>,
    pub engagement_score: Option<Option<f64>>,
    pub first_contact_date: Option<Option<DateTime<Utc>>>,
    pub last_activity_date: Option<Option<DateTime<Utc>>>,
    pub last_contacted_date: Option<Option<DateTime<Utc>>>,
    pub next_follow_up_date: Option<Option<DateTime<Utc>>>,
    pub consent: Option<Consent>,
}

/// Every field reachable through [`Account::field`], in declaration order.
pub const ACCOUNT_FIELDS: &[&str] = &[
    "id",
    "account_number",
    "name",
    "parent_account_id",
    "account_type",
    "industry",
    "sub_industry",
    "account_size",
    "annual_revenue",
    "currency",
    "employee_count",
    "website",
    "phone",
    "email",
    "billing_street",
    "billing_city",
    "billing_state",
    "billing_postal_code",
    "billing_country",
    "shipping_street",
    "shipping_city",
    "shipping_state",
    "shipping_postal_code",
    "shipping_country",
    "description",
    "business_model",
    "founded_year",
    "status",
    "rating",
    "priority",
    "owner_id",
    "team_id",
    "tags",
    "health_score",
    "engagement_score",
    "first_contact_date",
    "last_activity_date",
    "last_contacted_date",
    "next_follow_up_date",
    "email_opt_in",
    "sms_opt_in",
    "do_not_call",
    "created_at",
    "updated_at",
    "created_by",
    "updated_by",
];

/// Fields only the store may write.
const READ_ONLY_FIELDS: &[&str] = &[
    "id",
    "created_at",
    "updated_at",
    "created_by",
    "updated_by",
];

/// Normalize a field name: camelCase to snake_case, `type` to `account_type`.
pub fn canonical_field_name(name: &str) -> String {
    let trimmed = name.trim();
    let mut out = String::with_capacity(trimmed.len() + 4);
    for (i, ch) in trimmed.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    match out.as_str() {
        "type" => "account_type".to_string(),
        "size" => "account_size".to_string(),
        "owner" => "owner_id".to_string(),
        _ => out,
    }
}

/// Whether [`Account::set_field`] accepts `name`.
pub fn is_writable_field(name: &str) -> bool {
    if name.trim().starts_with("custom.") {
        return true;
    }
    let canonical = canonical_field_name(name);
    ACCOUNT_FIELDS.contains(&canonical.as_str()) && !READ_ONLY_FIELDS.contains(&canonical.as_str())
}

/// Check a 0-100 score.
pub fn validate_score(label: &str, score: Option<f64>) -> Result<(), KeelError> {
    match score {
        Some(s) if !s.is_finite() || !(0.0..=100.0).contains(&s) => Err(KeelError::Validation(
            format!("{label} must be within 0..=100, got {s}"),
        )),
        _ => Ok(()),
    }
}

fn text(value: &Option<String>) -> Option<FieldValue> {
    value.as_ref().map(|s| FieldValue::Text(s.clone()))
}

fn address_part(address: &Option<Address>, part: &str) -> Option<FieldValue> {
    let address = address.as_ref()?;
    let value = match part {
        "street" => &address.street,
        "city" => &address.city,
        "state" => &address.state,
        "postal_code" => &address.postal_code,
        "country" => &address.country,
        _ => return None,
    };
    text(value)
}

fn set_address_part(
    address: &mut Option<Address>,
    part: &str,
    value: Option<String>,
) -> Result<(), KeelError> {
    let address = address.get_or_insert_with(Address::default);
    let slot = match part {
        "street" => &mut address.street,
        "city" => &mut address.city,
        "state" => &mut address.state,
        "postal_code" => &mut address.postal_code,
        "country" => &mut address.country,
        other => {
            return Err(KeelError::Validation(format!(
                "unknown address part `{other}`"
            )))
        }
    };
    *slot = value;
    Ok(())
}

fn parse_enum<T: FromStr>(field: &str, value: &FieldValue) -> Result<T, KeelError> {
    value
        .as_str()
        .and_then(|s| T::from_str(s.trim()).ok())
        .ok_or_else(|| {
            KeelError::Validation(format!(
                "`{}` is not a valid value for {field}",
                value.to_text()
            ))
        })
}

fn want_text(field: &str, value: &FieldValue) -> Result<Option<String>, KeelError> {
    match value {
        FieldValue::Text(s) | FieldValue::Enum(s) => {
            let s = s.trim();
            Ok(if s.is_empty() { None } else { Some(s.to_string()) })
        }
        FieldValue::Number(_) | FieldValue::Bool(_) => Ok(Some(value.to_text())),
        other => Err(KeelError::Validation(format!(
            "{field} expects text, got {}",
            other.kind()
        ))),
    }
}

fn want_number(field: &str, value: &FieldValue) -> Result<Option<f64>, KeelError> {
    if value.is_empty() {
        return Ok(None);
    }
    value.as_number().map(Some).ok_or_else(|| {
        KeelError::Validation(format!("{field} expects a number, got `{}`", value.to_text()))
    })
}

fn want_date(field: &str, value: &FieldValue) -> Result<Option<DateTime<Utc>>, KeelError> {
    if value.is_empty() {
        return Ok(None);
    }
    value.as_date().map(Some).ok_or_else(|| {
        KeelError::Validation(format!("{field} expects a date, got `{}`", value.to_text()))
    })
}

fn want_bool(field: &str, value: &FieldValue) -> Result<bool, KeelError> {
    value.as_bool().ok_or_else(|| {
        KeelError::Validation(format!("{field} expects a boolean, got `{}`", value.to_text()))
    })
}

impl Account {
    /// Materialize a draft with store-assigned identity and audit fields.
    pub fn from_new(id: String, draft: NewAccount, actor: &str, now: DateTime<Utc>) -> Self {
        Self {
            id,
            account_number: draft.account_number,
            name: draft.name,
            parent_account_id: draft.parent_account_id,
            account_type: draft.account_type,
            industry: draft.industry,
            sub_industry: draft.sub_industry,
            account_size: draft.account_size,
            annual_revenue: draft.annual_revenue,
            currency: draft.currency,
            employee_count: draft.employee_count,
            website: draft.website,
            phone: draft.phone,
            email: draft.email,
            billing_address: draft.billing_address,
            shipping_address: draft.shipping_address,
            description: draft.description,
            business_model: draft.business_model,
            founded_year: draft.founded_year,
            status: draft.status,
            rating: draft.rating,
            priority: draft.priority,
            owner_id: draft.owner_id,
            team_id: draft.team_id,
            custom_fields: draft.custom_fields,
            tags: dedup_tags(draft.tags),
            health_score: draft.health_score,
            engagement_score: draft.engagement_score,
            first_contact_date: draft.first_contact_date,
            last_activity_date: draft.last_activity_date,
            last_contacted_date: draft.last_contacted_date,
            next_follow_up_date: draft.next_follow_up_date,
            consent: draft.consent,
            created_at: now,
            updated_at: now,
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
            deleted_at: None,
        }
    }

    /// Check the value-range invariants carried by the record itself.
    pub fn validate(&self) -> Result<(), KeelError> {
        validate_score("health_score", self.health_score)?;
        validate_score("engagement_score", self.engagement_score)?;
        if self.parent_account_id.as_deref() == Some(self.id.as_str()) {
            return Err(KeelError::Validation(format!(
                "account {} cannot be its own parent",
                self.id
            )));
        }
        Ok(())
    }

    /// Case-insensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Add a tag unless an equal (case-insensitive) tag is present.
    /// Returns whether the tag list changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Read a field by name. `custom.<key>` (or a bare custom key) reads
    /// from `custom_fields`.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        if let Some(key) = name.trim().strip_prefix("custom.") {
            return self.custom_fields.get(key).cloned();
        }
        let canonical = canonical_field_name(name);
        let name = canonical.as_str();
        if let Some(part) = name.strip_prefix("billing_") {
            return address_part(&self.billing_address, part);
        }
        if let Some(part) = name.strip_prefix("shipping_") {
            return address_part(&self.shipping_address, part);
        }
        match name {
            "id" => Some(FieldValue::Text(self.id.clone())),
            "account_number" => text(&self.account_number),
            "name" => Some(FieldValue::Text(self.name.clone())),
            "parent_account_id" => text(&self.parent_account_id),
            "account_type" => Some(FieldValue::Enum(self.account_type.to_string())),
            "industry" => text(&self.industry),
            "sub_industry" => text(&self.sub_industry),
            "account_size" => self.account_size.map(|s| FieldValue::Enum(s.to_string())),
            "annual_revenue" => self.annual_revenue.map(FieldValue::Number),
            "currency" => text(&self.currency),
            "employee_count" => self.employee_count.map(|n| FieldValue::Number(n.into())),
            "website" => text(&self.website),
            "phone" => text(&self.phone),
            "email" => text(&self.email),
            "description" => text(&self.description),
            "business_model" => text(&self.business_model),
            "founded_year" => self.founded_year.map(|y| FieldValue::Number(y.into())),
            "status" => Some(FieldValue::Enum(self.status.to_string())),
            "rating" => self.rating.map(|r| FieldValue::Enum(r.to_string())),
            "priority" => Some(FieldValue::Enum(self.priority.to_string())),
            "owner_id" => Some(FieldValue::Text(self.owner_id.clone())),
            "team_id" => text(&self.team_id),
            "tags" => Some(FieldValue::List(self.tags.clone())),
            "health_score" => self.health_score.map(FieldValue::Number),
            "engagement_score" => self.engagement_score.map(FieldValue::Number),
            "first_contact_date" => self.first_contact_date.map(FieldValue::Date),
            "last_activity_date" => self.last_activity_date.map(FieldValue::Date),
            "last_contacted_date" => self.last_contacted_date.map(FieldValue::Date),
            "next_follow_up_date" => self.next_follow_up_date.map(FieldValue::Date),
            "email_opt_in" => Some(FieldValue::Bool(self.consent.email_opt_in)),
            "sms_opt_in" => Some(FieldValue::Bool(self.consent.sms_opt_in)),
            "do_not_call" => Some(FieldValue::Bool(self.consent.do_not_call)),
            "created_at" => Some(FieldValue::Date(self.created_at)),
            "updated_at" => Some(FieldValue::Date(self.updated_at)),
            "created_by" => Some(FieldValue::Text(self.created_by.clone())),
            "updated_by" => Some(FieldValue::Text(self.updated_by.clone())),
            other => self.custom_fields.get(other).cloned(),
        }
    }

    /// Write a field by name, converting the value to the field's type.
    ///
    /// Empty text clears nullable fields. Unknown names land in
    /// `custom_fields` only when prefixed with `custom.`; anything else is
    /// rejected so typos in workflows surface as failures.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), KeelError> {
        if let Some(key) = name.trim().strip_prefix("custom.") {
            if value.is_empty() {
                self.custom_fields.remove(key);
            } else {
                self.custom_fields.insert(key.to_string(), value);
            }
            return Ok(());
        }
        let canonical = canonical_field_name(name);
        let field = canonical.as_str();
        if READ_ONLY_FIELDS.contains(&field) {
            return Err(KeelError::Validation(format!("{field} is read-only")));
        }
        if let Some(part) = field.strip_prefix("billing_") {
            return set_address_part(&mut self.billing_address, part, want_text(field, &value)?);
        }
        if let Some(part) = field.strip_prefix("shipping_") {
            return set_address_part(&mut self.shipping_address, part, want_text(field, &value)?);
        }
        match field {
            "account_number" => self.account_number = want_text(field, &value)?,
            "name" => {
                self.name = want_text(field, &value)?.ok_or_else(|| {
                    KeelError::Validation("name must not be empty".to_string())
                })?
            }
            "parent_account_id" => self.parent_account_id = want_text(field, &value)?,
            "account_type" => self.account_type = parse_enum(field, &value)?,
            "industry" => self.industry = want_text(field, &value)?,
            "sub_industry" => self.sub_industry = want_text(field, &value)?,
            "account_size" => {
                self.account_size = if value.is_empty() {
                    None
                } else {
                    Some(parse_enum(field, &value)?)
                }
            }
            "annual_revenue" => self.annual_revenue = want_number(field, &value)?,
            "currency" => self.currency = want_text(field, &value)?,
            "employee_count" => {
                self.employee_count = want_number(field, &value)?.map(|n| n.max(0.0) as u32)
            }
            "website" => self.website = want_text(field, &value)?,
            "phone" => self.phone = want_text(field, &value)?,
            "email" => self.email = want_text(field, &value)?,
            "description" => self.description = want_text(field, &value)?,
            "business_model" => self.business_model = want_text(field, &value)?,
            "founded_year" => self.founded_year = want_number(field, &value)?.map(|n| n as i32),
            "status" => self.status = parse_enum(field, &value)?,
            "rating" => {
                self.rating = if value.is_empty() {
                    None
                } else {
                    Some(parse_enum(field, &value)?)
                }
            }
            "priority" => self.priority = parse_enum(field, &value)?,
            "owner_id" => {
                self.owner_id = want_text(field, &value)?.ok_or_else(|| {
                    KeelError::Validation("owner_id must not be empty".to_string())
                })?
            }
            "team_id" => self.team_id = want_text(field, &value)?,
            "tags" => {
                let tags = value.as_list().ok_or_else(|| {
                    KeelError::Validation(format!("tags expects a list, got {}", value.kind()))
                })?;
                self.tags = dedup_tags(tags);
            }
            "health_score" => {
                let score = want_number(field, &value)?;
                validate_score(field, score)?;
                self.health_score = score;
            }
            "engagement_score" => {
                let score = want_number(field, &value)?;
                validate_score(field, score)?;
                self.engagement_score = score;
            }
            "first_contact_date" => self.first_contact_date = want_date(field, &value)?,
            "last_activity_date" => self.last_activity_date = want_date(field, &value)?,
            "last_contacted_date" => self.last_contacted_date = want_date(field, &value)?,
            "next_follow_up_date" => self.next_follow_up_date = want_date(field, &value)?,
            "email_opt_in" => self.consent.email_opt_in = want_bool(field, &value)?,
            "sms_opt_in" => self.consent.sms_opt_in = want_bool(field, &value)?,
            "do_not_call" => self.consent.do_not_call = want_bool(field, &value)?,
            other => {
                return Err(KeelError::Validation(format!(
                    "unknown account field `{other}`"
                )))
            }
        }
        Ok(())
    }

    /// Names of fields whose value differs from `before`. Audit fields are
    /// ignored; custom fields are reported as `custom.<key>`.
    pub fn changed_fields(&self, before: &Account) -> Vec<String> {
        let mut changed: Vec<String> = ACCOUNT_FIELDS
            .iter()
            .filter(|f| !READ_ONLY_FIELDS.contains(*f))
            .filter(|f| self.field(f) != before.field(f))
            .map(|f| f.to_string())
            .collect();
        let keys = self
            .custom_fields
            .keys()
            .chain(before.custom_fields.keys())
            .collect::<std::collections::BTreeSet<_>>();
        for key in keys {
            if self.custom_fields.get(key) != before.custom_fields.get(key) {
                changed.push(format!("custom.{key}"));
            }
        }
        changed
    }
}

impl AccountPatch {
    /// Copy every set field onto `account`. Audit fields are left to the store.
    pub fn apply_to(self, account: &mut Account) {
        macro_rules! set {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = self.$field { account.$field = v; })*
            };
        }
        set!(
            account_number,
            name,
            parent_account_id,
            account_type,
            industry,
            sub_industry,
            account_size,
            annual_revenue,
            currency,
            employee_count,
            website,
            phone,
            email,
            billing_address,
            shipping_address,
            description,
            business_model,
            founded_year,
            status,
            rating,
            priority,
            owner_id,
            team_id,
            health_score,
            engagement_score,
            first_contact_date,
            last_activity_date,
            last_contacted_date,
            next_follow_up_date,
            consent,
        );
        if let Some(custom) = self.custom_fields {
            account.custom_fields.extend(custom);
        }
        if let Some(tags) = self.tags {
            account.tags = dedup_tags(tags);
        }
    }

    /// Whether applying this patch could alter the parent link.
    pub fn touches_parent(&self) -> bool {
        self.parent_account_id.is_some()
    }
}

/// Trim tags and drop empty and case-insensitive repeats, keeping first spelling.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            out.push(tag.to_string());
        }
    }
    out
}

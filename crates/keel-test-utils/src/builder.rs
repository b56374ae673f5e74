// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fluent construction of accounts and drafts.

use chrono::{DateTime, Utc};
use keel_core::{
    Account, AccountSize, AccountStatus, AccountType, FieldValue, NewAccount, Rating,
};

use crate::fixed_now;

/// Builder for [`Account`] fixtures.
///
/// Only the fields a test cares about need to be set; everything else takes
/// the [`NewAccount`] default. `build()` yields a materialized account with
/// id and audit fields, `draft()` the bare draft for `create_account`.
#[derive(Debug, Clone)]
pub struct AccountBuilder {
    id: String,
    created_at: DateTime<Utc>,
    draft: NewAccount,
}

impl AccountBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            id: format!("acc_{}", name.to_ascii_lowercase().replace(' ', "_")),
            created_at: fixed_now(),
            draft: NewAccount {
                name: name.to_string(),
                owner_id: "user_1".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn email(mut self, email: &str) -> Self {
        self.draft.email = Some(email.to_string());
        self
    }

    pub fn phone(mut self, phone: &str) -> Self {
        self.draft.phone = Some(phone.to_string());
        self
    }

    pub fn website(mut self, website: &str) -> Self {
        self.draft.website = Some(website.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.draft.description = Some(description.to_string());
        self
    }

    pub fn account_type(mut self, account_type: AccountType) -> Self {
        self.draft.account_type = account_type;
        self
    }

    pub fn status(mut self, status: AccountStatus) -> Self {
        self.draft.status = status;
        self
    }

    pub fn industry(mut self, industry: &str) -> Self {
        self.draft.industry = Some(industry.to_string());
        self
    }

    pub fn size(mut self, size: AccountSize) -> Self {
        self.draft.account_size = Some(size);
        self
    }

    pub fn rating(mut self, rating: Rating) -> Self {
        self.draft.rating = Some(rating);
        self
    }

    pub fn owner(mut self, owner_id: &str) -> Self {
        self.draft.owner_id = owner_id.to_string();
        self
    }

    pub fn parent(mut self, parent_id: &str) -> Self {
        self.draft.parent_account_id = Some(parent_id.to_string());
        self
    }

    pub fn revenue(mut self, revenue: f64) -> Self {
        self.draft.annual_revenue = Some(revenue);
        self
    }

    pub fn health(mut self, score: f64) -> Self {
        self.draft.health_score = Some(score);
        self
    }

    pub fn engagement(mut self, score: f64) -> Self {
        self.draft.engagement_score = Some(score);
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.draft.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn custom(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.draft.custom_fields.insert(key.to_string(), value.into());
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn last_activity(mut self, at: DateTime<Utc>) -> Self {
        self.draft.last_activity_date = Some(at);
        self
    }

    /// The draft, for feeding a store.
    pub fn draft(self) -> NewAccount {
        self.draft
    }

    /// A materialized account stamped by the `test` actor.
    pub fn build(self) -> Account {
        Account::from_new(self.id, self.draft, "test", self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_derives_id_from_name() {
        let account = AccountBuilder::new("Acme Corp").health(80.0).build();
        assert_eq!(account.id, "acc_acme_corp");
        assert_eq!(account.health_score, Some(80.0));
        assert_eq!(account.created_by, "test");
    }

    #[test]
    fn draft_keeps_overrides() {
        let draft = AccountBuilder::new("Globex")
            .owner("user_9")
            .tags(&["vip"])
            .draft();
        assert_eq!(draft.owner_id, "user_9");
        assert_eq!(draft.tags, vec!["vip".to_string()]);
    }
}

// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Many-to-many link tables to external contacts and deals.
//!
//! At most one link per (account, external id) pair exists; linking again
//! updates the relationship metadata in place. Marking a link primary
//! clears the flag on the account's other links of the same kind.

use keel_core::{AccountContact, AccountDeal, ContactLink, DealLink, KeelError};
use tracing::{debug, info};

use crate::{prefix, AccountStore};

impl AccountStore {
    pub fn link_contact(
        &mut self,
        account_id: &str,
        contact_id: &str,
        link: ContactLink,
    ) -> Result<AccountContact, KeelError> {
        if !self.contains_account(account_id) {
            return Err(KeelError::not_found("account", account_id));
        }
        if link.is_primary {
            for other in self.contacts.iter_mut().filter(|c| c.account_id == account_id) {
                other.is_primary = false;
            }
        }
        if let Some(existing) = self
            .contacts
            .iter_mut()
            .find(|c| c.account_id == account_id && c.contact_id == contact_id)
        {
            existing.role = link.role;
            existing.is_primary = link.is_primary;
            existing.influence_level = link.influence_level;
            existing.relationship_type = link.relationship_type;
            debug!(account_id, contact_id, "contact link updated");
            return Ok(existing.clone());
        }
        let record = AccountContact {
            id: self.mint_id(prefix::CONTACT_LINK),
            account_id: account_id.to_string(),
            contact_id: contact_id.to_string(),
            role: link.role,
            is_primary: link.is_primary,
            influence_level: link.influence_level,
            relationship_type: link.relationship_type,
            created_at: self.now(),
        };
        info!(account_id, contact_id, "contact linked");
        self.contacts.push(record.clone());
        Ok(record)
    }

    /// Returns whether a link was removed.
    pub fn unlink_contact(&mut self, account_id: &str, contact_id: &str) -> bool {
        let before = self.contacts.len();
        self.contacts
            .retain(|c| !(c.account_id == account_id && c.contact_id == contact_id));
        before != self.contacts.len()
    }

    pub fn contacts_for(&self, account_id: &str) -> Vec<&AccountContact> {
        self.contacts
            .iter()
            .filter(|c| c.account_id == account_id)
            .collect()
    }

    /// Move contact links from `from` to `to`. A contact already linked to
    /// `to` keeps the `to` link and the `from` link is dropped; moved links
    /// lose their primary flag when `to` already has a primary contact.
    pub fn reassign_contacts(&mut self, from: &str, to: &str) -> usize {
        let target_has_primary = self
            .contacts
            .iter()
            .any(|c| c.account_id == to && c.is_primary);
        let already: Vec<String> = self
            .contacts
            .iter()
            .filter(|c| c.account_id == to)
            .map(|c| c.contact_id.clone())
            .collect();
        self.contacts
            .retain(|c| !(c.account_id == from && already.contains(&c.contact_id)));
        let mut moved = 0;
        for link in self.contacts.iter_mut().filter(|c| c.account_id == from) {
            link.account_id = to.to_string();
            if target_has_primary {
                link.is_primary = false;
            }
            moved += 1;
        }
        moved
    }

    pub fn link_deal(
        &mut self,
        account_id: &str,
        deal_id: &str,
        link: DealLink,
    ) -> Result<AccountDeal, KeelError> {
        if !self.contains_account(account_id) {
            return Err(KeelError::not_found("account", account_id));
        }
        if link.is_primary {
            for other in self.deals.iter_mut().filter(|d| d.account_id == account_id) {
                other.is_primary = false;
            }
        }
        if let Some(existing) = self
            .deals
            .iter_mut()
            .find(|d| d.account_id == account_id && d.deal_id == deal_id)
        {
            existing.is_primary = link.is_primary;
            existing.relationship_type = link.relationship_type;
            return Ok(existing.clone());
        }
        let record = AccountDeal {
            id: self.mint_id(prefix::DEAL_LINK),
            account_id: account_id.to_string(),
            deal_id: deal_id.to_string(),
            is_primary: link.is_primary,
            relationship_type: link.relationship_type,
            created_at: self.now(),
        };
        info!(account_id, deal_id, "deal linked");
        self.deals.push(record.clone());
        Ok(record)
    }

    pub fn unlink_deal(&mut self, account_id: &str, deal_id: &str) -> bool {
        let before = self.deals.len();
        self.deals
            .retain(|d| !(d.account_id == account_id && d.deal_id == deal_id));
        before != self.deals.len()
    }

    pub fn deals_for(&self, account_id: &str) -> Vec<&AccountDeal> {
        self.deals
            .iter()
            .filter(|d| d.account_id == account_id)
            .collect()
    }

    /// Deal counterpart of [`AccountStore::reassign_contacts`].
    pub fn reassign_deals(&mut self, from: &str, to: &str) -> usize {
        let target_has_primary = self.deals.iter().any(|d| d.account_id == to && d.is_primary);
        let already: Vec<String> = self
            .deals
            .iter()
            .filter(|d| d.account_id == to)
            .map(|d| d.deal_id.clone())
            .collect();
        self.deals
            .retain(|d| !(d.account_id == from && already.contains(&d.deal_id)));
        let mut moved = 0;
        for link in self.deals.iter_mut().filter(|d| d.account_id == from) {
            link.account_id = to.to_string();
            if target_has_primary {
                link.is_primary = false;
            }
            moved += 1;
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use keel_core::InfluenceLevel;
    use keel_test_utils::AccountBuilder;

    use super::*;

    fn store() -> AccountStore {
        let mut store = AccountStore::default();
        store
            .restore_accounts(vec![
                AccountBuilder::new("A").id("a").build(),
                AccountBuilder::new("B").id("b").build(),
            ])
            .unwrap();
        store
    }

    #[test]
    fn relinking_updates_in_place() {
        let mut store = store();
        store.link_contact("a", "c1", ContactLink::default()).unwrap();
        let link = store
            .link_contact(
                "a",
                "c1",
                ContactLink {
                    influence_level: InfluenceLevel::DecisionMaker,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(link.influence_level, InfluenceLevel::DecisionMaker);
        assert_eq!(store.contacts_for("a").len(), 1);
    }

    #[test]
    fn one_primary_contact_per_account() {
        let mut store = store();
        let primary = ContactLink {
            is_primary: true,
            ..Default::default()
        };
        store.link_contact("a", "c1", primary.clone()).unwrap();
        store.link_contact("a", "c2", primary).unwrap();
        let primaries: Vec<&str> = store
            .contacts_for("a")
            .iter()
            .filter(|c| c.is_primary)
            .map(|c| c.contact_id.as_str())
            .collect();
        assert_eq!(primaries, vec!["c2"]);
    }

    #[test]
    fn link_to_missing_account_fails() {
        let mut store = store();
        assert!(store.link_deal("zzz", "d1", DealLink::default()).is_err());
    }

    #[test]
    fn unlink_reports_removal() {
        let mut store = store();
        store.link_deal("a", "d1", DealLink::default()).unwrap();
        assert!(store.unlink_deal("a", "d1"));
        assert!(!store.unlink_deal("a", "d1"));
    }

    #[test]
    fn reassign_contacts_dedupes_by_contact() {
        let mut store = store();
        store.link_contact("a", "shared", ContactLink::default()).unwrap();
        store.link_contact("b", "shared", ContactLink::default()).unwrap();
        store.link_contact("b", "only_b", ContactLink::default()).unwrap();

        assert_eq!(store.reassign_contacts("b", "a"), 1);
        let ids: Vec<&str> = store
            .contacts_for("a")
            .iter()
            .map(|c| c.contact_id.as_str())
            .collect();
        assert_eq!(ids, vec!["shared", "only_b"]);
        assert!(store.contacts_for("b").is_empty());
    }
}

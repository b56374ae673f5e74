// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seeded demo dataset.

use chrono::Duration;
use keel_core::{Account, AccountSize, AccountStatus, AccountType, NewAccount, Rating};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::fixed_now;

const PREFIXES: &[&str] = &[
    "Acme", "Globex", "Initech", "Umbrella", "Stark", "Wayne", "Hooli", "Vandelay", "Soylent",
    "Tyrell", "Wonka", "Cyberdyne",
];
const SUFFIXES: &[&str] = &["Corp", "Labs", "Systems", "Group", "Holdings", "Industries"];
const INDUSTRIES: &[&str] = &[
    "Technology",
    "Healthcare",
    "Finance",
    "Manufacturing",
    "Retail",
    "Energy",
];
const TYPES: &[AccountType] = &[
    AccountType::Prospect,
    AccountType::Customer,
    AccountType::Partner,
    AccountType::Vendor,
    AccountType::Competitor,
];
const SIZES: &[AccountSize] = &[
    AccountSize::Startup,
    AccountSize::Small,
    AccountSize::Medium,
    AccountSize::Large,
    AccountSize::Enterprise,
];
const RATINGS: &[Rating] = &[Rating::Hot, Rating::Warm, Rating::Cold];
const TAGS: &[&str] = &["vip", "renewal", "expansion", "churn-risk", "partner-led"];
const OWNERS: &[&str] = &["user_1", "user_2", "user_3"];

/// Generate `n` accounts from `seed`. The same seed always yields the same
/// accounts. Ids are `acc_0000`, `acc_0001`, ...
///
/// Roughly one account in seven repeats the name and email of an earlier one
/// so duplicate detection has something to find.
pub fn sample_accounts(n: usize, seed: u64) -> Vec<Account> {
    let mut rng = StdRng::seed_from_u64(seed);
    let now = fixed_now();
    let mut accounts: Vec<Account> = Vec::with_capacity(n);

    for i in 0..n {
        let (name, email) = if i > 0 && i % 7 == 0 {
            let earlier = &accounts[rng.gen_range(0..i)];
            (earlier.name.clone(), earlier.email.clone())
        } else {
            let name = format!(
                "{} {}",
                PREFIXES.choose(&mut rng).copied().unwrap_or("Acme"),
                SUFFIXES.choose(&mut rng).copied().unwrap_or("Corp")
            );
            let email = format!("info{i}@{}.example", name.to_ascii_lowercase().replace(' ', "-"));
            (name, Some(email))
        };

        let status = match rng.gen_range(0..10) {
            0 => AccountStatus::Inactive,
            1 => AccountStatus::Archived,
            _ => AccountStatus::Active,
        };
        let tag_count = rng.gen_range(0..3);
        let tags = TAGS
            .choose_multiple(&mut rng, tag_count)
            .map(|t| t.to_string())
            .collect();

        let draft = NewAccount {
            name,
            email,
            phone: rng
                .gen_bool(0.7)
                .then(|| format!("+1-555-{:04}", rng.gen_range(0..10_000))),
            account_type: TYPES.choose(&mut rng).copied().unwrap_or_default(),
            industry: rng
                .gen_bool(0.9)
                .then(|| INDUSTRIES.choose(&mut rng).map(|s| s.to_string()))
                .flatten(),
            account_size: SIZES.choose(&mut rng).copied(),
            status,
            rating: RATINGS.choose(&mut rng).copied(),
            owner_id: OWNERS.choose(&mut rng).copied().unwrap_or("user_1").to_string(),
            annual_revenue: rng
                .gen_bool(0.8)
                .then(|| f64::from(rng.gen_range(50u32..50_000)) * 1_000.0),
            employee_count: Some(rng.gen_range(5..20_000)),
            health_score: rng.gen_bool(0.85).then(|| f64::from(rng.gen_range(0u32..=100))),
            engagement_score: rng.gen_bool(0.85).then(|| f64::from(rng.gen_range(0u32..=100))),
            last_activity_date: rng
                .gen_bool(0.6)
                .then(|| now - Duration::days(rng.gen_range(0..90))),
            tags,
            ..Default::default()
        };
        let created_at = now - Duration::days(rng.gen_range(0..120));
        accounts.push(Account::from_new(format!("acc_{i:04}"), draft, "seed", created_at));
    }

    accounts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_accounts() {
        assert_eq!(sample_accounts(25, 7), sample_accounts(25, 7));
    }

    #[test]
    fn scores_stay_in_range() {
        for account in sample_accounts(100, 42) {
            assert!(account.validate().is_ok(), "invalid sample {account:?}");
        }
    }

    #[test]
    fn every_seventh_account_repeats_an_earlier_name() {
        let accounts = sample_accounts(15, 3);
        let seventh = &accounts[7];
        assert!(accounts[..7].iter().any(|a| a.name == seventh.name));
    }
}

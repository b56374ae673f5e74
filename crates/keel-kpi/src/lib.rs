// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! KPI aggregation over account collections.
//!
//! [`compute_kpis`] is a pure read over whatever slice it is given: pass the
//! whole store for dashboard totals or a filtered subset for segment
//! reporting.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Utc};
use keel_config::KpiConfig;
use keel_core::{Account, AccountStatus};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bucket used in breakdowns for accounts without a value.
pub const UNKNOWN_BUCKET: &str = "unknown";

/// One entry of the top-by-revenue ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopAccount {
    pub id: String,
    pub name: String,
    pub annual_revenue: f64,
}

/// Summary statistics over a set of accounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountKpi {
    pub total_accounts: usize,
    pub active_accounts: usize,
    /// Created in the calendar month of `now`.
    pub new_this_month: usize,
    /// Created in the calendar month before `now`.
    pub new_last_month: usize,
    /// `last_activity_date` inside the trailing window.
    pub recent_activity: usize,
    /// Health score present and below the at-risk threshold.
    pub at_risk: usize,
    /// Mean over all accounts, missing scores counted as 0. Zero when empty.
    pub average_health_score: f64,
    pub average_engagement_score: f64,
    pub top_accounts: Vec<TopAccount>,
    pub accounts_by_industry: BTreeMap<String, usize>,
    pub accounts_by_size: BTreeMap<String, usize>,
    pub accounts_by_type: BTreeMap<String, usize>,
}

/// Compute KPIs for `accounts` as of `now`.
pub fn compute_kpis(accounts: &[Account], now: DateTime<Utc>, config: &KpiConfig) -> AccountKpi {
    let this_month = (now.year(), now.month());
    let last_month = previous_month(this_month);
    // A window reaching past the representable range counts every activity.
    let recent_cutoff = Duration::try_days(config.recent_activity_days)
        .and_then(|window| now.checked_sub_signed(window));

    let mut kpi = AccountKpi {
        total_accounts: accounts.len(),
        ..Default::default()
    };
    let mut health_sum = 0.0;
    let mut engagement_sum = 0.0;

    for account in accounts {
        if account.status == AccountStatus::Active {
            kpi.active_accounts += 1;
        }
        let created = (account.created_at.year(), account.created_at.month());
        if created == this_month {
            kpi.new_this_month += 1;
        } else if created == last_month {
            kpi.new_last_month += 1;
        }
        if account
            .last_activity_date
            .is_some_and(|at| recent_cutoff.is_none_or(|cutoff| at >= cutoff))
        {
            kpi.recent_activity += 1;
        }
        if account
            .health_score
            .is_some_and(|h| h < config.at_risk_threshold)
        {
            kpi.at_risk += 1;
        }
        health_sum += account.health_score.unwrap_or(0.0);
        engagement_sum += account.engagement_score.unwrap_or(0.0);

        bump(
            &mut kpi.accounts_by_industry,
            account.industry.as_deref().filter(|i| !i.trim().is_empty()),
        );
        bump(
            &mut kpi.accounts_by_size,
            account.account_size.map(|s| s.to_string()).as_deref(),
        );
        bump(&mut kpi.accounts_by_type, Some(&account.account_type.to_string()));
    }

    if !accounts.is_empty() {
        let n = accounts.len() as f64;
        kpi.average_health_score = health_sum / n;
        kpi.average_engagement_score = engagement_sum / n;
    }
    kpi.top_accounts = top_by_revenue(accounts, config.top_accounts);

    debug!(
        total = kpi.total_accounts,
        active = kpi.active_accounts,
        at_risk = kpi.at_risk,
        "kpis computed"
    );
    kpi
}

/// Accounts with a revenue figure, highest first, at most `limit`.
/// Ties keep collection order.
pub fn top_by_revenue(accounts: &[Account], limit: usize) -> Vec<TopAccount> {
    let mut ranked: Vec<TopAccount> = accounts
        .iter()
        .filter_map(|a| {
            a.annual_revenue.map(|revenue| TopAccount {
                id: a.id.clone(),
                name: a.name.clone(),
                annual_revenue: revenue,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.annual_revenue.total_cmp(&a.annual_revenue));
    ranked.truncate(limit);
    ranked
}

fn bump(map: &mut BTreeMap<String, usize>, key: Option<&str>) {
    *map.entry(key.unwrap_or(UNKNOWN_BUCKET).to_string())
        .or_default() += 1;
}

fn previous_month((year, month): (i32, u32)) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use keel_core::{AccountSize, AccountType};
    use keel_test_utils::{fixed_now, AccountBuilder};

    use super::*;

    #[test]
    fn empty_input_has_zero_means() {
        let kpi = compute_kpis(&[], fixed_now(), &KpiConfig::default());
        assert_eq!(kpi.total_accounts, 0);
        assert_eq!(kpi.average_health_score, 0.0);
        assert!(!kpi.average_engagement_score.is_nan());
        assert!(kpi.top_accounts.is_empty());
    }

    #[test]
    fn counts_months_activity_and_risk() {
        let now = fixed_now();
        let feb = Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap();
        let jan = Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap();
        let accounts = vec![
            AccountBuilder::new("A").health(40.0).last_activity(now - Duration::days(3)).build(),
            AccountBuilder::new("B").health(80.0).created_at(feb).build(),
            AccountBuilder::new("C")
                .status(AccountStatus::Inactive)
                .created_at(jan)
                .last_activity(now - Duration::days(45))
                .build(),
        ];
        let kpi = compute_kpis(&accounts, now, &KpiConfig::default());
        assert_eq!(kpi.total_accounts, 3);
        assert_eq!(kpi.active_accounts, 2);
        assert_eq!(kpi.new_this_month, 1);
        assert_eq!(kpi.new_last_month, 1);
        assert_eq!(kpi.recent_activity, 1);
        assert_eq!(kpi.at_risk, 1);
        assert_eq!(kpi.average_health_score, 40.0);
    }

    #[test]
    fn oversized_activity_window_counts_all_activity() {
        let now = fixed_now();
        let accounts = vec![
            AccountBuilder::new("A").last_activity(now - Duration::days(4_000)).build(),
            AccountBuilder::new("B").build(),
        ];
        let config = KpiConfig {
            recent_activity_days: 200_000_000,
            ..KpiConfig::default()
        };
        let kpi = compute_kpis(&accounts, now, &config);
        assert_eq!(kpi.recent_activity, 1);
    }

    #[test]
    fn last_month_rolls_over_the_year() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
        let december = Utc.with_ymd_and_hms(2025, 12, 20, 0, 0, 0).unwrap();
        let accounts = vec![AccountBuilder::new("A").created_at(december).build()];
        let kpi = compute_kpis(&accounts, now, &KpiConfig::default());
        assert_eq!(kpi.new_last_month, 1);
        assert_eq!(kpi.new_this_month, 0);
    }

    #[test]
    fn top_accounts_skip_missing_revenue() {
        let accounts = vec![
            AccountBuilder::new("Small").revenue(1_000.0).build(),
            AccountBuilder::new("None").build(),
            AccountBuilder::new("Big").revenue(9_000.0).build(),
            AccountBuilder::new("Mid").revenue(5_000.0).build(),
        ];
        let top = top_by_revenue(&accounts, 2);
        let names: Vec<_> = top.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Big", "Mid"]);
    }

    #[test]
    fn breakdowns_use_unknown_bucket() {
        let accounts = vec![
            AccountBuilder::new("A")
                .industry("Retail")
                .size(AccountSize::Small)
                .account_type(AccountType::Customer)
                .build(),
            AccountBuilder::new("B").account_type(AccountType::Partner).build(),
        ];
        let kpi = compute_kpis(&accounts, fixed_now(), &KpiConfig::default());
        assert_eq!(kpi.accounts_by_industry.get("Retail"), Some(&1));
        assert_eq!(kpi.accounts_by_industry.get(UNKNOWN_BUCKET), Some(&1));
        assert_eq!(kpi.accounts_by_size.get(UNKNOWN_BUCKET), Some(&1));
        assert_eq!(kpi.accounts_by_type.get("customer"), Some(&1));
        assert_eq!(kpi.accounts_by_type.get("partner"), Some(&1));
    }
}

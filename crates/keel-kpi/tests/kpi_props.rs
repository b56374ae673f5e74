// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consistency properties of KPI aggregation.

use keel_config::KpiConfig;
use keel_kpi::compute_kpis;
use keel_test_utils::{fixed_now, sample_accounts};
use proptest::prelude::*;

proptest! {
    #[test]
    fn breakdowns_sum_to_total(n in 0usize..80, seed in any::<u64>()) {
        let accounts = sample_accounts(n, seed);
        let kpi = compute_kpis(&accounts, fixed_now(), &KpiConfig::default());

        prop_assert_eq!(kpi.total_accounts, n);
        prop_assert_eq!(kpi.accounts_by_type.values().sum::<usize>(), n);
        prop_assert_eq!(kpi.accounts_by_industry.values().sum::<usize>(), n);
        prop_assert_eq!(kpi.accounts_by_size.values().sum::<usize>(), n);
        prop_assert!(kpi.active_accounts <= n);
        prop_assert!(kpi.top_accounts.len() <= KpiConfig::default().top_accounts);
        prop_assert!((0.0..=100.0).contains(&kpi.average_health_score));
        prop_assert!(kpi
            .top_accounts
            .windows(2)
            .all(|w| w[0].annual_revenue >= w[1].annual_revenue));
    }
}

#[test]
fn kpis_serialize_for_reporting() {
    let accounts = sample_accounts(12, 7);
    let kpi = compute_kpis(&accounts, fixed_now(), &KpiConfig::default());
    let json = serde_json::to_value(&kpi).expect("serialize");
    assert_eq!(json["total_accounts"], 12);
    assert!(json["accounts_by_type"].is_object());
}

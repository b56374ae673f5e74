// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Keel.
//!
//! Provides deterministic fixtures so tests across the workspace build
//! accounts the same way without a running store.
//!
//! # Components
//!
//! - [`AccountBuilder`] - fluent builder for single accounts
//! - [`sample_accounts`] - seeded generator for realistic account sets
//! - [`fixed_now`] / [`fixed_clock`] - a pinned instant and a clock starting there

pub mod builder;
pub mod sample;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use keel_core::ManualClock;

pub use builder::AccountBuilder;
pub use keel_core::SequentialIds;
pub use sample::sample_accounts;

/// The instant every fixture is anchored to: 2026-03-15 12:00:00 UTC.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// A manual clock starting at [`fixed_now`].
pub fn fixed_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(fixed_now()))
}

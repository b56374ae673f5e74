// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-side queries over account collections.
//!
//! Everything here is a pure function of its inputs: [`filter_accounts`]
//! keeps collection order, [`sort_accounts`] applies a view's sort key, and
//! [`apply_view`] does both.

pub mod filter;
pub mod sort;

pub use filter::{filter_accounts, matches};
pub use sort::{compare_field_values, sort_accounts};

use keel_core::{Account, AccountView};

/// Filter by the view's criteria, then order by its sort key (if any).
pub fn apply_view<'a, I>(accounts: I, view: &AccountView) -> Vec<&'a Account>
where
    I: IntoIterator<Item = &'a Account>,
{
    let mut result = filter_accounts(accounts, &view.filter);
    if let Some(sort) = &view.sort {
        sort_accounts(&mut result, sort);
    }
    tracing::debug!(view_id = %view.id, matched = result.len(), "view applied");
    result
}

// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordering of filtered accounts by a view's sort key.

use std::cmp::Ordering;

use keel_core::{Account, FieldValue, SortDirection, SortSpec};

/// Stable sort by `spec.field`. Accounts without a value for the field go
/// last in both directions.
pub fn sort_accounts(accounts: &mut [&Account], spec: &SortSpec) {
    accounts.sort_by(|a, b| {
        match (a.field(&spec.field), b.field(&spec.field)) {
            (Some(x), Some(y)) => {
                let ord = compare_field_values(&x, &y);
                match spec.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

/// Total order over field values: numbers and dates numerically, text
/// case-insensitively. Values of different kinds order by kind name.
pub fn compare_field_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Number(x), FieldValue::Number(y)) => x.total_cmp(y),
        (FieldValue::Date(x), FieldValue::Date(y)) => x.cmp(y),
        (FieldValue::Bool(x), FieldValue::Bool(y)) => x.cmp(y),
        (FieldValue::List(x), FieldValue::List(y)) => x.len().cmp(&y.len()),
        (
            FieldValue::Text(x) | FieldValue::Enum(x),
            FieldValue::Text(y) | FieldValue::Enum(y),
        ) => x.to_lowercase().cmp(&y.to_lowercase()),
        _ => a.kind().cmp(b.kind()),
    }
}

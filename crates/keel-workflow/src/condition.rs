// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Condition evaluation.
//!
//! Operators are total: a missing field or a value of the wrong kind makes
//! a comparison false (and its `not_*` counterpart true) rather than an
//! error.

use keel_core::{Account, ConditionOperator, FieldValue, LogicalOperator, WorkflowCondition};

/// Evaluate a condition list strictly left to right. Each condition's
/// `logical_operator` joins it to the result accumulated so far; the first
/// condition's operator is ignored. An empty list holds.
pub fn evaluate_conditions(account: &Account, conditions: &[WorkflowCondition]) -> bool {
    let mut iter = conditions.iter();
    let Some(first) = iter.next() else {
        return true;
    };
    let mut result = evaluate_condition(account, first);
    for condition in iter {
        let value = evaluate_condition(account, condition);
        result = match condition.logical_operator {
            LogicalOperator::And => result && value,
            LogicalOperator::Or => result || value,
        };
    }
    result
}

/// Evaluate one condition against an account.
pub fn evaluate_condition(account: &Account, condition: &WorkflowCondition) -> bool {
    let actual = account.field(&condition.field);
    let expected = condition.value.as_ref();
    match condition.operator {
        ConditionOperator::IsEmpty => is_empty(actual.as_ref()),
        ConditionOperator::IsNotEmpty => !is_empty(actual.as_ref()),
        ConditionOperator::Equals => both(actual.as_ref(), expected, equals),
        ConditionOperator::NotEquals => !both(actual.as_ref(), expected, equals),
        ConditionOperator::Contains => both(actual.as_ref(), expected, contains),
        ConditionOperator::NotContains => !both(actual.as_ref(), expected, contains),
        ConditionOperator::GreaterThan => {
            both(actual.as_ref(), expected, |a, e| compare(a, e).is_some_and(|o| o.is_gt()))
        }
        ConditionOperator::LessThan => {
            both(actual.as_ref(), expected, |a, e| compare(a, e).is_some_and(|o| o.is_lt()))
        }
        ConditionOperator::StartsWith => both(actual.as_ref(), expected, |a, e| {
            text_pair(a, e).is_some_and(|(a, e)| a.starts_with(&e))
        }),
        ConditionOperator::EndsWith => both(actual.as_ref(), expected, |a, e| {
            text_pair(a, e).is_some_and(|(a, e)| a.ends_with(&e))
        }),
    }
}

fn is_empty(value: Option<&FieldValue>) -> bool {
    value.is_none_or(FieldValue::is_empty)
}

fn both(
    actual: Option<&FieldValue>,
    expected: Option<&FieldValue>,
    op: impl Fn(&FieldValue, &FieldValue) -> bool,
) -> bool {
    match (actual, expected) {
        (Some(a), Some(e)) => op(a, e),
        _ => false,
    }
}

fn equals(actual: &FieldValue, expected: &FieldValue) -> bool {
    match actual {
        FieldValue::Number(n) => expected.as_number() == Some(*n),
        FieldValue::Date(d) => expected.as_date() == Some(*d),
        FieldValue::Bool(b) => expected.as_bool() == Some(*b),
        FieldValue::Text(s) | FieldValue::Enum(s) => match expected {
            FieldValue::Number(n) => actual.as_number() == Some(*n),
            _ => expected.as_str() == Some(s.as_str()),
        },
        FieldValue::List(items) => matches!(expected, FieldValue::List(other) if other == items),
    }
}

/// Substring for text, membership for lists; both case-insensitive.
fn contains(actual: &FieldValue, expected: &FieldValue) -> bool {
    let needle = expected.to_text().to_lowercase();
    match actual {
        FieldValue::Text(s) | FieldValue::Enum(s) => s.to_lowercase().contains(&needle),
        FieldValue::List(items) => items.iter().any(|i| i.to_lowercase() == needle),
        _ => false,
    }
}

/// Numbers compare numerically, dates chronologically, anything else is
/// incomparable.
fn compare(actual: &FieldValue, expected: &FieldValue) -> Option<std::cmp::Ordering> {
    if let (Some(a), Some(e)) = (actual.as_number(), expected.as_number()) {
        return a.partial_cmp(&e);
    }
    if let (Some(a), Some(e)) = (actual.as_date(), expected.as_date()) {
        return Some(a.cmp(&e));
    }
    None
}

fn text_pair(actual: &FieldValue, expected: &FieldValue) -> Option<(String, String)> {
    Some((
        actual.as_str()?.to_lowercase(),
        expected.as_str()?.to_lowercase(),
    ))
}

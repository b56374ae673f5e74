// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Automation rule records: trigger, conditions, actions and counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::{AccountStatus, ActivityType};
use crate::value::FieldValue;

/// Store event that can start a workflow.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    Created,
    Updated,
    FieldChanged,
    StatusChanged,
    TimeBased,
    #[default]
    Manual,
}

/// Trigger configuration. `field` names the watched field for
/// `field_changed`; `schedule` is an opaque description for `time_based`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowTrigger {
    pub trigger_type: TriggerType,
    pub field: Option<String>,
    pub schedule: Option<String>,
}

impl WorkflowTrigger {
    pub fn on(trigger_type: TriggerType) -> Self {
        Self {
            trigger_type,
            ..Default::default()
        }
    }

    pub fn on_field_change(field: impl Into<String>) -> Self {
        Self {
            trigger_type: TriggerType::FieldChanged,
            field: Some(field.into()),
            schedule: None,
        }
    }
}

/// Comparison applied between an account field and a condition operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
    StartsWith,
    EndsWith,
}

/// How a condition joins the result accumulated so far.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

/// One `{field, operator, value, logicalOperator}` tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowCondition {
    pub field: String,
    pub operator: ConditionOperator,
    /// Absent for `is_empty` / `is_not_empty`.
    #[serde(default)]
    pub value: Option<FieldValue>,
    #[serde(default)]
    pub logical_operator: LogicalOperator,
}

impl WorkflowCondition {
    pub fn new(
        field: impl Into<String>,
        operator: ConditionOperator,
        value: Option<FieldValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            logical_operator: LogicalOperator::And,
        }
    }

    /// Same condition joined with OR instead of AND.
    pub fn or(mut self) -> Self {
        self.logical_operator = LogicalOperator::Or;
        self
    }
}

/// Typed parameters for each action kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    CreateTask {
        subject: String,
        #[serde(default)]
        due_in_days: Option<i64>,
        #[serde(default)]
        assignee: Option<String>,
    },
    SendEmail {
        /// Defaults to the account email when absent.
        #[serde(default)]
        to: Option<String>,
        subject: String,
        #[serde(default)]
        body: Option<String>,
    },
    AssignUser {
        user_id: String,
    },
    UpdateField {
        field: String,
        value: FieldValue,
    },
    CreateActivity {
        activity_type: ActivityType,
        subject: String,
        #[serde(default)]
        description: Option<String>,
    },
    SendNotification {
        recipient: String,
        message: String,
    },
    Webhook {
        url: String,
        #[serde(default)]
        method: Option<String>,
    },
    UpdateStatus {
        status: AccountStatus,
    },
    AddTag {
        tag: String,
    },
    CreateDeal {
        name: String,
        #[serde(default)]
        amount: Option<f64>,
    },
}

impl ActionKind {
    /// The `snake_case` action type name.
    pub fn action_type(&self) -> &'static str {
        match self {
            ActionKind::CreateTask { .. } => "create_task",
            ActionKind::SendEmail { .. } => "send_email",
            ActionKind::AssignUser { .. } => "assign_user",
            ActionKind::UpdateField { .. } => "update_field",
            ActionKind::CreateActivity { .. } => "create_activity",
            ActionKind::SendNotification { .. } => "send_notification",
            ActionKind::Webhook { .. } => "webhook",
            ActionKind::UpdateStatus { .. } => "update_status",
            ActionKind::AddTag { .. } => "add_tag",
            ActionKind::CreateDeal { .. } => "create_deal",
        }
    }
}

/// One step of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowAction {
    #[serde(flatten)]
    pub kind: ActionKind,
    /// Requested delay before running. Not backed by a scheduler.
    #[serde(default)]
    pub delay_minutes: Option<u32>,
    /// Guard evaluated against the account just before the action runs.
    #[serde(default)]
    pub condition: Option<WorkflowCondition>,
}

impl From<ActionKind> for WorkflowAction {
    fn from(kind: ActionKind) -> Self {
        Self {
            kind,
            delay_minutes: None,
            condition: None,
        }
    }
}

/// Execution counters. The execution count is derived from the success and
/// failure counts, so `execution_count == success_count + failure_count`
/// holds for every value of this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStats {
    success_count: u64,
    failure_count: u64,
    last_executed_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl WorkflowStats {
    pub fn execution_count(&self) -> u64 {
        self.success_count + self.failure_count
    }

    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    pub fn last_executed_at(&self) -> Option<DateTime<Utc>> {
        self.last_executed_at
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn record_success(&mut self, at: DateTime<Utc>) {
        self.success_count += 1;
        self.last_executed_at = Some(at);
    }

    pub fn record_failure(&mut self, at: DateTime<Utc>, error: impl Into<String>) {
        self.failure_count += 1;
        self.last_executed_at = Some(at);
        self.last_error = Some(error.into());
    }
}

/// An automation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountWorkflow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub trigger: WorkflowTrigger,
    pub conditions: Vec<WorkflowCondition>,
    pub actions: Vec<WorkflowAction>,
    pub is_active: bool,
    pub stats: WorkflowStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
}

/// Caller-supplied fields for a new workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewWorkflow {
    pub name: String,
    pub description: Option<String>,
    pub trigger: WorkflowTrigger,
    pub conditions: Vec<WorkflowCondition>,
    pub actions: Vec<WorkflowAction>,
    pub is_active: bool,
}

/// Partial update of a workflow definition. Counters are never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub trigger: Option<WorkflowTrigger>,
    pub conditions: Option<Vec<WorkflowCondition>>,
    pub actions: Option<Vec<WorkflowAction>>,
    pub is_active: Option<bool>,
}

impl WorkflowPatch {
    pub fn apply_to(self, workflow: &mut AccountWorkflow) {
        if let Some(name) = self.name {
            workflow.name = name;
        }
        if let Some(description) = self.description {
            workflow.description = description;
        }
        if let Some(trigger) = self.trigger {
            workflow.trigger = trigger;
        }
        if let Some(conditions) = self.conditions {
            workflow.conditions = conditions;
        }
        if let Some(actions) = self.actions {
            workflow.actions = actions;
        }
        if let Some(is_active) = self.is_active {
            workflow.is_active = is_active;
        }
    }
}

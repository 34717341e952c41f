//! Audit log records
//!
//! Every household, member, expense and settlement change is written as one
//! `AuditEntry` carrying JSON snapshots of the record before and after.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of record an entry is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Household,
    Member,
    Expense,
    Settlement,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Household => "Household",
            Self::Member => "Member",
            Self::Expense => "Expense",
            Self::Settlement => "Settlement",
        }
    }

    /// Whether changes to this kind of record can move balances
    pub fn affects_balances(&self) -> bool {
        matches!(self, Self::Expense | Self::Settlement)
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audited change
///
/// `before` is present for updates and deletes, `after` for creates and
/// updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub entity_type: EntityType,

    /// Short display id, e.g. `exp-1a2b3c4d`
    pub entity_id: String,

    /// Household name, member name or expense title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

fn snapshot<T: Serialize>(entity_id: &str, record: &T) -> Option<serde_json::Value> {
    serde_json::to_value(record)
        .map_err(|err| warn!(entity = entity_id, error = %err, "audit snapshot failed"))
        .ok()
}

impl AuditEntry {
    fn record(
        operation: Operation,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id,
            entity_name,
            before: None,
            after: None,
            diff_summary: None,
        }
    }

    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        created: &T,
    ) -> Self {
        let mut entry = Self::record(Operation::Create, entity_type, entity_id.into(), entity_name);
        entry.after = snapshot(&entry.entity_id, created);
        entry
    }

    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> Self {
        let mut entry = Self::record(Operation::Update, entity_type, entity_id.into(), entity_name);
        entry.before = snapshot(&entry.entity_id, before);
        entry.after = snapshot(&entry.entity_id, after);
        entry.diff_summary = diff_summary;
        entry
    }

    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        removed: &T,
    ) -> Self {
        let mut entry = Self::record(Operation::Delete, entity_type, entity_id.into(), entity_name);
        entry.before = snapshot(&entry.entity_id, removed);
        entry
    }

    /// `[time] OPERATION Kind id (name)`, with the field changes on a second line
    pub fn format_human_readable(&self) -> String {
        let name = self
            .entity_name
            .as_deref()
            .map(|name| format!(" ({})", name))
            .unwrap_or_default();
        let changes = self
            .diff_summary
            .as_deref()
            .map(|diff| format!("\n  Changes: {}", diff))
            .unwrap_or_default();

        format!(
            "[{}] {} {} {}{}{}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id,
            name,
            changes
        )
    }
}

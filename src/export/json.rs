//! JSON export
//!
//! Dumps one household's members, expenses and settlement records, plus the
//! balances derived from them, with a schema version.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{RoomiesError, RoomiesResult};
use crate::models::{Balance, Expense, Household, HouseholdId, Member, Settlement};
use crate::services::LedgerService;
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full export of one household
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseholdExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub household: Household,

    /// All members, archived ones included
    pub members: Vec<Member>,

    pub expenses: Vec<Expense>,

    pub settlements: Vec<Settlement>,

    /// Balances at export time; absent when the ledger cannot be computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balances: Option<Vec<Balance>>,

    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub member_count: usize,
    pub expense_count: usize,
    pub settlement_count: usize,
    pub earliest_expense: Option<String>,
    pub latest_expense: Option<String>,
}

impl HouseholdExport {
    /// Collect a household's data from storage
    pub fn from_storage(storage: &Storage, household_id: HouseholdId) -> RoomiesResult<Self> {
        let household = storage
            .households
            .get(household_id)?
            .ok_or_else(|| RoomiesError::household_not_found(household_id.to_string()))?;
        let members = storage.members.get_by_household(household_id)?;
        let expenses = storage.expenses.get_by_household(household_id)?;
        let settlements = storage.settlements.get_by_household(household_id)?;

        let balances = match LedgerService::new(storage).balances(household_id) {
            Ok(balances) => Some(balances),
            Err(e) => {
                warn!(household = %household_id, error = %e, "exporting without balances");
                None
            }
        };

        let metadata = ExportMetadata {
            member_count: members.len(),
            expense_count: expenses.len(),
            settlement_count: settlements.len(),
            earliest_expense: expenses.iter().map(|e| e.date).min().map(|d| d.to_string()),
            latest_expense: expenses.iter().map(|e| e.date).max().map(|d| d.to_string()),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            household,
            members,
            expenses,
            settlements,
            balances,
            metadata,
        })
    }

    /// Check that every reference in the export resolves inside it
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let member_ids: HashSet<_> = self.members.iter().map(|m| m.id).collect();
        let expense_ids: HashSet<_> = self.expenses.iter().map(|e| e.id).collect();

        for expense in &self.expenses {
            if !member_ids.contains(&expense.payer_id) {
                return Err(format!(
                    "Expense {} references unknown payer {}",
                    expense.id, expense.payer_id
                ));
            }
            if let Some(split) = expense.splits.iter().find(|s| !member_ids.contains(&s.member_id)) {
                return Err(format!(
                    "Expense {} has a split for unknown member {}",
                    expense.id, split.member_id
                ));
            }
        }

        for settlement in &self.settlements {
            if !expense_ids.contains(&settlement.expense_id) {
                return Err(format!(
                    "Settlement {} references unknown expense {}",
                    settlement.id, settlement.expense_id
                ));
            }
        }

        Ok(())
    }
}

/// Export a household to JSON
pub fn export_household_json<W: Write>(
    storage: &Storage,
    household_id: HouseholdId,
    writer: &mut W,
    pretty: bool,
) -> RoomiesResult<HouseholdExport> {
    let export = HouseholdExport::from_storage(storage, household_id)?;
    if let Err(problem) = export.validate() {
        warn!(household = %household_id, %problem, "exported data has dangling references");
    }

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| RoomiesError::Export(e.to_string()))?;

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::RoomiesPaths;
    use crate::models::{Money, SplitRequest};
    use crate::services::{ExpenseService, HouseholdService, MemberService, NewExpense};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage, HouseholdId) {
        let temp_dir = TempDir::new().unwrap();
        let paths = RoomiesPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let household = HouseholdService::new(&storage).create("Maple").unwrap();
        let members = MemberService::new(&storage);
        let alice = members.add(household.id, "Alice").unwrap();
        let bob = members.add(household.id, "Bob").unwrap();

        ExpenseService::new(&storage)
            .create(
                household.id,
                NewExpense {
                    title: "Rent".into(),
                    amount: Money::from_cents(150_000),
                    payer_id: alice.id,
                    date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                    notes: String::new(),
                    split: SplitRequest::Equal(vec![alice.id, bob.id]),
                },
            )
            .unwrap();

        (temp_dir, storage, household.id)
    }

    #[test]
    fn test_household_export() {
        let (_temp_dir, storage, household_id) = create_test_storage();
        let export = HouseholdExport::from_storage(&storage, household_id).unwrap();

        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(export.metadata.member_count, 2);
        assert_eq!(export.metadata.expense_count, 1);
        assert_eq!(export.metadata.settlement_count, 1);
        assert_eq!(export.metadata.earliest_expense.as_deref(), Some("2025-03-01"));
        assert_eq!(export.balances.as_ref().map(Vec::len), Some(2));
        assert!(export.validate().is_ok());
    }

    #[test]
    fn test_json_output_parses_back() {
        let (_temp_dir, storage, household_id) = create_test_storage();

        let mut output = Vec::new();
        export_household_json(&storage, household_id, &mut output, true).unwrap();

        let parsed: HouseholdExport = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed.household.name, "Maple");
        assert_eq!(parsed.expenses[0].amount.cents(), 150_000);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_validate_catches_dangling_settlement() {
        let (_temp_dir, storage, household_id) = create_test_storage();
        let mut export = HouseholdExport::from_storage(&storage, household_id).unwrap();
        export.expenses.clear();

        assert!(export.validate().unwrap_err().contains("unknown expense"));
    }

    #[test]
    fn test_unknown_household() {
        let (_temp_dir, storage, _) = create_test_storage();
        let err = HouseholdExport::from_storage(&storage, HouseholdId::new()).unwrap_err();
        assert!(err.is_not_found());
    }
}

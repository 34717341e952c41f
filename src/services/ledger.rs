//! Ledger service
//!
//! Read side of the household ledger. Every call loads a fresh snapshot from
//! storage and runs the pure engine on it; nothing is cached.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::RoomiesResult;
use crate::ledger::{compute_balances, compute_settlement_plan};
use crate::models::{
    Balance, Expense, HouseholdId, Member, MemberId, Money, Settlement, Transfer,
};
use crate::storage::Storage;

/// Everything the engine needs for one household
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    /// Active members in roster order
    pub roster: Vec<Member>,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<Settlement>,
}

/// An outstanding settlement record with the context needed to show it
#[derive(Debug, Clone, Serialize)]
pub struct Obligation {
    pub settlement: Settlement,
    pub expense_title: String,
    /// The member owed the money
    pub payer_id: MemberId,
}

/// Paid and owed totals for one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberTotals {
    pub member_id: MemberId,
    pub display_name: String,
    /// Sum of expenses this member paid for
    pub paid: Money,
    /// Sum of this member's splits
    pub share: Money,
}

/// Household-wide spending summary
#[derive(Debug, Clone, Serialize)]
pub struct HouseholdSummary {
    pub expense_count: usize,
    pub total_spent: Money,
    pub outstanding_records: usize,
    pub members: Vec<MemberTotals>,
}

/// Service for balances and settle-up plans
pub struct LedgerService<'a> {
    storage: &'a Storage,
}

impl<'a> LedgerService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Load the current roster, expenses and settlement records
    pub fn snapshot(&self, household_id: HouseholdId) -> RoomiesResult<LedgerSnapshot> {
        let snapshot = LedgerSnapshot {
            roster: self.storage.members.get_roster(household_id)?,
            expenses: self.storage.expenses.get_by_household(household_id)?,
            settlements: self.storage.settlements.get_by_household(household_id)?,
        };
        debug!(
            household = %household_id,
            members = snapshot.roster.len(),
            expenses = snapshot.expenses.len(),
            settlements = snapshot.settlements.len(),
            "loaded ledger snapshot"
        );
        Ok(snapshot)
    }

    /// Each roster member's balance
    pub fn balances(&self, household_id: HouseholdId) -> RoomiesResult<Vec<Balance>> {
        let snapshot = self.snapshot(household_id)?;
        compute_balances(&snapshot.roster, &snapshot.expenses, &snapshot.settlements)
    }

    /// Suggested transfers that would settle the household
    pub fn settlement_plan(&self, household_id: HouseholdId) -> RoomiesResult<Vec<Transfer>> {
        compute_settlement_plan(&self.balances(household_id)?)
    }

    /// Balances and plan from the same snapshot
    pub fn balances_and_plan(
        &self,
        household_id: HouseholdId,
    ) -> RoomiesResult<(Vec<Balance>, Vec<Transfer>)> {
        let balances = self.balances(household_id)?;
        let plan = compute_settlement_plan(&balances)?;
        Ok((balances, plan))
    }

    /// Records where `member_id` still owes money, oldest first
    pub fn obligations(
        &self,
        household_id: HouseholdId,
        member_id: MemberId,
    ) -> RoomiesResult<Vec<Obligation>> {
        let snapshot = self.snapshot(household_id)?;
        let expenses: HashMap<_, _> = snapshot.expenses.iter().map(|e| (e.id, e)).collect();

        Ok(snapshot
            .settlements
            .into_iter()
            .filter(|s| s.member_id == member_id && s.status.is_outstanding())
            .filter_map(|settlement| {
                let expense = expenses.get(&settlement.expense_id)?;
                Some(Obligation {
                    expense_title: expense.title.clone(),
                    payer_id: expense.payer_id,
                    settlement,
                })
            })
            .collect())
    }

    /// Totals across the household's expenses
    pub fn summary(&self, household_id: HouseholdId) -> RoomiesResult<HouseholdSummary> {
        let snapshot = self.snapshot(household_id)?;

        let members = snapshot
            .roster
            .iter()
            .map(|member| MemberTotals {
                member_id: member.id,
                display_name: member.display_name.clone(),
                paid: snapshot
                    .expenses
                    .iter()
                    .filter(|e| e.payer_id == member.id)
                    .map(|e| e.amount)
                    .sum(),
                share: snapshot
                    .expenses
                    .iter()
                    .filter_map(|e| e.split_for(member.id))
                    .map(|s| s.amount)
                    .sum(),
            })
            .collect();

        Ok(HouseholdSummary {
            expense_count: snapshot.expenses.len(),
            total_spent: snapshot.expenses.iter().map(|e| e.amount).sum(),
            outstanding_records: snapshot
                .settlements
                .iter()
                .filter(|s| s.status.is_outstanding())
                .count(),
            members,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::RoomiesPaths;
    use crate::error::RoomiesError;
    use crate::models::{Household, SettlementStatus, SplitRequest};
    use crate::services::expense::{ExpenseService, NewExpense};
    use crate::services::member::MemberService;
    use crate::services::settlement::SettlementService;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn setup(names: &[&str]) -> (TempDir, Storage, HouseholdId, Vec<MemberId>) {
        let temp_dir = TempDir::new().unwrap();
        let paths = RoomiesPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let household = Household::new("Maple");
        let household_id = household.id;
        storage.households.upsert(household).unwrap();

        let service = MemberService::new(&storage);
        let ids = names
            .iter()
            .map(|name| service.add(household_id, name).unwrap().id)
            .collect();
        (temp_dir, storage, household_id, ids)
    }

    fn add_expense(storage: &Storage, household_id: HouseholdId, payer: MemberId, cents: i64, among: &[MemberId]) {
        ExpenseService::new(storage)
            .create(
                household_id,
                NewExpense {
                    title: "Groceries".into(),
                    amount: Money::from_cents(cents),
                    payer_id: payer,
                    date: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
                    notes: String::new(),
                    split: SplitRequest::Equal(among.to_vec()),
                },
            )
            .unwrap();
    }

    #[test]
    fn test_empty_household() {
        let (_temp_dir, storage, household_id, _) = setup(&["A", "B"]);
        let ledger = LedgerService::new(&storage);

        let (balances, plan) = ledger.balances_and_plan(household_id).unwrap();
        assert!(balances.iter().all(|b| b.is_settled()));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_mark_paid_then_recompute() {
        let (_temp_dir, storage, household_id, ids) = setup(&["A", "B", "C", "D"]);
        add_expense(&storage, household_id, ids[0], 8575, &ids);
        let ledger = LedgerService::new(&storage);

        let nets: Vec<i64> = ledger
            .balances(household_id)
            .unwrap()
            .iter()
            .map(|b| b.net.cents())
            .collect();
        assert_eq!(nets, vec![6431, -2144, -2144, -2143]);
        assert_eq!(ledger.settlement_plan(household_id).unwrap().len(), 3);

        let owed = ledger.obligations(household_id, ids[1]).unwrap();
        assert_eq!(owed.len(), 1);
        assert_eq!(owed[0].payer_id, ids[0]);
        SettlementService::new(&storage)
            .mark(owed[0].settlement.id, SettlementStatus::Completed)
            .unwrap();

        let nets: Vec<i64> = ledger
            .balances(household_id)
            .unwrap()
            .iter()
            .map(|b| b.net.cents())
            .collect();
        assert_eq!(nets, vec![4287, 0, -2144, -2143]);
        assert_eq!(ledger.settlement_plan(household_id).unwrap().len(), 2);
        assert!(ledger.obligations(household_id, ids[1]).unwrap().is_empty());
    }

    #[test]
    fn test_forced_removal_surfaces_unbalanced_ledger() {
        let (_temp_dir, storage, household_id, ids) = setup(&["A", "B"]);
        add_expense(&storage, household_id, ids[0], 2000, &ids);
        MemberService::new(&storage).remove(ids[0], true).unwrap();

        let ledger = LedgerService::new(&storage);
        let balances = ledger.balances(household_id).unwrap();
        assert_eq!(balances.len(), 1);
        assert!(matches!(
            ledger.settlement_plan(household_id),
            Err(RoomiesError::UnbalancedLedger { unsettled: 1, .. })
        ));
    }

    #[test]
    fn test_summary() {
        let (_temp_dir, storage, household_id, ids) = setup(&["A", "B"]);
        add_expense(&storage, household_id, ids[0], 3000, &ids);
        add_expense(&storage, household_id, ids[1], 1001, &ids[1..]);

        let summary = LedgerService::new(&storage).summary(household_id).unwrap();
        assert_eq!(summary.expense_count, 2);
        assert_eq!(summary.total_spent.cents(), 4001);
        assert_eq!(summary.outstanding_records, 1);
        assert_eq!(summary.members[0].paid.cents(), 3000);
        assert_eq!(summary.members[0].share.cents(), 1500);
        assert_eq!(summary.members[1].paid.cents(), 1001);
        assert_eq!(summary.members[1].share.cents(), 2501);
    }
}

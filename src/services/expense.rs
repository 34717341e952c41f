//! Expense service
//!
//! Records shared expenses and keeps their settlement records in step: one
//! PENDING record per non-payer split on creation, reconciled on edit and
//! removed together with the expense.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::audit::{AuditEntry, EntityType};
use crate::error::{RoomiesError, RoomiesResult};
use crate::models::{
    Expense, ExpenseId, HouseholdId, MemberId, Money, Settlement, SplitRequest,
};
use crate::storage::Storage;

/// Input for a new expense
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub title: String,
    pub amount: Money,
    pub payer_id: MemberId,
    pub date: NaiveDate,
    pub notes: String,
    pub split: SplitRequest,
}

/// Changes to an existing expense; `None` keeps the current value
///
/// Without a new `split`, a changed amount is re-split the way the expense is
/// currently split.
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    pub title: Option<String>,
    pub amount: Option<Money>,
    pub payer_id: Option<MemberId>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub split: Option<SplitRequest>,
}

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Check that every referenced member is on the household's roster
    fn ensure_roster_members(
        &self,
        household_id: HouseholdId,
        members: impl IntoIterator<Item = MemberId>,
    ) -> RoomiesResult<()> {
        let roster = self.storage.members.get_roster(household_id)?;
        for member_id in members {
            if !roster.iter().any(|m| m.id == member_id) {
                return Err(RoomiesError::Validation(format!(
                    "{} is not an active member of this household",
                    member_id
                )));
            }
        }
        Ok(())
    }

    /// Record a new expense and its pending settlement records
    pub fn create(&self, household_id: HouseholdId, input: NewExpense) -> RoomiesResult<Expense> {
        self.storage
            .households
            .get(household_id)?
            .ok_or_else(|| RoomiesError::household_not_found(household_id.to_string()))?;

        let members = std::iter::once(input.payer_id).chain(input.split.member_ids());
        self.ensure_roster_members(household_id, members)?;

        let mut expense = Expense::new(
            household_id,
            input.title.trim(),
            input.amount,
            input.payer_id,
            input.date,
        );
        expense.notes = input.notes;
        expense.apply_splits(&input.split)?;
        expense.validate()?;

        let settlements = pending_records(&expense);

        self.storage.expenses.upsert(expense.clone())?;
        for settlement in &settlements {
            self.storage.settlements.upsert(settlement.clone())?;
        }
        self.storage.expenses.save()?;
        self.storage.settlements.save()?;

        let mut entries = vec![AuditEntry::create(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.title.clone()),
            &expense,
        )];
        entries.extend(settlements.iter().map(|s| {
            AuditEntry::create(EntityType::Settlement, s.id.to_string(), None, s)
        }));
        self.storage.log_batch(&entries)?;

        info!(
            expense = %expense.id,
            amount = %expense.amount,
            splits = expense.splits.len(),
            "recorded expense"
        );
        Ok(expense)
    }

    pub fn get(&self, id: ExpenseId) -> RoomiesResult<Option<Expense>> {
        self.storage.expenses.get(id)
    }

    /// Find an expense of a household by id reference
    pub fn find(&self, household_id: HouseholdId, reference: &str) -> RoomiesResult<Option<Expense>> {
        self.storage.expenses.find(household_id, reference)
    }

    pub fn require(&self, household_id: HouseholdId, reference: &str) -> RoomiesResult<Expense> {
        self.find(household_id, reference)?
            .ok_or_else(|| RoomiesError::expense_not_found(reference))
    }

    /// Expenses of a household, newest first
    pub fn list(&self, household_id: HouseholdId) -> RoomiesResult<Vec<Expense>> {
        self.storage.expenses.get_by_household(household_id)
    }

    /// Settlement records of one expense
    pub fn settlements(&self, id: ExpenseId) -> RoomiesResult<Vec<Settlement>> {
        self.storage.settlements.get_by_expense(id)
    }

    /// Edit an expense, regenerating its splits as a whole
    ///
    /// Settlement records keep their status when the member's split amount
    /// and the payer are unchanged; every other record is replaced by a new
    /// PENDING one.
    pub fn update(&self, id: ExpenseId, changes: ExpenseUpdate) -> RoomiesResult<Expense> {
        let mut expense = self
            .get(id)?
            .ok_or_else(|| RoomiesError::expense_not_found(id.to_string()))?;
        let before = expense.clone();

        if let Some(title) = changes.title {
            expense.title = title.trim().to_string();
        }
        if let Some(date) = changes.date {
            expense.date = date;
        }
        if let Some(notes) = changes.notes {
            expense.notes = notes;
        }
        if let Some(payer_id) = changes.payer_id {
            expense.payer_id = payer_id;
        }
        if let Some(amount) = changes.amount {
            expense.amount = amount;
        }

        let request = changes
            .split
            .unwrap_or_else(|| before.current_split_request());
        if expense.payer_id != before.payer_id || request != before.current_split_request() {
            let members = std::iter::once(expense.payer_id).chain(request.member_ids());
            self.ensure_roster_members(expense.household_id, members)?;
        }
        expense.apply_splits(&request)?;
        expense.validate()?;

        let existing = self.storage.settlements.get_by_expense(id)?;
        let (kept, created, dropped) = reconcile_records(&before, &expense, existing);

        self.storage.expenses.upsert(expense.clone())?;
        for settlement in &created {
            self.storage.settlements.upsert(settlement.clone())?;
        }
        for settlement in &dropped {
            self.storage.settlements.delete(settlement.id)?;
        }
        self.storage.expenses.save()?;
        self.storage.settlements.save()?;

        self.storage.log_update(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.title.clone()),
            &before,
            &expense,
        )?;
        let mut entries: Vec<AuditEntry> = dropped
            .iter()
            .map(|s| AuditEntry::delete(EntityType::Settlement, s.id.to_string(), None, s))
            .collect();
        entries.extend(
            created
                .iter()
                .map(|s| AuditEntry::create(EntityType::Settlement, s.id.to_string(), None, s)),
        );
        self.storage.log_batch(&entries)?;

        debug!(
            expense = %id,
            kept,
            created = created.len(),
            dropped = dropped.len(),
            "reconciled settlement records"
        );
        info!(expense = %id, "updated expense");
        Ok(expense)
    }

    /// Delete an expense together with its settlement records
    pub fn delete(&self, id: ExpenseId) -> RoomiesResult<Expense> {
        let expense = self
            .storage
            .expenses
            .delete(id)?
            .ok_or_else(|| RoomiesError::expense_not_found(id.to_string()))?;
        let removed = self.storage.settlements.delete_by_expense(id)?;

        self.storage.expenses.save()?;
        self.storage.settlements.save()?;

        let mut entries = vec![AuditEntry::delete(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.title.clone()),
            &expense,
        )];
        entries.extend(
            removed
                .iter()
                .map(|s| AuditEntry::delete(EntityType::Settlement, s.id.to_string(), None, s)),
        );
        self.storage.log_batch(&entries)?;

        info!(expense = %id, settlements = removed.len(), "deleted expense");
        Ok(expense)
    }
}

/// One PENDING record per non-payer split with a positive amount
fn pending_records(expense: &Expense) -> Vec<Settlement> {
    expense
        .reimbursable_splits()
        .map(|split| {
            Settlement::new(expense.household_id, expense.id, split.member_id, split.amount)
        })
        .collect()
}

/// Split existing records into kept, newly created and dropped
fn reconcile_records(
    before: &Expense,
    after: &Expense,
    existing: Vec<Settlement>,
) -> (usize, Vec<Settlement>, Vec<Settlement>) {
    let same_payer = before.payer_id == after.payer_id;
    let mut dropped = Vec::new();
    let mut kept_members = Vec::new();

    for record in existing {
        let unchanged = same_payer
            && after
                .reimbursable_splits()
                .any(|s| s.member_id == record.member_id && s.amount == record.amount);
        if unchanged && !kept_members.contains(&record.member_id) {
            kept_members.push(record.member_id);
        } else {
            dropped.push(record);
        }
    }

    let created = pending_records(after)
        .into_iter()
        .filter(|s| !kept_members.contains(&s.member_id))
        .collect();

    (kept_members.len(), created, dropped)
}

//! Expense repository
//!
//! Manages loading and saving expenses to expenses.json, indexed by household.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::RoomiesError;
use crate::models::{Expense, ExpenseId, HouseholdId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

/// Newest first
fn newest_first(a: &Expense, b: &Expense) -> std::cmp::Ordering {
    b.date
        .cmp(&a.date)
        .then(b.created_at.cmp(&a.created_at))
        .then(a.id.cmp(&b.id))
}

/// Repository for expense persistence
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExpenseId, Expense>>,
    /// Index: household_id -> expense_ids
    by_household: RwLock<HashMap<HouseholdId, Vec<ExpenseId>>>,
}

impl ExpenseRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_household: RwLock::new(HashMap::new()),
        }
    }

    /// Load expenses from disk and build the household index
    pub fn load(&self) -> Result<(), RoomiesError> {
        let file_data: ExpenseData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        let mut by_household = write_lock(&self.by_household)?;
        data.clear();
        by_household.clear();

        for expense in file_data.expenses {
            by_household
                .entry(expense.household_id)
                .or_default()
                .push(expense.id);
            data.insert(expense.id, expense);
        }

        Ok(())
    }

    /// Save expenses to disk
    pub fn save(&self) -> Result<(), RoomiesError> {
        let data = read_lock(&self.data)?;
        let mut expenses: Vec<_> = data.values().cloned().collect();
        expenses.sort_by(newest_first);

        write_json_atomic(&self.path, &ExpenseData { expenses })
    }

    pub fn get(&self, id: ExpenseId) -> Result<Option<Expense>, RoomiesError> {
        let data = read_lock(&self.data)?;
        Ok(data.get(&id).cloned())
    }

    /// All expenses of a household, newest first
    pub fn get_by_household(&self, household_id: HouseholdId) -> Result<Vec<Expense>, RoomiesError> {
        let data = read_lock(&self.data)?;
        let by_household = read_lock(&self.by_household)?;

        let ids = by_household
            .get(&household_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut expenses: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        expenses.sort_by(newest_first);
        Ok(expenses)
    }

    /// Find an expense of a household by id reference
    pub fn find(
        &self,
        household_id: HouseholdId,
        reference: &str,
    ) -> Result<Option<Expense>, RoomiesError> {
        Ok(self
            .get_by_household(household_id)?
            .into_iter()
            .find(|e| e.id.matches_reference(reference)))
    }

    /// Insert or update an expense
    pub fn upsert(&self, expense: Expense) -> Result<(), RoomiesError> {
        let mut data = write_lock(&self.data)?;
        let mut by_household = write_lock(&self.by_household)?;

        if !data.contains_key(&expense.id) {
            by_household
                .entry(expense.household_id)
                .or_default()
                .push(expense.id);
        }
        data.insert(expense.id, expense);
        Ok(())
    }

    /// Delete an expense, returning it if it existed
    pub fn delete(&self, id: ExpenseId) -> Result<Option<Expense>, RoomiesError> {
        let mut data = write_lock(&self.data)?;
        let mut by_household = write_lock(&self.by_household)?;

        let removed = data.remove(&id);
        if let Some(expense) = &removed {
            if let Some(ids) = by_household.get_mut(&expense.household_id) {
                ids.retain(|&other| other != id);
            }
        }
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize, RoomiesError> {
        Ok(read_lock(&self.data)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MemberId, Money, SplitRequest};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, ExpenseRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        (temp_dir, repo)
    }

    fn expense(household_id: HouseholdId, day: u32) -> Expense {
        let payer = MemberId::new();
        let mut expense = Expense::new(
            household_id,
            format!("Day {}", day),
            Money::from_cents(1000),
            payer,
            NaiveDate::from_ymd_opt(2025, 2, day).unwrap(),
        );
        expense
            .apply_splits(&SplitRequest::Equal(vec![payer]))
            .unwrap();
        expense
    }

    #[test]
    fn test_by_household_newest_first() {
        let (_temp_dir, repo) = create_test_repo();
        let household_id = HouseholdId::new();
        repo.upsert(expense(household_id, 1)).unwrap();
        repo.upsert(expense(household_id, 9)).unwrap();
        repo.upsert(expense(HouseholdId::new(), 5)).unwrap();

        let expenses = repo.get_by_household(household_id).unwrap();
        let titles: Vec<&str> = expenses.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Day 9", "Day 1"]);
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let household_id = HouseholdId::new();
        let rent = expense(household_id, 1);
        let id = rent.id;
        repo.upsert(rent).unwrap();

        assert!(repo.delete(id).unwrap().is_some());
        assert!(repo.delete(id).unwrap().is_none());
        assert!(repo.get_by_household(household_id).unwrap().is_empty());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_find_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let household_id = HouseholdId::new();
        let rent = expense(household_id, 3);
        let id = rent.id;
        repo.upsert(rent).unwrap();
        repo.save().unwrap();

        let reloaded = ExpenseRepository::new(temp_dir.path().join("expenses.json"));
        reloaded.load().unwrap();
        let found = reloaded.find(household_id, &id.to_string()).unwrap().unwrap();
        assert_eq!(found.splits.len(), 1);
        assert!(reloaded.find(HouseholdId::new(), &id.to_string()).unwrap().is_none());
    }
}

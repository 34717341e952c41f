//! Settlement record repository
//!
//! Manages loading and saving settlement records to settlements.json,
//! indexed by the expense they belong to.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::RoomiesError;
use crate::models::{ExpenseId, HouseholdId, MemberId, Settlement, SettlementId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct SettlementData {
    settlements: Vec<Settlement>,
}

fn oldest_first(a: &Settlement, b: &Settlement) -> std::cmp::Ordering {
    a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
}

/// Repository for settlement record persistence
pub struct SettlementRepository {
    path: PathBuf,
    data: RwLock<HashMap<SettlementId, Settlement>>,
    /// Index: expense_id -> settlement_ids
    by_expense: RwLock<HashMap<ExpenseId, Vec<SettlementId>>>,
}

impl SettlementRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_expense: RwLock::new(HashMap::new()),
        }
    }

    /// Load settlement records from disk and build the expense index
    pub fn load(&self) -> Result<(), RoomiesError> {
        let file_data: SettlementData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        let mut by_expense = write_lock(&self.by_expense)?;
        data.clear();
        by_expense.clear();

        for settlement in file_data.settlements {
            by_expense
                .entry(settlement.expense_id)
                .or_default()
                .push(settlement.id);
            data.insert(settlement.id, settlement);
        }

        Ok(())
    }

    /// Save settlement records to disk
    pub fn save(&self) -> Result<(), RoomiesError> {
        let data = read_lock(&self.data)?;
        let mut settlements: Vec<_> = data.values().cloned().collect();
        settlements.sort_by(oldest_first);

        write_json_atomic(&self.path, &SettlementData { settlements })
    }

    pub fn get(&self, id: SettlementId) -> Result<Option<Settlement>, RoomiesError> {
        let data = read_lock(&self.data)?;
        Ok(data.get(&id).cloned())
    }

    /// All records of a household, oldest first
    pub fn get_by_household(
        &self,
        household_id: HouseholdId,
    ) -> Result<Vec<Settlement>, RoomiesError> {
        let data = read_lock(&self.data)?;
        let mut settlements: Vec<_> = data
            .values()
            .filter(|s| s.household_id == household_id)
            .cloned()
            .collect();
        settlements.sort_by(oldest_first);
        Ok(settlements)
    }

    /// Records generated from one expense
    pub fn get_by_expense(&self, expense_id: ExpenseId) -> Result<Vec<Settlement>, RoomiesError> {
        let data = read_lock(&self.data)?;
        let by_expense = read_lock(&self.by_expense)?;

        let ids = by_expense
            .get(&expense_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut settlements: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        settlements.sort_by(oldest_first);
        Ok(settlements)
    }

    /// Records where `member_id` is the debtor
    pub fn get_by_member(
        &self,
        household_id: HouseholdId,
        member_id: MemberId,
    ) -> Result<Vec<Settlement>, RoomiesError> {
        Ok(self
            .get_by_household(household_id)?
            .into_iter()
            .filter(|s| s.member_id == member_id)
            .collect())
    }

    /// Find a record of a household by id reference
    pub fn find(
        &self,
        household_id: HouseholdId,
        reference: &str,
    ) -> Result<Option<Settlement>, RoomiesError> {
        Ok(self
            .get_by_household(household_id)?
            .into_iter()
            .find(|s| s.id.matches_reference(reference)))
    }

    /// Insert or update a record
    pub fn upsert(&self, settlement: Settlement) -> Result<(), RoomiesError> {
        let mut data = write_lock(&self.data)?;
        let mut by_expense = write_lock(&self.by_expense)?;

        if !data.contains_key(&settlement.id) {
            by_expense
                .entry(settlement.expense_id)
                .or_default()
                .push(settlement.id);
        }
        data.insert(settlement.id, settlement);
        Ok(())
    }

    /// Delete a record, returning it if it existed
    pub fn delete(&self, id: SettlementId) -> Result<Option<Settlement>, RoomiesError> {
        let mut data = write_lock(&self.data)?;
        let mut by_expense = write_lock(&self.by_expense)?;

        let removed = data.remove(&id);
        if let Some(settlement) = &removed {
            if let Some(ids) = by_expense.get_mut(&settlement.expense_id) {
                ids.retain(|&other| other != id);
            }
        }
        Ok(removed)
    }

    /// Delete every record of an expense, returning the removed records
    pub fn delete_by_expense(&self, expense_id: ExpenseId) -> Result<Vec<Settlement>, RoomiesError> {
        let mut data = write_lock(&self.data)?;
        let mut by_expense = write_lock(&self.by_expense)?;

        let ids = by_expense.remove(&expense_id).unwrap_or_default();
        Ok(ids.iter().filter_map(|id| data.remove(id)).collect())
    }

    pub fn count(&self) -> Result<usize, RoomiesError> {
        Ok(read_lock(&self.data)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, SettlementStatus};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, SettlementRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = SettlementRepository::new(temp_dir.path().join("settlements.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_by_expense_and_member() {
        let (_temp_dir, repo) = create_test_repo();
        let household_id = HouseholdId::new();
        let expense_id = ExpenseId::new();
        let bob = MemberId::new();
        let carol = MemberId::new();

        repo.upsert(Settlement::new(household_id, expense_id, bob, Money::from_cents(500)))
            .unwrap();
        repo.upsert(Settlement::new(household_id, expense_id, carol, Money::from_cents(500)))
            .unwrap();
        repo.upsert(Settlement::new(household_id, ExpenseId::new(), bob, Money::from_cents(75)))
            .unwrap();

        assert_eq!(repo.get_by_expense(expense_id).unwrap().len(), 2);
        assert_eq!(repo.get_by_member(household_id, bob).unwrap().len(), 2);
        assert_eq!(repo.get_by_household(household_id).unwrap().len(), 3);
    }

    #[test]
    fn test_delete_by_expense() {
        let (_temp_dir, repo) = create_test_repo();
        let household_id = HouseholdId::new();
        let expense_id = ExpenseId::new();
        let keep = Settlement::new(household_id, ExpenseId::new(), MemberId::new(), Money::from_cents(1));
        repo.upsert(keep.clone()).unwrap();
        for _ in 0..3 {
            repo.upsert(Settlement::new(household_id, expense_id, MemberId::new(), Money::from_cents(10)))
                .unwrap();
        }

        let removed = repo.delete_by_expense(expense_id).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(repo.count().unwrap(), 1);
        assert!(repo.get(keep.id).unwrap().is_some());
    }

    #[test]
    fn test_status_survives_reload() {
        let (temp_dir, repo) = create_test_repo();
        let household_id = HouseholdId::new();
        let mut record = Settlement::new(household_id, ExpenseId::new(), MemberId::new(), Money::from_cents(2144));
        record.set_status(SettlementStatus::Completed);
        let id = record.id;
        repo.upsert(record).unwrap();
        repo.save().unwrap();

        let reloaded = SettlementRepository::new(temp_dir.path().join("settlements.json"));
        reloaded.load().unwrap();
        let found = reloaded.find(household_id, &id.to_string()).unwrap().unwrap();
        assert!(found.is_completed());
        assert!(found.settled_at.is_some());
    }
}

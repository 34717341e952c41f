//! Settlement service
//!
//! The write path for settlement records. Marking never touches balances;
//! they are derived again on the next read.

use tracing::{debug, info};

use crate::audit::{AuditEntry, EntityType};
use crate::error::{RoomiesError, RoomiesResult};
use crate::models::{HouseholdId, MemberId, Settlement, SettlementId, SettlementStatus};
use crate::storage::Storage;

/// Result of marking a record
#[derive(Debug, Clone)]
pub struct MarkOutcome {
    pub settlement: Settlement,
    /// False when the record already had the requested status
    pub changed: bool,
}

/// Service for settlement record management
pub struct SettlementService<'a> {
    storage: &'a Storage,
}

impl<'a> SettlementService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn get(&self, id: SettlementId) -> RoomiesResult<Option<Settlement>> {
        self.storage.settlements.get(id)
    }

    /// Find a record of a household by id reference
    pub fn find(&self, household_id: HouseholdId, reference: &str) -> RoomiesResult<Option<Settlement>> {
        self.storage.settlements.find(household_id, reference)
    }

    pub fn require(&self, household_id: HouseholdId, reference: &str) -> RoomiesResult<Settlement> {
        self.find(household_id, reference)?
            .ok_or_else(|| RoomiesError::settlement_not_found(reference))
    }

    /// Records of a household, optionally narrowed to one debtor
    ///
    /// Completed records are left out unless `include_completed` is set.
    pub fn list(
        &self,
        household_id: HouseholdId,
        member_id: Option<MemberId>,
        include_completed: bool,
    ) -> RoomiesResult<Vec<Settlement>> {
        let records = match member_id {
            Some(member_id) => self.storage.settlements.get_by_member(household_id, member_id)?,
            None => self.storage.settlements.get_by_household(household_id)?,
        };
        Ok(records
            .into_iter()
            .filter(|s| include_completed || s.status.is_outstanding())
            .collect())
    }

    /// Set the status of one record
    ///
    /// Marking a record with the status it already has writes nothing and
    /// leaves `settled_at` as it was.
    pub fn mark(&self, id: SettlementId, status: SettlementStatus) -> RoomiesResult<MarkOutcome> {
        let mut settlement = self
            .get(id)?
            .ok_or_else(|| RoomiesError::settlement_not_found(id.to_string()))?;

        let before = settlement.clone();
        if !settlement.set_status(status) {
            debug!(settlement = %id, %status, "settlement already in requested status");
            return Ok(MarkOutcome {
                settlement,
                changed: false,
            });
        }

        self.storage.settlements.upsert(settlement.clone())?;
        self.storage.settlements.save()?;

        self.storage.log_update(
            EntityType::Settlement,
            settlement.id.to_string(),
            None,
            &before,
            &settlement,
        )?;

        info!(settlement = %id, from = %before.status, to = %status, "marked settlement");
        Ok(MarkOutcome {
            settlement,
            changed: true,
        })
    }

    /// Complete every PENDING record where `member_id` is the debtor
    ///
    /// Returns the records that changed.
    pub fn mark_all_for_member(
        &self,
        household_id: HouseholdId,
        member_id: MemberId,
    ) -> RoomiesResult<Vec<Settlement>> {
        let pending: Vec<Settlement> = self
            .storage
            .settlements
            .get_by_member(household_id, member_id)?
            .into_iter()
            .filter(|s| s.status == SettlementStatus::Pending)
            .collect();

        if pending.is_empty() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::with_capacity(pending.len());
        let mut completed = Vec::with_capacity(pending.len());
        for before in pending {
            let mut settlement = before.clone();
            settlement.set_status(SettlementStatus::Completed);
            self.storage.settlements.upsert(settlement.clone())?;
            entries.push(AuditEntry::update(
                EntityType::Settlement,
                settlement.id.to_string(),
                None,
                &before,
                &settlement,
                Some("status: \"PENDING\" -> \"COMPLETED\"".to_string()),
            ));
            completed.push(settlement);
        }

        self.storage.settlements.save()?;
        self.storage.log_batch(&entries)?;

        info!(member = %member_id, count = completed.len(), "completed member's settlements");
        Ok(completed)
    }
}

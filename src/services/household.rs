//! Household service
//!
//! Create, look up and rename households.

use tracing::info;

use crate::audit::EntityType;
use crate::error::{RoomiesError, RoomiesResult};
use crate::models::{Household, HouseholdId};
use crate::storage::Storage;

/// Service for household management
pub struct HouseholdService<'a> {
    storage: &'a Storage,
}

impl<'a> HouseholdService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new household with a unique name
    pub fn create(&self, name: &str) -> RoomiesResult<Household> {
        let name = name.trim();
        if self.storage.households.get_by_name(name)?.is_some() {
            return Err(RoomiesError::Duplicate {
                entity_type: "Household",
                identifier: name.to_string(),
            });
        }

        let household = Household::new(name);
        household
            .validate()
            .map_err(|e| RoomiesError::Validation(e.to_string()))?;

        self.storage.households.upsert(household.clone())?;
        self.storage.households.save()?;

        self.storage.log_create(
            EntityType::Household,
            household.id.to_string(),
            Some(household.name.clone()),
            &household,
        )?;

        info!(household = %household.id, name = %household.name, "created household");
        Ok(household)
    }

    pub fn get(&self, id: HouseholdId) -> RoomiesResult<Option<Household>> {
        self.storage.households.get(id)
    }

    /// Get a household by id, failing if it does not exist
    pub fn require(&self, id: HouseholdId) -> RoomiesResult<Household> {
        self.get(id)?
            .ok_or_else(|| RoomiesError::household_not_found(id.to_string()))
    }

    /// Find a household by name or id
    pub fn find(&self, reference: &str) -> RoomiesResult<Option<Household>> {
        self.storage.households.find(reference)
    }

    pub fn list(&self) -> RoomiesResult<Vec<Household>> {
        self.storage.households.get_all()
    }

    /// Rename a household
    pub fn rename(&self, id: HouseholdId, new_name: &str) -> RoomiesResult<Household> {
        let mut household = self.require(id)?;
        let new_name = new_name.trim();

        if let Some(existing) = self.storage.households.get_by_name(new_name)? {
            if existing.id != id {
                return Err(RoomiesError::Duplicate {
                    entity_type: "Household",
                    identifier: new_name.to_string(),
                });
            }
        }

        let before = household.clone();
        household.rename(new_name);
        household
            .validate()
            .map_err(|e| RoomiesError::Validation(e.to_string()))?;

        self.storage.households.upsert(household.clone())?;
        self.storage.households.save()?;

        self.storage.log_update(
            EntityType::Household,
            household.id.to_string(),
            Some(household.name.clone()),
            &before,
            &household,
        )?;

        Ok(household)
    }
}

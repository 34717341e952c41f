//! Household repository
//!
//! Manages loading and saving households to households.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::RoomiesError;
use crate::models::{Household, HouseholdId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct HouseholdData {
    households: Vec<Household>,
}

/// Repository for household persistence
pub struct HouseholdRepository {
    path: PathBuf,
    data: RwLock<HashMap<HouseholdId, Household>>,
}

impl HouseholdRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load households from disk
    pub fn load(&self) -> Result<(), RoomiesError> {
        let file_data: HouseholdData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        data.clear();
        for household in file_data.households {
            data.insert(household.id, household);
        }

        Ok(())
    }

    /// Save households to disk
    pub fn save(&self) -> Result<(), RoomiesError> {
        let households = self.get_all()?;
        write_json_atomic(&self.path, &HouseholdData { households })
    }

    pub fn get(&self, id: HouseholdId) -> Result<Option<Household>, RoomiesError> {
        let data = read_lock(&self.data)?;
        Ok(data.get(&id).cloned())
    }

    /// All households, oldest first
    pub fn get_all(&self) -> Result<Vec<Household>, RoomiesError> {
        let data = read_lock(&self.data)?;
        let mut households: Vec<_> = data.values().cloned().collect();
        households.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(households)
    }

    /// Get a household by exact name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<Household>, RoomiesError> {
        let data = read_lock(&self.data)?;
        let wanted = name.trim().to_lowercase();
        Ok(data
            .values()
            .find(|h| h.name.to_lowercase() == wanted)
            .cloned())
    }

    /// Find a household by name or id reference
    pub fn find(&self, reference: &str) -> Result<Option<Household>, RoomiesError> {
        if let Some(household) = self.get_by_name(reference)? {
            return Ok(Some(household));
        }
        let data = read_lock(&self.data)?;
        Ok(data
            .values()
            .find(|h| h.id.matches_reference(reference))
            .cloned())
    }

    /// Insert or update a household
    pub fn upsert(&self, household: Household) -> Result<(), RoomiesError> {
        let mut data = write_lock(&self.data)?;
        data.insert(household.id, household);
        Ok(())
    }

    pub fn count(&self) -> Result<usize, RoomiesError> {
        Ok(read_lock(&self.data)?.len())
    }
}

//! Member repository
//!
//! Manages loading and saving members to members.json, indexed by household.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::RoomiesError;
use crate::models::{HouseholdId, Member, MemberId};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct MemberData {
    members: Vec<Member>,
}

/// Roster order: join time, then id
fn roster_order(a: &Member, b: &Member) -> std::cmp::Ordering {
    a.joined_at.cmp(&b.joined_at).then(a.id.cmp(&b.id))
}

/// Repository for member persistence
pub struct MemberRepository {
    path: PathBuf,
    data: RwLock<HashMap<MemberId, Member>>,
    /// Index: household_id -> member_ids
    by_household: RwLock<HashMap<HouseholdId, Vec<MemberId>>>,
}

impl MemberRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_household: RwLock::new(HashMap::new()),
        }
    }

    /// Load members from disk and build the household index
    pub fn load(&self) -> Result<(), RoomiesError> {
        let file_data: MemberData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        let mut by_household = write_lock(&self.by_household)?;
        data.clear();
        by_household.clear();

        for member in file_data.members {
            by_household
                .entry(member.household_id)
                .or_default()
                .push(member.id);
            data.insert(member.id, member);
        }

        Ok(())
    }

    /// Save members to disk
    pub fn save(&self) -> Result<(), RoomiesError> {
        let data = read_lock(&self.data)?;
        let mut members: Vec<_> = data.values().cloned().collect();
        members.sort_by(|a, b| a.household_id.cmp(&b.household_id).then(roster_order(a, b)));

        write_json_atomic(&self.path, &MemberData { members })
    }

    pub fn get(&self, id: MemberId) -> Result<Option<Member>, RoomiesError> {
        let data = read_lock(&self.data)?;
        Ok(data.get(&id).cloned())
    }

    /// Every member of a household, archived ones included, in roster order
    pub fn get_by_household(&self, household_id: HouseholdId) -> Result<Vec<Member>, RoomiesError> {
        let data = read_lock(&self.data)?;
        let by_household = read_lock(&self.by_household)?;

        let ids = by_household
            .get(&household_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut members: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        members.sort_by(roster_order);
        Ok(members)
    }

    /// The active roster of a household
    pub fn get_roster(&self, household_id: HouseholdId) -> Result<Vec<Member>, RoomiesError> {
        Ok(self
            .get_by_household(household_id)?
            .into_iter()
            .filter(Member::is_active)
            .collect())
    }

    /// Find an active member by display name (case-insensitive) or id reference
    pub fn find_active(
        &self,
        household_id: HouseholdId,
        reference: &str,
    ) -> Result<Option<Member>, RoomiesError> {
        let roster = self.get_roster(household_id)?;
        let wanted = reference.trim().to_lowercase();

        if let Some(member) = roster
            .iter()
            .find(|m| m.display_name.to_lowercase() == wanted)
        {
            return Ok(Some(member.clone()));
        }
        Ok(roster
            .into_iter()
            .find(|m| m.id.matches_reference(reference)))
    }

    /// Insert or update a member
    pub fn upsert(&self, member: Member) -> Result<(), RoomiesError> {
        let mut data = write_lock(&self.data)?;
        let mut by_household = write_lock(&self.by_household)?;

        if !data.contains_key(&member.id) {
            by_household
                .entry(member.household_id)
                .or_default()
                .push(member.id);
        }
        data.insert(member.id, member);
        Ok(())
    }

    pub fn count(&self) -> Result<usize, RoomiesError> {
        Ok(read_lock(&self.data)?.len())
    }
}

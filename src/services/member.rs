//! Member service
//!
//! Adds, renames and removes household members. Removal archives the member
//! so the expenses they were part of stay intact.

use tracing::{info, warn};

use crate::audit::EntityType;
use crate::error::{RoomiesError, RoomiesResult};
use crate::ledger::compute_balances;
use crate::models::{HouseholdId, Member, MemberId};
use crate::storage::Storage;

/// Service for member management
pub struct MemberService<'a> {
    storage: &'a Storage,
}

impl<'a> MemberService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn ensure_name_free(
        &self,
        household_id: HouseholdId,
        name: &str,
        except: Option<MemberId>,
    ) -> RoomiesResult<()> {
        let wanted = name.to_lowercase();
        let taken = self
            .storage
            .members
            .get_roster(household_id)?
            .into_iter()
            .any(|m| Some(m.id) != except && m.display_name.to_lowercase() == wanted);

        if taken {
            return Err(RoomiesError::Duplicate {
                entity_type: "Member",
                identifier: name.to_string(),
            });
        }
        Ok(())
    }

    /// Add a member to a household
    pub fn add(&self, household_id: HouseholdId, display_name: &str) -> RoomiesResult<Member> {
        self.storage
            .households
            .get(household_id)?
            .ok_or_else(|| RoomiesError::household_not_found(household_id.to_string()))?;

        let display_name = display_name.trim();
        self.ensure_name_free(household_id, display_name, None)?;

        let member = Member::new(household_id, display_name);
        member
            .validate()
            .map_err(|e| RoomiesError::Validation(e.to_string()))?;

        self.storage.members.upsert(member.clone())?;
        self.storage.members.save()?;

        self.storage.log_create(
            EntityType::Member,
            member.id.to_string(),
            Some(member.display_name.clone()),
            &member,
        )?;

        info!(member = %member.id, household = %household_id, "added member");
        Ok(member)
    }

    pub fn get(&self, id: MemberId) -> RoomiesResult<Option<Member>> {
        self.storage.members.get(id)
    }

    /// Find an active member by name or id
    pub fn find(&self, household_id: HouseholdId, reference: &str) -> RoomiesResult<Option<Member>> {
        self.storage.members.find_active(household_id, reference)
    }

    /// Find an active member, failing if there is none
    pub fn require(&self, household_id: HouseholdId, reference: &str) -> RoomiesResult<Member> {
        self.find(household_id, reference)?
            .ok_or_else(|| RoomiesError::member_not_found(reference))
    }

    /// Members of a household in roster order
    pub fn list(&self, household_id: HouseholdId, include_archived: bool) -> RoomiesResult<Vec<Member>> {
        if include_archived {
            self.storage.members.get_by_household(household_id)
        } else {
            self.storage.members.get_roster(household_id)
        }
    }

    /// Rename an active member
    pub fn rename(&self, id: MemberId, new_name: &str) -> RoomiesResult<Member> {
        let mut member = self
            .get(id)?
            .filter(Member::is_active)
            .ok_or_else(|| RoomiesError::member_not_found(id.to_string()))?;

        let new_name = new_name.trim();
        self.ensure_name_free(member.household_id, new_name, Some(id))?;

        let before = member.clone();
        member.rename(new_name);
        member
            .validate()
            .map_err(|e| RoomiesError::Validation(e.to_string()))?;

        self.storage.members.upsert(member.clone())?;
        self.storage.members.save()?;

        self.storage.log_update(
            EntityType::Member,
            member.id.to_string(),
            Some(member.display_name.clone()),
            &before,
            &member,
        )?;

        Ok(member)
    }

    /// Take a member off the roster
    ///
    /// A member whose balance is not zero would leave the remaining roster
    /// unbalanced, so removal is refused unless `force` is set.
    pub fn remove(&self, id: MemberId, force: bool) -> RoomiesResult<Member> {
        let mut member = self
            .get(id)?
            .filter(Member::is_active)
            .ok_or_else(|| RoomiesError::member_not_found(id.to_string()))?;

        let household_id = member.household_id;
        let roster = self.storage.members.get_roster(household_id)?;
        let expenses = self.storage.expenses.get_by_household(household_id)?;
        let settlements = self.storage.settlements.get_by_household(household_id)?;
        let net = compute_balances(&roster, &expenses, &settlements)?
            .into_iter()
            .find(|b| b.member_id == id)
            .map(|b| b.net)
            .unwrap_or_default();

        if !net.is_zero() {
            if !force {
                return Err(RoomiesError::Validation(format!(
                    "{} still has a balance of {}; settle up first or force the removal",
                    member.display_name, net
                )));
            }
            warn!(member = %id, %net, "removing member with an open balance");
        }

        let before = member.clone();
        member.archive();

        self.storage.members.upsert(member.clone())?;
        self.storage.members.save()?;

        self.storage.log_update(
            EntityType::Member,
            member.id.to_string(),
            Some(member.display_name.clone()),
            &before,
            &member,
        )?;

        info!(member = %id, household = %household_id, "archived member");
        Ok(member)
    }
}

//! Storage layer for Roomies
//!
//! One JSON file per entity collection, written atomically, plus the
//! append-only audit log. Repositories keep their collection in memory
//! behind a `RwLock` and write the whole file back on `save`.

pub mod expenses;
pub mod file_io;
pub mod households;
pub mod members;
pub mod settlements;

pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use households::HouseholdRepository;
pub use members::MemberRepository;
pub use settlements::SettlementRepository;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
use crate::config::paths::RoomiesPaths;
use crate::error::{RoomiesError, RoomiesResult};

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RoomiesResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| RoomiesError::Storage(format!("Failed to acquire read lock: {}", e)))
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RoomiesResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| RoomiesError::Storage(format!("Failed to acquire write lock: {}", e)))
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: RoomiesPaths,
    audit: AuditLogger,
    pub households: HouseholdRepository,
    pub members: MemberRepository,
    pub expenses: ExpenseRepository,
    pub settlements: SettlementRepository,
}

impl Storage {
    /// Create a new Storage instance, creating directories as needed
    pub fn new(paths: RoomiesPaths) -> RoomiesResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            households: HouseholdRepository::new(paths.households_file()),
            members: MemberRepository::new(paths.members_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            settlements: SettlementRepository::new(paths.settlements_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &RoomiesPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&self) -> RoomiesResult<()> {
        self.households.load()?;
        self.members.load()?;
        self.expenses.load()?;
        self.settlements.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> RoomiesResult<()> {
        self.households.save()?;
        self.members.save()?;
        self.expenses.save()?;
        self.settlements.save()?;
        Ok(())
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> RoomiesResult<()> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Record an update; the diff summary is derived from the two snapshots
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> RoomiesResult<()> {
        let diff = match (serde_json::to_value(before), serde_json::to_value(after)) {
            (Ok(b), Ok(a)) => generate_diff(&b, &a),
            _ => None,
        };
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> RoomiesResult<()> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }

    /// Append several prepared entries with one write
    pub fn log_batch(&self, entries: &[AuditEntry]) -> RoomiesResult<()> {
        self.audit.log_batch(entries)
    }
}

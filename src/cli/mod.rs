//! CLI command handlers
//!
//! Bridges the clap argument parsing with the service layer. Commands that
//! act on a household use the one named with `--household`, falling back to
//! the active household in the settings.

pub mod audit;
pub mod expense;
pub mod export;
pub mod household;
pub mod ledger;
pub mod member;
pub mod settle;

use chrono::NaiveDate;

use crate::config::settings::Settings;
use crate::display::MemberNames;
use crate::error::{RoomiesError, RoomiesResult};
use crate::models::{Household, HouseholdId, Money};
use crate::services::HouseholdService;
use crate::storage::Storage;

pub use audit::handle_audit_command;
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportCommands};
pub use household::{handle_household_command, HouseholdCommands};
pub use ledger::{handle_balance_command, handle_plan_command};
pub use member::{handle_member_command, MemberCommands};
pub use settle::{handle_settle_command, SettleCommands};

/// The household a command acts on
pub fn resolve_household(
    storage: &Storage,
    settings: &Settings,
    reference: Option<&str>,
) -> RoomiesResult<Household> {
    let service = HouseholdService::new(storage);
    match reference {
        Some(reference) => service
            .find(reference)?
            .ok_or_else(|| RoomiesError::household_not_found(reference)),
        None => {
            let id = settings.active_household.ok_or_else(|| {
                RoomiesError::Config(
                    "No active household. Create one with 'roomies household create <name>' \
                     or pass --household"
                        .into(),
                )
            })?;
            service.require(id)
        }
    }
}

/// Names of every member of a household, archived ones included
pub(crate) fn member_names(storage: &Storage, household_id: HouseholdId) -> RoomiesResult<MemberNames> {
    Ok(MemberNames::from_members(
        &storage.members.get_by_household(household_id)?,
    ))
}

/// Parse a YYYY-MM-DD date
pub(crate) fn parse_date(input: &str) -> RoomiesResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| RoomiesError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", input)))
}

/// Parse a user-typed amount such as "85.75"
pub(crate) fn parse_amount(input: &str) -> RoomiesResult<Money> {
    Money::parse(input).map_err(|e| RoomiesError::Validation(e.to_string()))
}

//! Household CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_household_list, format_summary};
use crate::error::{RoomiesError, RoomiesResult};
use crate::services::{HouseholdService, LedgerService};
use crate::storage::Storage;

/// Household subcommands
#[derive(Subcommand)]
pub enum HouseholdCommands {
    /// Create a household and make it active
    Create {
        /// Household name
        name: String,
        /// Keep the current active household
        #[arg(long)]
        no_switch: bool,
    },
    /// List households
    List,
    /// Make a household the active one
    Use {
        /// Household name or ID
        #[arg(value_name = "HOUSEHOLD")]
        target: String,
    },
    /// Rename a household
    Rename {
        /// Household name or ID
        #[arg(value_name = "HOUSEHOLD")]
        target: String,
        /// New name
        name: String,
    },
    /// Show spending totals for the active household
    Show,
}

/// Handle a household command
pub fn handle_household_command(
    storage: &Storage,
    settings: &mut Settings,
    household: Option<&str>,
    cmd: HouseholdCommands,
) -> RoomiesResult<()> {
    let service = HouseholdService::new(storage);

    match cmd {
        HouseholdCommands::Create { name, no_switch } => {
            let created = service.create(&name)?;
            println!("Created household: {} ({})", created.name, created.id);

            if !no_switch || settings.active_household.is_none() {
                settings.active_household = Some(created.id);
                settings.save(storage.paths())?;
                println!("Active household is now '{}'", created.name);
            }
        }

        HouseholdCommands::List => {
            println!(
                "{}",
                format_household_list(&service.list()?, settings.active_household)
            );
        }

        HouseholdCommands::Use { target } => {
            let found = service
                .find(&target)?
                .ok_or_else(|| RoomiesError::household_not_found(&target))?;
            settings.active_household = Some(found.id);
            settings.save(storage.paths())?;
            println!("Active household is now '{}'", found.name);
        }

        HouseholdCommands::Rename { target, name } => {
            let found = service
                .find(&target)?
                .ok_or_else(|| RoomiesError::household_not_found(&target))?;
            let old_name = found.name.clone();
            let renamed = service.rename(found.id, &name)?;
            println!("Renamed household: '{}' -> '{}'", old_name, renamed.name);
        }

        HouseholdCommands::Show => {
            let found = super::resolve_household(storage, settings, household)?;
            let summary = LedgerService::new(storage).summary(found.id)?;
            println!(
                "{}",
                format_summary(&found.name, &summary, &settings.currency_symbol)
            );
        }
    }

    Ok(())
}

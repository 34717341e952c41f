//! Member CLI commands

use clap::Subcommand;

use crate::display::format_member_list;
use crate::error::RoomiesResult;
use crate::models::Household;
use crate::services::MemberService;
use crate::storage::Storage;

/// Member subcommands
#[derive(Subcommand)]
pub enum MemberCommands {
    /// Add a member to the household
    Add {
        /// Display name
        name: String,
    },
    /// List the household's members
    List {
        /// Include members who have left
        #[arg(short, long)]
        all: bool,
    },
    /// Rename a member
    Rename {
        /// Member name or ID
        member: String,
        /// New display name
        name: String,
    },
    /// Remove a member from the roster
    Remove {
        /// Member name or ID
        member: String,
        /// Remove even if the member has an open balance
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a member command
pub fn handle_member_command(
    storage: &Storage,
    household: &Household,
    cmd: MemberCommands,
) -> RoomiesResult<()> {
    let service = MemberService::new(storage);

    match cmd {
        MemberCommands::Add { name } => {
            let member = service.add(household.id, &name)?;
            println!(
                "Added {} to {} ({})",
                member.display_name, household.name, member.id
            );
        }

        MemberCommands::List { all } => {
            println!("{}", format_member_list(&service.list(household.id, all)?));
        }

        MemberCommands::Rename { member, name } => {
            let found = service.require(household.id, &member)?;
            let renamed = service.rename(found.id, &name)?;
            println!(
                "Renamed member: '{}' -> '{}'",
                found.display_name, renamed.display_name
            );
        }

        MemberCommands::Remove { member, force } => {
            let found = service.require(household.id, &member)?;
            let removed = service.remove(found.id, force)?;
            println!("Removed {} from {}", removed.display_name, household.name);
        }
    }

    Ok(())
}

//! Settlement CLI commands

use clap::{Subcommand, ValueEnum};

use crate::config::settings::Settings;
use crate::display::format_settlement_list;
use crate::error::RoomiesResult;
use crate::models::{Household, SettlementStatus};
use crate::services::{ExpenseService, LedgerService, MemberService, SettlementService};
use crate::storage::Storage;

/// Status to set on a settlement record
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Pending,
    Completed,
    Declined,
}

impl From<StatusArg> for SettlementStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::Pending,
            StatusArg::Completed => Self::Completed,
            StatusArg::Declined => Self::Declined,
        }
    }
}

/// Settlement subcommands
#[derive(Subcommand)]
pub enum SettleCommands {
    /// Set the status of a settlement record
    Mark {
        /// Settlement ID
        settlement: String,
        /// New status
        #[arg(short, long, value_enum, default_value = "completed")]
        status: StatusArg,
    },
    /// List settlement records
    List {
        /// Only records this member owes
        #[arg(short, long)]
        member: Option<String>,
        /// Include completed records
        #[arg(short, long)]
        all: bool,
    },
    /// Mark everything a member owes as paid
    Member {
        /// Member name or ID
        member: String,
    },
}

/// Handle a settlement command
pub fn handle_settle_command(
    storage: &Storage,
    settings: &Settings,
    household: &Household,
    cmd: SettleCommands,
) -> RoomiesResult<()> {
    let service = SettlementService::new(storage);
    let members = MemberService::new(storage);
    let symbol = &settings.currency_symbol;

    match cmd {
        SettleCommands::Mark { settlement, status } => {
            let found = service.require(household.id, &settlement)?;
            let outcome = service.mark(found.id, status.into())?;
            if outcome.changed {
                println!(
                    "Marked {} ({}) as {}",
                    outcome.settlement.id,
                    outcome.settlement.amount.format_with_symbol(symbol),
                    outcome.settlement.status
                );
            } else {
                println!(
                    "{} is already {}",
                    outcome.settlement.id, outcome.settlement.status
                );
            }
        }

        SettleCommands::List { member, all } => {
            let member_id = member
                .map(|name| members.require(household.id, &name).map(|m| m.id))
                .transpose()?;
            let records = service.list(household.id, member_id, all)?;
            let expenses = ExpenseService::new(storage).list(household.id)?;
            let names = super::member_names(storage, household.id)?;
            println!(
                "{}",
                format_settlement_list(&records, &expenses, &names, symbol)
            );
        }

        SettleCommands::Member { member } => {
            let found = members.require(household.id, &member)?;
            let completed = service.mark_all_for_member(household.id, found.id)?;
            if completed.is_empty() {
                println!("{} has nothing pending", found.display_name);
                return Ok(());
            }

            let total: crate::models::Money = completed.iter().map(|s| s.amount).sum();
            println!(
                "Marked {} record(s) for {} as paid ({})",
                completed.len(),
                found.display_name,
                total.format_with_symbol(symbol)
            );

            let remaining = LedgerService::new(storage).obligations(household.id, found.id)?;
            if !remaining.is_empty() {
                println!("{} declined record(s) still open", remaining.len());
            }
        }
    }

    Ok(())
}

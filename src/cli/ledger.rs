//! Balance and settle-up plan commands

use serde::Serialize;

use crate::config::settings::Settings;
use crate::display::{format_balances, format_plan};
use crate::error::RoomiesResult;
use crate::models::{Household, Transfer};
use crate::services::LedgerService;
use crate::storage::Storage;

fn print_json<T: Serialize>(value: &T) -> RoomiesResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print each member's balance
pub fn handle_balance_command(
    storage: &Storage,
    settings: &Settings,
    household: &Household,
    json: bool,
) -> RoomiesResult<()> {
    let balances = LedgerService::new(storage).balances(household.id)?;

    if json {
        return print_json(&balances);
    }

    println!("Balances for {}", household.name);
    println!("{}", format_balances(&balances, &settings.currency_symbol));
    Ok(())
}

/// A transfer with member names, for JSON output
#[derive(Serialize)]
struct NamedTransfer {
    #[serde(flatten)]
    transfer: Transfer,
    from_name: String,
    to_name: String,
}

/// Print the suggested settle-up transfers
pub fn handle_plan_command(
    storage: &Storage,
    settings: &Settings,
    household: &Household,
    json: bool,
) -> RoomiesResult<()> {
    let plan = LedgerService::new(storage).settlement_plan(household.id)?;
    let names = super::member_names(storage, household.id)?;

    if json {
        let named: Vec<NamedTransfer> = plan
            .into_iter()
            .map(|transfer| NamedTransfer {
                from_name: names.name(transfer.from),
                to_name: names.name(transfer.to),
                transfer,
            })
            .collect();
        return print_json(&named);
    }

    println!("Settle-up plan for {}", household.name);
    println!("{}", format_plan(&plan, &names, &settings.currency_symbol));
    Ok(())
}

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::prelude::*;

use roomies::cli::{
    handle_audit_command, handle_balance_command, handle_expense_command, handle_export_command,
    handle_household_command, handle_member_command, handle_plan_command, handle_settle_command,
    resolve_household,
};
use roomies::config::{paths::RoomiesPaths, settings::Settings};
use roomies::storage::Storage;
use roomies::RoomiesError;

#[derive(Parser)]
#[command(
    name = "roomies",
    version,
    about = "Shared expenses and settle-up plans for roommates",
    long_about = "Roomies tracks what each member of a household paid for, how every \
                  expense is split, and who still owes whom. It suggests the fewest \
                  transfers needed to settle up."
)]
struct Cli {
    /// Household to act on (defaults to the active household)
    #[arg(long, global = true, env = "ROOMIES_HOUSEHOLD")]
    household: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Household management commands
    #[command(subcommand)]
    Household(roomies::cli::HouseholdCommands),

    /// Member management commands
    #[command(subcommand)]
    Member(roomies::cli::MemberCommands),

    /// Expense management commands
    #[command(subcommand, alias = "exp")]
    Expense(roomies::cli::ExpenseCommands),

    /// Show each member's balance
    Balance {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Suggest transfers that settle everyone up
    Plan {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Settlement record commands
    #[command(subcommand)]
    Settle(roomies::cli::SettleCommands),

    /// Export household data
    #[command(subcommand)]
    Export(roomies::cli::ExportCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Only expense and settlement changes
        #[arg(long)]
        ledger: bool,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn get_rust_log() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(get_rust_log()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    run(cli).map_err(|err| match err.downcast_ref::<RoomiesError>() {
        Some(ledger_err) if ledger_err.is_ledger_failure() => {
            error!(error = %ledger_err, "ledger computation failed");
            anyhow!("Unable to compute balances")
        }
        _ => err,
    })
}

fn run(cli: Cli) -> Result<()> {
    let paths = RoomiesPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    let storage = Storage::new(paths.clone())?;
    storage
        .load_all()
        .with_context(|| format!("Failed to load data from {}", paths.data_dir().display()))?;

    let household_ref = cli.household.as_deref();

    match cli.command {
        Some(Commands::Household(cmd)) => {
            handle_household_command(&storage, &mut settings, household_ref, cmd)?;
        }
        Some(Commands::Member(cmd)) => {
            let household = resolve_household(&storage, &settings, household_ref)?;
            handle_member_command(&storage, &household, cmd)?;
        }
        Some(Commands::Expense(cmd)) => {
            let household = resolve_household(&storage, &settings, household_ref)?;
            handle_expense_command(&storage, &settings, &household, cmd)?;
        }
        Some(Commands::Balance { json }) => {
            let household = resolve_household(&storage, &settings, household_ref)?;
            handle_balance_command(&storage, &settings, &household, json)?;
        }
        Some(Commands::Plan { json }) => {
            let household = resolve_household(&storage, &settings, household_ref)?;
            handle_plan_command(&storage, &settings, &household, json)?;
        }
        Some(Commands::Settle(cmd)) => {
            let household = resolve_household(&storage, &settings, household_ref)?;
            handle_settle_command(&storage, &settings, &household, cmd)?;
        }
        Some(Commands::Export(cmd)) => {
            let household = resolve_household(&storage, &settings, household_ref)?;
            handle_export_command(&storage, &household, cmd)?;
        }
        Some(Commands::Audit { limit, ledger }) => {
            handle_audit_command(&storage, limit, ledger)?;
        }
        Some(Commands::Init) => {
            println!("Initializing Roomies at: {}", paths.base_dir().display());
            storage.save_all()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next steps:");
            println!("  roomies household create <name>");
            println!("  roomies member add <name>");
            println!("  roomies expense add <title> <amount> --paid-by <name>");
        }
        Some(Commands::Config) => {
            println!("Roomies Configuration");
            println!("=====================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Date format:     {}", settings.date_format);
            match settings.active_household {
                Some(id) => match storage.households.get(id)? {
                    Some(household) => println!("  Active household: {} ({})", household.name, id),
                    None => println!("  Active household: {} (missing)", id),
                },
                None => println!("  Active household: (none)"),
            }
        }
        None => {
            println!("Roomies - shared expenses for roommates");
            println!();
            println!("Run 'roomies --help' for usage information.");
        }
    }

    Ok(())
}

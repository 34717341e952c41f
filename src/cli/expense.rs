//! Expense CLI commands
//!
//! Splits are described with `--split`, plus `--among` for equal splits or
//! repeated `--share NAME=VALUE` for percentage and custom splits.

use clap::{Args, Subcommand, ValueEnum};

use crate::config::settings::Settings;
use crate::display::{format_expense_details, format_expense_list};
use crate::error::{RoomiesError, RoomiesResult};
use crate::models::expense::FULL_SHARE_BP;
use crate::models::{Household, Money, SplitRequest, MAX_EXPENSE_AMOUNT};
use crate::services::{ExpenseService, ExpenseUpdate, MemberService, NewExpense};
use crate::storage::Storage;

/// How to divide an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SplitKind {
    /// Evenly across members
    Equal,
    /// By percentage shares totalling 100
    Percentage,
    /// By exact amounts totalling the expense
    Custom,
}

/// Split options shared by `add` and `edit`
#[derive(Args, Debug, Default)]
pub struct SplitArgs {
    /// Split type
    #[arg(short, long, value_enum)]
    pub split: Option<SplitKind>,

    /// Members for an equal split (default: everyone)
    #[arg(long, value_delimiter = ',')]
    pub among: Vec<String>,

    /// NAME=VALUE share for percentage or custom splits; repeatable
    #[arg(long = "share")]
    pub shares: Vec<String>,
}

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record a shared expense
    Add {
        /// What the money was spent on
        title: String,
        /// Amount, e.g. 85.75
        amount: String,
        /// Member who paid
        #[arg(short, long)]
        paid_by: String,
        #[command(flatten)]
        split: SplitArgs,
        /// Date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,
        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List expenses, newest first
    List {
        /// Only expenses involving this member
        #[arg(short, long)]
        member: Option<String>,
        /// Number of expenses to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show an expense with its splits
    Show {
        /// Expense ID
        expense: String,
    },
    /// Change an expense
    Edit {
        /// Expense ID
        expense: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short, long)]
        paid_by: Option<String>,
        #[command(flatten)]
        split: SplitArgs,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Delete an expense and its settlement records
    Delete {
        /// Expense ID
        expense: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Split a `NAME=VALUE` share argument
fn parse_share(share: &str) -> RoomiesResult<(&str, &str)> {
    share
        .split_once('=')
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, value)| !name.is_empty() && !value.is_empty())
        .ok_or_else(|| RoomiesError::Validation(format!("Invalid share '{}', expected NAME=VALUE", share)))
}

/// A money argument no larger than a single expense may be
fn parse_bounded_amount(input: &str) -> RoomiesResult<Money> {
    let amount = super::parse_amount(input)?;
    if amount > MAX_EXPENSE_AMOUNT {
        return Err(RoomiesError::Validation(format!(
            "Amount {} is over the {} limit",
            amount, MAX_EXPENSE_AMOUNT
        )));
    }
    Ok(amount)
}

fn parse_expense_amount(input: &str) -> RoomiesResult<Money> {
    let amount = parse_bounded_amount(input)?;
    if !amount.is_positive() {
        return Err(RoomiesError::Validation(
            "Expense amount must be greater than zero".into(),
        ));
    }
    Ok(amount)
}

/// Percentage text ("33.33") to basis points
fn parse_percentage(value: &str) -> RoomiesResult<u32> {
    let bp = Money::parse(value.trim_end_matches('%'))
        .map_err(|_| RoomiesError::Validation(format!("Invalid percentage '{}'", value)))?
        .cents();
    u32::try_from(bp)
        .ok()
        .filter(|bp| *bp <= FULL_SHARE_BP)
        .ok_or_else(|| {
            RoomiesError::Validation(format!("Percentage must be between 0 and 100: {}", value))
        })
}

/// Turn split options into a request, resolving member names
fn build_split_request(
    storage: &Storage,
    household: &Household,
    kind: SplitKind,
    args: &SplitArgs,
) -> RoomiesResult<SplitRequest> {
    let members = MemberService::new(storage);

    match kind {
        SplitKind::Equal => {
            if !args.shares.is_empty() {
                return Err(RoomiesError::Validation(
                    "--share is for percentage and custom splits; use --among".into(),
                ));
            }
            let ids = if args.among.is_empty() {
                members
                    .list(household.id, false)?
                    .into_iter()
                    .map(|m| m.id)
                    .collect()
            } else {
                args.among
                    .iter()
                    .map(|name| members.require(household.id, name).map(|m| m.id))
                    .collect::<RoomiesResult<Vec<_>>>()?
            };
            Ok(SplitRequest::Equal(ids))
        }
        SplitKind::Percentage | SplitKind::Custom => {
            if !args.among.is_empty() {
                return Err(RoomiesError::Validation(
                    "--among is for equal splits; use --share NAME=VALUE".into(),
                ));
            }
            if args.shares.is_empty() {
                return Err(RoomiesError::Validation(
                    "At least one --share NAME=VALUE is required".into(),
                ));
            }

            let mut percentages = Vec::with_capacity(args.shares.len());
            let mut amounts = Vec::with_capacity(args.shares.len());
            for share in &args.shares {
                let (name, value) = parse_share(share)?;
                let member_id = members.require(household.id, name)?.id;
                if kind == SplitKind::Percentage {
                    percentages.push((member_id, parse_percentage(value)?));
                } else {
                    let amount = parse_bounded_amount(value)?;
                    if amount.is_negative() {
                        return Err(RoomiesError::Validation(format!(
                            "Share for {} cannot be negative",
                            name
                        )));
                    }
                    amounts.push((member_id, amount));
                }
            }

            Ok(if kind == SplitKind::Percentage {
                SplitRequest::Percentage(percentages)
            } else {
                SplitRequest::Custom(amounts)
            })
        }
    }
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    household: &Household,
    cmd: ExpenseCommands,
) -> RoomiesResult<()> {
    let service = ExpenseService::new(storage);
    let members = MemberService::new(storage);

    match cmd {
        ExpenseCommands::Add {
            title,
            amount,
            paid_by,
            split,
            date,
            notes,
        } => {
            let payer = members.require(household.id, &paid_by)?;
            let kind = split.split.unwrap_or(SplitKind::Equal);
            let request = build_split_request(storage, household, kind, &split)?;
            let date = match date {
                Some(date) => super::parse_date(&date)?,
                None => chrono::Local::now().date_naive(),
            };

            let expense = service.create(
                household.id,
                NewExpense {
                    title,
                    amount: parse_expense_amount(&amount)?,
                    payer_id: payer.id,
                    date,
                    notes: notes.unwrap_or_default(),
                    split: request,
                },
            )?;

            println!(
                "Recorded {}: {} paid by {}, split {} ways ({})",
                expense.title,
                expense.amount.format_with_symbol(&settings.currency_symbol),
                payer.display_name,
                expense.splits.len(),
                expense.id
            );
        }

        ExpenseCommands::List { member, limit } => {
            let mut expenses = service.list(household.id)?;
            if let Some(member) = member {
                let member_id = members.require(household.id, &member)?.id;
                expenses.retain(|e| e.involves(member_id));
            }
            if let Some(limit) = limit {
                expenses.truncate(limit);
            }

            let names = super::member_names(storage, household.id)?;
            println!("{}", format_expense_list(&expenses, &names, settings));
        }

        ExpenseCommands::Show { expense } => {
            let found = service.require(household.id, &expense)?;
            let settlements = service.settlements(found.id)?;
            let names = super::member_names(storage, household.id)?;
            print!(
                "{}",
                format_expense_details(&found, &settlements, &names, settings)
            );
        }

        ExpenseCommands::Edit {
            expense,
            title,
            amount,
            paid_by,
            split,
            date,
            notes,
        } => {
            let found = service.require(household.id, &expense)?;

            let split_request = match split.split {
                Some(kind) => Some(build_split_request(storage, household, kind, &split)?),
                None if !split.among.is_empty() || !split.shares.is_empty() => {
                    return Err(RoomiesError::Validation(
                        "--among and --share need --split".into(),
                    ));
                }
                None => None,
            };

            let changes = ExpenseUpdate {
                title,
                amount: amount.as_deref().map(parse_expense_amount).transpose()?,
                payer_id: paid_by
                    .map(|name| members.require(household.id, &name).map(|m| m.id))
                    .transpose()?,
                date: date.as_deref().map(super::parse_date).transpose()?,
                notes,
                split: split_request,
            };

            let updated = service.update(found.id, changes)?;
            println!("Updated expense: {} ({})", updated.title, updated.id);
        }

        ExpenseCommands::Delete { expense, force } => {
            let found = service.require(household.id, &expense)?;

            if !force {
                println!("About to delete expense: {}", found);
                println!("Its settlement records will be deleted too.");
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            let deleted = service.delete(found.id)?;
            println!("Deleted expense: {}", deleted);
        }
    }

    Ok(())
}

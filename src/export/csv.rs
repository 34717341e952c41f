//! CSV export
//!
//! One row per split, so a spreadsheet can total what each member paid and
//! owes. The payer's own split has no settlement record and an empty status.

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;

use crate::display::MemberNames;
use crate::error::{RoomiesError, RoomiesResult};
use crate::models::{HouseholdId, Money};
use crate::storage::Storage;

#[derive(Serialize)]
struct SplitRecord<'a> {
    expense_id: String,
    date: String,
    title: &'a str,
    payer: String,
    total: String,
    split_type: String,
    member: String,
    share: String,
    status: String,
}

fn decimal(amount: Money) -> String {
    amount.format_with_symbol("")
}

/// Export a household's expenses to CSV, returning the number of rows written
pub fn export_expenses_csv<W: Write>(
    storage: &Storage,
    household_id: HouseholdId,
    writer: W,
) -> RoomiesResult<usize> {
    let names = MemberNames::from_members(&storage.members.get_by_household(household_id)?);
    let status_by_split: HashMap<_, _> = storage
        .settlements
        .get_by_household(household_id)?
        .into_iter()
        .map(|s| ((s.expense_id, s.member_id), s.status))
        .collect();

    let mut expenses = storage.expenses.get_by_household(household_id)?;
    expenses.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

    let mut csv_writer = csv::Writer::from_writer(writer);
    let mut rows = 0;
    for expense in &expenses {
        for split in &expense.splits {
            csv_writer
                .serialize(SplitRecord {
                    expense_id: expense.id.to_string(),
                    date: expense.date.to_string(),
                    title: &expense.title,
                    payer: names.name(expense.payer_id),
                    total: decimal(expense.amount),
                    split_type: expense.split_type.to_string(),
                    member: names.name(split.member_id),
                    share: decimal(split.amount),
                    status: status_by_split
                        .get(&(expense.id, split.member_id))
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                })
                .map_err(|e| RoomiesError::Export(e.to_string()))?;
            rows += 1;
        }
    }

    csv_writer
        .flush()
        .map_err(|e| RoomiesError::Export(e.to_string()))?;
    Ok(rows)
}

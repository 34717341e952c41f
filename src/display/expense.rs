//! Expense display formatting
//!
//! List and detail views for expenses and their splits.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{truncate, MemberNames};
use crate::config::settings::Settings;
use crate::models::money::format_basis_points;
use crate::models::{Expense, Settlement};

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Paid By")]
    payer: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Split")]
    split: String,
}

/// Format expenses as a table, followed by a total line
pub fn format_expense_list(expenses: &[Expense], names: &MemberNames, settings: &Settings) -> String {
    if expenses.is_empty() {
        return "No expenses found.".to_string();
    }

    let symbol = &settings.currency_symbol;
    let rows = expenses.iter().map(|e| ExpenseRow {
        id: e.id.to_string(),
        date: e.date.format(&settings.date_format).to_string(),
        title: truncate(&e.title, 32),
        payer: names.name(e.payer_id),
        amount: e.amount.format_with_symbol(symbol),
        split: format!("{} x{}", e.split_type, e.splits.len()),
    });

    let total: crate::models::Money = expenses.iter().map(|e| e.amount).sum();
    format!(
        "{}\nTotal: {} across {} expense(s)",
        Table::new(rows).with(Style::psql()),
        total.format_with_symbol(symbol),
        expenses.len()
    )
}

#[derive(Tabled)]
struct SplitRow {
    #[tabled(rename = "Member")]
    member: String,
    #[tabled(rename = "Share")]
    share: String,
    #[tabled(rename = "%")]
    percentage: String,
    #[tabled(rename = "Settlement")]
    settlement: String,
}

/// Format one expense with its splits and the status of each settlement record
pub fn format_expense_details(
    expense: &Expense,
    settlements: &[Settlement],
    names: &MemberNames,
    settings: &Settings,
) -> String {
    let symbol = &settings.currency_symbol;
    let mut output = String::new();

    output.push_str(&format!("Expense: {}\n", expense.title));
    output.push_str(&format!("  ID:       {}\n", expense.id));
    output.push_str(&format!(
        "  Date:     {}\n",
        expense.date.format(&settings.date_format)
    ));
    output.push_str(&format!(
        "  Amount:   {}\n",
        expense.amount.format_with_symbol(symbol)
    ));
    output.push_str(&format!("  Paid by:  {}\n", names.name(expense.payer_id)));
    output.push_str(&format!("  Split:    {}\n", expense.split_type));
    if !expense.notes.is_empty() {
        output.push_str(&format!("  Notes:    {}\n", expense.notes));
    }
    output.push('\n');

    let rows = expense.splits.iter().map(|split| {
        let settlement = if split.member_id == expense.payer_id {
            "(payer)".to_string()
        } else {
            settlements
                .iter()
                .find(|s| s.member_id == split.member_id)
                .map(|s| format!("{} {}", s.status, s.id))
                .unwrap_or_default()
        };
        SplitRow {
            member: names.name(split.member_id),
            share: split.amount.format_with_symbol(symbol),
            percentage: split
                .percentage
                .map(|bp| format_basis_points(i64::from(bp)))
                .unwrap_or_default(),
            settlement,
        }
    });
    output.push_str(&Table::new(rows).with(Style::psql()).to_string());
    output.push('\n');

    output.push_str(&format!(
        "\n  Created:  {}\n",
        expense.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        expense.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HouseholdId, Member, Money, SplitRequest};
    use chrono::NaiveDate;

    fn sample() -> (Expense, Vec<Member>) {
        let household_id = HouseholdId::new();
        let alice = Member::new(household_id, "Alice");
        let bob = Member::new(household_id, "Bob");
        let mut expense = Expense::new(
            household_id,
            "Internet",
            Money::from_cents(6000),
            alice.id,
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        );
        expense
            .apply_splits(&SplitRequest::Percentage(vec![(alice.id, 7_500), (bob.id, 2_500)]))
            .unwrap();
        (expense, vec![alice, bob])
    }

    #[test]
    fn test_expense_list() {
        let (expense, members) = sample();
        let names = MemberNames::from_members(&members);
        let output = format_expense_list(&[expense], &names, &Settings::default());

        assert!(output.contains("Internet"));
        assert!(output.contains("Alice"));
        assert!(output.contains("$60.00"));
        assert!(output.contains("Total: $60.00 across 1 expense(s)"));
        assert_eq!(
            format_expense_list(&[], &names, &Settings::default()),
            "No expenses found."
        );
    }

    #[test]
    fn test_expense_details() {
        let (expense, members) = sample();
        let names = MemberNames::from_members(&members);
        let record = Settlement::new(
            expense.household_id,
            expense.id,
            members[1].id,
            Money::from_cents(1500),
        );
        let output = format_expense_details(&expense, &[record], &names, &Settings::default());

        assert!(output.contains("Paid by:  Alice"));
        assert!(output.contains("75.00%"));
        assert!(output.contains("$15.00"));
        assert!(output.contains("Pending"));
        assert!(output.contains("(payer)"));
    }
}

//! Ledger display formatting
//!
//! Balances, settle-up plans, settlement records and the household summary.

use std::collections::HashMap;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{truncate, MemberNames};
use crate::models::{Balance, Expense, Money, Settlement, Transfer};
use crate::services::HouseholdSummary;

#[derive(Tabled)]
struct BalanceRow {
    #[tabled(rename = "Member")]
    member: String,
    #[tabled(rename = "Owes")]
    owes: String,
    #[tabled(rename = "Is Owed")]
    is_owed: String,
    #[tabled(rename = "Net")]
    net: String,
}

/// Format per-member balances
pub fn format_balances(balances: &[Balance], symbol: &str) -> String {
    if balances.is_empty() {
        return "No members in this household.".to_string();
    }

    let rows = balances.iter().map(|b| BalanceRow {
        member: b.display_name.clone(),
        owes: b.owes.format_with_symbol(symbol),
        is_owed: b.is_owed.format_with_symbol(symbol),
        net: b.net.format_with_symbol(symbol),
    });

    let mut output = Table::new(rows).with(Style::psql()).to_string();
    if balances.iter().all(Balance::is_settled) {
        output.push_str("\nEveryone is settled up.");
    }
    output
}

#[derive(Tabled)]
struct TransferRow {
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Format a settle-up plan
pub fn format_plan(plan: &[Transfer], names: &MemberNames, symbol: &str) -> String {
    if plan.is_empty() {
        return "Nothing to settle.".to_string();
    }

    let rows = plan.iter().map(|t| TransferRow {
        from: names.name(t.from),
        to: names.name(t.to),
        amount: t.amount.format_with_symbol(symbol),
    });

    let total: Money = plan.iter().map(|t| t.amount).sum();
    format!(
        "{}\n{} transfer(s) moving {}",
        Table::new(rows).with(Style::psql()),
        plan.len(),
        total.format_with_symbol(symbol)
    )
}

#[derive(Tabled)]
struct SettlementRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Expense")]
    expense: String,
    #[tabled(rename = "Debtor")]
    debtor: String,
    #[tabled(rename = "Owes To")]
    creditor: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Format settlement records, resolving expense titles and payers
pub fn format_settlement_list(
    settlements: &[Settlement],
    expenses: &[Expense],
    names: &MemberNames,
    symbol: &str,
) -> String {
    if settlements.is_empty() {
        return "No settlement records found.".to_string();
    }

    let expenses: HashMap<_, _> = expenses.iter().map(|e| (e.id, e)).collect();
    let rows = settlements.iter().map(|s| {
        let expense = expenses.get(&s.expense_id);
        SettlementRow {
            id: s.id.to_string(),
            expense: expense
                .map(|e| truncate(&e.title, 28))
                .unwrap_or_else(|| s.expense_id.to_string()),
            debtor: names.name(s.member_id),
            creditor: expense.map(|e| names.name(e.payer_id)).unwrap_or_default(),
            amount: s.amount.format_with_symbol(symbol),
            status: s.status.to_string(),
        }
    });

    Table::new(rows).with(Style::psql()).to_string()
}

#[derive(Tabled)]
struct TotalsRow {
    #[tabled(rename = "Member")]
    member: String,
    #[tabled(rename = "Paid")]
    paid: String,
    #[tabled(rename = "Share")]
    share: String,
}

/// Format a household summary
pub fn format_summary(household_name: &str, summary: &HouseholdSummary, symbol: &str) -> String {
    let mut output = format!(
        "Household: {}\n  Expenses:    {}\n  Total spent: {}\n  Open records: {}\n\n",
        household_name,
        summary.expense_count,
        summary.total_spent.format_with_symbol(symbol),
        summary.outstanding_records
    );

    let rows = summary.members.iter().map(|m| TotalsRow {
        member: m.display_name.clone(),
        paid: m.paid.format_with_symbol(symbol),
        share: m.share.format_with_symbol(symbol),
    });
    output.push_str(&Table::new(rows).with(Style::psql()).to_string());
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HouseholdId, Member, MemberId};
    use crate::services::MemberTotals;
    use chrono::NaiveDate;

    #[test]
    fn test_format_balances() {
        let alice = MemberId::new();
        let bob = MemberId::new();
        let balances = vec![
            Balance::from_net(alice, "Alice", Money::from_cents(6431)),
            Balance::from_net(bob, "Bob", Money::from_cents(-6431)),
        ];
        let output = format_balances(&balances, "$");

        assert!(output.contains("Alice"));
        assert!(output.contains("$64.31"));
        assert!(output.contains("-$64.31"));
        assert!(!output.contains("settled up"));

        let settled = vec![Balance::zero(alice, "Alice"), Balance::zero(bob, "Bob")];
        assert!(format_balances(&settled, "$").contains("Everyone is settled up."));
    }

    #[test]
    fn test_format_plan() {
        let household_id = HouseholdId::new();
        let alice = Member::new(household_id, "Alice");
        let bob = Member::new(household_id, "Bob");
        let names = MemberNames::from_members(&[alice.clone(), bob.clone()]);
        let plan = vec![Transfer {
            from: bob.id,
            to: alice.id,
            amount: Money::from_cents(2144),
        }];

        let output = format_plan(&plan, &names, "€");
        assert!(output.contains("Bob"));
        assert!(output.contains("€21.44"));
        assert!(output.contains("1 transfer(s)"));
        assert_eq!(format_plan(&[], &names, "$"), "Nothing to settle.");
    }

    #[test]
    fn test_format_settlement_list() {
        let household_id = HouseholdId::new();
        let alice = Member::new(household_id, "Alice");
        let bob = Member::new(household_id, "Bob");
        let expense = Expense::new(
            household_id,
            "Pizza night",
            Money::from_cents(3000),
            alice.id,
            NaiveDate::from_ymd_opt(2025, 6, 6).unwrap(),
        );
        let record = Settlement::new(household_id, expense.id, bob.id, Money::from_cents(1500));
        let names = MemberNames::from_members(&[alice, bob]);

        let output = format_settlement_list(&[record], &[expense], &names, "$");
        assert!(output.contains("Pizza night"));
        assert!(output.contains("Alice"));
        assert!(output.contains("Bob"));
        assert!(output.contains("Pending"));
    }

    #[test]
    fn test_format_summary() {
        let summary = HouseholdSummary {
            expense_count: 2,
            total_spent: Money::from_cents(4001),
            outstanding_records: 1,
            members: vec![MemberTotals {
                member_id: MemberId::new(),
                display_name: "Alice".into(),
                paid: Money::from_cents(3000),
                share: Money::from_cents(1500),
            }],
        };
        let output = format_summary("Maple", &summary, "$");
        assert!(output.contains("Household: Maple"));
        assert!(output.contains("$40.01"));
        assert!(output.contains("$15.00"));
    }
}

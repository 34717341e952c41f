//! Balance calculator
//!
//! Turns a household snapshot into one `Balance` per roster member. The payer
//! of an expense is credited with the full amount and every split member is
//! debited with their share; completed settlement records move money back
//! from the debtor to the payer.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{RoomiesError, RoomiesResult};
use crate::models::{
    Balance, Expense, ExpenseId, Member, MemberId, Money, Settlement, MAX_EXPENSE_AMOUNT,
};

/// Running net positions keyed by roster member
struct NetBook {
    nets: HashMap<MemberId, Money>,
}

impl NetBook {
    fn new(roster: &[Member]) -> Self {
        Self {
            nets: roster.iter().map(|m| (m.id, Money::zero())).collect(),
        }
    }

    /// Add `delta` to a member's net; members outside the roster are skipped
    fn post(
        &mut self,
        member_id: MemberId,
        delta: Money,
        source: &dyn std::fmt::Display,
    ) -> RoomiesResult<()> {
        match self.nets.get_mut(&member_id) {
            Some(net) => {
                *net = net.checked_add(delta).ok_or_else(|| {
                    RoomiesError::InvalidExpenseAmount(format!(
                        "balance of {} overflows at {}",
                        member_id, source
                    ))
                })?;
            }
            None => warn!(
                member = %member_id,
                %delta,
                source = %source,
                "member is not on the roster, entry left out of balances"
            ),
        }
        Ok(())
    }

    fn get(&self, member_id: MemberId) -> Money {
        self.nets.get(&member_id).copied().unwrap_or_default()
    }
}

fn check_amounts(expense: &Expense) -> RoomiesResult<()> {
    if !expense.amount.is_positive() {
        return Err(RoomiesError::InvalidExpenseAmount(format!(
            "expense {} has non-positive amount {}",
            expense.id, expense.amount
        )));
    }
    if expense.amount > MAX_EXPENSE_AMOUNT {
        return Err(RoomiesError::InvalidExpenseAmount(format!(
            "expense {} amount {} is over the {} limit",
            expense.id, expense.amount, MAX_EXPENSE_AMOUNT
        )));
    }
    if let Some(split) = expense.splits.iter().find(|s| s.amount.is_negative()) {
        return Err(RoomiesError::InvalidExpenseAmount(format!(
            "expense {} has negative split {} for {}",
            expense.id, split.amount, split.member_id
        )));
    }
    Ok(())
}

/// Compute each roster member's balance
///
/// `roster` is the household's active members and fixes the output order.
/// Expenses, splits and settlement records may reference members that are no
/// longer on the roster; those entries are logged and left out, which the
/// settlement optimizer then reports as an unbalanced ledger.
///
/// # Errors
///
/// `InvalidExpenseAmount` when an expense amount is not positive or over
/// `MAX_EXPENSE_AMOUNT`, a split amount is negative, or a net leaves the
/// cent range.
pub fn compute_balances(
    roster: &[Member],
    expenses: &[Expense],
    settlements: &[Settlement],
) -> RoomiesResult<Vec<Balance>> {
    let mut book = NetBook::new(roster);
    let mut payers: HashMap<ExpenseId, MemberId> = HashMap::with_capacity(expenses.len());

    for expense in expenses {
        check_amounts(expense)?;

        book.post(expense.payer_id, expense.amount, &expense.id)?;
        for split in &expense.splits {
            book.post(split.member_id, -split.amount, &expense.id)?;
        }
        payers.insert(expense.id, expense.payer_id);
    }

    for settlement in settlements.iter().filter(|s| s.is_completed()) {
        let Some(&payer_id) = payers.get(&settlement.expense_id) else {
            warn!(
                settlement = %settlement.id,
                expense = %settlement.expense_id,
                "settlement refers to an expense outside this snapshot, ignored"
            );
            continue;
        };
        book.post(settlement.member_id, settlement.amount, &settlement.id)?;
        book.post(payer_id, -settlement.amount, &settlement.id)?;
    }

    let balances: Vec<Balance> = roster
        .iter()
        .map(|member| Balance::from_net(member.id, &member.display_name, book.get(member.id)))
        .collect();

    debug!(
        members = balances.len(),
        expenses = expenses.len(),
        settlements = settlements.len(),
        "computed balances"
    );

    Ok(balances)
}

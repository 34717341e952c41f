//! Settlement optimizer
//!
//! Greedy settle-up: repeatedly match the largest debtor with the largest
//! creditor and move the smaller of the two amounts between them. Every
//! round zeroes at least one side, so `n` unsettled members need at most
//! `n - 1` transfers.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{RoomiesError, RoomiesResult};
use crate::models::{Balance, MemberId, Money, Transfer};

/// Residual at or below which a member counts as settled
pub const SETTLEMENT_EPSILON: Money = Money::from_cents(1);

fn is_unsettled(net: Money) -> bool {
    net.cents().unsigned_abs() > SETTLEMENT_EPSILON.cents().unsigned_abs()
}

fn unbalanced(working: &BTreeMap<MemberId, Money>) -> RoomiesError {
    let unsettled = working.values().filter(|net| is_unsettled(**net)).count();
    let residual: i128 = working.values().map(|net| i128::from(net.cents())).sum();
    let residual = Money::from_cents(i64::try_from(residual).unwrap_or(i64::MAX));
    warn!(unsettled, %residual, "balances do not net to zero");
    RoomiesError::UnbalancedLedger {
        unsettled,
        residual,
    }
}

/// Compute the suggested transfers that settle `balances`
///
/// Debtor and creditor ties are broken by the smaller member id, so the same
/// balances always give the same plan. Entries for the same member are summed.
///
/// # Errors
///
/// `UnbalancedLedger` when only debtors or only creditors remain, which
/// happens when the balances do not net to zero. `InvalidExpenseAmount` when
/// a net or the total leaves the cent range.
pub fn compute_settlement_plan(balances: &[Balance]) -> RoomiesResult<Vec<Transfer>> {
    let out_of_range = |member_id: MemberId| {
        RoomiesError::InvalidExpenseAmount(format!("net of {} is out of range", member_id))
    };

    let mut working: BTreeMap<MemberId, Money> = BTreeMap::new();
    for balance in balances {
        let net = working.entry(balance.member_id).or_default();
        *net = net
            .checked_add(balance.net)
            .filter(|sum| sum.cents() != i64::MIN)
            .ok_or_else(|| out_of_range(balance.member_id))?;
    }
    if Money::checked_sum(working.values().copied()).is_none() {
        return Err(RoomiesError::InvalidExpenseAmount(
            "balances total is out of range".into(),
        ));
    }

    let max_rounds = working.len();
    let mut transfers = Vec::new();

    while working.values().any(|net| is_unsettled(*net)) {
        let debtor = working
            .iter()
            .filter(|(_, net)| net.is_negative())
            .min_by_key(|(id, net)| (**net, **id))
            .map(|(id, net)| (*id, *net));
        let creditor = working
            .iter()
            .filter(|(_, net)| net.is_positive())
            .min_by_key(|(id, net)| (Reverse(**net), **id))
            .map(|(id, net)| (*id, *net));

        let (Some((debtor_id, debtor_net)), Some((creditor_id, creditor_net))) = (debtor, creditor)
        else {
            return Err(unbalanced(&working));
        };

        if transfers.len() >= max_rounds {
            return Err(unbalanced(&working));
        }

        let amount = (-debtor_net).min(creditor_net);
        working.insert(debtor_id, debtor_net + amount);
        working.insert(creditor_id, creditor_net - amount);
        transfers.push(Transfer {
            from: debtor_id,
            to: creditor_id,
            amount,
        });
    }

    debug!(
        members = working.len(),
        transfers = transfers.len(),
        "computed settlement plan"
    );

    Ok(transfers)
}

/// Apply `transfers` to `balances`, as if every suggested payment were made
pub fn apply_transfers(balances: &[Balance], transfers: &[Transfer]) -> Vec<Balance> {
    let mut nets: BTreeMap<MemberId, Money> =
        balances.iter().map(|b| (b.member_id, b.net)).collect();
    for transfer in transfers {
        *nets.entry(transfer.from).or_default() += transfer.amount;
        *nets.entry(transfer.to).or_default() -= transfer.amount;
    }

    balances
        .iter()
        .map(|b| {
            let net = nets.get(&b.member_id).copied().unwrap_or_default();
            Balance::from_net(b.member_id, b.display_name.clone(), net)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::tests::fixed_id;

    fn balance(idx: u128, cents: i64) -> Balance {
        Balance::from_net(fixed_id(idx), format!("M{}", idx), Money::from_cents(cents))
    }

    fn summary(transfers: &[Transfer]) -> Vec<(u128, u128, i64)> {
        transfers
            .iter()
            .map(|t| {
                (
                    t.from.as_uuid().as_u128() & 0xff,
                    t.to.as_uuid().as_u128() & 0xff,
                    t.amount.cents(),
                )
            })
            .collect()
    }

    #[test]
    fn test_groceries_plan() {
        let balances = vec![
            balance(1, 6431),
            balance(2, -2144),
            balance(3, -2144),
            balance(4, -2143),
        ];

        let plan = compute_settlement_plan(&balances).unwrap();
        assert_eq!(
            summary(&plan),
            vec![(2, 1, 2144), (3, 1, 2144), (4, 1, 2143)]
        );

        let after = apply_transfers(&balances, &plan);
        assert!(after.iter().all(|b| b.is_settled()));
    }

    #[test]
    fn test_empty_plan() {
        assert!(compute_settlement_plan(&[]).unwrap().is_empty());

        let zeros = vec![balance(1, 0), balance(2, 0)];
        assert!(compute_settlement_plan(&zeros).unwrap().is_empty());
    }

    #[test]
    fn test_two_creditors_two_debtors() {
        let balances = vec![
            balance(1, 3000),
            balance(2, 1000),
            balance(3, -2500),
            balance(4, -1500),
        ];

        let plan = compute_settlement_plan(&balances).unwrap();
        assert_eq!(
            summary(&plan),
            vec![(3, 1, 2500), (4, 2, 1000), (4, 1, 500)]
        );
        assert!(plan.len() <= balances.len() - 1);
    }

    #[test]
    fn test_one_cent_residual_is_settled() {
        let balances = vec![balance(1, 1), balance(2, -1)];
        assert!(compute_settlement_plan(&balances).unwrap().is_empty());

        let balances = vec![balance(1, 301), balance(2, -300), balance(3, -1)];
        let plan = compute_settlement_plan(&balances).unwrap();
        assert_eq!(summary(&plan), vec![(2, 1, 300)]);
    }

    #[test]
    fn test_small_debts_still_matched() {
        let balances = vec![balance(1, 2), balance(2, -1), balance(3, -1)];
        let plan = compute_settlement_plan(&balances).unwrap();
        assert_eq!(summary(&plan), vec![(2, 1, 1)]);
    }

    #[test]
    fn test_out_of_range_nets_are_errors() {
        let duplicate = vec![balance(1, i64::MAX), balance(1, 10), balance(2, -10)];
        let err = compute_settlement_plan(&duplicate).unwrap_err();
        assert!(matches!(err, RoomiesError::InvalidExpenseAmount(_)));

        let total = vec![balance(1, i64::MAX), balance(2, i64::MAX)];
        let err = compute_settlement_plan(&total).unwrap_err();
        assert!(matches!(err, RoomiesError::InvalidExpenseAmount(_)));

        let floor = vec![balance(1, i64::MIN), balance(2, i64::MAX)];
        assert!(compute_settlement_plan(&floor).unwrap_err().is_ledger_failure());
    }

    #[test]
    fn test_unbalanced_only_creditors() {
        let balances = vec![balance(1, 500), balance(2, 0)];
        let err = compute_settlement_plan(&balances).unwrap_err();
        match err {
            RoomiesError::UnbalancedLedger {
                unsettled,
                residual,
            } => {
                assert_eq!(unsettled, 1);
                assert_eq!(residual.cents(), 500);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unbalanced_after_partial_matching() {
        let balances = vec![balance(1, 1000), balance(2, -400)];
        let err = compute_settlement_plan(&balances).unwrap_err();
        assert!(matches!(
            err,
            RoomiesError::UnbalancedLedger { unsettled: 1, .. }
        ));
    }

    #[test]
    fn test_duplicate_entries_are_summed() {
        let balances = vec![balance(1, 500), balance(1, 500), balance(2, -1000)];
        let plan = compute_settlement_plan(&balances).unwrap();
        assert_eq!(summary(&plan), vec![(2, 1, 1000)]);
    }

    #[test]
    fn test_ties_break_on_member_id() {
        let forward = vec![balance(3, -500), balance(2, -500), balance(1, 1000)];
        let reversed: Vec<Balance> = forward.iter().rev().cloned().collect();

        let plan = compute_settlement_plan(&forward).unwrap();
        assert_eq!(summary(&plan), vec![(2, 1, 500), (3, 1, 500)]);
        assert_eq!(plan, compute_settlement_plan(&reversed).unwrap());
    }
}

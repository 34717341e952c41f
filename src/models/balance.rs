//! Derived ledger values: per-member balances and suggested transfers
//!
//! Neither type is persisted. Both are recomputed from expenses and
//! settlement records every time they are needed.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::MemberId;
use super::money::Money;

/// A member's net position in the household
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub member_id: MemberId,
    pub display_name: String,
    /// What this member still owes others (`max(-net, 0)`)
    pub owes: Money,
    /// What others still owe this member (`max(net, 0)`)
    pub is_owed: Money,
    /// Positive when the member is owed money
    pub net: Money,
}

impl Balance {
    /// Build a balance from a net amount
    pub fn from_net(member_id: MemberId, display_name: impl Into<String>, net: Money) -> Self {
        let (owes, is_owed) = if net.is_negative() {
            (Money::from_cents(net.cents().saturating_neg()), Money::zero())
        } else {
            (Money::zero(), net)
        };
        Self {
            member_id,
            display_name: display_name.into(),
            owes,
            is_owed,
            net,
        }
    }

    pub fn zero(member_id: MemberId, display_name: impl Into<String>) -> Self {
        Self::from_net(member_id, display_name, Money::zero())
    }

    pub fn is_settled(&self) -> bool {
        self.net.is_zero()
    }
}

/// A suggested payment from a debtor to a creditor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.amount)
    }
}

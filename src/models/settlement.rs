//! Settlement record model
//!
//! One record per non-payer split: the obligation of `member_id` to pay the
//! expense's payer back `amount`. Only COMPLETED records count toward
//! balances.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ExpenseId, HouseholdId, MemberId, SettlementId};
use super::money::Money;

/// Status of a settlement record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SettlementStatus {
    #[default]
    Pending,
    Completed,
    Declined,
}

impl SettlementStatus {
    /// Parse a status from user input
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "p" => Some(Self::Pending),
            "completed" | "complete" | "paid" | "c" => Some(Self::Completed),
            "declined" | "decline" | "d" => Some(Self::Declined),
            _ => None,
        }
    }

    /// Whether the obligation is still open
    pub fn is_outstanding(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Completed => write!(f, "Completed"),
            Self::Declined => write!(f, "Declined"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,

    pub household_id: HouseholdId,

    /// The expense this obligation comes from
    pub expense_id: ExpenseId,

    /// The member who owes the payer
    pub member_id: MemberId,

    /// Amount owed (the member's split)
    pub amount: Money,

    #[serde(default)]
    pub status: SettlementStatus,

    /// Set while the record is COMPLETED
    #[serde(default)]
    pub settled_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Settlement {
    /// Create a pending obligation
    pub fn new(
        household_id: HouseholdId,
        expense_id: ExpenseId,
        member_id: MemberId,
        amount: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SettlementId::new(),
            household_id,
            expense_id,
            member_id,
            amount,
            status: SettlementStatus::Pending,
            settled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `status`, returning whether anything changed
    ///
    /// Entering COMPLETED stamps `settled_at`; leaving it clears the stamp.
    /// Setting the current status again leaves the record untouched.
    pub fn set_status(&mut self, status: SettlementStatus) -> bool {
        if self.status == status {
            return false;
        }

        let now = Utc::now();
        self.settled_at = match status {
            SettlementStatus::Completed => Some(now),
            _ => None,
        };
        self.status = status;
        self.updated_at = now;
        true
    }

    pub fn is_completed(&self) -> bool {
        self.status == SettlementStatus::Completed
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.id, self.amount, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Settlement {
        Settlement::new(
            HouseholdId::new(),
            ExpenseId::new(),
            MemberId::new(),
            Money::from_cents(2144),
        )
    }

    #[test]
    fn test_new_is_pending() {
        let settlement = record();
        assert_eq!(settlement.status, SettlementStatus::Pending);
        assert!(settlement.settled_at.is_none());
        assert!(settlement.status.is_outstanding());
    }

    #[test]
    fn test_complete_stamps_settled_at() {
        let mut settlement = record();
        assert!(settlement.set_status(SettlementStatus::Completed));
        assert!(settlement.is_completed());
        assert!(settlement.settled_at.is_some());
    }

    #[test]
    fn test_same_status_is_noop() {
        let mut settlement = record();
        settlement.set_status(SettlementStatus::Completed);
        let stamp = settlement.settled_at;
        let updated = settlement.updated_at;

        assert!(!settlement.set_status(SettlementStatus::Completed));
        assert_eq!(settlement.settled_at, stamp);
        assert_eq!(settlement.updated_at, updated);
    }

    #[test]
    fn test_leaving_completed_clears_stamp() {
        let mut settlement = record();
        settlement.set_status(SettlementStatus::Completed);
        assert!(settlement.set_status(SettlementStatus::Declined));
        assert!(settlement.settled_at.is_none());
        assert!(settlement.status.is_outstanding());
    }

    #[test]
    fn test_status_parse_and_serde() {
        assert_eq!(SettlementStatus::parse("paid"), Some(SettlementStatus::Completed));
        assert_eq!(SettlementStatus::parse("Declined"), Some(SettlementStatus::Declined));
        assert_eq!(SettlementStatus::parse("nope"), None);

        let json = serde_json::to_string(&SettlementStatus::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");
    }
}

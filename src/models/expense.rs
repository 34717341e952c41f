//! Expense model
//!
//! A shared cost fronted by one member and split across some or all of the
//! household. Splits are always generated as a whole from a `SplitRequest`,
//! never patched one at a time, so they always add up to the expense amount.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::ids::{ExpenseId, HouseholdId, MemberId};
use super::money::Money;
use crate::error::RoomiesError;

/// Basis points in 100%
pub const FULL_SHARE_BP: u32 = 10_000;

/// Largest amount a single expense may carry ($1,000,000,000.00)
pub const MAX_EXPENSE_AMOUNT: Money = Money::from_cents(100_000_000_000);

/// How an expense is divided between members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    #[default]
    Equal,
    Percentage,
    Custom,
}

impl SplitType {
    /// Parse a split type from user input
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "equal" | "even" => Some(Self::Equal),
            "percentage" | "percent" | "pct" => Some(Self::Percentage),
            "custom" | "exact" => Some(Self::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "Equal"),
            Self::Percentage => write!(f, "Percentage"),
            Self::Custom => write!(f, "Custom"),
        }
    }
}

/// One member's share of one expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub member_id: MemberId,

    /// Amount this member owes toward the expense (never negative)
    pub amount: Money,

    /// Share in basis points, kept for percentage splits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u32>,
}

impl Split {
    pub fn new(member_id: MemberId, amount: Money) -> Self {
        Self {
            member_id,
            amount,
            percentage: None,
        }
    }
}

/// A request describing how to split an expense
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitRequest {
    /// Even split across these members; spare cents go to the first ones
    Equal(Vec<MemberId>),
    /// Shares in basis points that must total 100%
    Percentage(Vec<(MemberId, u32)>),
    /// Exact amounts that must total the expense amount
    Custom(Vec<(MemberId, Money)>),
}

impl SplitRequest {
    pub fn split_type(&self) -> SplitType {
        match self {
            Self::Equal(_) => SplitType::Equal,
            Self::Percentage(_) => SplitType::Percentage,
            Self::Custom(_) => SplitType::Custom,
        }
    }

    /// Members named by this request, in request order
    pub fn member_ids(&self) -> Vec<MemberId> {
        match self {
            Self::Equal(members) => members.clone(),
            Self::Percentage(shares) => shares.iter().map(|(id, _)| *id).collect(),
            Self::Custom(parts) => parts.iter().map(|(id, _)| *id).collect(),
        }
    }

    /// Generate the full set of splits for `amount`
    pub fn build(&self, amount: Money) -> Result<Vec<Split>, ExpenseValidationError> {
        if !amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(amount));
        }
        if amount > MAX_EXPENSE_AMOUNT {
            return Err(ExpenseValidationError::AmountTooLarge(amount));
        }

        let members = self.member_ids();
        if members.is_empty() {
            return Err(ExpenseValidationError::NoSplits);
        }
        let mut seen = HashSet::with_capacity(members.len());
        for member_id in &members {
            if !seen.insert(*member_id) {
                return Err(ExpenseValidationError::DuplicateMember(*member_id));
            }
        }

        let splits = match self {
            Self::Equal(members) => members
                .iter()
                .zip(amount.split_evenly(members.len()))
                .map(|(member_id, share)| Split::new(*member_id, share))
                .collect(),
            Self::Percentage(shares) => {
                let total: u64 = shares.iter().map(|(_, bp)| u64::from(*bp)).sum();
                if total != u64::from(FULL_SHARE_BP) {
                    return Err(ExpenseValidationError::PercentageTotal(total));
                }
                let weights: Vec<u64> = shares.iter().map(|(_, bp)| u64::from(*bp)).collect();
                shares
                    .iter()
                    .zip(amount.allocate(&weights))
                    .map(|((member_id, bp), share)| Split {
                        member_id: *member_id,
                        amount: share,
                        percentage: Some(*bp),
                    })
                    .collect()
            }
            Self::Custom(parts) => {
                if let Some((member_id, part)) = parts.iter().find(|(_, m)| m.is_negative()) {
                    return Err(ExpenseValidationError::NegativeSplit {
                        member_id: *member_id,
                        amount: *part,
                    });
                }
                let splits_total = Money::checked_sum(parts.iter().map(|(_, m)| *m))
                    .ok_or(ExpenseValidationError::SplitsOverflow)?;
                if splits_total != amount {
                    return Err(ExpenseValidationError::SplitsMismatch {
                        expense_amount: amount,
                        splits_total,
                    });
                }
                parts
                    .iter()
                    .map(|(member_id, part)| Split::new(*member_id, *part))
                    .collect()
            }
        };

        Ok(splits)
    }
}

/// A shared expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,

    pub household_id: HouseholdId,

    /// What the money was spent on
    pub title: String,

    /// Total amount fronted by the payer (always positive)
    pub amount: Money,

    /// The member who paid
    pub payer_id: MemberId,

    #[serde(default)]
    pub split_type: SplitType,

    /// Per-member shares; they sum to `amount`
    #[serde(default)]
    pub splits: Vec<Split>,

    /// Date the expense was incurred
    pub date: NaiveDate,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create an expense without splits
    pub fn new(
        household_id: HouseholdId,
        title: impl Into<String>,
        amount: Money,
        payer_id: MemberId,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            household_id,
            title: title.into(),
            amount,
            payer_id,
            split_type: SplitType::Equal,
            splits: Vec::new(),
            date,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace all splits according to `request`
    pub fn apply_splits(&mut self, request: &SplitRequest) -> Result<(), ExpenseValidationError> {
        self.splits = request.build(self.amount)?;
        self.split_type = request.split_type();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// The request that reproduces the current splits
    ///
    /// Rebuilding it against a new amount re-splits an EQUAL or PERCENTAGE
    /// expense the same way; a CUSTOM one only rebuilds if the total is unchanged.
    pub fn current_split_request(&self) -> SplitRequest {
        match self.split_type {
            SplitType::Equal => {
                SplitRequest::Equal(self.splits.iter().map(|s| s.member_id).collect())
            }
            SplitType::Percentage => SplitRequest::Percentage(
                self.splits
                    .iter()
                    .map(|s| (s.member_id, s.percentage.unwrap_or(0)))
                    .collect(),
            ),
            SplitType::Custom => {
                SplitRequest::Custom(self.splits.iter().map(|s| (s.member_id, s.amount)).collect())
            }
        }
    }

    /// Sum of all splits, `None` if it overflows
    pub fn splits_total(&self) -> Option<Money> {
        Money::checked_sum(self.splits.iter().map(|s| s.amount))
    }

    pub fn split_for(&self, member_id: MemberId) -> Option<&Split> {
        self.splits.iter().find(|s| s.member_id == member_id)
    }

    /// Whether the member paid for or shares in this expense
    pub fn involves(&self, member_id: MemberId) -> bool {
        self.payer_id == member_id || self.split_for(member_id).is_some()
    }

    /// Splits the payer is owed back (everyone but the payer, non-zero)
    pub fn reimbursable_splits(&self) -> impl Iterator<Item = &Split> {
        self.splits
            .iter()
            .filter(move |s| s.member_id != self.payer_id && s.amount.is_positive())
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.title.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyTitle);
        }
        if self.title.len() > 200 {
            return Err(ExpenseValidationError::TitleTooLong(self.title.len()));
        }
        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }
        if self.amount > MAX_EXPENSE_AMOUNT {
            return Err(ExpenseValidationError::AmountTooLarge(self.amount));
        }
        if self.splits.is_empty() {
            return Err(ExpenseValidationError::NoSplits);
        }

        let mut seen = HashSet::with_capacity(self.splits.len());
        for split in &self.splits {
            if split.amount.is_negative() {
                return Err(ExpenseValidationError::NegativeSplit {
                    member_id: split.member_id,
                    amount: split.amount,
                });
            }
            if !seen.insert(split.member_id) {
                return Err(ExpenseValidationError::DuplicateMember(split.member_id));
            }
        }

        let splits_total = self
            .splits_total()
            .ok_or(ExpenseValidationError::SplitsOverflow)?;
        if splits_total != self.amount {
            return Err(ExpenseValidationError::SplitsMismatch {
                expense_amount: self.amount,
                splits_total,
            });
        }

        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.title,
            self.amount
        )
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    EmptyTitle,
    TitleTooLong(usize),
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    NegativeSplit { member_id: MemberId, amount: Money },
    NoSplits,
    DuplicateMember(MemberId),
    PercentageTotal(u64),
    SplitsOverflow,
    SplitsMismatch {
        expense_amount: Money,
        splits_total: Money,
    },
}

impl ExpenseValidationError {
    /// Whether this error is about a money value rather than the expense shape
    pub fn is_amount_error(&self) -> bool {
        matches!(
            self,
            Self::NonPositiveAmount(_)
                | Self::AmountTooLarge(_)
                | Self::NegativeSplit { .. }
                | Self::SplitsOverflow
        )
    }
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Expense title cannot be empty"),
            Self::TitleTooLong(len) => {
                write!(f, "Expense title too long ({} chars, max 200)", len)
            }
            Self::NonPositiveAmount(amount) => {
                write!(f, "Expense amount must be positive, got {}", amount)
            }
            Self::AmountTooLarge(amount) => write!(
                f,
                "Expense amount {} is over the {} limit",
                amount, MAX_EXPENSE_AMOUNT
            ),
            Self::NegativeSplit { member_id, amount } => {
                write!(f, "Split for {} cannot be negative ({})", member_id, amount)
            }
            Self::NoSplits => write!(f, "Expense must be split between at least one member"),
            Self::DuplicateMember(member_id) => {
                write!(f, "Member {} appears more than once in the split", member_id)
            }
            Self::PercentageTotal(total) => write!(
                f,
                "Percentages must add up to 100% (got {}.{:02}%)",
                total / 100,
                total % 100
            ),
            Self::SplitsOverflow => write!(f, "Split totals are out of range"),
            Self::SplitsMismatch {
                expense_amount,
                splits_total,
            } => write!(
                f,
                "Split totals ({}) do not match expense amount ({})",
                splits_total, expense_amount
            ),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

impl From<ExpenseValidationError> for RoomiesError {
    fn from(err: ExpenseValidationError) -> Self {
        if err.is_amount_error() {
            RoomiesError::InvalidExpenseAmount(err.to_string())
        } else {
            RoomiesError::Validation(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn members(n: usize) -> Vec<MemberId> {
        (0..n).map(|_| MemberId::new()).collect()
    }

    #[test]
    fn test_equal_split_four_ways() {
        let ids = members(4);
        let mut expense = Expense::new(
            HouseholdId::new(),
            "Groceries",
            Money::from_cents(8575),
            ids[0],
            date(),
        );
        expense
            .apply_splits(&SplitRequest::Equal(ids.clone()))
            .unwrap();

        let cents: Vec<i64> = expense.splits.iter().map(|s| s.amount.cents()).collect();
        assert_eq!(cents, vec![2144, 2144, 2144, 2143]);
        assert_eq!(expense.split_type, SplitType::Equal);
        assert!(expense.validate().is_ok());
        assert_eq!(expense.reimbursable_splits().count(), 3);
    }

    #[test]
    fn test_percentage_split() {
        let ids = members(3);
        let request = SplitRequest::Percentage(vec![(ids[0], 5000), (ids[1], 3000), (ids[2], 2000)]);
        let splits = request.build(Money::from_cents(12345)).unwrap();

        let cents: Vec<i64> = splits.iter().map(|s| s.amount.cents()).collect();
        assert_eq!(cents.iter().sum::<i64>(), 12345);
        assert_eq!(cents, vec![6173, 3703, 2469]);
        assert_eq!(splits[1].percentage, Some(3000));
    }

    #[test]
    fn test_percentage_must_total_100() {
        let ids = members(2);
        let request = SplitRequest::Percentage(vec![(ids[0], 5000), (ids[1], 4000)]);
        assert_eq!(
            request.build(Money::from_cents(1000)),
            Err(ExpenseValidationError::PercentageTotal(9000))
        );
    }

    #[test]
    fn test_oversized_percentages_do_not_wrap() {
        let ids = members(2);
        let request = SplitRequest::Percentage(vec![(ids[0], u32::MAX), (ids[1], 10_001)]);
        assert_eq!(
            request.build(Money::from_cents(1000)),
            Err(ExpenseValidationError::PercentageTotal(u64::from(u32::MAX) + 10_001))
        );
    }

    #[test]
    fn test_custom_split_total_overflow() {
        let ids = members(2);
        let big = Money::from_cents(i64::MAX - 10);
        let request = SplitRequest::Custom(vec![(ids[0], big), (ids[1], big)]);

        let err = request.build(Money::from_cents(1000)).unwrap_err();
        assert_eq!(err, ExpenseValidationError::SplitsOverflow);
        assert!(matches!(
            RoomiesError::from(err),
            RoomiesError::InvalidExpenseAmount(_)
        ));
    }

    #[test]
    fn test_amount_limit() {
        let ids = members(2);
        let request = SplitRequest::Equal(ids.clone());
        assert!(request.build(MAX_EXPENSE_AMOUNT).is_ok());

        let over = Money::from_cents(MAX_EXPENSE_AMOUNT.cents() + 1);
        assert_eq!(
            request.build(over),
            Err(ExpenseValidationError::AmountTooLarge(over))
        );

        let mut expense = Expense::new(HouseholdId::new(), "Yacht", over, ids[0], date());
        expense.splits = vec![Split::new(ids[0], over)];
        assert_eq!(
            expense.validate(),
            Err(ExpenseValidationError::AmountTooLarge(over))
        );
    }

    #[test]
    fn test_custom_split_mismatch() {
        let ids = members(2);
        let request = SplitRequest::Custom(vec![
            (ids[0], Money::from_cents(600)),
            (ids[1], Money::from_cents(300)),
        ]);
        assert!(matches!(
            request.build(Money::from_cents(1000)),
            Err(ExpenseValidationError::SplitsMismatch { .. })
        ));
    }

    #[test]
    fn test_custom_split_negative_is_amount_error() {
        let ids = members(2);
        let request = SplitRequest::Custom(vec![
            (ids[0], Money::from_cents(1100)),
            (ids[1], Money::from_cents(-100)),
        ]);
        let err = request.build(Money::from_cents(1000)).unwrap_err();
        assert!(err.is_amount_error());
        assert!(matches!(
            RoomiesError::from(err),
            RoomiesError::InvalidExpenseAmount(_)
        ));
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let id = MemberId::new();
        let request = SplitRequest::Equal(vec![id, id]);
        assert_eq!(
            request.build(Money::from_cents(1000)),
            Err(ExpenseValidationError::DuplicateMember(id))
        );
    }

    #[test]
    fn test_non_positive_amount() {
        let ids = members(1);
        let err = SplitRequest::Equal(ids).build(Money::zero()).unwrap_err();
        assert_eq!(err, ExpenseValidationError::NonPositiveAmount(Money::zero()));
    }

    #[test]
    fn test_validate_catches_hand_edited_splits() {
        let ids = members(2);
        let mut expense = Expense::new(
            HouseholdId::new(),
            "Internet",
            Money::from_cents(6000),
            ids[0],
            date(),
        );
        expense.splits = vec![
            Split::new(ids[0], Money::from_cents(3000)),
            Split::new(ids[1], Money::from_cents(2999)),
        ];
        assert!(matches!(
            expense.validate(),
            Err(ExpenseValidationError::SplitsMismatch { .. })
        ));

        expense.splits.clear();
        assert_eq!(expense.validate(), Err(ExpenseValidationError::NoSplits));
    }

    #[test]
    fn test_involves() {
        let ids = members(3);
        let mut expense = Expense::new(
            HouseholdId::new(),
            "Pizza",
            Money::from_cents(3000),
            ids[0],
            date(),
        );
        expense
            .apply_splits(&SplitRequest::Equal(vec![ids[1]]))
            .unwrap();

        assert!(expense.involves(ids[0]));
        assert!(expense.involves(ids[1]));
        assert!(!expense.involves(ids[2]));
        assert!(expense.split_for(ids[0]).is_none());
    }

    #[test]
    fn test_current_split_request_resplits_new_amount() {
        let ids = members(2);
        let mut expense = Expense::new(
            HouseholdId::new(),
            "Utilities",
            Money::from_cents(10000),
            ids[0],
            date(),
        );
        expense
            .apply_splits(&SplitRequest::Percentage(vec![(ids[0], 7500), (ids[1], 2500)]))
            .unwrap();

        let request = expense.current_split_request();
        let splits = request.build(Money::from_cents(2000)).unwrap();
        assert_eq!(splits[0].amount.cents(), 1500);
        assert_eq!(splits[1].amount.cents(), 500);

        expense
            .apply_splits(&SplitRequest::Custom(vec![
                (ids[0], Money::from_cents(9000)),
                (ids[1], Money::from_cents(1000)),
            ]))
            .unwrap();
        assert!(expense
            .current_split_request()
            .build(Money::from_cents(2000))
            .is_err());
    }

    #[test]
    fn test_split_type_parse() {
        assert_eq!(SplitType::parse("EQUAL"), Some(SplitType::Equal));
        assert_eq!(SplitType::parse("percent"), Some(SplitType::Percentage));
        assert_eq!(SplitType::parse("exact"), Some(SplitType::Custom));
        assert_eq!(SplitType::parse("weird"), None);
    }

    #[test]
    fn test_display() {
        let expense = Expense::new(
            HouseholdId::new(),
            "Rent",
            Money::from_cents(150000),
            MemberId::new(),
            date(),
        );
        assert_eq!(format!("{}", expense), "2025-03-01 Rent $1500.00");
    }
}

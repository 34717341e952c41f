//! Core data models for Roomies
//!
//! This module contains the data structures of the shared-expense domain:
//! households, members, expenses with their splits, settlement records and
//! the derived balance/transfer values.

pub mod balance;
pub mod expense;
pub mod household;
pub mod ids;
pub mod member;
pub mod money;
pub mod settlement;

pub use balance::{Balance, Transfer};
pub use expense::{
    Expense, ExpenseValidationError, Split, SplitRequest, SplitType, MAX_EXPENSE_AMOUNT,
};
pub use household::Household;
pub use ids::{ExpenseId, HouseholdId, MemberId, SettlementId};
pub use member::Member;
pub use money::Money;
pub use settlement::{Settlement, SettlementStatus};

//! Service layer for Roomies
//!
//! Business logic on top of the storage layer: validation, audit logging and
//! the cross-entity bookkeeping between expenses and settlement records.

pub mod expense;
pub mod household;
pub mod ledger;
pub mod member;
pub mod settlement;

pub use expense::{ExpenseService, ExpenseUpdate, NewExpense};
pub use household::HouseholdService;
pub use ledger::{HouseholdSummary, LedgerService, LedgerSnapshot, MemberTotals, Obligation};
pub use member::MemberService;
pub use settlement::{MarkOutcome, SettlementService};

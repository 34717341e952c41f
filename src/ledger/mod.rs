//! Expense-settlement engine
//!
//! Pure functions over a household snapshot: `compute_balances` derives each
//! member's net position and `compute_settlement_plan` turns those positions
//! into a short list of suggested transfers. Nothing here touches storage.

pub mod balances;
pub mod plan;

pub use balances::compute_balances;
pub use plan::{apply_transfers, compute_settlement_plan, SETTLEMENT_EPSILON};

//! Roomies - shared expense tracking for households
//!
//! Members of a household record what they paid for and how each expense is
//! split. Every non-payer split becomes a settlement record that can be marked
//! paid. Balances are derived from expenses and completed records on every
//! read, and the settlement optimizer turns them into a short list of
//! suggested transfers.
//!
//! # Architecture
//!
//! - `models`: households, members, expenses, settlement records, money
//! - `ledger`: the pure balance calculator and settlement optimizer
//! - `storage`: JSON file storage layer
//! - `services`: business logic on top of storage
//! - `audit`: append-only audit log
//! - `config`: paths and user settings
//! - `display`, `export`, `cli`: terminal output, exports and command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use roomies::ledger::{compute_balances, compute_settlement_plan};
//!
//! let balances = compute_balances(&roster, &expenses, &settlements)?;
//! let plan = compute_settlement_plan(&balances)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod ledger;
pub mod models;
pub mod services;
pub mod storage;

pub use error::RoomiesError;

//! Custom error types for Roomies
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::models::Money;

/// The main error type for Roomies operations
#[derive(Error, Debug)]
pub enum RoomiesError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// An expense or split amount is not a usable money value
    #[error("Invalid expense amount: {0}")]
    InvalidExpenseAmount(String),

    /// Balances handed to the settlement optimizer do not net to zero
    #[error("Unbalanced ledger: {unsettled} member(s) left unsettled, residual {residual}")]
    UnbalancedLedger { unsettled: usize, residual: Money },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl RoomiesError {
    /// Create a "not found" error for households
    pub fn household_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Household",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for members
    pub fn member_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Member",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for settlement records
    pub fn settlement_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Settlement",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error came out of the balance/settlement engine
    ///
    /// These are shown to users as a generic failure; the detail goes to the log.
    pub fn is_ledger_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidExpenseAmount(_) | Self::UnbalancedLedger { .. }
        )
    }
}

impl From<std::io::Error> for RoomiesError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RoomiesError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Roomies operations
pub type RoomiesResult<T> = Result<T, RoomiesError>;

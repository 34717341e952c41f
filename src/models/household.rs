//! Household model
//!
//! A household is the unit everything else hangs off: its members share
//! expenses and settle up with each other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::HouseholdId;

/// A shared household
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Household {
    pub id: HouseholdId,

    /// Household name, unique across the data directory
    pub name: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Household {
    /// Create a new household
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: HouseholdId::new(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), HouseholdValidationError> {
        if self.name.trim().is_empty() {
            return Err(HouseholdValidationError::EmptyName);
        }
        if self.name.len() > 100 {
            return Err(HouseholdValidationError::NameTooLong(self.name.len()));
        }
        Ok(())
    }
}

impl fmt::Display for Household {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HouseholdValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for HouseholdValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Household name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Household name too long ({} chars, max 100)", len)
            }
        }
    }
}

impl std::error::Error for HouseholdValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_household() {
        let household = Household::new("Maple Street");
        assert_eq!(household.name, "Maple Street");
        assert_eq!(household.created_at, household.updated_at);
        assert!(household.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut household = Household::new("  ");
        assert_eq!(
            household.validate(),
            Err(HouseholdValidationError::EmptyName)
        );

        household.rename("x".repeat(101));
        assert_eq!(
            household.validate(),
            Err(HouseholdValidationError::NameTooLong(101))
        );
    }
}

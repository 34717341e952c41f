//! Member model
//!
//! A member is one roommate's identity inside a household. Removing someone
//! archives the record instead of deleting it, so expenses they paid for or
//! shared keep pointing at a real member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{HouseholdId, MemberId};

/// A household member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,

    /// The household this member belongs to
    pub household_id: HouseholdId,

    /// Name shown in balances and settle-up plans
    pub display_name: String,

    /// Archived members are no longer part of the active roster
    #[serde(default)]
    pub archived: bool,

    /// When the member joined the household
    pub joined_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Create a new active member
    pub fn new(household_id: HouseholdId, display_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: MemberId::new(),
            household_id,
            display_name: display_name.into(),
            archived: false,
            joined_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, display_name: impl Into<String>) {
        self.display_name = display_name.into();
        self.updated_at = Utc::now();
    }

    /// Take this member off the active roster
    pub fn archive(&mut self) {
        self.archived = true;
        self.updated_at = Utc::now();
    }

    pub fn is_active(&self) -> bool {
        !self.archived
    }

    pub fn validate(&self) -> Result<(), MemberValidationError> {
        if self.display_name.trim().is_empty() {
            return Err(MemberValidationError::EmptyName);
        }
        if self.display_name.len() > 60 {
            return Err(MemberValidationError::NameTooLong(self.display_name.len()));
        }
        Ok(())
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.archived {
            write!(f, "{} (former)", self.display_name)
        } else {
            write!(f, "{}", self.display_name)
        }
    }
}

/// Validation errors for members
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for MemberValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Member name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Member name too long ({} chars, max 60)", len)
            }
        }
    }
}

impl std::error::Error for MemberValidationError {}

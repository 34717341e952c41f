//! Display formatting for terminal output
//!
//! Renders households, members, expenses and ledger results as tables.

pub mod expense;
pub mod ledger;
pub mod member;

use std::collections::HashMap;

use crate::models::{Member, MemberId};

pub use expense::{format_expense_details, format_expense_list};
pub use ledger::{format_balances, format_plan, format_settlement_list, format_summary};
pub use member::{format_household_list, format_member_list};

/// Lookup from member id to display name
///
/// Built from every member of a household, archived ones included, so old
/// expenses still show who paid.
#[derive(Debug, Default, Clone)]
pub struct MemberNames(HashMap<MemberId, String>);

impl MemberNames {
    pub fn from_members(members: &[Member]) -> Self {
        Self(
            members
                .iter()
                .map(|m| (m.id, m.display_name.clone()))
                .collect(),
        )
    }

    /// The member's name, or the short id if the member is unknown
    pub fn name(&self, id: MemberId) -> String {
        self.0.get(&id).cloned().unwrap_or_else(|| id.to_string())
    }
}

/// Truncate a string to at most `max_chars` characters
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HouseholdId;

    #[test]
    fn test_member_names_fallback() {
        let alice = Member::new(HouseholdId::new(), "Alice");
        let names = MemberNames::from_members(std::slice::from_ref(&alice));

        assert_eq!(names.name(alice.id), "Alice");
        let stranger = MemberId::new();
        assert_eq!(names.name(stranger), stranger.to_string());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Groceries", 20), "Groceries");
        assert_eq!(truncate("Electricity and gas", 10), "Electri...");
        assert_eq!(truncate("Café crème brûlée", 8), "Café ...");
    }
}

//! Household and member display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Household, HouseholdId, Member};

#[derive(Tabled)]
struct HouseholdRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Created")]
    created: String,
}

/// Format households, marking the active one with `*`
pub fn format_household_list(households: &[Household], active: Option<HouseholdId>) -> String {
    if households.is_empty() {
        return "No households found.".to_string();
    }

    let rows = households.iter().map(|h| HouseholdRow {
        marker: if Some(h.id) == active { "*" } else { "" },
        name: h.name.clone(),
        id: h.id.to_string(),
        created: h.created_at.format("%Y-%m-%d").to_string(),
    });

    Table::new(rows).with(Style::psql()).to_string()
}

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Joined")]
    joined: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

/// Format a household roster
pub fn format_member_list(members: &[Member]) -> String {
    if members.is_empty() {
        return "No members found.".to_string();
    }

    let rows = members.iter().map(|m| MemberRow {
        name: m.display_name.clone(),
        id: m.id.to_string(),
        joined: m.joined_at.format("%Y-%m-%d").to_string(),
        status: if m.archived { "Archived" } else { "" },
    });

    Table::new(rows).with(Style::psql()).to_string()
}

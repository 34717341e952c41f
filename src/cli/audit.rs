//! Audit log command

use crate::error::RoomiesResult;
use crate::storage::Storage;

/// Print the most recent audit entries, oldest first
///
/// With `ledger_only`, only changes that can move balances are shown.
pub fn handle_audit_command(storage: &Storage, limit: usize, ledger_only: bool) -> RoomiesResult<()> {
    let entries = storage
        .audit()
        .read_recent_where(limit, |entry| !ledger_only || entry.entity_type.affects_balances())?;

    if entries.is_empty() {
        println!("The audit log is empty.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}

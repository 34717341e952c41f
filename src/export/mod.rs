//! Export module for Roomies
//!
//! - JSON: full household dump for backups and other tools
//! - CSV: one row per expense split, for spreadsheets

pub mod csv;
pub mod json;

pub use self::csv::export_expenses_csv;
pub use json::{export_household_json, ExportMetadata, HouseholdExport, EXPORT_SCHEMA_VERSION};

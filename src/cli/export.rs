//! CLI commands for data export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::error::{RoomiesError, RoomiesResult};
use crate::export::{export_expenses_csv, export_household_json};
use crate::models::Household;
use crate::storage::Storage;

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export the household's full data to JSON
    Json {
        /// Output file path
        output: PathBuf,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Export expense splits to CSV
    Csv {
        /// Output file path
        output: PathBuf,
    },
}

fn create_output(output: &Path) -> RoomiesResult<BufWriter<File>> {
    let file = File::create(output).map_err(|e| {
        RoomiesError::Export(format!("Failed to create file {}: {}", output.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

/// Handle export commands
pub fn handle_export_command(
    storage: &Storage,
    household: &Household,
    cmd: ExportCommands,
) -> RoomiesResult<()> {
    match cmd {
        ExportCommands::Json { output, pretty } => {
            let mut writer = create_output(&output)?;
            let export = export_household_json(storage, household.id, &mut writer, pretty)?;
            writer
                .flush()
                .map_err(|e| RoomiesError::Export(e.to_string()))?;
            println!(
                "Exported {} ({} members, {} expenses, {} settlement records) to {}",
                household.name,
                export.metadata.member_count,
                export.metadata.expense_count,
                export.metadata.settlement_count,
                output.display()
            );
        }
        ExportCommands::Csv { output } => {
            let writer = create_output(&output)?;
            let rows = export_expenses_csv(storage, household.id, writer)?;
            println!("Exported {} split row(s) to {}", rows, output.display());
        }
    }

    Ok(())
}

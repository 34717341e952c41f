//! Append-only JSONL audit log
//!
//! One JSON object per line. Writers append a whole batch and flush once, so
//! an expense and the settlement records created with it land together.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use crate::error::{RoomiesError, RoomiesResult};

use super::entry::AuditEntry;

pub struct AuditLogger {
    log_path: PathBuf,
}

fn io_error(action: &str, err: std::io::Error) -> RoomiesError {
    RoomiesError::Io(format!("Failed to {} audit log: {}", action, err))
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    pub fn log(&self, entry: &AuditEntry) -> RoomiesResult<()> {
        self.log_batch(std::slice::from_ref(entry))
    }

    /// Append `entries` in order with a single flush
    pub fn log_batch(&self, entries: &[AuditEntry]) -> RoomiesResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let lines = entries
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| io_error("open", e))?;
        let mut writer = BufWriter::new(file);
        for line in &lines {
            writeln!(writer, "{}", line).map_err(|e| io_error("write", e))?;
        }
        writer.flush().map_err(|e| io_error("flush", e))
    }

    /// Every entry, oldest first; a missing log reads as empty
    pub fn read_all(&self) -> RoomiesResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&self.log_path).map_err(|e| io_error("open", e))?;

        let mut entries = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| io_error("read", e))?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line).map_err(|e| {
                RoomiesError::Json(format!("Corrupt audit entry on line {}: {}", idx + 1, e))
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// The last `count` entries accepted by `keep`, oldest first
    pub fn read_recent_where(
        &self,
        count: usize,
        keep: impl Fn(&AuditEntry) -> bool,
    ) -> RoomiesResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        entries.retain(|entry| keep(entry));
        Ok(entries.split_off(entries.len().saturating_sub(count)))
    }
}

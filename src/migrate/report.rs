//! Run report.
//!
//! Collects [`TableOutcome`]s in processing order and renders the final
//! summary: an ASCII table (like the MySQL CLI), a total line, skipped tables
//! and, for dry runs, a notice that nothing was written.

use crate::error::{MigrateError, MigrateResult};
use crate::migrate::batch::TableOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

/// Notice printed at the end of every dry run.
pub const DRY_RUN_NOTICE: &str = "Dry run: no data was written to the destination";

/// A table that was not migrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTable {
    pub table: String,
    pub reason: String,
}

/// Summary of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    pub run_id: String,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Outcomes in processing order.
    pub tables: Vec<TableOutcome>,
    pub skipped: Vec<SkippedTable>,
    /// Error that stopped the run early; `tables` then holds what finished before it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MigrationReport {
    pub fn new(run_id: impl Into<String>, dry_run: bool) -> Self {
        Self {
            run_id: run_id.into(),
            dry_run,
            started_at: Utc::now(),
            completed_at: None,
            tables: Vec::new(),
            skipped: Vec::new(),
            error: None,
        }
    }

    /// Append a finished table.
    pub fn record(&mut self, outcome: TableOutcome) {
        self.tables.push(outcome);
    }

    /// Note a table that was not migrated.
    pub fn skip(&mut self, table: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedTable {
            table: table.into(),
            reason: reason.into(),
        });
    }

    /// Mark the run as finished.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Mark the run as stopped by `err`.
    pub fn fail(&mut self, err: &MigrateError) {
        self.error = Some(err.to_string());
        self.complete();
    }

    /// Count recorded for a table, if it was processed.
    pub fn count(&self, table: &str) -> Option<u64> {
        self.tables
            .iter()
            .find(|o| o.table == table)
            .map(|o| o.migrated)
    }

    /// `(table, count)` pairs in processing order.
    pub fn counts(&self) -> Vec<(&str, u64)> {
        self.tables
            .iter()
            .map(|o| (o.table.as_str(), o.migrated))
            .collect()
    }

    /// Rows migrated (or that would be migrated) across all tables.
    pub fn total(&self) -> u64 {
        self.tables.iter().map(|o| o.migrated).sum()
    }

    pub fn total_duplicates(&self) -> u64 {
        self.tables.iter().map(|o| o.duplicates).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.tables.iter().map(|o| o.failures).sum()
    }

    /// Render the summary block.
    pub fn summary(&self) -> String {
        let mut output = String::new();

        if self.tables.is_empty() {
            output.push_str("No tables migrated\n");
        } else {
            output.push_str(&self.format_table());
        }

        let table_text = if self.tables.len() == 1 { "table" } else { "tables" };
        output.push_str(&format!(
            "Total: {} rows across {} {}",
            self.total(),
            self.tables.len(),
            table_text
        ));
        if !self.dry_run {
            output.push_str(&format!(
                " ({} duplicates, {} failed)",
                self.total_duplicates(),
                self.total_failures()
            ));
        }
        output.push('\n');

        for skipped in &self.skipped {
            output.push_str(&format!("Skipped {}: {}\n", skipped.table, skipped.reason));
        }

        if let Some(error) = &self.error {
            output.push_str(&format!("Stopped early: {}\n", error));
        }

        if self.dry_run {
            output.push_str(DRY_RUN_NOTICE);
            output.push('\n');
        }

        output
    }

    fn format_table(&self) -> String {
        let headers: &[&str] = if self.dry_run {
            &["Table", "Rows"]
        } else {
            &["Table", "Rows", "Duplicates", "Failed"]
        };

        let rows: Vec<Vec<String>> = self
            .tables
            .iter()
            .map(|o| {
                let mut row = vec![o.table.clone(), o.migrated.to_string()];
                if !self.dry_run {
                    row.push(o.duplicates.to_string());
                    row.push(o.failures.to_string());
                }
                row
            })
            .collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        let separator: String = widths
            .iter()
            .map(|w| format!("+{}", "-".repeat(w + 2)))
            .collect::<String>()
            + "+\n";

        let mut output = String::new();
        output.push_str(&separator);
        let header: String = headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("| {} ", pad_right(h, *w)))
            .collect::<String>()
            + "|\n";
        output.push_str(&header);
        output.push_str(&separator);

        for row in &rows {
            let line: String = row
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (cell, w))| {
                    // Counts are right-aligned, names left-aligned.
                    if i == 0 {
                        format!("| {} ", pad_right(cell, *w))
                    } else {
                        format!("| {} ", pad_left(cell, *w))
                    }
                })
                .collect::<String>()
                + "|\n";
            output.push_str(&line);
        }

        output.push_str(&separator);
        output
    }

    /// Write the report as pretty JSON.
    pub fn write_json(&self, path: &Path) -> MigrateResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| MigrateError::internal(format!("Failed to serialize report: {}", e)))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn pad_right(text: &str, width: usize) -> String {
    format!("{}{}", text, " ".repeat(width.saturating_sub(text.width())))
}

fn pad_left(text: &str, width: usize) -> String {
    format!("{}{}", " ".repeat(width.saturating_sub(text.width())), text)
}

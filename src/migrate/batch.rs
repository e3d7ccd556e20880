//! Paginated copy of one table.
//!
//! Rows are read in `LIMIT/OFFSET` pages, converted, and inserted one at a
//! time. Row-level failures are counted and skipped; anything else ends the
//! table and is returned to the caller.

use crate::db::{Destination, SqliteSource};
use crate::error::{MigrateError, MigrateResult};
use crate::migrate::convert::convert_row;
use crate::models::TableDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Per-table settings for the batch stage.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Rows per page. Must be greater than zero.
    pub page_size: u64,
    /// Count rows only; no content reads and no writes.
    pub dry_run: bool,
}

/// Result of migrating one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOutcome {
    pub table: String,
    /// Rows in the source table when it was counted.
    pub total_rows: u64,
    /// Rows fetched from the source across all pages.
    pub rows_read: u64,
    /// Rows inserted, or rows that would be inserted in a dry run.
    pub migrated: u64,
    pub duplicates: u64,
    pub failures: u64,
    pub pages: u64,
}

impl TableOutcome {
    fn new(table: &str, total_rows: u64) -> Self {
        Self {
            table: table.to_string(),
            total_rows,
            ..Default::default()
        }
    }
}

/// Share of `processed` over `total`, in percent, clamped to `[0, 100]`.
///
/// An empty table counts as complete.
pub fn percent(processed: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (processed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

/// Render a percentage: `100%` when complete, one decimal otherwise.
///
/// An incomplete share never rounds up to `100.0%`.
pub fn format_percent(pct: f64) -> String {
    if pct >= 100.0 {
        "100%".to_string()
    } else {
        format!("{:.1}%", pct.clamp(0.0, 99.9))
    }
}

/// Progress after a page, with the processed count capped at the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: u64,
    pub total: u64,
}

impl Progress {
    pub fn new(processed: u64, total: u64) -> Self {
        Self {
            processed: processed.min(total),
            total,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({})",
            self.processed,
            self.total,
            format_percent(percent(self.processed, self.total))
        )
    }
}

/// Number of pages needed to read `rows` rows at `page_size` rows per page.
pub fn page_count(rows: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    rows.div_ceil(page_size)
}

/// Copy one table.
///
/// `destination` is only used in live mode and must be present then.
/// `cancel` is checked before every page.
pub async fn migrate_table(
    source: &SqliteSource,
    destination: Option<&mut (dyn Destination + '_)>,
    table: &TableDescriptor,
    options: BatchOptions,
    cancel: &watch::Receiver<bool>,
) -> MigrateResult<TableOutcome> {
    if options.page_size == 0 {
        return Err(MigrateError::config("batch size must be greater than zero"));
    }

    let total = source.count_rows(&table.name).await?;
    let mut outcome = TableOutcome::new(&table.name, total);

    if total == 0 {
        info!(table = %table.name, "Table is empty, nothing to migrate");
        return Ok(outcome);
    }

    if options.dry_run {
        info!(table = %table.name, rows = total, "Dry run: counted rows");
        outcome.migrated = total;
        return Ok(outcome);
    }

    let Some(dest) = destination else {
        return Err(MigrateError::internal(
            "live migration requires a destination",
        ));
    };

    info!(table = %table.name, rows = total, "Migrating table");

    let mut offset = 0u64;
    while offset < total {
        if *cancel.borrow() {
            return Err(MigrateError::Cancelled);
        }

        let page = source.fetch_page(table, options.page_size, offset).await?;
        outcome.pages += 1;
        if page.is_empty() {
            debug!(table = %table.name, offset, "Source returned an empty page");
            break;
        }
        outcome.rows_read += page.len() as u64;

        for row in page {
            let result = match row {
                Ok(values) => dest.insert_row(table, &convert_row(values)).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => outcome.migrated += 1,
                Err(e @ MigrateError::DuplicateKey { .. }) => {
                    outcome.duplicates += 1;
                    error!(table = %table.name, error = %e, "Skipping duplicate row");
                }
                Err(e) if e.is_row_level() => {
                    outcome.failures += 1;
                    error!(table = %table.name, error = %e, "Skipping rejected row");
                }
                Err(e) => return Err(e),
            }
        }

        offset += options.page_size;
        info!(table = %table.name, "{}", Progress::new(offset, total));
    }

    info!(
        table = %table.name,
        migrated = outcome.migrated,
        duplicates = outcome.duplicates,
        failures = outcome.failures,
        pages = outcome.pages,
        "Table complete"
    );
    Ok(outcome)
}

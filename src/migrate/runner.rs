//! Migration orchestrator.
//!
//! Control flow: discover tables, order them, disable destination
//! constraints, copy each table, then restore constraints and commit. The
//! restore step and closing the source happen on every exit path.

use crate::config::Config;
use crate::db::{Destination, SqliteSource};
use crate::error::{MigrateError, MigrateResult};
use crate::migrate::batch::{BatchOptions, migrate_table};
use crate::migrate::order::order_tables;
use crate::migrate::report::MigrationReport;
use crate::migrate::toggler;
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{Instrument, debug, info, info_span, warn};

/// Run-level settings.
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    pub page_size: u64,
    pub dry_run: bool,
    /// Tables to process first, in this order.
    pub preferred_order: Vec<String>,
    /// Tables never processed.
    pub skip: HashSet<String>,
}

impl MigrationOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.batch_size,
            dry_run: config.dry_run,
            preferred_order: config.preferred_order(),
            skip: config.skip_set(),
        }
    }

    fn batch(&self) -> BatchOptions {
        BatchOptions {
            page_size: self.page_size,
            dry_run: self.dry_run,
        }
    }
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            page_size: crate::config::DEFAULT_BATCH_SIZE,
            dry_run: false,
            preferred_order: Vec::new(),
            skip: HashSet::new(),
        }
    }
}

/// A run that stopped early.
///
/// `report` holds the tables committed before the error, so the caller can
/// still print and persist what reached the destination.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct MigrationFailure {
    pub error: MigrateError,
    pub report: Box<MigrationReport>,
}

/// A cancel receiver that never fires.
pub fn never_cancelled() -> watch::Receiver<bool> {
    let (_, rx) = watch::channel(false);
    rx
}

/// Migrate every table of `source` into `destination`.
///
/// `destination` is ignored in a dry run and required otherwise. The source
/// is closed before this returns, whatever the outcome. On failure the
/// partial report travels with the error.
pub async fn run_migration(
    source: SqliteSource,
    destination: Option<&mut (dyn Destination + '_)>,
    options: &MigrationOptions,
    cancel: watch::Receiver<bool>,
) -> Result<MigrationReport, MigrationFailure> {
    let run_id = uuid::Uuid::new_v4().to_string();
    let span = info_span!("migration", run_id = %run_id, dry_run = options.dry_run);

    async move {
        let mut report = MigrationReport::new(run_id.clone(), options.dry_run);
        let destination = if options.dry_run { None } else { destination };

        let result = if !options.dry_run && destination.is_none() {
            Err(MigrateError::config(
                "a destination is required unless running a dry run",
            ))
        } else {
            migrate_all(&source, destination, options, &cancel, &mut report).await
        };

        source.close().await;
        if let Err(error) = result {
            report.fail(&error);
            warn!(
                tables = report.tables.len(),
                rows = report.total(),
                error = %error,
                "Migration stopped early"
            );
            return Err(MigrationFailure {
                error,
                report: Box::new(report),
            });
        }

        report.complete();
        info!(
            tables = report.tables.len(),
            rows = report.total(),
            skipped = report.skipped.len(),
            "Migration finished"
        );
        Ok(report)
    }
    .instrument(span)
    .await
}

async fn migrate_all(
    source: &SqliteSource,
    mut destination: Option<&mut (dyn Destination + '_)>,
    options: &MigrationOptions,
    cancel: &watch::Receiver<bool>,
    report: &mut MigrationReport,
) -> MigrateResult<()> {
    let discovered = source.list_tables().await?;
    let order = order_tables(&discovered, &options.preferred_order, &options.skip);
    info!(
        discovered = discovered.len(),
        selected = order.len(),
        order = ?order,
        "Table order resolved"
    );

    let result = match toggler::disable(destination.as_deref_mut()).await {
        Ok(()) => {
            process_tables(
                source,
                destination.as_deref_mut(),
                &order,
                options,
                cancel,
                report,
            )
            .await
        }
        Err(e) => Err(e),
    };

    toggler::restore_after(destination, result).await
}

async fn process_tables(
    source: &SqliteSource,
    mut destination: Option<&mut (dyn Destination + '_)>,
    order: &[String],
    options: &MigrationOptions,
    cancel: &watch::Receiver<bool>,
    report: &mut MigrationReport,
) -> MigrateResult<()> {
    for name in order {
        if *cancel.borrow() {
            warn!(table = %name, "Cancellation requested, stopping before table");
            return Err(MigrateError::Cancelled);
        }

        let table = source.describe_table(name).await?;
        if !table.is_migratable() {
            warn!(table = %name, "Table has no data columns, skipping");
            report.skip(name.as_str(), "no data columns");
            continue;
        }
        debug!(table = %name, columns = ?table.column_names(), "Described table");

        if let Some(dest) = destination.as_deref_mut() {
            match dest.has_unique_key(name).await {
                Ok(true) => {}
                Ok(false) => warn!(
                    table = %name,
                    "Destination table has no unique index; duplicate rows will be inserted twice"
                ),
                Err(e) => warn!(table = %name, error = %e, "Could not inspect destination indexes"),
            }
        }

        let outcome = migrate_table(
            source,
            destination.as_deref_mut(),
            &table,
            options.batch(),
            cancel,
        )
        .await?;

        if let Some(dest) = destination.as_deref_mut() {
            dest.commit().await?;
        }

        report.record(outcome);
    }

    Ok(())
}

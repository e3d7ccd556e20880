//! Migration pipeline.
//!
//! - `order`: which tables run and in what sequence
//! - `convert`: value mapping between the two engines
//! - `batch`: paginated copy of a single table
//! - `toggler`: destination constraint bracket
//! - `report`: per-table outcomes and the final summary
//! - `runner`: the orchestrator tying the stages together

pub mod batch;
pub mod convert;
pub mod order;
pub mod report;
pub mod runner;
pub mod toggler;

pub use batch::{BatchOptions, TableOutcome, migrate_table};
pub use convert::{convert_row, convert_value};
pub use order::order_tables;
pub use report::{MigrationReport, SkippedTable};
pub use runner::{MigrationFailure, MigrationOptions, never_cancelled, run_migration};

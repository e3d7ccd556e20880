//! SQLite to MySQL Migrator Library
//!
//! This library copies every table of a SQLite database into a pre-created
//! MySQL schema, in a configurable order, in fixed-size pages, with destination
//! constraints suspended for the duration of the run.

pub mod config;
pub mod db;
pub mod error;
pub mod migrate;
pub mod models;

pub use config::Config;
pub use error::{MigrateError, MigrateResult};
pub use migrate::{MigrationFailure, MigrationOptions, MigrationReport, run_migration};

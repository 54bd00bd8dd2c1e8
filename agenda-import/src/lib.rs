//! Bulk spreadsheet importer for agenda events
//!
//! Decodes CSV and workbook files, reconciles their columns against the
//! event schema (title, date, category, description), validates every row
//! and writes the valid ones to a record store in batches.

pub mod config;
pub mod import;
pub mod store;

pub use import::{BatchOptions, ImportOutcome, ImportPhase, ImportRun, Preview};
pub use store::{RecordStore, StoreError, StoredRecord};

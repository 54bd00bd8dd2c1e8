//! Tabular bulk import of agenda events
//!
//! This module turns a loosely-structured spreadsheet into validated event
//! records and writes them to a record store in batches:
//!
//! file -> decoder -> raw rows -> fields/dates/category -> validation
//!      -> preview -> batch importer -> outcome

pub mod batch;
pub mod category;
pub mod dates;
pub mod decoder;
pub mod fields;
pub mod pipeline;
pub mod report;
pub mod template;
pub mod validation;
pub mod value;

pub use batch::{
    BatchOptions, CancelFlag, DEFAULT_BATCH_SIZE, ImportOutcome, ImportProgress, import_records,
};
pub use category::{Category, map_category};
pub use dates::{NormalizedDate, format_date, normalize_date};
pub use decoder::{ContainerKind, DecodeError, decode};
pub use fields::{Field, HeaderMapping, resolve_field, resolve_headers};
pub use pipeline::{ImportPhase, ImportRun, RunError};
pub use report::write_report;
pub use template::write_template;
pub use validation::{CanonicalRecord, Preview, RowResult, validate_row, validate_rows};
pub use value::{CellValue, RawRow};

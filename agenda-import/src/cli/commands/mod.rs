//! Command arguments and handlers

pub mod import;
pub mod preview;
pub mod template;

use std::path::PathBuf;

use clap::Args;

use agenda_import::config::StoreKind;

pub use import::handle_import_command;
pub use preview::handle_preview_command;
pub use template::handle_template_command;

#[derive(Args, Debug)]
pub struct PreviewCommands {
    /// CSV, TSV, xlsx, xls or ods file
    pub file: PathBuf,

    /// Write a per-row CSV report to this path
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Only list rows with problems
    #[arg(long)]
    pub errors_only: bool,
}

#[derive(Args, Debug)]
pub struct ImportCommands {
    /// CSV, TSV, xlsx, xls or ods file
    pub file: PathBuf,

    /// Identity stamped on every imported record
    #[arg(short, long)]
    pub owner: Option<String>,

    /// Records per insert call
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Record store to write to
    #[arg(short, long, value_enum)]
    pub store: Option<StoreKind>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct TemplateCommands {
    /// Output path; .csv or .xlsx
    #[arg(default_value = "agenda-template.xlsx")]
    pub output: PathBuf,
}

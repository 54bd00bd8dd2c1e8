//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{ImportCommands, PreviewCommands, TemplateCommands};

#[derive(Parser)]
#[command(name = "agenda-import")]
#[command(about = "Import agenda events from CSV and spreadsheet files")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ~/.config/agenda-import/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a file and show what would be imported
    Preview(PreviewCommands),
    /// Validate a file and import its valid rows
    Import(ImportCommands),
    /// Write an example import file
    Template(TemplateCommands),
}

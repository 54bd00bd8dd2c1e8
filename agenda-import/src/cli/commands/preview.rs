//! Preview command handler

use anyhow::{Context, Result};
use colored::*;

use agenda_import::import::{HeaderMapping, ImportRun, Preview, format_date, write_report};

use super::PreviewCommands;

/// Handle the preview command
pub async fn handle_preview_command(args: PreviewCommands) -> Result<()> {
    let mut run = ImportRun::new();
    let preview = run
        .decode_file(&args.file)
        .await
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    print_header_mapping(&preview.header_mapping());
    print_rows(preview, args.errors_only);
    print_summary(preview);

    if let Some(report) = &args.report {
        write_report(preview, report)?;
        println!("Report written to {}", report.display().to_string().cyan());
    }

    Ok(())
}

pub fn print_header_mapping(mapping: &HeaderMapping) {
    for (field, header) in &mapping.resolved {
        println!("  {:<12} <- {}", field.to_string().bold(), header.cyan());
    }
    for field in &mapping.missing {
        println!("  {:<12} <- {}", field.to_string().bold(), "(no column)".dimmed());
    }
    if !mapping.unmapped.is_empty() {
        println!(
            "  {} {}",
            "ignored columns:".dimmed(),
            mapping.unmapped.join(", ").dimmed()
        );
    }
    println!();
}

pub fn print_rows(preview: &Preview, errors_only: bool) {
    for (row_number, result) in preview.numbered() {
        if result.is_valid() {
            if errors_only {
                continue;
            }
            let date = result.date.date.map(format_date).unwrap_or_default();
            println!(
                "  {:>5}  {}  {}  {}  {}",
                row_number,
                "ok".green(),
                date,
                result.category.to_string().dimmed(),
                result.title
            );
        } else {
            println!(
                "  {:>5}  {}  {}",
                row_number,
                "error".red(),
                result.errors.join("; ").red()
            );
            if !result.date.ok() && !result.date.raw.is_empty() {
                println!("         {} {}", "date was:".dimmed(), result.date.raw);
            }
        }
    }
}

pub fn print_summary(preview: &Preview) {
    println!();
    println!(
        "{} rows: {} valid, {} invalid",
        preview.total(),
        preview.valid_count().to_string().green().bold(),
        if preview.invalid_count() > 0 {
            preview.invalid_count().to_string().red().bold()
        } else {
            preview.invalid_count().to_string().normal()
        }
    );
}

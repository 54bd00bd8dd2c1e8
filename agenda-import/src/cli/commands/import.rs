//! Import command handler

use anyhow::{Context, Result, bail};
use colored::*;
use dialoguer::Confirm;

use agenda_import::config::Config;
use agenda_import::import::{BatchOptions, CancelFlag, ImportOutcome, ImportProgress, ImportRun};

use super::ImportCommands;
use super::preview::{print_header_mapping, print_rows, print_summary};

/// Handle the import command
pub async fn handle_import_command(args: ImportCommands, mut config: Config) -> Result<()> {
    // Flags override file and environment
    if let Some(owner) = args.owner {
        config.import.owner_id = Some(owner);
    }
    if let Some(batch_size) = args.batch_size {
        config.import.batch_size = batch_size;
    }
    if let Some(kind) = args.store {
        config.store.kind = kind;
    }

    let owner_id = config.import.owner_id.clone().context(
        "No owner set. Use --owner, set import.owner_id in the config file or AGENDA_IMPORT_OWNER",
    )?;

    if config.import.batch_size == 0 {
        bail!("Batch size must be at least 1");
    }

    let mut run = ImportRun::new();
    let preview = run
        .decode_file(&args.file)
        .await
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    print_header_mapping(&preview.header_mapping());
    print_rows(preview, true);
    print_summary(preview);

    let valid = preview.valid_count();
    if valid == 0 {
        println!("{}", "Nothing to import.".yellow());
        return Ok(());
    }

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Import {} records into the {:?} store as '{}'?",
                valid, config.store.kind, owner_id
            ))
            .default(true)
            .interact()
            .context("Failed to read confirmation")?;

        if !confirmed {
            println!("Import aborted.");
            return Ok(());
        }
    }

    let store = config.build_store().await?;
    let options = BatchOptions::new(owner_id).with_batch_size(config.import.batch_size);

    // Ctrl-C stops the run before the next batch
    let cancel = CancelFlag::new();
    let cancel_on_signal = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, stopping after the current batch");
            cancel_on_signal.cancel();
        }
    });

    let outcome = run
        .import(&*store, &options, Some(&cancel), print_progress)
        .await?
        .clone();
    signal_task.abort();

    print_outcome(&outcome);

    if outcome.has_failures() {
        bail!("{} records failed to import", outcome.failed_count);
    }
    Ok(())
}

fn print_progress(progress: ImportProgress) {
    println!(
        "  [{}/{}] {:>5.1}%  {}/{} records",
        progress.batch,
        progress.total_batches,
        progress.percent,
        progress.processed,
        progress.total
    );
}

fn print_outcome(outcome: &ImportOutcome) {
    println!();
    println!(
        "{} imported, {} failed",
        outcome.success_count.to_string().green().bold(),
        if outcome.failed_count > 0 {
            outcome.failed_count.to_string().red().bold()
        } else {
            outcome.failed_count.to_string().normal()
        }
    );

    for error in &outcome.errors {
        println!("  {} {}", "✗".red(), error);
    }

    if outcome.cancelled {
        println!(
            "{}",
            "Import was interrupted; remaining batches were not submitted.".yellow()
        );
    }
}

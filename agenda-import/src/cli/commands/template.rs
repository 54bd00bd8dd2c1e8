//! Template command handler

use anyhow::Result;
use colored::*;

use agenda_import::import::write_template;

use super::TemplateCommands;

/// Handle the template command
pub fn handle_template_command(args: TemplateCommands) -> Result<()> {
    write_template(&args.output)?;
    println!("Template written to {}", args.output.display().to_string().cyan());
    Ok(())
}

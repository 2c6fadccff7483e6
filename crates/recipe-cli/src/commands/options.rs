//! Options command: list declared options

use std::path::Path;

use colored::Colorize;
use recipe_core::Manifest;

use crate::error::Result;

/// Run the options command
pub fn run_options(manifest_path: &Path, json: bool) -> Result<()> {
    let mut manifest = Manifest::load(manifest_path)?;
    manifest.validate()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&manifest.options)?);
        return Ok(());
    }

    println!(
        "{} {}",
        manifest.package.name.bold(),
        manifest.package.version.dimmed()
    );
    println!();

    if manifest.options.is_empty() {
        println!("{}", "No options declared.".dimmed());
        return Ok(());
    }

    for (name, def) in &manifest.options {
        println!(
            "  {:<26} {:<22} default {}",
            name.green(),
            def.domain.to_string(),
            def.default.to_string().cyan()
        );
        if let Some(variable) = &def.variable {
            println!("  {:<26} -> {}", "", variable.dimmed());
        }
        if let Some(description) = &def.description {
            println!("  {:<26} {}", "", description);
        }
    }

    println!();
    println!(
        "{} {} options. Override with {}.",
        "Total:".dimmed(),
        manifest.options.len(),
        "recipe resolve --set <name>=<value>".cyan()
    );

    Ok(())
}

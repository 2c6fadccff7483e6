//! Check command: validate a recipe without resolving it

use std::path::Path;

use colored::Colorize;
use recipe_core::{Manifest, Resolver};

use crate::error::Result;

/// Run the check command
///
/// Fails with the same error (and exit code) a resolution would for an
/// invalid manifest or a cyclic rule table.
pub fn run_check(manifest_path: &Path) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    let resolver = Resolver::new(manifest)?;
    resolver.check()?;

    let manifest = resolver.manifest();
    println!(
        "{} {} {}: {} options, {} rules, {} requirements",
        "✓".green().bold(),
        manifest.package.name.bold(),
        manifest.package.version,
        manifest.options.len(),
        resolver.rules().len(),
        manifest.requires.len() + manifest.build_requires.len(),
    );

    Ok(())
}

//! Resolve command: recipe + profiles + flags -> build plan

use std::fs;

use colored::Colorize;
use recipe_core::{Manifest, ProfileResolver, Resolver, parse_overrides};

use crate::cli::ResolveArgs;
use crate::error::{CliError, Result};

/// Run the resolve command, printing the plan or writing it to `--output`
pub fn run_resolve(args: &ResolveArgs) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;

    let profiles = match &args.config_dir {
        Some(dir) => ProfileResolver::with_global_config_dir(dir.clone()),
        None => ProfileResolver::new(),
    };
    let profile = profiles.resolve(&args.profiles)?;

    let mut settings = profile.settings.clone();
    settings.merge(&args.settings());
    let env = settings.to_environment()?;

    // Profile options first so that --set wins
    let mut overrides = profile.overrides()?;
    overrides.extend(parse_overrides(&args.overrides)?);

    let jobs = args.jobs.or_else(host_parallelism);
    tracing::debug!(
        manifest = %args.manifest.display(),
        os = %env.os,
        compiler = %env.compiler,
        overrides = overrides.len(),
        ?jobs,
        "Resolving"
    );

    let plan = Resolver::new(manifest)?
        .with_parallel_level(jobs)
        .resolve(&env, &overrides)?;
    let rendered = plan.render(args.format)?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                if !parent.is_dir() {
                    return Err(CliError::user(format!(
                        "output directory {} does not exist",
                        parent.display()
                    )));
                }
            }
            fs::write(path, rendered)?;
            eprintln!(
                "{} Wrote {} plan for {} to {}",
                "✓".green(),
                args.format,
                plan.package.cyan(),
                path.display()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn host_parallelism() -> Option<u32> {
    std::thread::available_parallelism()
        .ok()
        .and_then(|n| u32::try_from(n.get()).ok())
}

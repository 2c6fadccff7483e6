//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use recipe_core::PlanFormat;
use recipe_core::profile::ProfileSettings;
use recipe_core::value::OptionValue;

/// Recipe resolver - turn a build recipe into a concrete build plan
#[derive(Parser, Debug)]
#[command(name = "recipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve a recipe into a build plan
    ///
    /// Settings come from the global default profile, then each --profile
    /// in order, then the settings flags. Option overrides follow the same
    /// layering, with --set applied last.
    ///
    /// Examples:
    ///   recipe resolve --os Linux --compiler gcc --build-type Release
    ///   recipe resolve -p profiles/linux.toml --set shared=true
    ///   recipe resolve -p linux.toml --format cmake -o args.txt
    Resolve(ResolveArgs),

    /// List the options a recipe declares
    Options {
        /// Recipe file
        #[arg(short, long, default_value = "recipe.toml")]
        manifest: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Validate a recipe, including rule ordering
    Check {
        /// Recipe file
        #[arg(short, long, default_value = "recipe.toml")]
        manifest: PathBuf,
    },

    /// Generate shell completions
    ///
    /// Outputs completion script for your shell.
    ///
    /// Examples:
    ///   recipe completions bash > ~/.local/share/bash-completion/completions/recipe
    ///   recipe completions zsh > ~/.zfunc/_recipe
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of `recipe resolve`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ResolveArgs {
    /// Recipe file
    #[arg(short, long, default_value = "recipe.toml")]
    pub manifest: PathBuf,

    /// Profile files, applied in order after the global default profile
    #[arg(short, long = "profile", value_name = "FILE")]
    pub profiles: Vec<PathBuf>,

    /// Target operating system (Linux, Windows, Macos, ...)
    #[arg(long)]
    pub os: Option<String>,

    /// Compiler id (gcc, clang, msvc, ...)
    #[arg(long)]
    pub compiler: Option<String>,

    /// Compiler version
    #[arg(long)]
    pub compiler_version: Option<String>,

    /// C++ standard library (libstdc++, libstdc++11, libc++, ...)
    #[arg(long)]
    pub libcxx: Option<String>,

    /// C++ standard (14, 17, gnu17, ...)
    #[arg(long)]
    pub cppstd: Option<String>,

    /// Build type (Debug, Release, RelWithDebInfo, MinSizeRel)
    #[arg(long)]
    pub build_type: Option<String>,

    /// Target architecture, defaults to the host
    #[arg(long)]
    pub arch: Option<String>,

    /// Option override, repeatable (`shared=true`, `opencv:with_cuda=true`)
    #[arg(short = 's', long = "set", value_name = "NAME=VALUE")]
    pub overrides: Vec<String>,

    /// Build parallelism passed through to the plan, defaults to the host CPU count
    #[arg(short, long)]
    pub jobs: Option<u32>,

    /// Output format (json, toml, yaml, cmake)
    #[arg(short, long, default_value = "json")]
    pub format: PlanFormat,

    /// Write the plan to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory holding `profiles/default.toml`
    #[arg(long, env = "RECIPE_CONFIG_DIR", hide = true)]
    pub config_dir: Option<PathBuf>,
}

impl ResolveArgs {
    /// Settings given as flags, layered over every profile
    pub fn settings(&self) -> ProfileSettings {
        ProfileSettings {
            os: self.os.clone(),
            arch: self.arch.clone(),
            build_type: self.build_type.clone(),
            compiler: self.compiler.clone(),
            compiler_version: self.compiler_version.clone().map(OptionValue::Str),
            libcxx: self.libcxx.clone(),
            cppstd: self.cppstd.clone().map(OptionValue::Str),
        }
    }
}

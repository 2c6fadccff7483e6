//! Option resolution and build plan generation for native build recipes
//!
//! A recipe declares options (name, domain, default), requirements, and the
//! rules that tie options together. This crate turns a recipe, a target
//! environment and a list of explicit overrides into a [`BuildPlan`]: the
//! flat set of resolved options, the toolchain variables derived from them,
//! and the ordered requirement list handed to the native build system.
//!
//! - **Manifest**: TOML recipe parsing and validation ([`Manifest`])
//! - **Profiles**: layered settings and option defaults ([`ProfileResolver`])
//! - **Rules**: declarative implication rules ([`RuleTable`])
//! - **Adjustments**: forced compiler-setting rewrites ([`Adjustment`])
//! - **Resolver**: the single resolution pass ([`Resolver`])
//!
//! # Example
//!
//! ```
//! use recipe_core::{BuildType, Environment, Manifest, Os, Override, Resolver};
//!
//! let manifest = Manifest::parse(r#"
//! [package]
//! name = "demo"
//! version = "1.0.0"
//!
//! [options.shared]
//! domain = "bool"
//! default = false
//! variable = "BUILD_SHARED_LIBS"
//!
//! [options.fPIC]
//! domain = "bool"
//! default = true
//!
//! [[rules]]
//! name = "shared-drops-fpic"
//! when = { options = { shared = true } }
//! remove = ["fPIC"]
//! "#).unwrap();
//!
//! let resolver = Resolver::new(manifest).unwrap();
//! let env = Environment::new(Os::Linux, "gcc", BuildType::Release);
//! let plan = resolver.resolve(&env, &[Override::new("shared", "true")]).unwrap();
//!
//! assert!(plan.option("fPIC").is_none());
//! assert_eq!(plan.variables["BUILD_SHARED_LIBS"], "ON");
//! ```

pub mod adjust;
pub mod environment;
pub mod error;
pub mod manifest;
pub mod options;
pub mod plan;
pub mod profile;
pub mod resolver;
pub mod rules;
pub mod value;
pub mod version;

pub use adjust::Adjustment;
pub use environment::{BuildType, CppStd, Environment, Os, SettingKey};
pub use error::{Error, ErrorKind, Result};
pub use manifest::Manifest;
pub use options::{OptionDef, OptionSet};
pub use plan::{BuildPlan, Dependency, PackageInfo, PlanFormat};
pub use profile::{Profile, ProfileResolver};
pub use resolver::{Override, OverrideTarget, Resolver, Stage, parse_overrides, resolve};
pub use rules::{Condition, Rule, RuleTable};
pub use value::{Domain, OptionValue};
pub use version::{Reference, VersionSpec};

//! Build plan resolution
//!
//! [`Resolver`] is an immutable configuration object built from a validated
//! [`Manifest`]. Each call to [`Resolver::resolve`] starts from the manifest
//! defaults and walks the stages
//!
//! ```text
//! Unresolved -> Validating -> RuleApplication -> Finalized
//!                    \               \
//!                     `------------- Failed
//! ```
//!
//! 1. **Validating**: overrides are checked against the declared options
//!    and their domains, then applied in order (last wins). Environment
//!    adjustments follow, so they cannot be undone by an override.
//! 2. **RuleApplication**: the rule table runs once in dependency order.
//! 3. **Finalized**: toolchain variables, requirements and package info are
//!    assembled into a [`BuildPlan`].
//!
//! No stage touches the filesystem.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::adjust::apply_adjustments;
use crate::environment::{Environment, Os};
use crate::manifest::{Manifest, RequirementDecl};
use crate::options::OptionSet;
use crate::plan::{BuildPlan, Dependency, PackageInfo};
use crate::rules::RuleTable;
use crate::value::{OptionValue, parse_bool};
use crate::{Error, Result};

/// What an override assigns to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OverrideTarget {
    /// An option of the recipe itself
    Option(String),
    /// An option of a requirement (`zlib:shared=true`)
    Requirement { requirement: String, option: String },
}

impl fmt::Display for OverrideTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideTarget::Option(name) => f.write_str(name),
            OverrideTarget::Requirement {
                requirement,
                option,
            } => write!(f, "{}:{}", requirement, option),
        }
    }
}

/// An explicit `name=value` assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub target: OverrideTarget,
    pub value: String,
}

impl Override {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            target: OverrideTarget::Option(name.into()),
            value: value.into(),
        }
    }

    pub fn requirement(
        requirement: impl Into<String>,
        option: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            target: OverrideTarget::Requirement {
                requirement: requirement.into(),
                option: option.into(),
            },
            value: value.into(),
        }
    }
}

impl FromStr for Override {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || Error::MalformedOverride { raw: s.to_string() };
        let (name, value) = s.split_once('=').ok_or_else(malformed)?;
        let name = name.trim();
        let value = value.trim();
        if name.is_empty() {
            return Err(malformed());
        }
        match name.split_once(':') {
            Some((requirement, option)) => {
                let (requirement, option) = (requirement.trim(), option.trim());
                if requirement.is_empty() || option.is_empty() {
                    return Err(malformed());
                }
                Ok(Self::requirement(requirement, option, value))
            }
            None => Ok(Self::new(name, value)),
        }
    }
}

impl fmt::Display for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.target, self.value)
    }
}

/// Parse a list of raw `name=value` strings
pub fn parse_overrides<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Override>> {
    raw.iter().map(|s| s.as_ref().parse()).collect()
}

/// Resolution stages; a resolution only ever moves forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Unresolved,
    Validating,
    RuleApplication,
    Finalized,
    Failed,
}

/// Resolves a manifest against an environment and overrides
#[derive(Debug, Clone)]
pub struct Resolver {
    manifest: Manifest,
    rules: RuleTable,
    parallel_level: Option<u32>,
}

impl Resolver {
    /// Validate `manifest` and build a resolver for it
    pub fn new(mut manifest: Manifest) -> Result<Self> {
        manifest.validate()?;
        let rules = manifest.rule_table();
        Ok(Self {
            manifest,
            rules,
            parallel_level: None,
        })
    }

    /// Parallelism passed through to every plan this resolver produces
    pub fn with_parallel_level(mut self, level: Option<u32>) -> Self {
        self.parallel_level = level;
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Check that the rule table can be ordered
    pub fn check(&self) -> Result<()> {
        self.rules.evaluation_order().map(|_| ())
    }

    /// Produce a build plan
    ///
    /// # Errors
    ///
    /// - `UnknownOption` if an override names an undeclared option or
    ///   requirement
    /// - `InvalidOptionValue` if an override value lies outside its domain
    /// - `RuleCycleDetected` if the rule table cannot be ordered
    ///
    /// On error no plan is produced.
    pub fn resolve(&self, env: &Environment, overrides: &[Override]) -> Result<BuildPlan> {
        let mut resolution = Resolution::new(self, env);
        let result = resolution.run(overrides);
        if let Err(ref e) = result {
            resolution.fail(e);
        }
        result
    }
}

/// Resolve `manifest` in one call
pub fn resolve(manifest: Manifest, env: &Environment, overrides: &[Override]) -> Result<BuildPlan> {
    Resolver::new(manifest)?.resolve(env, overrides)
}

/// Working state of a single resolution
struct Resolution<'a> {
    resolver: &'a Resolver,
    stage: Stage,
    env: Environment,
    options: OptionSet,
    requirement_options: BTreeMap<String, BTreeMap<String, OptionValue>>,
    explicit: BTreeMap<String, OptionValue>,
}

impl<'a> Resolution<'a> {
    fn new(resolver: &'a Resolver, env: &Environment) -> Self {
        Self {
            resolver,
            stage: Stage::Unresolved,
            env: env.clone(),
            options: OptionSet::from_defaults(&resolver.manifest.options),
            requirement_options: BTreeMap::new(),
            explicit: BTreeMap::new(),
        }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.stage, "resolution cannot re-enter {:?}", next);
        tracing::debug!(from = ?self.stage, to = ?next, "Resolution stage");
        self.stage = next;
    }

    fn fail(&mut self, error: &Error) {
        tracing::debug!(stage = ?self.stage, %error, "Resolution failed");
        self.stage = Stage::Failed;
    }

    fn run(&mut self, overrides: &[Override]) -> Result<BuildPlan> {
        self.advance(Stage::Validating);
        for ov in overrides {
            self.apply_override(ov)?;
        }
        let adjustments = apply_adjustments(
            &mut self.env,
            &self.resolver.manifest.adjustments,
            self.resolver.manifest.package.min_cppstd,
        )?;

        self.advance(Stage::RuleApplication);
        let applied_rules = self.resolver.rules.apply(&mut self.options, &self.env)?;
        self.warn_forced_overrides();

        self.advance(Stage::Finalized);
        let plan = self.finalize(applied_rules, adjustments)?;
        tracing::info!(
            package = %plan.package,
            options = plan.options.len(),
            requires = plan.requires.len(),
            "Build plan resolved"
        );
        Ok(plan)
    }

    fn apply_override(&mut self, ov: &Override) -> Result<()> {
        let manifest = &self.resolver.manifest;
        match &ov.target {
            OverrideTarget::Option(name) => {
                let def = manifest.option(name).ok_or_else(|| Error::UnknownOption {
                    name: name.clone(),
                })?;
                let value = def
                    .domain
                    .parse(&ov.value)
                    .ok_or_else(|| Error::InvalidOptionValue {
                        option: name.clone(),
                        value: ov.value.clone(),
                        allowed: def.domain.describe(),
                    })?;
                tracing::debug!(option = %name, %value, "Override applied");
                self.explicit.insert(name.clone(), value.clone());
                self.options.set(name.clone(), value);
            }
            OverrideTarget::Requirement {
                requirement,
                option,
            } => {
                let declared = manifest
                    .requires
                    .iter()
                    .chain(manifest.build_requires.iter())
                    .filter_map(|decl| decl.reference().ok())
                    .any(|r| r.name == *requirement);
                if !declared {
                    return Err(Error::UnknownOption {
                        name: ov.target.to_string(),
                    });
                }
                // Requirement options are opaque here; only booleans are recognized.
                let value = match parse_bool(&ov.value) {
                    Some(b) => OptionValue::Bool(b),
                    None => OptionValue::str(ov.value.clone()),
                };
                self.requirement_options
                    .entry(requirement.clone())
                    .or_default()
                    .insert(option.clone(), value);
            }
        }
        Ok(())
    }

    fn warn_forced_overrides(&self) {
        for (name, requested) in &self.explicit {
            match self.options.get(name) {
                Some(actual) if actual == requested => {}
                Some(actual) => {
                    tracing::warn!(option = %name, %requested, %actual, "Override replaced by rule")
                }
                None => tracing::warn!(option = %name, %requested, "Override removed by rule"),
            }
        }
    }

    fn finalize(&self, applied_rules: Vec<String>, adjustments: Vec<String>) -> Result<BuildPlan> {
        let manifest = &self.resolver.manifest;

        for (name, value) in self.options.iter() {
            if let Some(def) = manifest.option(name) {
                if !def.domain.contains(value) {
                    return Err(Error::InvalidOptionValue {
                        option: name.to_string(),
                        value: value.to_string(),
                        allowed: def.domain.describe(),
                    });
                }
            }
        }

        Ok(BuildPlan {
            package: manifest.package.name.clone(),
            version: manifest.package.version.clone(),
            settings: self.env.clone(),
            options: self.options.clone(),
            variables: self.render_variables(),
            cache_variables: manifest
                .toolchain
                .cache_variables
                .iter()
                .map(|(k, v)| (k.clone(), v.to_cmake()))
                .collect(),
            requires: self.collect_requirements(&manifest.requires)?,
            build_requires: self.collect_requirements(&manifest.build_requires)?,
            package_info: self.package_info(),
            applied_rules,
            adjustments,
            parallel_level: self.resolver.parallel_level,
        })
    }

    /// Variables in write order: settings, parallelism, static variables,
    /// bound options
    fn render_variables(&self) -> BTreeMap<String, String> {
        let manifest = &self.resolver.manifest;
        let mut variables = BTreeMap::new();

        variables.insert(
            "CMAKE_BUILD_TYPE".to_string(),
            self.env.build_type.to_string(),
        );
        if let Some(cppstd) = self.env.cppstd {
            variables.insert("CMAKE_CXX_STANDARD".to_string(), cppstd.number.to_string());
        }
        if let Some(level) = self.resolver.parallel_level {
            variables.insert("CMAKE_BUILD_PARALLEL_LEVEL".to_string(), level.to_string());
        }
        for (name, value) in &manifest.toolchain.variables {
            variables.insert(name.clone(), value.to_cmake());
        }
        for (name, value) in self.options.iter() {
            let bound = manifest.option(name).and_then(|def| def.variable.as_ref());
            if let Some(variable) = bound {
                variables.insert(variable.clone(), value.to_cmake());
            }
        }
        variables
    }

    fn collect_requirements(&self, decls: &[RequirementDecl]) -> Result<Vec<Dependency>> {
        let mut deps = Vec::new();
        for decl in decls {
            if !decl.when.matches(&self.options, &self.env) {
                continue;
            }
            let reference = decl.reference()?;
            let mut options = decl.options.clone();
            if let Some(extra) = self.requirement_options.get(&reference.name) {
                options.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            deps.push(Dependency {
                name: reference.name,
                version: reference.version,
                options,
            });
        }
        Ok(deps)
    }

    fn package_info(&self) -> PackageInfo {
        let info = &self.resolver.manifest.package_info;

        let mut seen = BTreeSet::new();
        let libs = info
            .libs
            .iter()
            .filter(|group| group.when.matches(&self.options, &self.env))
            .flat_map(|group| group.names.iter())
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect();

        let system_libs = info
            .system_libs
            .iter()
            .find(|(os, _)| os.parse::<Os>().is_ok_and(|os| os == self.env.os))
            .map(|(_, libs)| libs.clone())
            .unwrap_or_default();

        PackageInfo {
            libs,
            includedirs: info.includedirs.clone(),
            libdirs: info.libdirs.clone(),
            bindirs: info.bindirs.clone(),
            system_libs,
            runenv: info.runenv.clone(),
        }
    }
}

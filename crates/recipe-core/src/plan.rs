//! The resolved build plan and its serialized forms

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::environment::Environment;
use crate::options::OptionSet;
use crate::value::OptionValue;
use crate::version::VersionSpec;
use crate::{Error, Result};

/// A requirement as it enters the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub name: String,
    pub version: VersionSpec,

    /// Overrides for the requirement's own options
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, OptionValue>,
}

impl Dependency {
    /// `name/version` form
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

/// What consumers of the built package link against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub libs: Vec<String>,
    pub includedirs: Vec<String>,
    pub libdirs: Vec<String>,
    pub bindirs: Vec<String>,
    pub system_libs: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub runenv: BTreeMap<String, String>,
}

/// Resolved, immutable output handed to the external build system
///
/// Every map is ordered, so serializing the same plan twice produces
/// byte-identical text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    /// Package name
    pub package: String,
    /// Package version
    pub version: String,
    /// Environment after adjustments
    pub settings: Environment,
    /// Final option values (removed options are absent)
    pub options: OptionSet,
    /// Toolchain variables for the native build
    pub variables: BTreeMap<String, String>,
    pub cache_variables: BTreeMap<String, String>,
    /// Runtime requirements in declaration order
    pub requires: Vec<Dependency>,
    /// Build-time tool requirements in declaration order
    pub build_requires: Vec<Dependency>,
    pub package_info: PackageInfo,
    /// Rules that fired, in evaluation order
    pub applied_rules: Vec<String>,
    /// Environment adjustments that changed a setting
    pub adjustments: Vec<String>,
    /// Parallelism for the downstream build, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_level: Option<u32>,
}

/// The parts of a plan that identify a binary configuration
#[derive(Serialize)]
struct PackageIdInput<'a> {
    settings: &'a Environment,
    options: &'a OptionSet,
    requires: Vec<String>,
}

impl BuildPlan {
    /// Look up a final option value
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    /// `-DNAME=VALUE` arguments for a CMake configure step, in key order
    ///
    /// Variables and cache variables share one namespace on the command
    /// line; a cache variable wins over a variable of the same name.
    pub fn cmake_args(&self) -> Vec<String> {
        let mut merged: BTreeMap<&str, &str> = BTreeMap::new();
        for (name, value) in self.variables.iter().chain(self.cache_variables.iter()) {
            merged.insert(name, value);
        }
        merged
            .into_iter()
            .map(|(name, value)| format!("-D{}={}", name, value))
            .collect()
    }

    /// Digest of settings, options and requirements
    ///
    /// Two plans with the same id describe the same binary.
    pub fn package_id(&self) -> String {
        let input = PackageIdInput {
            settings: &self.settings,
            options: &self.options,
            requires: self.requires.iter().map(Dependency::reference).collect(),
        };
        // Serializing ordered maps cannot fail.
        let canonical = serde_json::to_string(&input).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        format!("sha256:{:x}", hasher.finalize())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Serialize in the requested format
    pub fn render(&self, format: PlanFormat) -> Result<String> {
        match format {
            PlanFormat::Json => self.to_json(),
            PlanFormat::Toml => self.to_toml(),
            PlanFormat::Yaml => self.to_yaml(),
            PlanFormat::Cmake => {
                let mut out = self.cmake_args().join("\n");
                out.push('\n');
                Ok(out)
            }
        }
    }
}

/// Output format for a rendered plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanFormat {
    #[default]
    Json,
    Toml,
    Yaml,
    /// One `-DNAME=VALUE` argument per line
    Cmake,
}

impl fmt::Display for PlanFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlanFormat::Json => "json",
            PlanFormat::Toml => "toml",
            PlanFormat::Yaml => "yaml",
            PlanFormat::Cmake => "cmake",
        };
        f.write_str(name)
    }
}

impl FromStr for PlanFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(PlanFormat::Json),
            "toml" => Ok(PlanFormat::Toml),
            "yaml" | "yml" => Ok(PlanFormat::Yaml),
            "cmake" => Ok(PlanFormat::Cmake),
            _ => Err(Error::InvalidSetting {
                name: "format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{BuildType, Os};

    fn sample_plan() -> BuildPlan {
        let mut options = OptionSet::new();
        options.set("shared", OptionValue::Bool(true));

        let mut variables = BTreeMap::new();
        variables.insert("BUILD_SHARED_LIBS".to_string(), "ON".to_string());
        variables.insert("CMAKE_BUILD_TYPE".to_string(), "Release".to_string());

        let mut cache_variables = BTreeMap::new();
        cache_variables.insert("CMAKE_POLICY_VERSION_MINIMUM".to_string(), "3.5".to_string());
        cache_variables.insert("BUILD_TESTING".to_string(), "OFF".to_string());

        BuildPlan {
            package: "demo".to_string(),
            version: "1.0.0".to_string(),
            settings: Environment::new(Os::Linux, "gcc", BuildType::Release).with_arch("x86_64"),
            options,
            variables,
            cache_variables,
            requires: vec![Dependency {
                name: "zlib".to_string(),
                version: VersionSpec::parse("zlib", "1.3.1").unwrap(),
                options: BTreeMap::new(),
            }],
            build_requires: Vec::new(),
            package_info: PackageInfo::default(),
            applied_rules: Vec::new(),
            adjustments: Vec::new(),
            parallel_level: None,
        }
    }

    #[test]
    fn test_cmake_args() {
        let plan = sample_plan();
        assert_eq!(
            plan.cmake_args(),
            vec![
                "-DBUILD_SHARED_LIBS=ON",
                "-DBUILD_TESTING=OFF",
                "-DCMAKE_BUILD_TYPE=Release",
                "-DCMAKE_POLICY_VERSION_MINIMUM=3.5",
            ]
        );
    }

    #[test]
    fn test_cmake_args_emit_shared_names_once() {
        let mut plan = sample_plan();
        plan.variables
            .insert("CMAKE_POLICY_VERSION_MINIMUM".to_string(), "3.0".to_string());

        let args = plan.cmake_args();
        let policy: Vec<&String> = args
            .iter()
            .filter(|a| a.starts_with("-DCMAKE_POLICY_VERSION_MINIMUM="))
            .collect();
        assert_eq!(policy, vec!["-DCMAKE_POLICY_VERSION_MINIMUM=3.5"]);
    }

    #[test]
    fn test_package_id_tracks_options() {
        let plan = sample_plan();
        let id = plan.package_id();
        assert!(id.starts_with("sha256:"));
        assert_eq!(id, sample_plan().package_id());

        let mut changed = sample_plan();
        changed.options.set("shared", OptionValue::Bool(false));
        assert_ne!(changed.package_id(), id);
    }

    #[test]
    fn test_package_id_ignores_rendering_details() {
        let mut plan = sample_plan();
        let id = plan.package_id();
        plan.parallel_level = Some(32);
        plan.applied_rules.push("something".to_string());
        assert_eq!(plan.package_id(), id);
    }

    #[test]
    fn test_json_and_toml_render() {
        let plan = sample_plan();
        let json = plan.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["requires"][0]["version"], "1.3.1");
        assert_eq!(value["settings"]["os"], "Linux");
        assert!(value.get("parallel_level").is_none());

        let toml_text = plan.to_toml().unwrap();
        assert!(toml_text.contains("package = \"demo\""));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<PlanFormat>().unwrap(), PlanFormat::Json);
        assert_eq!("yml".parse::<PlanFormat>().unwrap(), PlanFormat::Yaml);
        assert!("xml".parse::<PlanFormat>().is_err());
    }
}

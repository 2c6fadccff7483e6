//! Profiles: layered sources of settings and option overrides
//!
//! Profiles are loaded and merged in a defined order, later layers
//! overriding earlier ones:
//!
//! 1. **Global default** - `<config_dir>/recipe-resolver/profiles/default.toml`
//! 2. **Explicit profiles** - each `--profile <file>`, in command-line order
//! 3. **Command line** - settings flags and `--set` overrides (applied by the
//!    caller on top of the merged profile)
//!
//! ```toml
//! [settings]
//! os = "Linux"
//! build_type = "Release"
//! compiler = "gcc"
//! "compiler.libcxx" = "libstdc++11"
//!
//! [options]
//! shared = true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::environment::{BuildType, Environment, Os, host_arch};
use crate::resolver::Override;
use crate::value::OptionValue;
use crate::{Error, Result};

/// Settings section of a profile; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,

    #[serde(
        rename = "compiler.version",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub compiler_version: Option<OptionValue>,

    #[serde(
        rename = "compiler.libcxx",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub libcxx: Option<String>,

    #[serde(
        rename = "compiler.cppstd",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cppstd: Option<OptionValue>,
}

impl ProfileSettings {
    /// Overlay `other` on top of `self`; keys set in `other` win
    pub fn merge(&mut self, other: &ProfileSettings) {
        fn overlay<T: Clone>(base: &mut Option<T>, top: &Option<T>) {
            if top.is_some() {
                base.clone_from(top);
            }
        }
        overlay(&mut self.os, &other.os);
        overlay(&mut self.arch, &other.arch);
        overlay(&mut self.build_type, &other.build_type);
        overlay(&mut self.compiler, &other.compiler);
        overlay(&mut self.compiler_version, &other.compiler_version);
        overlay(&mut self.libcxx, &other.libcxx);
        overlay(&mut self.cppstd, &other.cppstd);
    }

    /// Build an environment, failing on the first missing required setting
    ///
    /// `os`, `compiler` and `build_type` are required; `arch` defaults to
    /// the host architecture.
    pub fn to_environment(&self) -> Result<Environment> {
        let required = |value: &Option<String>, name: &str| {
            value.clone().ok_or_else(|| Error::MissingSetting {
                name: name.to_string(),
            })
        };
        let os: Os = required(&self.os, "os")?.parse()?;
        let compiler = required(&self.compiler, "compiler")?;
        let build_type: BuildType = required(&self.build_type, "build_type")?.parse()?;

        let mut env = Environment::new(os, compiler, build_type)
            .with_arch(self.arch.clone().unwrap_or_else(host_arch));
        if let Some(version) = &self.compiler_version {
            env = env.with_compiler_version(version.to_string());
        }
        if let Some(libcxx) = &self.libcxx {
            env = env.with_libcxx(libcxx.clone());
        }
        if let Some(cppstd) = &self.cppstd {
            env = env.with_cppstd(cppstd.to_string().parse()?);
        }
        Ok(env)
    }
}

/// A parsed profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub settings: ProfileSettings,

    /// Option overrides; `dep:option` keys target requirements
    #[serde(default)]
    pub options: BTreeMap<String, OptionValue>,
}

impl Profile {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::ProfileParse { path: None, source })
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ProfileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| Error::ProfileParse {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// Overlay `other` on top of `self`
    pub fn merge(&mut self, other: &Profile) {
        self.settings.merge(&other.settings);
        for (name, value) in &other.options {
            self.options.insert(name.clone(), value.clone());
        }
    }

    /// Profile options as overrides, to be applied before command-line ones
    pub fn overrides(&self) -> Result<Vec<Override>> {
        self.options
            .iter()
            .map(|(name, value)| format!("{}={}", name, value).parse())
            .collect()
    }
}

/// Loads and merges profiles from the global directory and explicit paths
pub struct ProfileResolver {
    /// Override for the global config directory (used for testing).
    /// When `None`, `dirs::config_dir()` is used.
    global_config_dir_override: Option<PathBuf>,
}

impl Default for ProfileResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileResolver {
    pub fn new() -> Self {
        Self {
            global_config_dir_override: None,
        }
    }

    /// Use a custom global config directory instead of the platform one
    pub fn with_global_config_dir(global_config_dir: PathBuf) -> Self {
        Self {
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("recipe-resolver"))
    }

    /// Path of the global default profile, whether or not it exists
    pub fn default_profile_path(&self) -> Option<PathBuf> {
        self.global_config_dir()
            .map(|d| d.join("profiles").join("default.toml"))
    }

    /// Merge the global default profile (if present) and `explicit` profiles
    ///
    /// A missing global profile is skipped; a missing explicit profile is an
    /// error.
    pub fn resolve(&self, explicit: &[PathBuf]) -> Result<Profile> {
        let mut profile = Profile::default();

        if let Some(default_path) = self.default_profile_path() {
            if default_path.is_file() {
                tracing::debug!(?default_path, "Loading default profile (layer 1)");
                profile.merge(&Profile::load(&default_path)?);
            } else {
                tracing::debug!(?default_path, "No default profile found (layer 1), skipping");
            }
        }

        for path in explicit {
            tracing::debug!(?path, "Loading profile (layer 2)");
            profile.merge(&Profile::load(path)?);
        }

        Ok(profile)
    }
}

//! Recipe manifest parsing and validation
//!
//! A manifest declares the options of a package (name, domain, default),
//! static toolchain variables, requirements, implication rules, environment
//! adjustments and package info. It is plain TOML:
//!
//! ```toml
//! [package]
//! name = "opencv"
//! version = "4.12.0"
//! min_cppstd = "17"
//!
//! [options.shared]
//! domain = "bool"
//! default = false
//! variable = "BUILD_SHARED_LIBS"
//!
//! [[requires]]
//! reference = "zlib/1.3.1"
//!
//! [[rules]]
//! name = "shared-drops-fpic"
//! when = { options = { shared = true } }
//! remove = ["fPIC"]
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use crate::adjust::Adjustment;
use crate::environment::{CppStd, Os, SettingKey};
use crate::options::OptionDef;
use crate::rules::{Condition, Rule, RuleTable};
use crate::value::OptionValue;
use crate::version::{Reference, VersionSpec};
use crate::{Error, Result};

/// Option names must be usable as identifiers in the generated toolchain
static OPTION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

static PACKAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_+.-]*$").unwrap());

/// `[package]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSection {
    pub name: String,
    pub version: String,

    /// Lowest C++ standard the package builds with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cppstd: Option<CppStd>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `[toolchain]` section: variables that do not depend on options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolchainSection {
    #[serde(default)]
    pub variables: BTreeMap<String, OptionValue>,

    #[serde(default)]
    pub cache_variables: BTreeMap<String, OptionValue>,
}

/// A `[[requires]]` or `[[build_requires]]` entry
///
/// Either `reference = "name/version"` or separate `name` and `version`
/// keys identify the package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequirementDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Option overrides for the requirement's own option set
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, OptionValue>,

    #[serde(default, skip_serializing_if = "Condition::is_empty")]
    pub when: Condition,
}

impl RequirementDecl {
    /// Parse the package reference of this entry
    pub fn reference(&self) -> Result<Reference> {
        match (&self.reference, &self.name, &self.version) {
            (Some(reference), None, None) => reference.parse(),
            (None, Some(name), Some(version)) => Ok(Reference {
                name: name.clone(),
                version: VersionSpec::parse(name, version)?,
            }),
            _ => Err(Error::InvalidReference {
                reference: self
                    .reference
                    .clone()
                    .or_else(|| self.name.clone())
                    .unwrap_or_default(),
            }),
        }
    }
}

/// A group of libraries exported when `when` holds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibGroup {
    pub names: Vec<String>,

    #[serde(default, skip_serializing_if = "Condition::is_empty")]
    pub when: Condition,
}

/// `[package_info]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageInfoSection {
    #[serde(default)]
    pub libs: Vec<LibGroup>,

    /// Directories relative to the package folder
    #[serde(default)]
    pub includedirs: Vec<String>,
    #[serde(default)]
    pub libdirs: Vec<String>,
    #[serde(default)]
    pub bindirs: Vec<String>,

    /// System libraries keyed by operating system name
    #[serde(default)]
    pub system_libs: BTreeMap<String, Vec<String>>,

    /// Runtime environment for consumers; values are paths relative to the
    /// package folder
    #[serde(default)]
    pub runenv: BTreeMap<String, String>,
}

/// A parsed recipe manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub package: PackageSection,

    #[serde(default)]
    pub options: BTreeMap<String, OptionDef>,

    #[serde(default)]
    pub toolchain: ToolchainSection,

    #[serde(default)]
    pub requires: Vec<RequirementDecl>,

    #[serde(default)]
    pub build_requires: Vec<RequirementDecl>,

    #[serde(default)]
    pub rules: Vec<Rule>,

    #[serde(default)]
    pub adjustments: Vec<Adjustment>,

    #[serde(default)]
    pub package_info: PackageInfoSection,
}

impl Manifest {
    /// Parse a manifest from TOML content
    ///
    /// Parsing checks structure only; call [`Manifest::validate`] (or build a
    /// [`crate::Resolver`]) to check values against domains.
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(content)?;
        Ok(manifest)
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }
        tracing::debug!(?path, "Loading recipe");
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Declaration of a single option
    pub fn option(&self, name: &str) -> Option<&OptionDef> {
        self.options.get(name)
    }

    /// The rule table declared by this manifest
    pub fn rule_table(&self) -> RuleTable {
        RuleTable::new(self.rules.clone())
    }

    /// Check every value against its domain and every name against the
    /// declared options, normalizing values in place
    ///
    /// After validation, defaults and rule assignments hold canonical values
    /// (`"OFF"` for a boolean option becomes `false`).
    pub fn validate(&mut self) -> Result<()> {
        if !PACKAGE_NAME.is_match(&self.package.name) {
            return Err(Error::InvalidName {
                name: self.package.name.clone(),
            });
        }
        VersionSpec::parse(&self.package.name, &self.package.version)?;

        for (name, def) in self.options.iter_mut() {
            if !OPTION_NAME.is_match(name) {
                return Err(Error::InvalidName { name: name.clone() });
            }
            def.default = coerce(name, def, &def.default)?;
        }

        let options = &self.options;

        for rule in self.rules.iter_mut() {
            validate_condition(&mut rule.when, options)?;
            for (target, value) in rule.set.iter_mut() {
                let def = declared(target, options)?;
                *value = coerce(target, def, value)?;
            }
            for target in &rule.remove {
                declared(target, options)?;
            }
        }

        for decl in self.requires.iter_mut().chain(self.build_requires.iter_mut()) {
            decl.reference()?;
            validate_condition(&mut decl.when, options)?;
        }

        for group in self.package_info.libs.iter_mut() {
            validate_condition(&mut group.when, options)?;
        }
        for os in self.package_info.system_libs.keys() {
            os.parse::<Os>()?;
        }

        for adjustment in &self.adjustments {
            if adjustment.setting == SettingKey::CppStd {
                adjustment.from.parse::<CppStd>()?;
                adjustment.to.parse::<CppStd>()?;
            }
        }

        Ok(())
    }
}

fn declared<'a>(name: &str, options: &'a BTreeMap<String, OptionDef>) -> Result<&'a OptionDef> {
    options.get(name).ok_or_else(|| Error::UnknownOption {
        name: name.to_string(),
    })
}

fn coerce(name: &str, def: &OptionDef, value: &OptionValue) -> Result<OptionValue> {
    def.domain
        .coerce(value)
        .ok_or_else(|| Error::InvalidOptionValue {
            option: name.to_string(),
            value: value.to_string(),
            allowed: def.domain.describe(),
        })
}

fn validate_condition(cond: &mut Condition, options: &BTreeMap<String, OptionDef>) -> Result<()> {
    for (name, value) in cond.options.iter_mut() {
        let def = declared(name, options)?;
        *value = coerce(name, def, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[package]
name = "demo"
version = "1.0.0"

[options.shared]
domain = "bool"
default = false
variable = "BUILD_SHARED_LIBS"

[options.fPIC]
domain = [true, false]
default = true
"#;

    #[test]
    fn test_parse_minimal() {
        let manifest = Manifest::parse(MINIMAL).unwrap();
        assert_eq!(manifest.package.name, "demo");
        assert_eq!(manifest.options.len(), 2);
        assert_eq!(
            manifest.option("shared").unwrap().variable.as_deref(),
            Some("BUILD_SHARED_LIBS")
        );
        assert!(manifest.requires.is_empty());
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let content = format!("{MINIMAL}\n[settings]\nos = \"Linux\"\n");
        assert!(matches!(
            Manifest::parse(&content),
            Err(Error::ManifestParse(_))
        ));
    }

    #[test]
    fn test_validate_normalizes_rule_values() {
        let content = format!(
            "{MINIMAL}\n[[rules]]\nname = \"r\"\nwhen = {{ options = {{ shared = \"True\" }} }}\nset = {{ fPIC = \"OFF\" }}\n"
        );
        let mut manifest = Manifest::parse(&content).unwrap();
        manifest.validate().unwrap();

        let rule = &manifest.rules[0];
        assert_eq!(rule.set["fPIC"], OptionValue::Bool(false));
        assert_eq!(rule.when.options["shared"], OptionValue::Bool(true));
    }

    #[test]
    fn test_validate_rejects_default_outside_domain() {
        let content = r#"
[package]
name = "demo"
version = "1.0.0"

[options.opencv_version]
domain = ["4.12.0", "4.10.0"]
default = "5.0.0"
"#;
        let mut manifest = Manifest::parse(content).unwrap();
        match manifest.validate() {
            Err(Error::InvalidOptionValue { option, value, .. }) => {
                assert_eq!(option, "opencv_version");
                assert_eq!(value, "5.0.0");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_rule_on_undeclared_option() {
        let content = format!("{MINIMAL}\n[[rules]]\nname = \"r\"\nremove = [\"with_cuda\"]\n");
        let mut manifest = Manifest::parse(&content).unwrap();
        assert!(matches!(
            manifest.validate(),
            Err(Error::UnknownOption { name }) if name == "with_cuda"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_option_name() {
        let content = r#"
[package]
name = "demo"
version = "1.0.0"

[options."with-cuda"]
domain = "bool"
default = false
"#;
        let mut manifest = Manifest::parse(content).unwrap();
        assert!(matches!(manifest.validate(), Err(Error::InvalidName { .. })));
    }

    #[test]
    fn test_requirement_forms() {
        let by_reference = RequirementDecl {
            reference: Some("onnxruntime/1.14.1".to_string()),
            ..RequirementDecl::default()
        };
        assert_eq!(by_reference.reference().unwrap().name, "onnxruntime");

        let by_parts = RequirementDecl {
            name: Some("cmake".to_string()),
            version: Some("[>=3.15]".to_string()),
            ..RequirementDecl::default()
        };
        assert_eq!(by_parts.reference().unwrap().to_string(), "cmake/[>=3.15]");

        let both = RequirementDecl {
            reference: Some("cmake/3.28.1".to_string()),
            name: Some("cmake".to_string()),
            ..RequirementDecl::default()
        };
        assert!(matches!(both.reference(), Err(Error::InvalidReference { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Manifest::load(Path::new("/nonexistent/recipe.toml")).unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound { .. }));
    }
}

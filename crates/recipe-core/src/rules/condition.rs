//! Conditions shared by rules, requirements and package info entries

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::environment::{BuildType, Environment, Os};
use crate::options::OptionSet;
use crate::value::{OptionValue, parse_bool};

/// A conjunction of option equalities and environment predicates
///
/// An empty condition always holds. Every predicate that is present must
/// hold for the condition to match.
///
/// ```toml
/// when = { os = "Windows", options = { shared = false } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, OptionValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<Os>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_type: Option<BuildType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

impl Condition {
    /// Condition on a single option value
    pub fn option(name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        let mut options = BTreeMap::new();
        options.insert(name.into(), value.into());
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn os(os: Os) -> Self {
        Self {
            os: Some(os),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
            && self.os.is_none()
            && self.compiler.is_none()
            && self.build_type.is_none()
            && self.arch.is_none()
    }

    /// Names of the options this condition reads
    pub fn reads(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    pub fn matches(&self, options: &OptionSet, env: &Environment) -> bool {
        if self.os.is_some_and(|os| os != env.os) {
            return false;
        }
        if self
            .compiler
            .as_deref()
            .is_some_and(|c| !c.eq_ignore_ascii_case(&env.compiler))
        {
            return false;
        }
        if self.build_type.is_some_and(|bt| bt != env.build_type) {
            return false;
        }
        if self.arch.as_deref().is_some_and(|a| a != env.arch) {
            return false;
        }
        // Removed options never match.
        self.options.iter().all(|(name, expected)| {
            options
                .get(name)
                .is_some_and(|actual| values_match(expected, actual))
        })
    }
}

/// Compare a condition value against a resolved value
///
/// Booleans compare by truth value regardless of spelling (`"ON"` matches
/// `true`); everything else compares by text.
fn values_match(expected: &OptionValue, actual: &OptionValue) -> bool {
    match actual {
        OptionValue::Bool(b) => match expected {
            OptionValue::Bool(e) => e == b,
            OptionValue::Str(s) => parse_bool(s) == Some(*b),
        },
        OptionValue::Str(s) => expected.to_string() == *s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux_gcc() -> Environment {
        Environment::new(Os::Linux, "gcc", BuildType::Release)
    }

    #[test]
    fn test_empty_condition_always_matches() {
        let cond = Condition::default();
        assert!(cond.is_empty());
        assert!(cond.matches(&OptionSet::new(), &linux_gcc()));
    }

    #[test]
    fn test_option_condition() {
        let cond = Condition::option("shared", true);
        let mut options = OptionSet::new();
        options.set("shared", OptionValue::Bool(false));
        assert!(!cond.matches(&options, &linux_gcc()));

        options.set("shared", OptionValue::Bool(true));
        assert!(cond.matches(&options, &linux_gcc()));
    }

    #[test]
    fn test_missing_option_never_matches() {
        let cond = Condition::option("fPIC", true);
        assert!(!cond.matches(&OptionSet::new(), &linux_gcc()));
    }

    #[test]
    fn test_bool_spellings_match() {
        let cond = Condition::option("shared", "ON");
        let mut options = OptionSet::new();
        options.set("shared", OptionValue::Bool(true));
        assert!(cond.matches(&options, &linux_gcc()));
    }

    #[test]
    fn test_environment_predicates() {
        let windows = Condition::os(Os::Windows);
        assert!(!windows.matches(&OptionSet::new(), &linux_gcc()));

        let gcc = Condition {
            compiler: Some("GCC".to_string()),
            ..Condition::default()
        };
        assert!(gcc.matches(&OptionSet::new(), &linux_gcc()));

        let debug = Condition {
            build_type: Some(BuildType::Debug),
            ..Condition::default()
        };
        assert!(!debug.matches(&OptionSet::new(), &linux_gcc()));
    }

    #[test]
    fn test_parse_inline_table() {
        #[derive(Deserialize)]
        struct Holder {
            when: Condition,
        }

        let holder: Holder =
            toml::from_str(r#"when = { os = "Windows", options = { shared = false } }"#).unwrap();
        assert_eq!(holder.when.os, Some(Os::Windows));
        assert_eq!(
            holder.when.options.get("shared"),
            Some(&OptionValue::Bool(false))
        );

        let lower: Holder = toml::from_str(r#"when = { os = "linux" }"#).unwrap();
        assert_eq!(lower.when.os, Some(Os::Linux));

        assert!(toml::from_str::<Holder>(r#"when = { platform = "x" }"#).is_err());
    }
}

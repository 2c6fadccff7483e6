//! Option declarations and the flat option set they resolve into

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value::{Domain, OptionValue};

/// Declaration of a single recipe option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionDef {
    /// Allowed values
    pub domain: Domain,

    /// Value used when nothing overrides it
    pub default: OptionValue,

    /// Toolchain variable this option is rendered into, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OptionDef {
    pub fn new(domain: Domain, default: impl Into<OptionValue>) -> Self {
        Self {
            domain,
            default: default.into(),
            variable: None,
            description: None,
        }
    }

    pub fn boolean(default: bool) -> Self {
        Self::new(Domain::Boolean, default)
    }

    /// Bind this option to a toolchain variable
    pub fn bound_to(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }
}

/// Mapping from option name to its current value
///
/// Keys are unique and kept sorted, so iteration and serialization are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet {
    values: BTreeMap<String, OptionValue>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set holding the default of every declared option
    pub fn from_defaults<'a>(defs: impl IntoIterator<Item = (&'a String, &'a OptionDef)>) -> Self {
        let values = defs
            .into_iter()
            .map(|(name, def)| (name.clone(), def.default.clone()))
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Assign a value, returning the previous one
    pub fn set(&mut self, name: impl Into<String>, value: OptionValue) -> Option<OptionValue> {
        self.values.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<OptionValue> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, OptionValue)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

//! A single implication rule: condition -> forced assignments

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::condition::Condition;
use crate::environment::Environment;
use crate::options::OptionSet;
use crate::value::OptionValue;

/// An implication rule
///
/// When `when` holds, every `set` assignment is forced (overriding any
/// explicit value) and then every option in `remove` is dropped from the set.
///
/// ```toml
/// [[rules]]
/// name = "shared-drops-fpic"
/// when = { options = { shared = true } }
/// remove = ["fPIC"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    /// Identifier used in logs, plans and cycle reports
    pub name: String,

    #[serde(default, skip_serializing_if = "Condition::is_empty")]
    pub when: Condition,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub set: BTreeMap<String, OptionValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<String>,
}

impl Rule {
    pub fn new(name: impl Into<String>, when: Condition) -> Self {
        Self {
            name: name.into(),
            when,
            set: BTreeMap::new(),
            remove: Vec::new(),
        }
    }

    /// Add a forced assignment
    pub fn forcing(mut self, option: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set.insert(option.into(), value.into());
        self
    }

    /// Add a removal
    pub fn removing(mut self, option: impl Into<String>) -> Self {
        self.remove.push(option.into());
        self
    }

    /// Options read by the condition
    pub fn reads(&self) -> BTreeSet<&str> {
        self.when.reads().collect()
    }

    /// Options assigned or removed by the actions
    pub fn writes(&self) -> BTreeSet<&str> {
        self.set
            .keys()
            .map(String::as_str)
            .chain(self.remove.iter().map(String::as_str))
            .collect()
    }

    /// Apply the rule if its condition holds; returns whether it fired
    pub fn apply(&self, options: &mut OptionSet, env: &Environment) -> bool {
        if !self.when.matches(options, env) {
            return false;
        }
        for (name, value) in &self.set {
            options.set(name.clone(), value.clone());
        }
        for name in &self.remove {
            options.remove(name);
        }
        true
    }
}

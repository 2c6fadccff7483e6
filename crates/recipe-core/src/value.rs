//! Option values and the domains that constrain them

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// The current value of a single option
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

impl OptionValue {
    /// Convenience constructor for string values
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    /// Render the value the way CMake expects it (`ON`/`OFF` for booleans)
    pub fn to_cmake(&self) -> String {
        match self {
            OptionValue::Bool(true) => "ON".to_string(),
            OptionValue::Bool(false) => "OFF".to_string(),
            OptionValue::Str(s) => s.clone(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Str(_) => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OptionValue::Bool(b) => serializer.serialize_bool(*b),
            OptionValue::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for OptionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl Visitor<'_> for ValueVisitor {
            type Value = OptionValue;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a boolean, string or number")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<OptionValue, E> {
                Ok(OptionValue::Bool(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<OptionValue, E> {
                Ok(OptionValue::Str(v.to_string()))
            }

            // Numbers are kept in their textual form ("17", "3.5").
            fn visit_i64<E: de::Error>(self, v: i64) -> Result<OptionValue, E> {
                Ok(OptionValue::Str(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<OptionValue, E> {
                Ok(OptionValue::Str(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<OptionValue, E> {
                Ok(OptionValue::Str(v.to_string()))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Parse the boolean spellings accepted on the command line and in recipes
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "1" => Some(true),
        "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// The set of values an option may take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DomainRepr", into = "DomainRepr")]
pub enum Domain {
    /// `true` / `false`
    Boolean,
    /// A boolean option restricted to a single value (`[true]`)
    Pinned(bool),
    /// One of an enumerated list of strings
    OneOf(Vec<String>),
    /// Any string
    Any,
}

impl Domain {
    /// Bring `value` into this domain, if it belongs to it
    ///
    /// Boolean domains accept the textual spellings understood by
    /// [`parse_bool`]; enumerated domains compare the textual form.
    pub fn coerce(&self, value: &OptionValue) -> Option<OptionValue> {
        match (self, value) {
            (Domain::Boolean, OptionValue::Bool(b)) => Some(OptionValue::Bool(*b)),
            (Domain::Boolean, OptionValue::Str(s)) => parse_bool(s).map(OptionValue::Bool),
            (Domain::Pinned(only), OptionValue::Bool(b)) => {
                (b == only).then_some(OptionValue::Bool(*b))
            }
            (Domain::Pinned(only), OptionValue::Str(s)) => parse_bool(s)
                .filter(|b| b == only)
                .map(OptionValue::Bool),
            (Domain::OneOf(allowed), v) => {
                let text = v.to_string();
                allowed
                    .iter()
                    .any(|a| *a == text)
                    .then_some(OptionValue::Str(text))
            }
            (Domain::Any, v) => Some(v.clone()),
        }
    }

    /// Parse a raw string into a value of this domain
    pub fn parse(&self, raw: &str) -> Option<OptionValue> {
        self.coerce(&OptionValue::str(raw))
    }

    pub fn contains(&self, value: &OptionValue) -> bool {
        match (self, value) {
            (Domain::Boolean, OptionValue::Bool(_)) => true,
            (Domain::Boolean, OptionValue::Str(_)) => false,
            (Domain::Pinned(only), OptionValue::Bool(b)) => b == only,
            (Domain::Pinned(_), OptionValue::Str(_)) => false,
            (Domain::OneOf(allowed), OptionValue::Str(s)) => allowed.contains(s),
            (Domain::OneOf(_), OptionValue::Bool(_)) => false,
            (Domain::Any, _) => true,
        }
    }

    /// Human-readable list of allowed values for error messages
    pub fn describe(&self) -> String {
        match self {
            Domain::Boolean => "true, false".to_string(),
            Domain::Pinned(only) => only.to_string(),
            Domain::OneOf(allowed) => allowed.join(", "),
            Domain::Any => "any string".to_string(),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Boolean => f.write_str("bool"),
            Domain::Pinned(only) => write!(f, "[{}]", only),
            Domain::OneOf(allowed) => write!(f, "[{}]", allowed.join(", ")),
            Domain::Any => f.write_str("any"),
        }
    }
}

/// On-disk form of a domain: a keyword or a list of values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum DomainRepr {
    Keyword(String),
    Values(Vec<OptionValue>),
}

impl TryFrom<DomainRepr> for Domain {
    type Error = String;

    fn try_from(repr: DomainRepr) -> Result<Self, Self::Error> {
        match repr {
            DomainRepr::Keyword(k) => match k.as_str() {
                "bool" | "boolean" => Ok(Domain::Boolean),
                "any" | "string" => Ok(Domain::Any),
                other => Err(format!(
                    "unknown domain '{}' (expected \"bool\", \"any\" or a list of values)",
                    other
                )),
            },
            DomainRepr::Values(values) => {
                if values.is_empty() {
                    return Err("domain list must not be empty".to_string());
                }
                if values.iter().all(|v| v.as_bool().is_some()) {
                    let bools: BTreeSet<bool> = values.iter().filter_map(|v| v.as_bool()).collect();
                    return Ok(match bools.len() {
                        1 => Domain::Pinned(bools.contains(&true)),
                        _ => Domain::Boolean,
                    });
                }
                if values.iter().any(|v| matches!(v, OptionValue::Bool(_))) {
                    return Err("domain list mixes booleans and strings".to_string());
                }
                Ok(Domain::OneOf(values.iter().map(|v| v.to_string()).collect()))
            }
        }
    }
}

impl From<Domain> for DomainRepr {
    fn from(domain: Domain) -> Self {
        match domain {
            Domain::Boolean => DomainRepr::Keyword("bool".to_string()),
            Domain::Pinned(only) => DomainRepr::Values(vec![OptionValue::Bool(only)]),
            Domain::Any => DomainRepr::Keyword("any".to_string()),
            Domain::OneOf(allowed) => {
                DomainRepr::Values(allowed.into_iter().map(OptionValue::Str).collect())
            }
        }
    }
}

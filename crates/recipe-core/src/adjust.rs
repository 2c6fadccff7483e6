//! Environment adjustments
//!
//! Some compiler settings are known to be wrong for a recipe and are
//! rewritten before rules run, e.g. gcc with the legacy `libstdc++` ABI is
//! upgraded to `libstdc++11`. Adjustments run after user overrides, so an
//! explicit `--libcxx libstdc++` is still rewritten.

use serde::{Deserialize, Serialize};

use crate::environment::{CppStd, Environment, SettingKey};
use crate::Result;

/// A forced rewrite of one compiler setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Adjustment {
    pub name: String,

    /// Only applies to this compiler id, when given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,

    pub setting: SettingKey,
    pub from: String,
    pub to: String,
}

impl Adjustment {
    pub fn new(
        name: impl Into<String>,
        compiler: Option<&str>,
        setting: SettingKey,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            compiler: compiler.map(str::to_string),
            setting,
            from: from.into(),
            to: to.into(),
        }
    }

    fn applies_to(&self, env: &Environment) -> bool {
        let compiler_matches = self
            .compiler
            .as_deref()
            .is_none_or(|c| c.eq_ignore_ascii_case(&env.compiler));
        compiler_matches && env.setting(self.setting).as_deref() == Some(self.from.as_str())
    }
}

/// Apply every matching adjustment plus the minimum C++ standard
///
/// Returns the names of the adjustments that changed the environment.
pub fn apply_adjustments(
    env: &mut Environment,
    adjustments: &[Adjustment],
    min_cppstd: Option<CppStd>,
) -> Result<Vec<String>> {
    let mut applied = Vec::new();

    for adjustment in adjustments {
        if adjustment.applies_to(env) {
            tracing::debug!(
                adjustment = %adjustment.name,
                setting = %adjustment.setting,
                from = %adjustment.from,
                to = %adjustment.to,
                "Environment adjusted"
            );
            env.set_setting(adjustment.setting, &adjustment.to)?;
            applied.push(adjustment.name.clone());
        }
    }

    // Only a declared standard is raised; an unset one is left to the compiler.
    // The gnu flag does not count towards the minimum.
    if let (Some(min), Some(current)) = (min_cppstd, env.cppstd) {
        if current.year() < min.year() {
            let raised = current.with_number(min.number);
            tracing::debug!(from = %current, to = %raised, "Raising C++ standard to recipe minimum");
            env.cppstd = Some(raised);
            applied.push(format!("min-cppstd-{}", min.number));
        }
    }

    Ok(applied)
}

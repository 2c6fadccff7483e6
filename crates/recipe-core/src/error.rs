//! Error types for recipe-core

use std::path::PathBuf;

/// Result type for recipe-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading recipes or resolving a build plan
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value lies outside the declared domain of its option
    #[error("invalid value '{value}' for option '{option}' (allowed: {allowed})")]
    InvalidOptionValue {
        option: String,
        value: String,
        allowed: String,
    },

    /// An override or rule references an option that is not declared
    #[error("unknown option '{name}'")]
    UnknownOption { name: String },

    /// The rule table contains a read/write cycle
    #[error("rule cycle detected between: {}", rules.join(", "))]
    RuleCycleDetected { rules: Vec<String> },

    /// An override is not of the form `name=value`
    #[error("malformed override '{raw}' (expected name=value)")]
    MalformedOverride { raw: String },

    /// A required setting was not supplied by any profile or flag
    #[error("missing required setting '{name}'")]
    MissingSetting { name: String },

    /// A setting value could not be interpreted
    #[error("invalid value '{value}' for setting '{name}'")]
    InvalidSetting { name: String, value: String },

    /// A requirement carries an unparseable version
    #[error("invalid version '{version}' for '{dependency}': {source}")]
    InvalidVersion {
        dependency: String,
        version: String,
        source: semver::Error,
    },

    /// A `name/version` reference could not be parsed
    #[error("invalid reference '{reference}' (expected name/version)")]
    InvalidReference { reference: String },

    /// An option or package name contains invalid characters
    #[error("invalid name '{name}'")]
    InvalidName { name: String },

    /// Recipe file not found at the expected path
    #[error("recipe not found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// Profile file not found at the given path
    #[error("profile not found at {path}")]
    ProfileNotFound { path: PathBuf },

    /// Failed to parse recipe TOML
    #[error("failed to parse recipe: {0}")]
    ManifestParse(#[from] toml::de::Error),

    /// Failed to parse profile TOML
    #[error(
        "failed to parse profile{}: {source}",
        path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default()
    )]
    ProfileParse {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    /// YAML serialization error
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Coarse classification of errors, used to pick process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidOptionValue,
    UnknownOption,
    RuleCycle,
    InvalidManifest,
    MissingSetting,
    MalformedOverride,
    Other,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidOptionValue { .. } => ErrorKind::InvalidOptionValue,
            Error::UnknownOption { .. } => ErrorKind::UnknownOption,
            Error::RuleCycleDetected { .. } => ErrorKind::RuleCycle,
            Error::MalformedOverride { .. } => ErrorKind::MalformedOverride,
            Error::MissingSetting { .. } | Error::InvalidSetting { .. } => {
                ErrorKind::MissingSetting
            }
            Error::InvalidVersion { .. }
            | Error::InvalidReference { .. }
            | Error::InvalidName { .. }
            | Error::ManifestNotFound { .. }
            | Error::ManifestParse(_) => ErrorKind::InvalidManifest,
            Error::ProfileNotFound { .. }
            | Error::ProfileParse { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlSer(_)
            | Error::Yaml(_) => ErrorKind::Other,
        }
    }
}

//! Error types for recipe-cli

use recipe_core::ErrorKind;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from recipe-core
    #[error(transparent)]
    Core(#[from] recipe_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Process exit code for this error
    ///
    /// Usage errors (exit code 2) are reported by clap before any command
    /// runs and never reach this type.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Core(e) => match e.kind() {
                ErrorKind::InvalidOptionValue => 3,
                ErrorKind::UnknownOption => 4,
                ErrorKind::RuleCycle => 5,
                ErrorKind::InvalidManifest => 6,
                ErrorKind::MissingSetting => 7,
                ErrorKind::MalformedOverride => 8,
                ErrorKind::Other => 1,
            },
            CliError::Io(_) | CliError::Json(_) | CliError::User { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_per_kind() {
        let unknown = CliError::from(recipe_core::Error::UnknownOption {
            name: "wth_cuda".to_string(),
        });
        assert_eq!(unknown.exit_code(), 4);
        assert_eq!(unknown.to_string(), "unknown option 'wth_cuda'");

        let cycle = CliError::from(recipe_core::Error::RuleCycleDetected {
            rules: vec!["a".to_string()],
        });
        assert_eq!(cycle.exit_code(), 5);

        let malformed = CliError::from(recipe_core::Error::MalformedOverride {
            raw: "shared".to_string(),
        });
        assert_eq!(malformed.exit_code(), 8);

        assert_eq!(CliError::user("nope").exit_code(), 1);
    }
}

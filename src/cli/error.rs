//! CLI-level errors (wraps tree and settings errors)

use thiserror::Error;

use crate::errors::{SettingsError, TreeError};
use crate::iter::ParseOrderError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("config: {0}")]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Order(#[from] ParseOrderError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Order(_) => crate::exitcode::USAGE,
            CliError::Settings(_) => crate::exitcode::CONFIG,
            CliError::Tree(e) => match e {
                TreeError::CapacityExhausted { .. } => crate::exitcode::UNAVAILABLE,
                TreeError::InvariantViolation { .. } => crate::exitcode::SOFTWARE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;

    #[test]
    fn given_each_error_kind_then_maps_to_sysexits_code() {
        let capacity = CliError::from(TreeError::CapacityExhausted { capacity: 1 });
        assert_eq!(capacity.exit_code(), exitcode::UNAVAILABLE);

        let settings = CliError::from(SettingsError::Invalid {
            key: "capacity".into(),
            reason: "must be at least 1".into(),
        });
        assert_eq!(settings.exit_code(), exitcode::CONFIG);
        assert!(settings.to_string().starts_with("config: "));

        let order = CliError::from(ParseOrderError("sideways".into()));
        assert_eq!(order.exit_code(), exitcode::USAGE);
        assert_eq!(CliError::InvalidArgs("x".into()).exit_code(), exitcode::USAGE);
    }
}

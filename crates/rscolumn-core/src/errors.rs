use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColumnError {
    #[error("Invalid value for parameter '{name}': {value} ({reason})")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: String,
    },
    #[error("Shape mismatch for {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: String,
        expected: String,
        found: String,
    },
    #[error("Required parameter '{0}' is missing and has no default")]
    MissingParameter(String),
    #[error("External solver '{solver}' failed: {reason}")]
    ExternalSolverFailure { solver: String, reason: String },
    #[error("No state field named '{0}' is registered")]
    UnknownField(String),
    #[error("A state field named '{0}' is already registered")]
    DuplicateField(String),
    #[error("A subprocess named '{0}' already exists at this level")]
    DuplicateProcess(String),
    #[error("Invalid process name '{name}': {reason}")]
    InvalidProcessName { name: String, reason: String },
    #[error("Process '{process}' returned {kind} '{name}' which it never registered")]
    UndeclaredOutput {
        process: String,
        kind: String,
        name: String,
    },
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ColumnError {
    /// Convenience constructor for [`ColumnError::ShapeMismatch`]
    pub fn shape_mismatch(
        what: impl Into<String>,
        expected: impl std::fmt::Display,
        found: impl std::fmt::Display,
    ) -> Self {
        ColumnError::ShapeMismatch {
            what: what.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Convenience constructor for [`ColumnError::InvalidParameter`]
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: f64,
        reason: impl Into<String>,
    ) -> Self {
        ColumnError::InvalidParameter {
            name: name.into(),
            value,
            reason: reason.into(),
        }
    }
}

/// Convenience type for `Result<T, ColumnError>`.
pub type ColumnResult<T> = Result<T, ColumnError>;

/// Check that a fractional quantity lies within `[0, 1]`
pub fn check_unit_interval(name: &str, value: f64) -> ColumnResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ColumnError::invalid_parameter(
            name,
            value,
            "must lie within [0, 1]",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_interval_accepts_bounds() {
        assert!(check_unit_interval("albedo", 0.0).is_ok());
        assert!(check_unit_interval("albedo", 1.0).is_ok());
    }

    #[test]
    fn unit_interval_rejects_outside_and_nan() {
        assert!(matches!(
            check_unit_interval("eps", 1.01),
            Err(ColumnError::InvalidParameter { .. })
        ));
        assert!(check_unit_interval("eps", -0.1).is_err());
        assert!(check_unit_interval("eps", f64::NAN).is_err());
    }

    #[test]
    fn shape_mismatch_message() {
        let err = ColumnError::shape_mismatch("eps", 3, 2);
        assert_eq!(
            err.to_string(),
            "Shape mismatch for eps: expected 3, found 2"
        );
    }
}

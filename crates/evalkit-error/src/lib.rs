use thiserror::Error;

/// Primary error type for expression evaluation.
///
/// Two categories are kept apart: conversion failures (an argument cannot be
/// interpreted as the type a function needs) and everything that goes wrong
/// while binding a call. Mathematically undefined inputs are not errors at
/// all; functions answer them with a NULL datum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    // === Conversion Errors ===
    /// A value could not be coerced to the type an operation requires.
    #[error(
        "cannot convert {value} to {target}{}",
        .function.as_deref().map(|f| format!(" in {f}()")).unwrap_or_default()
    )]
    Conversion {
        value: String,
        target: &'static str,
        function: Option<String>,
    },

    /// A numeric conversion landed outside the target type's range.
    #[error("{target} value is out of range: {value}")]
    IntegerOverflow { value: String, target: &'static str },

    // === Binding Errors ===
    /// A function was called with an unacceptable number of arguments.
    #[error("incorrect parameter count in the call to native function '{function}': expected {expected}, got {actual}")]
    InvalidArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// No function with this name is registered.
    #[error("function {name} does not exist")]
    NoSuchFunction { name: String },

    /// A column reference points past the end of the input row.
    #[error("column index {index} out of range for row of width {width}")]
    ColumnOutOfRange { index: usize, width: usize },

    // === Runtime Errors ===
    /// SQL function runtime error.
    #[error("{0}")]
    FunctionError(String),

    /// Internal logic error (should never happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Numeric error codes, loosely following the MySQL client error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// Generic error.
    Error = 1,
    /// Internal logic error.
    Internal = 2,
    /// Function lookup or argument-shape failure.
    Function = 3,
    /// Data type mismatch.
    Mismatch = 20,
    /// Value out of range.
    Range = 25,
}

impl EvalError {
    /// Map this error to its numeric code.
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Conversion { .. } => ErrorCode::Mismatch,
            Self::IntegerOverflow { .. } => ErrorCode::Range,
            Self::InvalidArgumentCount { .. } | Self::NoSuchFunction { .. } => ErrorCode::Function,
            Self::ColumnOutOfRange { .. } | Self::Internal(_) => ErrorCode::Internal,
            Self::FunctionError(_) => ErrorCode::Error,
        }
    }

    /// Whether the user can likely fix this by changing the query or data.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Conversion { .. }
                | Self::IntegerOverflow { .. }
                | Self::InvalidArgumentCount { .. }
                | Self::NoSuchFunction { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Conversion { .. } => {
                Some("Cast the argument explicitly or relax the statement's conversion policy")
            }
            Self::IntegerOverflow { .. } => {
                Some("Use a wider type or enable the saturating overflow policy")
            }
            Self::NoSuchFunction { .. } => Some("Check the function name for typos"),
            _ => None,
        }
    }

    /// Create a conversion error without function context.
    pub fn conversion(value: impl Into<String>, target: &'static str) -> Self {
        Self::Conversion {
            value: value.into(),
            target,
            function: None,
        }
    }

    /// Create an integer overflow error.
    pub fn overflow(value: impl Into<String>, target: &'static str) -> Self {
        Self::IntegerOverflow {
            value: value.into(),
            target,
        }
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a function runtime error.
    pub fn function_error(msg: impl Into<String>) -> Self {
        Self::FunctionError(msg.into())
    }

    /// Attach the name of the enclosing function to a conversion error.
    ///
    /// Errors that already name a function, and every other variant, pass
    /// through unchanged.
    #[must_use]
    pub fn in_function(self, name: &str) -> Self {
        match self {
            Self::Conversion {
                value,
                target,
                function: None,
            } => Self::Conversion {
                value,
                target,
                function: Some(name.to_owned()),
            },
            other => other,
        }
    }
}

/// Result type alias using `EvalError`.
pub type Result<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_display_without_function() {
        let err = EvalError::conversion("'abc'", "DOUBLE");
        assert_eq!(err.to_string(), "cannot convert 'abc' to DOUBLE");
    }

    #[test]
    fn conversion_display_with_function() {
        let err = EvalError::conversion("'abc'", "DOUBLE").in_function("log");
        assert_eq!(err.to_string(), "cannot convert 'abc' to DOUBLE in log()");
    }

    #[test]
    fn in_function_keeps_innermost_name() {
        let err = EvalError::conversion("'x'", "BIGINT")
            .in_function("round")
            .in_function("abs");
        assert!(matches!(
            err,
            EvalError::Conversion { function: Some(ref f), .. } if f == "round"
        ));
    }

    #[test]
    fn in_function_ignores_other_variants() {
        let err = EvalError::internal("bug").in_function("abs");
        assert_eq!(err, EvalError::Internal("bug".to_owned()));
    }

    #[test]
    fn error_code_mapping() {
        assert_eq!(
            EvalError::conversion("x", "DOUBLE").error_code(),
            ErrorCode::Mismatch
        );
        assert_eq!(
            EvalError::overflow("18446744073709551615", "BIGINT").error_code(),
            ErrorCode::Range
        );
        assert_eq!(
            EvalError::NoSuchFunction {
                name: "nope".to_owned()
            }
            .error_code(),
            ErrorCode::Function
        );
        assert_eq!(EvalError::internal("x").error_code(), ErrorCode::Internal);
        assert_eq!(ErrorCode::Mismatch as i32, 20);
    }

    #[test]
    fn argument_count_display() {
        let err = EvalError::InvalidArgumentCount {
            function: "log".to_owned(),
            expected: "1 to 2".to_owned(),
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "incorrect parameter count in the call to native function 'log': expected 1 to 2, got 3"
        );
    }

    #[test]
    fn user_recoverable() {
        assert!(EvalError::conversion("x", "DOUBLE").is_user_recoverable());
        assert!(!EvalError::internal("bug").is_user_recoverable());
        assert!(EvalError::conversion("x", "DOUBLE").suggestion().is_some());
        assert!(EvalError::function_error("x").suggestion().is_none());
    }
}

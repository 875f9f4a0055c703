//! Error types for strassen-task operations.
//!
//! This module defines the error taxonomy shared by the Strassen engine, the
//! task lifecycle and the performance harness, so that callers can handle
//! failures gracefully instead of panicking.

use thiserror::Error;

use crate::task::Phase;

/// Errors that can occur while multiplying, staging or benchmarking.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrassenError {
    /// The matrix dimension is zero or not a power of two.
    #[error("Matrix size is not 2^k: n = {n}")]
    InvalidSize {
        /// The rejected dimension.
        n: usize,
    },
    /// An operand does not hold `n * n` elements.
    #[error("Dimension mismatch: expected {expected} elements, got {got}")]
    DimensionMismatch {
        /// Element count implied by the dimension.
        expected: usize,
        /// Element count actually provided.
        got: usize,
    },
    /// The task rejected its bundle during the validation phase.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Human-readable error message.
        message: String,
    },
    /// A lifecycle phase was invoked from a state that does not allow it.
    #[error("Phase `{phase}` cannot run while the task is {state:?}")]
    PhaseOrder {
        /// The phase that was requested.
        phase: &'static str,
        /// The state the task was in.
        state: Phase,
    },
    /// Engine or harness parameters are unusable.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },
    /// A measured mean exceeded the harness ceiling.
    #[error("Task execute time need to be: time < {limit_sec} secs (measured {time_sec} secs)")]
    TimeLimitExceeded {
        /// Measured mean seconds per iteration.
        time_sec: f64,
        /// Upper bound in seconds.
        limit_sec: f64,
    },
}

/// Result type alias for strassen-task operations.
pub type Result<T> = std::result::Result<T, StrassenError>;

/// Creates an invalid size error.
pub fn invalid_size(n: usize) -> StrassenError {
    StrassenError::InvalidSize { n }
}

/// Creates a dimension mismatch error.
pub fn dimension_mismatch(expected: usize, got: usize) -> StrassenError {
    StrassenError::DimensionMismatch { expected, got }
}

/// Creates a validation error.
pub fn validation_failed(message: impl Into<String>) -> StrassenError {
    StrassenError::ValidationFailed {
        message: message.into(),
    }
}

/// Creates a phase ordering error.
pub fn phase_order(phase: &'static str, state: Phase) -> StrassenError {
    StrassenError::PhaseOrder { phase, state }
}

/// Creates a configuration error.
pub fn invalid_config(message: impl Into<String>) -> StrassenError {
    StrassenError::InvalidConfig {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_size_display() {
        let error = invalid_size(3);
        let display = format!("{}", error);
        assert!(display.contains("not 2^k"));
        assert!(display.contains("n = 3"));
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let error = dimension_mismatch(16, 15);
        let display = format!("{}", error);
        assert!(display.contains("expected 16"));
        assert!(display.contains("got 15"));
    }

    #[test]
    fn test_validation_error_display() {
        let error = validation_failed("input counts differ");
        let display = format!("{}", error);
        assert!(display.contains("Validation failed"));
        assert!(display.contains("input counts differ"));
    }

    #[test]
    fn test_phase_order_display() {
        let error = phase_order("run", Phase::Created);
        let display = format!("{}", error);
        assert!(display.contains("`run`"));
        assert!(display.contains("Created"));
    }

    #[test]
    fn test_error_equality() {
        let error1 = invalid_size(0);
        let error2 = invalid_size(0);
        let error3 = invalid_size(5);

        assert_eq!(error1, error2);
        assert_ne!(error1, error3);
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = invalid_config("num_running must be positive");

        let _: &dyn std::error::Error = &error;

        assert!(std::error::Error::source(&error).is_none());
    }
}

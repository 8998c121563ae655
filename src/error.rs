//! Error taxonomy and the wire-level error envelope.

use serde::Serialize;
use thiserror::Error;

/// Errors raised by the formulators.
///
/// Input problems are rejected before any model is built; `Infeasible` is
/// the engine reporting that no solution satisfies the constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// Missing, malformed, or mutually inconsistent request fields.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The problem is structurally too small to route.
    #[error("specify an instance greater than 2, got {0} stops")]
    InvalidProblemSize(usize),
    /// The engine found no solution satisfying the constraints.
    #[error("no solution found")]
    Infeasible,
    /// Cost magnitudes would overflow the integer engine.
    #[error("cost magnitude too large for the solver")]
    Overflow,
}

/// The `{status, error, message}` body shared by every error response.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            error: "bad request".to_string(),
            message: message.into(),
        }
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self {
            status: 405,
            error: "method not allowed".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: 404,
            error: "not found".to_string(),
            message: message.into(),
        }
    }
}

impl From<&SolveError> for ErrorBody {
    fn from(error: &SolveError) -> Self {
        let message = match error {
            SolveError::Infeasible => "No solution found.".to_string(),
            other => other.to_string(),
        };
        Self::bad_request(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infeasible_maps_to_the_wire_message() {
        let body = ErrorBody::from(&SolveError::Infeasible);
        assert_eq!(body.status, 400);
        assert_eq!(body.error, "bad request");
        assert_eq!(body.message, "No solution found.");
    }

    #[test]
    fn invalid_input_keeps_the_detail() {
        let body = ErrorBody::from(&SolveError::InvalidInput("costs must be square".into()));
        assert!(body.message.contains("costs must be square"));
    }
}

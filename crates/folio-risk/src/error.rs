//! Error types for the risk engine.
//!
//! Every engine failure falls into one of four buckets. Callers branch on
//! the bucket (or on [`RiskError::code`]) rather than on message text.

use folio_core::CoreError;
use folio_math::MathError;
use thiserror::Error;

/// A specialized Result type for risk engine operations.
pub type RiskResult<T> = Result<T, RiskError>;

/// Errors that can occur during risk calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    /// Inputs were rejected before any computation ran.
    #[error("Validation failed: {reason}")]
    Validation {
        /// Summary of the failure.
        reason: String,
        /// One entry per offending field or series.
        details: Vec<String>,
    },

    /// Inputs were well-formed but numerically unusable.
    #[error("Degenerate input: {reason}")]
    DegenerateInput {
        /// What made the input degenerate.
        reason: String,
    },

    /// The optimizer exhausted its budget without meeting tolerance.
    #[error("Optimization did not converge after {iterations} iterations (residual: {residual:.2e})")]
    Convergence {
        /// Iterations performed.
        iterations: u32,
        /// Final projected-gradient residual.
        residual: f64,
    },

    /// A valid computation produced NaN or infinity.
    #[error("Internal computation error: {reason}")]
    InternalComputation {
        /// Where the bad value appeared.
        reason: String,
    },
}

impl RiskError {
    /// Creates a validation error without field details.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
            details: Vec::new(),
        }
    }

    /// Creates a validation error carrying per-field details.
    #[must_use]
    pub fn validation_with_details(reason: impl Into<String>, details: Vec<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
            details,
        }
    }

    /// Creates a degenerate input error.
    #[must_use]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateInput {
            reason: reason.into(),
        }
    }

    /// Creates a convergence error.
    #[must_use]
    pub fn convergence(iterations: u32, residual: f64) -> Self {
        Self::Convergence {
            iterations,
            residual,
        }
    }

    /// Creates an internal computation error.
    #[must_use]
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::InternalComputation {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::DegenerateInput { .. } => "DEGENERATE_INPUT",
            Self::Convergence { .. } => "OPTIMIZATION_ERROR",
            Self::InternalComputation { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Field-level details, empty for non-validation errors.
    #[must_use]
    pub fn details(&self) -> &[String] {
        match self {
            Self::Validation { details, .. } => details,
            _ => &[],
        }
    }
}

impl From<MathError> for RiskError {
    fn from(e: MathError) -> Self {
        match e {
            MathError::InvalidInput { .. }
            | MathError::DimensionMismatch { .. }
            | MathError::InsufficientData { .. } => Self::validation(e.to_string()),
            MathError::SingularMatrix { .. } | MathError::DivisionByZero { .. } => {
                Self::degenerate(e.to_string())
            }
            MathError::ConvergenceFailed {
                iterations,
                residual,
            } => Self::convergence(iterations, residual),
            MathError::NonFinite { .. } => Self::internal(e.to_string()),
        }
    }
}

impl From<CoreError> for RiskError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Source { .. } => Self::internal(e.to_string()),
            _ => Self::validation(e.to_string()),
        }
    }
}

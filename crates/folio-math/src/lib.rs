//! # Folio Math
//!
//! Mathematical utilities for the Folio portfolio risk engine.
//!
//! This crate provides:
//!
//! - **Linear Algebra**: Sample covariance, quadratic forms, positive-definiteness checks
//! - **Statistics**: Mean, population standard deviation, interpolated percentiles
//! - **Optimization**: Spectral projected gradient over convex feasible sets
//!
//! ## Design Philosophy
//!
//! - **Numerical Stability**: Careful handling of edge cases
//! - **Fail Loudly**: Non-finite inputs are errors, never silently propagated
//! - **Pure Functions**: No global state, safe to call from any thread

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod linear_algebra;
pub mod optimization;
pub mod statistics;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{MathError, MathResult};
    pub use crate::linear_algebra::{
        ensure_positive_definite, ensure_symmetric, quadratic_form, sample_covariance,
    };
    pub use crate::optimization::{
        project_onto_lower_bound, project_onto_simplex, spectral_projected_gradient,
        OptimizationConfig, OptimizationResult,
    };
    pub use crate::statistics::{
        mean, median_sorted, percentile_sorted, population_std_dev, sorted_finite,
    };
}

pub use error::{MathError, MathResult};

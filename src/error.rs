//! Error types for lookup table construction and evaluation
//!
//! This module defines the common errors encountered when building, searching for,
//! or persisting lookup tables, along with a convenient `Result` alias.

/// Errors that can occur while building or loading a lookup table.
///
/// Configuration problems are reported as soon as they are detected; numerical
/// trouble carries the values needed to decide whether to relax a tolerance or
/// pick a different table kind.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A construction parameter is out of range (nonpositive step, empty domain, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A fitting strategy needs more derivatives than the function container provides.
    #[error("Table requires derivatives up to order {required}, but only {available} are available")]
    MissingDerivative {
        /// Highest derivative order needed
        required: usize,

        /// Highest derivative order the container can supply
        available: usize,
    },

    /// Tables store at most 8 coefficients per subinterval.
    #[error("Unsupported number of coefficients per subinterval: {0}")]
    UnsupportedOrder(usize),

    /// The table name is not one of the known kinds.
    #[error("Unknown table kind `{0}`")]
    UnknownTable(String),

    /// A persisted table does not have the kind that was asked for.
    #[error("Table file holds `{found}` but `{expected}` was requested")]
    NameMismatch {
        /// Requested kind
        expected: String,

        /// Name recorded in the file
        found: String,
    },

    /// The two probe tables used to extrapolate a memory target had identical sizes.
    #[error("Cannot extrapolate a step size: both probe tables are {size} bytes")]
    DegenerateProbes {
        /// Size of both probes in bytes
        size: usize,
    },

    /// An iterative solver hit its iteration cap before reaching the requested tolerance.
    #[error(
        "Solver did not converge after {iterations} iterations (error {error:e}, tolerance {tolerance:e})"
    )]
    NonConvergence {
        /// Iterations performed
        iterations: usize,

        /// Residual or bracket width at the last iterate
        error: f64,

        /// Tolerance that was requested
        tolerance: f64,
    },

    /// A numeric value could not be cast to the target type.
    #[error("Failed to cast value to target type")]
    CastFailed,

    /// Failed to solve a linear system while fitting coefficients.
    ///
    /// Contains a static string describing the solver error.
    #[error("Failed to solve: {0}")]
    Algebra(&'static str),

    /// Reading or writing a table file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A table file is not valid JSON, or does not have the expected layout.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The plotting backend failed to render a diagnostic plot.
    #[cfg(feature = "plotting")]
    #[error("Failed to render plot: {0}")]
    Plotting(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`]
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result type for lookup table operations
pub type Result<T> = std::result::Result<T, Error>;

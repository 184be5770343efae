use thiserror::Error;

/// Error types for the teamkmeans library
///
/// Every variant is a configuration error detected before optimization
/// starts. Once inputs are validated the clustering loop cannot fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KMeansError {
    /// The number of clusters k is invalid (must be > 0)
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// Not enough data points for the requested number of clusters
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Dimension mismatch between points, or between data and model
    #[error("Dimension mismatch: {0}")]
    InvalidDimensions(String),

    /// size_min is larger than size_max
    #[error("Invalid size bounds: {0}")]
    InvalidSizeBounds(String),

    /// No partition of the data satisfies the size bounds
    #[error("Infeasible size constraint: {0}")]
    InfeasibleConstraint(String),

    /// Iteration or restart budget is zero
    #[error("Invalid iteration budget: {0}")]
    InvalidIterations(String),

    /// Input contains NaN or infinite values
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Two points share the same identifier
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    /// Model has not been fitted yet
    #[error("Model has not been fitted. Call train() or fit() first.")]
    NotFitted,
}

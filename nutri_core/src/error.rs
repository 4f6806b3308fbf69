//! Error types for the nutri_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for nutri_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A catalog food has a non-positive reference portion
    #[error("Invalid food definition '{food_id}': reference portion {reference_portion} must be positive")]
    InvalidFoodDefinition {
        food_id: String,
        reference_portion: f64,
    },

    /// A plan rescale would produce a non-positive or undefined calorie total
    #[error("Invalid adjustment: {0}")]
    InvalidAdjustment(String),

    /// Caller tried to change quantities on a closed plan
    #[error("Plan '{0}' is locked")]
    PlanLocked(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

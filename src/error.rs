// src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FipeError>;

#[derive(Error, Debug)]
pub enum FipeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Unexpected response shape: {0}")]
    Decode(String),

    #[error("No brand matching '{0}'")]
    BrandNotFound(String),

    #[error("No model matching '{0}'")]
    ModelNotFound(String),

    #[error("No year matching '{0}'")]
    YearNotFound(String),

    #[error("No reference periods available")]
    NoReferences,

    #[error("Insufficient data: {points} price point(s), need at least 2")]
    InsufficientData { points: usize },

    #[error("Invalid price '{0}'")]
    InvalidPrice(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FipeError {
    /// Failures that mean the vehicle could not be resolved or priced at all.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FipeError::BrandNotFound(_)
                | FipeError::ModelNotFound(_)
                | FipeError::YearNotFound(_)
                | FipeError::NoReferences
        )
    }
}

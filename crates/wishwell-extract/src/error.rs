use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unsafe URL refused: {reason}")]
    UnsafeUrl { reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

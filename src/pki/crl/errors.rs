use thiserror::Error;

/// CRL-related errors
#[derive(Error, Debug)]
pub enum CrlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to download CRL from {url}: {status}")]
    Download { url: String, status: String },

    #[error("Timeout while fetching CRL from {0}")]
    Timeout(String),

    #[error("Invalid CRL URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("CRL PEM decoding failed: {0}")]
    Pem(String),

    #[error("Malformed CRL: {0}")]
    Malformed(String),

    #[error("CRL has no nextUpdate field")]
    MissingNextUpdate,

    #[error("Unsupported CRL time format: {0}")]
    UnsupportedTimeFormat(String),

    #[error("Invalid CRL date {0:?}")]
    InvalidDate(String),
}

/// Convenient Result type alias
pub type CrlResult<T> = Result<T, CrlError>;

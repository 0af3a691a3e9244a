use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown catalog: {0}")]
    UnknownCatalog(String),
    #[error("invalid age limit token: {0}")]
    InvalidAgeToken(String),
    #[error("unknown regime: {0}")]
    UnknownRegime(String),
    #[error("entry {code} does not fit catalog {catalog}")]
    AttributeMismatch { catalog: String, code: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;

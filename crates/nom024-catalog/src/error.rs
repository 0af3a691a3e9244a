use std::path::PathBuf;

use nom024_model::{CatalogType, ModelError};

/// Errors raised while configuring or loading catalogs.
///
/// None of these escape [`crate::CatalogCache::initialize`]; load failures are
/// logged and reported per catalog in the [`crate::LoadReport`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    /// A required logical column matched none of its header aliases.
    #[error("{catalog} dataset {path} has no {field} column")]
    MissingColumn {
        catalog: CatalogType,
        path: PathBuf,
        field: &'static str,
    },

    #[error("failed to parse TOML manifest {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid manifest: {message}")]
    InvalidManifest { message: String },

    #[error("unknown catalog in manifest: {name}")]
    UnknownCatalog { name: String },

    #[error("duplicate catalog in manifest: {catalog}")]
    DuplicateCatalog { catalog: CatalogType },

    #[error("invalid manifest path {path}: {message}")]
    InvalidPath { path: PathBuf, message: String },

    #[error("invalid sha256 for {path}: {message}")]
    InvalidSha256 { path: PathBuf, message: String },

    #[error("sha256 mismatch for {path} (expected {expected}, got {actual})")]
    Sha256Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("loader for {catalog} panicked")]
    LoaderPanicked { catalog: CatalogType },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, error: &csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

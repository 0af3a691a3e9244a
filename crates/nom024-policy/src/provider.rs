//! Provider lookup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use nom024_model::{ModelError, Regime};
use serde::{Deserialize, Serialize};

/// What the resolver needs to know about a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderProfile {
    pub id: String,
    /// ISO 3166 country code, alpha-2 or alpha-3.
    pub country_code: Option<String>,
    /// Explicit regime tag; overrides the country rule.
    pub regime: Option<Regime>,
}

/// Source of provider profiles.
pub trait ProviderDirectory {
    fn find_provider(&self, id: &str) -> Option<ProviderProfile>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse provider file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("provider {id}: {source}")]
    InvalidRegime {
        id: String,
        #[source]
        source: ModelError,
    },
}

#[derive(Debug, Deserialize)]
struct ProviderFile {
    #[serde(default)]
    providers: Vec<ProviderRecord>,
}

#[derive(Debug, Deserialize)]
struct ProviderRecord {
    id: String,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    regime: Option<String>,
}

/// Providers held in memory, keyed by id.
///
/// ```toml
/// [[providers]]
/// id = "clinica-norte"
/// country_code = "MX"
///
/// [[providers]]
/// id = "demo"
/// regime = "unregulated"
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryProviderDirectory {
    providers: HashMap<String, ProviderProfile>,
}

impl InMemoryProviderDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: ProviderProfile) {
        self.providers.insert(profile.id.clone(), profile);
    }

    pub fn with_provider(mut self, profile: ProviderProfile) -> Self {
        self.insert(profile);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, DirectoryError> {
        let file: ProviderFile = toml::from_str(contents).map_err(|source| DirectoryError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        let mut directory = Self::new();
        for record in file.providers {
            let regime = record
                .regime
                .as_deref()
                .map(str::parse::<Regime>)
                .transpose()
                .map_err(|source| DirectoryError::InvalidRegime {
                    id: record.id.clone(),
                    source,
                })?;
            directory.insert(ProviderProfile {
                id: record.id.trim().to_string(),
                country_code: record
                    .country_code
                    .map(|code| code.trim().to_uppercase())
                    .filter(|code| !code.is_empty()),
                regime,
            });
        }
        Ok(directory)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, DirectoryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }
}

impl ProviderDirectory for InMemoryProviderDirectory {
    fn find_provider(&self, id: &str) -> Option<ProviderProfile> {
        self.providers.get(id.trim()).cloned()
    }
}

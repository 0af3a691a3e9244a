//! Catalog source configuration.
//!
//! A catalog directory either carries a `manifest.toml` listing each dataset
//! explicitly, or follows the default layout where every catalog lives at
//! `<root>/<DATASET>.csv`.
//!
//! ```toml
//! [manifest]
//! schema = "nom024.catalog-manifest"
//! schema_version = 1
//!
//! [defaults]
//! source = "DGIS"
//! version = "2024"
//!
//! [[catalogs]]
//! catalog = "CIE10"
//! path = "diagnosticos/CIE10.csv"
//! sha256 = "…"
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use nom024_model::CatalogType;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::paths::{MANIFEST_FILE, catalog_root};

pub const MANIFEST_SCHEMA: &str = "nom024.catalog-manifest";
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub manifest: ManifestHeader,
    #[serde(default)]
    pub defaults: Option<SourceDefaults>,
    #[serde(default)]
    pub catalogs: Vec<ManifestCatalog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub schema: String,
    pub schema_version: u32,
}

/// Provenance applied to rows that do not carry their own source/version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDefaults {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl SourceDefaults {
    fn overlay(&self, source: Option<String>, version: Option<String>) -> Self {
        Self {
            source: source.or_else(|| self.source.clone()),
            version: version.or_else(|| self.version.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestCatalog {
    pub catalog: String,
    pub path: String,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Where one catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSource {
    pub catalog: CatalogType,
    pub path: PathBuf,
    /// Lower-case hex digest the file must match, when pinned.
    pub sha256: Option<String>,
    pub defaults: SourceDefaults,
}

impl CatalogSource {
    pub fn new(catalog: CatalogType, path: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            path: path.into(),
            sha256: None,
            defaults: SourceDefaults::default(),
        }
    }
}

/// Resolved set of catalog sources.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    root: PathBuf,
    sources: BTreeMap<CatalogType, CatalogSource>,
}

impl CatalogConfig {
    /// Config with no sources; add them with [`CatalogConfig::with_source`].
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sources: BTreeMap::new(),
        }
    }

    /// Resolve the root (see [`catalog_root`]) and read its configuration.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        Self::from_dir(&catalog_root(explicit))
    }

    /// Read configuration for a catalog directory.
    ///
    /// With a manifest only the listed catalogs are configured. Without one
    /// every catalog type points at `<root>/<DATASET>.csv`.
    pub fn from_dir(root: &Path) -> Result<Self> {
        let manifest_path = root.join(MANIFEST_FILE);
        if manifest_path.is_file() {
            let manifest = load_manifest(&manifest_path)?;
            return Self::from_manifest(root, &manifest);
        }
        tracing::debug!(root = %root.display(), "no catalog manifest, using default layout");
        let sources = CatalogType::all()
            .iter()
            .map(|&catalog| {
                let path = root.join(format!("{}.csv", catalog.dataset_name()));
                (catalog, CatalogSource::new(catalog, path))
            })
            .collect();
        Ok(Self {
            root: root.to_path_buf(),
            sources,
        })
    }

    pub fn from_manifest(root: &Path, manifest: &Manifest) -> Result<Self> {
        validate_header(&manifest.manifest)?;
        let defaults = manifest.defaults.clone().unwrap_or_default();
        let mut seen: BTreeSet<CatalogType> = BTreeSet::new();
        let mut sources = BTreeMap::new();

        for item in &manifest.catalogs {
            let catalog: CatalogType =
                item.catalog
                    .parse()
                    .map_err(|_| CatalogError::UnknownCatalog {
                        name: item.catalog.clone(),
                    })?;
            if !seen.insert(catalog) {
                return Err(CatalogError::DuplicateCatalog { catalog });
            }
            let relative = validate_path(&item.path)?;
            let sha256 = item
                .sha256
                .as_deref()
                .map(|sha| validate_sha(sha, &item.path))
                .transpose()?;
            sources.insert(
                catalog,
                CatalogSource {
                    catalog,
                    path: root.join(relative),
                    sha256,
                    defaults: defaults.overlay(item.source.clone(), item.version.clone()),
                },
            );
        }

        Ok(Self {
            root: root.to_path_buf(),
            sources,
        })
    }

    pub fn with_source(mut self, source: CatalogSource) -> Self {
        self.sources.insert(source.catalog, source);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn source(&self, catalog: CatalogType) -> Option<&CatalogSource> {
        self.sources.get(&catalog)
    }

    pub fn sources(&self) -> impl Iterator<Item = &CatalogSource> {
        self.sources.values()
    }
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    toml::from_str(&contents).map_err(|e| CatalogError::Toml {
        path: path.to_path_buf(),
        source: e,
    })
}

fn validate_header(header: &ManifestHeader) -> Result<()> {
    if header.schema != MANIFEST_SCHEMA {
        return Err(CatalogError::InvalidManifest {
            message: format!("unsupported schema: {}", header.schema),
        });
    }
    if header.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(CatalogError::InvalidManifest {
            message: format!("unsupported schema_version: {}", header.schema_version),
        });
    }
    Ok(())
}

fn validate_sha(sha: &str, path: &str) -> Result<String> {
    let sha = sha.trim();
    if sha.len() != 64 || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CatalogError::InvalidSha256 {
            path: PathBuf::from(path),
            message: "expected 64 hex characters".to_string(),
        });
    }
    Ok(sha.to_ascii_lowercase())
}

/// Manifest paths must stay inside the catalog directory.
fn validate_path(path: &str) -> Result<PathBuf> {
    let candidate = PathBuf::from(path);
    let invalid = |message: &str| CatalogError::InvalidPath {
        path: candidate.clone(),
        message: message.to_string(),
    };
    if path.trim().is_empty() {
        return Err(invalid("empty path"));
    }
    if candidate.is_absolute() {
        return Err(invalid("absolute paths are not allowed"));
    }
    for component in candidate.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err(invalid("'..' is not allowed")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("absolute paths are not allowed"));
            }
        }
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(body: &str) -> Manifest {
        let text = format!(
            "[manifest]\nschema = \"nom024.catalog-manifest\"\nschema_version = 1\n{body}"
        );
        toml::from_str(&text).expect("parse manifest")
    }

    #[test]
    fn manifest_overlays_defaults() {
        let manifest = manifest(
            r#"
[defaults]
source = "DGIS"
version = "2024"

[[catalogs]]
catalog = "CIE10"
path = "cie/CIE10.csv"
version = "2025"
"#,
        );
        let config = CatalogConfig::from_manifest(Path::new("/data"), &manifest).unwrap();
        let source = config.source(CatalogType::Diagnoses).unwrap();
        assert_eq!(source.path, PathBuf::from("/data/cie/CIE10.csv"));
        assert_eq!(source.defaults.source.as_deref(), Some("DGIS"));
        assert_eq!(source.defaults.version.as_deref(), Some("2025"));
        assert!(config.source(CatalogType::Religions).is_none());
    }

    #[test]
    fn rejects_parent_paths() {
        let manifest = manifest("[[catalogs]]\ncatalog = \"CIE10\"\npath = \"../CIE10.csv\"\n");
        let err = CatalogConfig::from_manifest(Path::new("/data"), &manifest).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPath { .. }));
    }

    #[test]
    fn rejects_duplicates_and_unknown_names() {
        let duplicate = manifest(
            "[[catalogs]]\ncatalog = \"CIE10\"\npath = \"a.csv\"\n\
             [[catalogs]]\ncatalog = \"diagnoses\"\npath = \"b.csv\"\n",
        );
        assert!(matches!(
            CatalogConfig::from_manifest(Path::new("/data"), &duplicate),
            Err(CatalogError::DuplicateCatalog {
                catalog: CatalogType::Diagnoses
            })
        ));

        let unknown = manifest("[[catalogs]]\ncatalog = \"CIE11\"\npath = \"a.csv\"\n");
        assert!(matches!(
            CatalogConfig::from_manifest(Path::new("/data"), &unknown),
            Err(CatalogError::UnknownCatalog { .. })
        ));
    }

    #[test]
    fn rejects_malformed_sha_and_schema() {
        let bad_sha = manifest("[[catalogs]]\ncatalog = \"CLUES\"\npath = \"a.csv\"\nsha256 = \"abc\"\n");
        assert!(matches!(
            CatalogConfig::from_manifest(Path::new("/data"), &bad_sha),
            Err(CatalogError::InvalidSha256 { .. })
        ));

        let mut wrong = manifest("");
        wrong.manifest.schema_version = 2;
        assert!(matches!(
            CatalogConfig::from_manifest(Path::new("/data"), &wrong),
            Err(CatalogError::InvalidManifest { .. })
        ));
    }
}

//! NOM-024 reference catalog cache.
//!
//! Loads delimited reference datasets (CIE-10 diagnoses, administrative
//! geography, postal codes and the supplementary GIIS code sets) into typed,
//! keyed in-memory stores and answers point lookups, bounded searches and
//! hierarchical existence checks.
//!
//! # Example
//!
//! ```rust,ignore
//! use nom024_catalog::{CatalogCache, CatalogConfig};
//! use nom024_model::{CatalogType, GeoKind};
//!
//! let config = CatalogConfig::discover(None)?;
//! let (cache, report) = CatalogCache::initialize(&config);
//!
//! let diagnosis = cache.get(CatalogType::Diagnoses, "C539");
//! let in_state = cache.validate_geo(GeoKind::Municipio, "001", Some("25"));
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod paths;
pub mod store;

pub use cache::{
    CatalogCache, CatalogStats, CatalogStatus, DEFAULT_SEARCH_LIMIT, LoadOutcome, LoadReport,
    MAX_SEARCH_LIMIT, clamp_search_limit,
};
pub use config::{CatalogConfig, CatalogSource, Manifest, SourceDefaults};
pub use error::{CatalogError, Result};
pub use loader::{
    ParsedCatalog, load_catalog, normalize_diagnosis_key, parse_catalog, parse_catalog_str,
    sha256_hex,
};
pub use paths::{CATALOG_DIR_ENV_VAR, MANIFEST_FILE, catalog_root};
pub use store::{CatalogStore, locality_key};

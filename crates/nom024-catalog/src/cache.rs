//! The process-wide catalog cache.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use nom024_model::{CatalogEntry, CatalogType, GeoKind, ModelError};
use serde::Serialize;

use crate::config::{CatalogConfig, CatalogSource};
use crate::error::{CatalogError, Result};
use crate::loader::load_catalog;
use crate::store::CatalogStore;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Apply the default and cap a caller-supplied search limit.
pub fn clamp_search_limit(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .min(MAX_SEARCH_LIMIT)
}

/// How loading one catalog ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded {
        entries: usize,
        skipped_rows: usize,
        duplicates: usize,
    },
    Failed {
        message: String,
    },
    NotConfigured,
}

/// Per-catalog outcome of [`CatalogCache::initialize`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub outcomes: BTreeMap<CatalogType, LoadOutcome>,
}

impl LoadReport {
    pub fn outcome(&self, catalog: CatalogType) -> Option<&LoadOutcome> {
        self.outcomes.get(&catalog)
    }

    pub fn loaded_count(&self) -> usize {
        self.outcomes
            .values()
            .filter(|outcome| matches!(outcome, LoadOutcome::Loaded { .. }))
            .count()
    }

    /// Mandatory catalogs that were configured but did not load.
    pub fn failed_mandatory(&self) -> Vec<CatalogType> {
        self.outcomes
            .iter()
            .filter(|(catalog, outcome)| {
                !catalog.is_optional() && !matches!(outcome, LoadOutcome::Loaded { .. })
            })
            .map(|(catalog, _)| *catalog)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStatus {
    pub catalog: CatalogType,
    pub optional: bool,
    pub loaded: bool,
    pub entries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub mandatory_loaded: usize,
    pub mandatory_total: usize,
    pub optional_loaded: usize,
    pub optional_total: usize,
    pub catalogs: Vec<CatalogStatus>,
}

/// In-memory reference catalogs.
///
/// Stores are immutable once built. Replacing a catalog swaps its `Arc` under
/// a short write lock, so readers holding a store keep a consistent snapshot.
#[derive(Debug, Default)]
pub struct CatalogCache {
    stores: RwLock<HashMap<CatalogType, Arc<CatalogStore>>>,
    warned_optional: Mutex<HashSet<CatalogType>>,
}

impl CatalogCache {
    /// An empty cache. Every catalog reports as not loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache and load every configured catalog into it.
    pub fn initialize(config: &CatalogConfig) -> (Self, LoadReport) {
        let cache = Self::new();
        let report = cache.load(config);
        (cache, report)
    }

    /// Load every configured catalog in parallel, one worker per catalog.
    ///
    /// Returns after all workers have finished. Failures never propagate:
    /// mandatory catalogs log at error level, optional ones warn once.
    pub fn load(&self, config: &CatalogConfig) -> LoadReport {
        let results: Vec<(CatalogType, Result<(CatalogStore, usize)>)> =
            std::thread::scope(|scope| {
                let handles: Vec<_> = config
                    .sources()
                    .map(|source| (source.catalog, scope.spawn(move || load_store(source))))
                    .collect();
                handles
                    .into_iter()
                    .map(|(catalog, handle)| {
                        let result = handle
                            .join()
                            .unwrap_or(Err(CatalogError::LoaderPanicked { catalog }));
                        (catalog, result)
                    })
                    .collect()
            });

        let mut report = LoadReport::default();
        let mut built = Vec::new();
        for (catalog, result) in results {
            let outcome = match result {
                Ok((store, skipped_rows)) => {
                    let outcome = LoadOutcome::Loaded {
                        entries: store.len(),
                        skipped_rows,
                        duplicates: store.duplicates(),
                    };
                    built.push((catalog, Arc::new(store)));
                    outcome
                }
                Err(error) => {
                    self.report_failure(catalog, &error);
                    LoadOutcome::Failed {
                        message: error.to_string(),
                    }
                }
            };
            report.outcomes.insert(catalog, outcome);
        }
        for &catalog in CatalogType::all() {
            report
                .outcomes
                .entry(catalog)
                .or_insert(LoadOutcome::NotConfigured);
        }

        {
            let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
            stores.extend(built);
        }

        let stats = self.stats();
        tracing::info!(
            mandatory_loaded = stats.mandatory_loaded,
            mandatory_total = stats.mandatory_total,
            optional_loaded = stats.optional_loaded,
            optional_total = stats.optional_total,
            "catalog load complete"
        );
        report
    }

    fn report_failure(&self, catalog: CatalogType, error: &CatalogError) {
        if !catalog.is_optional() {
            tracing::error!(catalog = %catalog, %error, "mandatory catalog failed to load");
            return;
        }
        let first = self
            .warned_optional
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(catalog);
        if first {
            tracing::warn!(catalog = %catalog, %error, "optional catalog not loaded");
        } else {
            tracing::debug!(catalog = %catalog, %error, "optional catalog still not loaded");
        }
    }

    /// Current store for `catalog`, if loaded.
    pub fn store(&self, catalog: CatalogType) -> Option<Arc<CatalogStore>> {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&catalog)
            .filter(|store| !store.is_empty())
            .cloned()
    }

    pub fn is_loaded(&self, catalog: CatalogType) -> bool {
        self.store(catalog).is_some()
    }

    /// Exact-key lookup.
    pub fn get(&self, catalog: CatalogType, code: &str) -> Option<CatalogEntry> {
        self.store(catalog)?.get(code).cloned()
    }

    /// Bounded case-insensitive substring search. The query is matched as
    /// given; callers trim it and pick the limit, usually through
    /// [`clamp_search_limit`].
    pub fn search(&self, catalog: CatalogType, query: &str, limit: usize) -> Vec<CatalogEntry> {
        self.store(catalog)
            .map(|store| store.search(query, limit))
            .unwrap_or_default()
    }

    /// Hierarchical existence check.
    ///
    /// For municipalities `parent` is the state code; for localities it is the
    /// compound [`crate::locality_key`]. Without a parent, membership in any
    /// bucket counts; rows that never resolved a parent do not. Unloaded
    /// catalogs never match.
    pub fn validate_geo(&self, kind: GeoKind, code: &str, parent: Option<&str>) -> bool {
        let catalog = match kind {
            GeoKind::Estado => CatalogType::FederalEntities,
            GeoKind::Municipio => CatalogType::Municipalities,
            GeoKind::Localidad => CatalogType::Localities,
        };
        let Some(store) = self.store(catalog) else {
            return false;
        };
        match (kind, parent) {
            (GeoKind::Estado, _) => store.contains(code),
            (_, None) => store.is_indexed(code),
            (_, Some(parent)) => store
                .bucket(parent)
                .is_some_and(|bucket| bucket.contains_key(code)),
        }
    }

    /// Municipalities of a state, by code.
    pub fn municipalities_of(&self, state: &str) -> Vec<CatalogEntry> {
        let state = state.trim().to_uppercase();
        self.bucket_entries(CatalogType::Municipalities, &state)
    }

    /// Localities of a municipality, by code.
    pub fn localities_of(&self, state: &str, municipality: &str) -> Vec<CatalogEntry> {
        let key = crate::store::locality_key(&state.trim().to_uppercase(), municipality.trim());
        self.bucket_entries(CatalogType::Localities, &key)
    }

    fn bucket_entries(&self, catalog: CatalogType, parent: &str) -> Vec<CatalogEntry> {
        self.store(catalog)
            .and_then(|store| store.bucket(parent).map(|b| b.values().cloned().collect()))
            .unwrap_or_default()
    }

    pub fn stats(&self) -> CatalogStats {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        let catalogs: Vec<CatalogStatus> = CatalogType::all()
            .iter()
            .map(|&catalog| {
                let entries = stores.get(&catalog).map_or(0, |store| store.len());
                CatalogStatus {
                    catalog,
                    optional: catalog.is_optional(),
                    loaded: entries > 0,
                    entries,
                }
            })
            .collect();
        let count = |optional: bool| {
            catalogs
                .iter()
                .filter(|status| status.optional == optional && status.loaded)
                .count()
        };
        CatalogStats {
            mandatory_loaded: count(false),
            mandatory_total: CatalogType::mandatory().count(),
            optional_loaded: count(true),
            optional_total: CatalogType::optional().count(),
            catalogs,
        }
    }

    /// Replace a catalog wholesale. Returns the number of distinct codes.
    ///
    /// The new store and its index are built before the swap.
    pub fn inject(&self, catalog: CatalogType, entries: Vec<CatalogEntry>) -> Result<usize> {
        if let Some(entry) = entries.iter().find(|e| !catalog.accepts(&e.attributes)) {
            return Err(ModelError::AttributeMismatch {
                catalog: catalog.to_string(),
                code: entry.code.clone(),
            }
            .into());
        }
        let store = Arc::new(CatalogStore::build(catalog, entries));
        let len = store.len();
        self.stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(catalog, store);
        tracing::debug!(catalog = %catalog, entries = len, "catalog replaced");
        Ok(len)
    }

    pub fn clear(&self, catalog: CatalogType) {
        self.stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&catalog);
    }

    pub fn clear_all(&self) {
        self.stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

fn load_store(source: &CatalogSource) -> Result<(CatalogStore, usize)> {
    let span = tracing::info_span!("load_catalog", catalog = %source.catalog);
    let _guard = span.enter();
    let parsed = load_catalog(source)?;
    tracing::debug!(
        path = %source.path.display(),
        rows = parsed.entries.len(),
        skipped = parsed.skipped_rows,
        "catalog parsed"
    );
    Ok((
        CatalogStore::build(source.catalog, parsed.entries),
        parsed.skipped_rows,
    ))
}

//! Per-catalog keyed storage with hierarchical geography indices.

use std::collections::{BTreeMap, HashMap, HashSet};

use nom024_model::{CatalogEntry, CatalogType};

/// Compound key used by the locality index.
pub fn locality_key(state: &str, municipality: &str) -> String {
    format!("{state}-{municipality}")
}

type Bucket = BTreeMap<String, CatalogEntry>;

/// Immutable contents of one catalog.
///
/// The flat map keeps the first row seen for each code. Municipality and
/// locality codes repeat across parents, so their hierarchy buckets are built
/// from every row and can hold entries the flat map shadowed. Rows without a
/// resolvable parent stay out of the hierarchy.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    catalog: CatalogType,
    entries: BTreeMap<String, CatalogEntry>,
    hierarchy: HashMap<String, Bucket>,
    indexed: HashSet<String>,
    duplicates: usize,
}

impl CatalogStore {
    /// Build the flat map and, for municipalities and localities, the parent index.
    pub fn build(catalog: CatalogType, rows: Vec<CatalogEntry>) -> Self {
        let mut entries: BTreeMap<String, CatalogEntry> = BTreeMap::new();
        let mut hierarchy: HashMap<String, Bucket> = HashMap::new();
        let mut indexed: HashSet<String> = HashSet::new();
        let mut duplicates = 0usize;

        for entry in rows {
            if let Some(parent) = parent_key(catalog, &entry) {
                indexed.insert(entry.code.clone());
                hierarchy
                    .entry(parent)
                    .or_default()
                    .entry(entry.code.clone())
                    .or_insert_with(|| entry.clone());
            }
            if entries.contains_key(&entry.code) {
                duplicates += 1;
                continue;
            }
            entries.insert(entry.code.clone(), entry);
        }

        if duplicates > 0 {
            tracing::debug!(
                catalog = %catalog,
                duplicates,
                "duplicate codes kept first occurrence"
            );
        }

        Self {
            catalog,
            entries,
            hierarchy,
            indexed,
            duplicates,
        }
    }

    pub fn catalog(&self) -> CatalogType {
        self.catalog
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows whose code was already present in the flat map.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn get(&self, code: &str) -> Option<&CatalogEntry> {
        self.entries.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    /// Entries in code order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Entries under a parent key: a state code for municipalities, a
    /// [`locality_key`] for localities.
    pub fn bucket(&self, parent: &str) -> Option<&BTreeMap<String, CatalogEntry>> {
        self.hierarchy.get(parent)
    }

    /// Whether `code` sits in any parent bucket.
    pub fn is_indexed(&self, code: &str) -> bool {
        self.indexed.contains(code)
    }

    pub fn parent_count(&self) -> usize {
        self.hierarchy.len()
    }

    /// Case-insensitive substring search over code and description, in code
    /// order, stopping at `limit` hits. The query is matched as given.
    pub fn search(&self, query: &str, limit: usize) -> Vec<CatalogEntry> {
        let needle = query.to_lowercase();
        self.entries
            .values()
            .filter(|entry| entry.matches_lowercase(&needle))
            .take(limit)
            .cloned()
            .collect()
    }
}

fn parent_key(catalog: CatalogType, entry: &CatalogEntry) -> Option<String> {
    match catalog {
        CatalogType::Municipalities => entry.state_code().map(str::to_string),
        CatalogType::Localities => {
            let state = entry.state_code()?;
            let municipality = entry.municipality_code()?;
            Some(locality_key(state, municipality))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use nom024_model::EntryAttributes;

    use super::*;

    fn municipality(state: Option<&str>, code: &str, name: &str) -> CatalogEntry {
        CatalogEntry::new(
            code,
            name,
            EntryAttributes::Municipality {
                state_code: state.map(str::to_string),
            },
        )
    }

    #[test]
    fn repeated_codes_stay_indexed_per_state() {
        let store = CatalogStore::build(
            CatalogType::Municipalities,
            vec![
                municipality(Some("01"), "001", "Aguascalientes"),
                municipality(Some("25"), "001", "Ahome"),
                municipality(None, "900", "Sin entidad"),
            ],
        );
        assert_eq!(store.len(), 2);
        assert_eq!(store.duplicates(), 1);
        assert_eq!(store.get("001").unwrap().description, "Aguascalientes");
        assert_eq!(store.bucket("25").unwrap()["001"].description, "Ahome");
        assert!(store.bucket("01").unwrap().contains_key("001"));
        assert_eq!(store.parent_count(), 2);
        assert!(store.contains("900"));
        assert!(store.is_indexed("001"));
        assert!(!store.is_indexed("900"));
    }

    #[test]
    fn search_is_ordered_and_bounded() {
        let store = CatalogStore::build(
            CatalogType::Religions,
            vec![
                CatalogEntry::plain("3", "Judaica"),
                CatalogEntry::plain("1", "Catolica"),
                CatalogEntry::plain("2", "Cristiana"),
            ],
        );
        let hits: Vec<String> = store.search("CA", 10).into_iter().map(|e| e.code).collect();
        assert_eq!(hits, ["1", "3"]);
        assert_eq!(store.search("", 2).len(), 2);
        assert!(store.search("ca ", 10).is_empty());
        assert!(store.search("a", 0).is_empty());
    }
}

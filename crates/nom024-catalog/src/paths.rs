//! Catalog directory resolution.

use std::path::{Path, PathBuf};

/// Environment variable overriding the catalog directory.
pub const CATALOG_DIR_ENV_VAR: &str = "NOM024_CATALOG_DIR";

/// Optional manifest file inside the catalog directory.
pub const MANIFEST_FILE: &str = "manifest.toml";

/// Resolve the catalog root directory.
///
/// Resolution order:
/// 1. `explicit`, when given
/// 2. `NOM024_CATALOG_DIR` environment variable
/// 3. `catalogs/` directory relative to workspace root
pub fn catalog_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(root) = std::env::var(CATALOG_DIR_ENV_VAR)
        && !root.trim().is_empty()
    {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../catalogs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let root = catalog_root(Some(Path::new("/srv/catalogs")));
        assert_eq!(root, PathBuf::from("/srv/catalogs"));
    }
}

//! Membership checks against supplementary catalogs.
//!
//! All checks are non-blocking while their catalog is not loaded: the result
//! is valid with `catalog_loaded == false`.

use nom024_catalog::{CatalogCache, normalize_diagnosis_key};
use nom024_model::{CatalogType, CodeValidation};

const OPERATING_STATUS: &str = "EN OPERACION";

fn lookup_key(catalog: CatalogType, code: &str) -> String {
    match catalog {
        CatalogType::Diagnoses => normalize_diagnosis_key(code),
        CatalogType::FederalEntities | CatalogType::Establishments => code.to_uppercase(),
        _ => code.to_string(),
    }
}

/// Check that `code` exists in `catalog`.
pub fn validate_catalog_code(cache: &CatalogCache, catalog: CatalogType, code: &str) -> CodeValidation {
    let Some(store) = cache.store(catalog) else {
        return CodeValidation::catalog_unavailable();
    };
    let code = code.trim();
    if code.is_empty() {
        return CodeValidation::rejected(format!(
            "Se requiere una clave del catálogo {catalog}"
        ));
    }
    if store.contains(&lookup_key(catalog, code)) {
        CodeValidation::accepted()
    } else {
        CodeValidation::rejected(format!("La clave '{code}' no existe en el catálogo {catalog}"))
    }
}

/// Check a CLUES code exists and the establishment is operating.
pub fn validate_establishment(cache: &CatalogCache, clues: &str) -> CodeValidation {
    let result = validate_catalog_code(cache, CatalogType::Establishments, clues);
    if !result.valid || !result.catalog_loaded {
        return result;
    }
    let clues = clues.trim().to_uppercase();
    let status = cache
        .get(CatalogType::Establishments, &clues)
        .and_then(|entry| entry.operational_status().map(fold_status));
    match status.as_deref() {
        Some(OPERATING_STATUS) => result,
        _ => CodeValidation::rejected(format!(
            "El establecimiento '{clues}' no está en operación"
        )),
    }
}

fn fold_status(status: &str) -> String {
    status
        .trim()
        .to_uppercase()
        .replace('Ó', "O")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_nationality(cache: &CatalogCache, code: &str) -> CodeValidation {
    validate_catalog_code(cache, CatalogType::Nationalities, code)
}

pub fn validate_religion(cache: &CatalogCache, code: &str) -> CodeValidation {
    validate_catalog_code(cache, CatalogType::Religions, code)
}

pub fn validate_indigenous_language(cache: &CatalogCache, code: &str) -> CodeValidation {
    validate_catalog_code(cache, CatalogType::IndigenousLanguages, code)
}

pub fn validate_academic_background(cache: &CatalogCache, code: &str) -> CodeValidation {
    validate_catalog_code(cache, CatalogType::AcademicBackground, code)
}

/// CIE-9 procedure code.
pub fn validate_procedure(cache: &CatalogCache, code: &str) -> CodeValidation {
    validate_catalog_code(cache, CatalogType::Procedures, code)
}

pub fn validate_affiliation(cache: &CatalogCache, code: &str) -> CodeValidation {
    validate_catalog_code(cache, CatalogType::Affiliations, code)
}

pub fn validate_personnel_type(cache: &CatalogCache, code: &str) -> CodeValidation {
    validate_catalog_code(cache, CatalogType::PersonnelTypes, code)
}

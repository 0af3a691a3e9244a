//! End-to-end validation against an injected catalog cache.

use chrono::NaiveDate;
use nom024_catalog::CatalogCache;
use nom024_model::{
    CatalogEntry, CatalogType, CodeValidation, EntryAttributes, GeoField, GeographyPayload,
    IssueReason,
};
use nom024_validate::{
    CatalogRestrictions, DiagnosisRequest, LayeredRestrictions, RestrictionSource,
    StaticRestrictions, find_diagnosis_rule, find_duplicate_diagnoses, validate_catalog_code,
    validate_diagnoses_sex_age_on, validate_geography, validate_procedure,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn diagnosis(code: &str, lsex: &str, linf: &str, lsup: &str) -> CatalogEntry {
    CatalogEntry::new(
        code,
        format!("DIAGNOSTICO {code}"),
        EntryAttributes::Diagnosis {
            lsex: Some(lsex.to_string()),
            linf: Some(linf.to_string()),
            lsup: Some(lsup.to_string()),
        },
    )
}

fn geography_cache() -> CatalogCache {
    let cache = CatalogCache::new();
    cache
        .inject(
            CatalogType::FederalEntities,
            ["01", "25"]
                .into_iter()
                .map(|code| {
                    CatalogEntry::new(
                        code,
                        format!("ENTIDAD {code}"),
                        EntryAttributes::FederalEntity { abbreviation: None },
                    )
                })
                .collect(),
        )
        .unwrap();
    cache
        .inject(
            CatalogType::Municipalities,
            vec![
                CatalogEntry::new(
                    "999",
                    "MUNICIPIO DE OTRA ENTIDAD",
                    EntryAttributes::Municipality {
                        state_code: Some("01".to_string()),
                    },
                ),
                CatalogEntry::new(
                    "006",
                    "CULIACAN",
                    EntryAttributes::Municipality {
                        state_code: Some("25".to_string()),
                    },
                ),
            ],
        )
        .unwrap();
    cache
        .inject(
            CatalogType::Localities,
            vec![
                CatalogEntry::new(
                    "0001",
                    "CULIACAN ROSALES",
                    EntryAttributes::Locality {
                        state_code: Some("25".to_string()),
                        municipality_code: Some("006".to_string()),
                    },
                ),
                CatalogEntry::new(
                    "0100",
                    "LOCALIDAD SIN MUNICIPIO",
                    EntryAttributes::Locality {
                        state_code: Some("25".to_string()),
                        municipality_code: None,
                    },
                ),
            ],
        )
        .unwrap();
    cache
}

#[test]
fn municipality_from_another_state_is_rejected() {
    let cache = geography_cache();
    let result = validate_geography(
        &cache,
        &GeographyPayload::new(Some("25"), Some("999"), None),
    );
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, GeoField::Municipio);
    assert!(result.errors[0].reason.contains("no pertenece"));
}

#[test]
fn sentinel_state_bypasses_municipality_check() {
    let cache = CatalogCache::new();
    let result = validate_geography(
        &cache,
        &GeographyPayload::new(Some("NE"), Some("001"), None),
    );
    assert!(result.valid);
    assert!(result.errors.is_empty());
}

#[test]
fn locality_without_state_context_must_be_indexed() {
    let cache = geography_cache();
    let indexed = GeographyPayload::new(Some("NE"), Some("006"), Some("0001"));
    assert!(validate_geography(&cache, &indexed).valid);

    let orphan = validate_geography(
        &cache,
        &GeographyPayload::new(Some("NE"), Some("006"), Some("0100")),
    );
    assert!(!orphan.valid);
    assert_eq!(orphan.errors[0].field, GeoField::Localidad);
    assert_eq!(
        orphan.errors[0].reason,
        "La localidad '0100' no existe en el catálogo"
    );
}

#[test]
fn full_hierarchy_with_postal_catalog_missing() {
    let cache = geography_cache();
    let payload =
        GeographyPayload::new(Some("25"), Some("006"), Some("0001")).with_postal_code("80000");
    assert!(validate_geography(&cache, &payload).valid);
}

#[test]
fn catalog_rule_allows_cervical_cancer_at_thirty() {
    let cache = CatalogCache::new();
    cache
        .inject(
            CatalogType::Diagnoses,
            vec![diagnosis("C53", "MUJER", "010A", "120A")],
        )
        .unwrap();
    let request = DiagnosisRequest {
        principal: Some("C53"),
        sex: Some("F"),
        birth_date: Some("1995-01-15"),
        encounter_date: Some("2025-03-01"),
        ..Default::default()
    };
    for source in [
        &CatalogRestrictions::new(&cache) as &dyn RestrictionSource,
        &StaticRestrictions,
        &LayeredRestrictions::new(&cache),
    ] {
        let result = validate_diagnoses_sex_age_on(source, &request, today());
        assert!(result.ok, "{result:?}");
    }
}

#[test]
fn prostate_cancer_for_a_woman_yields_one_issue() {
    let request = DiagnosisRequest {
        principal: Some("C61"),
        sex: Some("MUJER"),
        ..Default::default()
    };
    let result = validate_diagnoses_sex_age_on(&StaticRestrictions, &request, today());
    assert!(!result.ok);
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].reason, IssueReason::SexNotAllowed);
    assert_eq!(result.issues[0].reason.to_string(), "Sexo no permitido");
    assert_eq!(result.issues[0].rule_key, "C61");
}

#[test]
fn exact_catalog_rule_beats_category() {
    let cache = CatalogCache::new();
    cache
        .inject(
            CatalogType::Diagnoses,
            vec![
                diagnosis("P07", "NO", "NO", "028D"),
                diagnosis("P073", "NO", "NO", "NO"),
            ],
        )
        .unwrap();
    assert_eq!(find_diagnosis_rule(&cache, "P07.3").unwrap().key, "P073");
    assert_eq!(find_diagnosis_rule(&cache, "P07.1").unwrap().key, "P07");
    assert!(find_diagnosis_rule(&cache, "Q00").is_none());

    let newborn = DiagnosisRequest {
        principal: Some("P071"),
        complementary: &["P073".to_string()],
        birth_date: Some("2025-01-01"),
        encounter_date: Some("2025-01-29"),
        sex: Some("H"),
    };
    let result = validate_diagnoses_sex_age_on(&CatalogRestrictions::new(&cache), &newborn, today());
    assert!(result.ok);

    let older = DiagnosisRequest {
        encounter_date: Some("2025-01-30"),
        ..newborn
    };
    let result = validate_diagnoses_sex_age_on(&CatalogRestrictions::new(&cache), &older, today());
    assert_eq!(result.issues.len(), 1);
    assert_eq!(result.issues[0].code, "P071");
    assert_eq!(result.issues[0].reason, IssueReason::AgeOutOfRange);
}

#[test]
fn layered_falls_back_to_static_table() {
    let cache = CatalogCache::new();
    cache
        .inject(CatalogType::Diagnoses, vec![diagnosis("J45", "NO", "NO", "NO")])
        .unwrap();
    let layered = LayeredRestrictions::new(&cache);
    assert_eq!(layered.find_rule("J45").unwrap().key, "J45");
    assert_eq!(layered.find_rule("N40.0").unwrap().key, "N40");
    assert!(CatalogRestrictions::new(&cache).find_rule("N40").is_none());
}

#[test]
fn optional_catalog_is_non_blocking_until_injected() {
    let cache = CatalogCache::new();
    assert_eq!(
        validate_procedure(&cache, "8904"),
        CodeValidation {
            valid: true,
            catalog_loaded: false,
            reason: None,
        }
    );
    cache
        .inject(
            CatalogType::Procedures,
            vec![CatalogEntry::plain("8904", "ENTREVISTA Y EVALUACION")],
        )
        .unwrap();
    assert!(validate_procedure(&cache, "8904").valid);
    let rejected = validate_catalog_code(&cache, CatalogType::Procedures, "0000");
    assert!(!rejected.valid);
    assert!(rejected.catalog_loaded);
}

#[test]
fn duplicated_principal_is_reported() {
    let complementary = vec!["E11".to_string(), "j45.0 - Asma predominantemente alergica".to_string()];
    assert_eq!(
        find_duplicate_diagnoses(Some("J45.0"), &complementary),
        ["J450"]
    );
}

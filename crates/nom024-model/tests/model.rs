//! Tests for nom024-model types.

use nom024_model::{
    AgeLimit, AgeUnit, CatalogEntry, CatalogType, DiagnosisIssue, DiagnosisRule,
    DiagnosisValidation, EntryAttributes, GeoCode, GeoKind, GeographyPayload, IssueReason,
    PatientSex, Regime, SexRestriction,
};

#[test]
fn catalog_type_parses_dataset_and_key() {
    assert_eq!("CIE10".parse::<CatalogType>().unwrap(), CatalogType::Diagnoses);
    assert_eq!("clues".parse::<CatalogType>().unwrap(), CatalogType::Establishments);
    assert_eq!(
        "postal_codes".parse::<CatalogType>().unwrap(),
        CatalogType::PostalCodes
    );
    assert!("CIE11".parse::<CatalogType>().is_err());
}

#[test]
fn mandatory_and_optional_partition_all() {
    assert_eq!(CatalogType::mandatory().count(), 9);
    assert_eq!(CatalogType::optional().count(), 4);
    assert!(CatalogType::Procedures.is_optional());
    assert!(!CatalogType::Religions.is_optional());
    assert_eq!(CatalogType::Establishments.to_string(), "CLUES");
}

#[test]
fn catalog_type_serializes_as_dataset_name() {
    let json = serde_json::to_string(&CatalogType::IndigenousLanguages).unwrap();
    assert_eq!(json, "\"LENGUAS_INDIGENAS\"");
}

#[test]
fn entry_accessors_ignore_blank_parents() {
    let entry = CatalogEntry::new(
        "0001",
        "Aguascalientes",
        EntryAttributes::Locality {
            state_code: Some("01".to_string()),
            municipality_code: Some("  ".to_string()),
        },
    );
    assert_eq!(entry.state_code(), Some("01"));
    assert_eq!(entry.municipality_code(), None);
    assert!(entry.matches_lowercase("aguas"));
    assert!(!CatalogEntry::plain("X", "Y").matches_lowercase("z"));
}

#[test]
fn age_limit_tokens() {
    assert_eq!(AgeLimit::parse(Some("NO")).unwrap(), None);
    assert_eq!(AgeLimit::parse(None).unwrap(), None);
    assert_eq!(AgeLimit::parse(Some(" ")).unwrap(), None);
    assert_eq!(
        AgeLimit::parse(Some("010A")).unwrap(),
        Some(AgeLimit::years(10))
    );
    let days = AgeLimit::parse(Some("028D")).unwrap().unwrap();
    assert_eq!(days.unit, AgeUnit::Days);
    assert_eq!(days.amount, 28);
    let months: AgeLimit = "006M".parse().unwrap();
    assert!((months.as_years() - 0.5).abs() < f64::EPSILON);
    assert_eq!(months.to_string(), "006M");
    assert!(AgeLimit::parse(Some("010X")).is_err());
    assert!(AgeLimit::parse(Some("A")).is_err());
}

#[test]
fn rule_bounds_come_from_raw_tokens() {
    let rule = DiagnosisRule::new(
        "C53",
        SexRestriction::from_token(Some("mujer")),
        Some("010A".to_string()),
        Some("120A".to_string()),
    );
    assert_eq!(rule.lsex, SexRestriction::Mujer);
    assert_eq!(rule.min_age(), Some(AgeLimit::years(10)));
    assert_eq!(rule.max_age(), Some(AgeLimit::years(120)));
    assert!(rule.is_restrictive());

    let open = DiagnosisRule::new("A00", SexRestriction::Si, Some("NO".into()), None);
    assert!(!open.is_restrictive());
}

#[test]
fn patient_sex_normalization() {
    assert_eq!(PatientSex::normalize(" femenino "), Some(PatientSex::Female));
    assert_eq!(PatientSex::normalize("M"), Some(PatientSex::Female));
    assert_eq!(PatientSex::normalize("h"), Some(PatientSex::Male));
    assert_eq!(PatientSex::normalize("Male"), Some(PatientSex::Male));
    assert_eq!(PatientSex::normalize("X"), None);
    assert!(SexRestriction::Hombre.allows(PatientSex::Male));
    assert!(!SexRestriction::Hombre.allows(PatientSex::Female));
    assert!(SexRestriction::Si.allows(PatientSex::Female));
}

#[test]
fn sentinels_are_recognized_per_level() {
    assert_eq!(GeoCode::parse(GeoKind::Estado, " ne "), Some(GeoCode::NotApplicable));
    assert_eq!(GeoCode::parse(GeoKind::Estado, "00"), Some(GeoCode::NotApplicable));
    assert_eq!(
        GeoCode::parse(GeoKind::Municipio, "000"),
        Some(GeoCode::NotApplicable)
    );
    assert_eq!(
        GeoCode::parse(GeoKind::Localidad, "0000"),
        Some(GeoCode::NotApplicable)
    );
    assert_eq!(
        GeoCode::parse(GeoKind::Municipio, "00"),
        Some(GeoCode::Code("00".to_string()))
    );
    assert_eq!(
        GeoCode::parse(GeoKind::Localidad, " ab "),
        Some(GeoCode::Code("ab".to_string()))
    );
    assert_eq!(GeoCode::parse(GeoKind::Estado, "   "), None);
}

#[test]
fn payload_emptiness() {
    assert!(GeographyPayload::default().is_empty());
    assert!(GeographyPayload::new(Some(" "), None, None).is_empty());
    assert!(!GeographyPayload::new(None, None, None).with_postal_code("20000").is_empty());
}

#[test]
fn diagnosis_issue_serializes_spanish_reason() {
    let validation = DiagnosisValidation::from_issues(vec![DiagnosisIssue {
        code: "C61".to_string(),
        rule_key: "C61".to_string(),
        reason: IssueReason::SexNotAllowed,
    }]);
    assert!(!validation.ok);
    let json = serde_json::to_value(&validation).unwrap();
    assert_eq!(json["issues"][0]["reason"], "Sexo no permitido");
}

#[test]
fn regime_parsing() {
    assert_eq!("NOM-024".parse::<Regime>().unwrap(), Regime::Nom024);
    assert_eq!("nom024".parse::<Regime>().unwrap(), Regime::Nom024);
    assert_eq!("Unregulated".parse::<Regime>().unwrap(), Regime::Unregulated);
    assert!("hipaa".parse::<Regime>().is_err());
}

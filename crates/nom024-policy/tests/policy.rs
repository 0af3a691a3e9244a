//! Resolving policies for providers and checking document drafts.

use nom024_catalog::CatalogCache;
use nom024_model::{
    CatalogEntry, CatalogType, EntryAttributes, GeographyPayload, PolicyField, Regime,
    RequirementLevel,
};
use nom024_policy::{
    DocumentDraft, InMemoryProviderDirectory, PolicyViolation, ProviderProfile, check_all,
    get_regulatory_policy,
};

fn directory() -> InMemoryProviderDirectory {
    InMemoryProviderDirectory::new()
        .with_provider(ProviderProfile {
            id: "clinica-norte".to_string(),
            country_code: Some("MX".to_string()),
            regime: None,
        })
        .with_provider(ProviderProfile {
            id: "occupational-us".to_string(),
            country_code: Some("US".to_string()),
            regime: None,
        })
}

fn cache() -> CatalogCache {
    let cache = CatalogCache::new();
    cache
        .inject(
            CatalogType::FederalEntities,
            vec![CatalogEntry::new(
                "25",
                "SINALOA",
                EntryAttributes::FederalEntity { abbreviation: None },
            )],
        )
        .unwrap();
    cache
        .inject(
            CatalogType::Municipalities,
            vec![CatalogEntry::new(
                "006",
                "CULIACAN",
                EntryAttributes::Municipality {
                    state_code: Some("25".to_string()),
                },
            )],
        )
        .unwrap();
    cache
}

#[test]
fn mexican_provider_gets_strict_policy() {
    let policy = get_regulatory_policy(&directory(), "clinica-norte");
    assert_eq!(policy.regime, Regime::Nom024);
    assert!(policy.features.enforce_document_immutability);
    assert_eq!(policy.validation.signer_curp, RequirementLevel::RequiredStrict);
    assert_eq!(policy.validation.geography, RequirementLevel::Required);

    let json = serde_json::to_value(policy).unwrap();
    assert_eq!(json["regime"], "nom024");
    assert_eq!(json["validation"]["signer_curp"], "required_strict");
}

#[test]
fn empty_draft_under_nom024_reports_every_field() {
    let policy = get_regulatory_policy(&directory(), "clinica-norte");
    let violations = check_all(&policy, &cache(), &DocumentDraft::default());
    let fields: Vec<PolicyField> = violations.iter().map(PolicyViolation::field).collect();
    assert_eq!(
        fields,
        [
            PolicyField::SignerCurp,
            PolicyField::WorkerCurp,
            PolicyField::PrincipalDiagnosis,
            PolicyField::Geography,
        ]
    );
    assert!(violations
        .iter()
        .all(|v| matches!(v, PolicyViolation::Missing { regime: Regime::Nom024, .. })));
}

#[test]
fn complete_draft_passes_and_bad_geography_is_malformed() {
    let policy = get_regulatory_policy(&directory(), "clinica-norte");
    let mut draft = DocumentDraft {
        signer_curp: Some("GODE561231HDFRRN00".to_string()),
        worker_curp: Some("MAHJ900101MJCRRN09".to_string()),
        principal_diagnosis: Some("J45.0 - Asma".to_string()),
        geography: GeographyPayload::new(Some("25"), Some("006"), None),
    };
    assert!(check_all(&policy, &cache(), &draft).is_empty());

    draft.geography = GeographyPayload::new(Some("25"), Some("999"), None);
    let violations = check_all(&policy, &cache(), &draft);
    assert_eq!(
        violations,
        [PolicyViolation::Malformed {
            regime: Regime::Nom024,
            field: PolicyField::Geography,
            value: "25/999/-/-".to_string(),
        }]
    );
}

#[test]
fn unregulated_provider_accepts_absent_fields_only() {
    let policy = get_regulatory_policy(&directory(), "occupational-us");
    assert_eq!(policy.regime, Regime::Unregulated);
    assert!(check_all(&policy, &cache(), &DocumentDraft::default()).is_empty());

    let draft = DocumentDraft {
        worker_curp: Some("not-a-curp".to_string()),
        ..Default::default()
    };
    let violations = check_all(&policy, &cache(), &draft);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field(), PolicyField::WorkerCurp);
}

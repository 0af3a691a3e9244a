//! Data model for the NOM-024 catalog and compliance engine.
//!
//! Types here are plain values shared by the catalog cache, the validators and
//! the policy resolver. Nothing in this crate performs I/O.

pub mod catalog;
pub mod diagnosis;
pub mod error;
pub mod geography;
pub mod policy;

pub use catalog::{CatalogEntry, CatalogType, CodeValidation, EntryAttributes};
pub use diagnosis::{
    AgeLimit, AgeUnit, DiagnosisIssue, DiagnosisRule, DiagnosisValidation, IssueReason,
    PatientSex, SexRestriction,
};
pub use error::{ModelError, Result};
pub use geography::{
    GeoCode, GeoField, GeoKind, GeographyError, GeographyPayload, GeographyValidation,
};
pub use policy::{
    PolicyFeatures, PolicyField, PolicyValidation, Regime, RegulatoryPolicy, RequirementLevel,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_type_accepts_one_shape() {
        let shapes = [
            EntryAttributes::Diagnosis {
                lsex: None,
                linf: None,
                lsup: None,
            },
            EntryAttributes::FederalEntity { abbreviation: None },
            EntryAttributes::Municipality { state_code: None },
            EntryAttributes::Locality {
                state_code: None,
                municipality_code: None,
            },
            EntryAttributes::PostalCode {
                state_code: None,
                municipality_code: None,
            },
            EntryAttributes::Establishment {
                operational_status: None,
                state_code: None,
            },
            EntryAttributes::Plain,
        ];
        for catalog in CatalogType::all() {
            let accepted = shapes.iter().filter(|s| catalog.accepts(s)).count();
            assert_eq!(accepted, 1, "{catalog}");
        }
    }

    #[test]
    fn validation_serializes_with_wire_names() {
        let validation = GeographyValidation::from_errors(vec![GeographyError {
            field: GeoField::CodigoPostal,
            reason: "x".to_string(),
        }]);
        let json = serde_json::to_string(&validation).expect("serialize validation");
        assert_eq!(
            json,
            r#"{"valid":false,"errors":[{"field":"codigo_postal","reason":"x"}]}"#
        );
    }
}

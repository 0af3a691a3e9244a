//! Record validation on top of the NOM-024 catalog cache.
//!
//! - [`validate_geography`]: state → municipality → locality consistency,
//!   sentinel codes and postal codes.
//! - [`validate_diagnoses_sex_age`]: sex and age eligibility of principal and
//!   complementary diagnoses, with interchangeable [`RestrictionSource`]s.
//! - [`find_duplicate_diagnoses`]: repeated codes within one document.
//! - [`codes`]: membership in supplementary catalogs (CLUES, CIE-9, …).
//! - [`curp`]: CURP structure and check digit.
//!
//! Validators are pure and never fail; violations are returned as values.

pub mod codes;
pub mod curp;
pub mod diagnosis;
pub mod geography;

pub use codes::{
    validate_academic_background, validate_affiliation, validate_catalog_code,
    validate_establishment, validate_indigenous_language, validate_nationality,
    validate_personnel_type, validate_procedure, validate_religion,
};
pub use curp::{is_generic_curp, is_valid_curp};
pub use diagnosis::{
    CatalogRestrictions, DiagnosisRequest, LayeredRestrictions, RestrictionSource,
    StaticRestrictions, find_diagnosis_rule, find_duplicate_diagnoses, normalize_diagnosis_code,
    validate_diagnoses_sex_age, validate_diagnoses_sex_age_on,
};
pub use geography::{GeoLookup, PostalLookup, validate_geography};

//! Reference catalog types and entries.
//!
//! Every dataset loaded by the engine is identified by a [`CatalogType`]. Each
//! type maps to exactly one source dataset name and accepts exactly one
//! attribute shape in [`EntryAttributes`].
//!
//! # Catalogs
//!
//! | Type                   | Dataset               | Optional |
//! |------------------------|-----------------------|----------|
//! | Diagnoses              | `CIE10`               | no       |
//! | FederalEntities        | `ENTIDADES`           | no       |
//! | Municipalities         | `MUNICIPIOS`          | no       |
//! | Localities             | `LOCALIDADES`         | no       |
//! | PostalCodes            | `CODIGOS_POSTALES`    | no       |
//! | Nationalities          | `NACIONALIDADES`      | no       |
//! | Religions              | `RELIGIONES`          | no       |
//! | IndigenousLanguages    | `LENGUAS_INDIGENAS`   | no       |
//! | AcademicBackground     | `FORMACION_ACADEMICA` | no       |
//! | Establishments         | `CLUES`               | yes      |
//! | Procedures             | `CIE9`                | yes      |
//! | Affiliations           | `DERECHOHABIENCIA`    | yes      |
//! | PersonnelTypes         | `TIPO_PERSONAL`       | yes      |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Identifies which reference dataset an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CatalogType {
    #[serde(rename = "CIE10")]
    Diagnoses,
    #[serde(rename = "ENTIDADES")]
    FederalEntities,
    #[serde(rename = "MUNICIPIOS")]
    Municipalities,
    #[serde(rename = "LOCALIDADES")]
    Localities,
    #[serde(rename = "CODIGOS_POSTALES")]
    PostalCodes,
    #[serde(rename = "NACIONALIDADES")]
    Nationalities,
    #[serde(rename = "RELIGIONES")]
    Religions,
    #[serde(rename = "LENGUAS_INDIGENAS")]
    IndigenousLanguages,
    #[serde(rename = "FORMACION_ACADEMICA")]
    AcademicBackground,
    #[serde(rename = "CLUES")]
    Establishments,
    #[serde(rename = "CIE9")]
    Procedures,
    #[serde(rename = "DERECHOHABIENCIA")]
    Affiliations,
    #[serde(rename = "TIPO_PERSONAL")]
    PersonnelTypes,
}

impl CatalogType {
    /// Source dataset name for this catalog.
    pub const fn dataset_name(&self) -> &'static str {
        match self {
            Self::Diagnoses => "CIE10",
            Self::FederalEntities => "ENTIDADES",
            Self::Municipalities => "MUNICIPIOS",
            Self::Localities => "LOCALIDADES",
            Self::PostalCodes => "CODIGOS_POSTALES",
            Self::Nationalities => "NACIONALIDADES",
            Self::Religions => "RELIGIONES",
            Self::IndigenousLanguages => "LENGUAS_INDIGENAS",
            Self::AcademicBackground => "FORMACION_ACADEMICA",
            Self::Establishments => "CLUES",
            Self::Procedures => "CIE9",
            Self::Affiliations => "DERECHOHABIENCIA",
            Self::PersonnelTypes => "TIPO_PERSONAL",
        }
    }

    /// Snake-case identifier, accepted by [`FromStr`] alongside the dataset name.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Diagnoses => "diagnoses",
            Self::FederalEntities => "federal_entities",
            Self::Municipalities => "municipalities",
            Self::Localities => "localities",
            Self::PostalCodes => "postal_codes",
            Self::Nationalities => "nationalities",
            Self::Religions => "religions",
            Self::IndigenousLanguages => "indigenous_languages",
            Self::AcademicBackground => "academic_background",
            Self::Establishments => "establishments",
            Self::Procedures => "procedures",
            Self::Affiliations => "affiliations",
            Self::PersonnelTypes => "personnel_types",
        }
    }

    /// Optional catalogs may be missing without being reported as errors.
    pub const fn is_optional(&self) -> bool {
        matches!(
            self,
            Self::Establishments | Self::Procedures | Self::Affiliations | Self::PersonnelTypes
        )
    }

    /// Whether entries of this type participate in a geography hierarchy.
    pub const fn is_geography(&self) -> bool {
        matches!(
            self,
            Self::FederalEntities | Self::Municipalities | Self::Localities
        )
    }

    pub const fn all() -> &'static [CatalogType] {
        &[
            Self::Diagnoses,
            Self::FederalEntities,
            Self::Municipalities,
            Self::Localities,
            Self::PostalCodes,
            Self::Nationalities,
            Self::Religions,
            Self::IndigenousLanguages,
            Self::AcademicBackground,
            Self::Establishments,
            Self::Procedures,
            Self::Affiliations,
            Self::PersonnelTypes,
        ]
    }

    pub fn mandatory() -> impl Iterator<Item = CatalogType> {
        Self::all().iter().copied().filter(|t| !t.is_optional())
    }

    pub fn optional() -> impl Iterator<Item = CatalogType> {
        Self::all().iter().copied().filter(CatalogType::is_optional)
    }

    /// Whether `attributes` has the shape this catalog stores.
    pub fn accepts(&self, attributes: &EntryAttributes) -> bool {
        match (self, attributes) {
            (Self::Diagnoses, EntryAttributes::Diagnosis { .. }) => true,
            (Self::FederalEntities, EntryAttributes::FederalEntity { .. }) => true,
            (Self::Municipalities, EntryAttributes::Municipality { .. }) => true,
            (Self::Localities, EntryAttributes::Locality { .. }) => true,
            (Self::PostalCodes, EntryAttributes::PostalCode { .. }) => true,
            (Self::Establishments, EntryAttributes::Establishment { .. }) => true,
            (
                Self::Nationalities
                | Self::Religions
                | Self::IndigenousLanguages
                | Self::AcademicBackground
                | Self::Procedures
                | Self::Affiliations
                | Self::PersonnelTypes,
                EntryAttributes::Plain,
            ) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CatalogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dataset_name())
    }
}

impl FromStr for CatalogType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|t| {
                t.dataset_name().eq_ignore_ascii_case(needle) || t.key().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ModelError::UnknownCatalog(needle.to_string()))
    }
}

/// Catalog-specific attributes carried by an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryAttributes {
    /// CIE-10 diagnosis with raw eligibility tokens as published.
    Diagnosis {
        lsex: Option<String>,
        linf: Option<String>,
        lsup: Option<String>,
    },
    FederalEntity {
        abbreviation: Option<String>,
    },
    Municipality {
        state_code: Option<String>,
    },
    Locality {
        state_code: Option<String>,
        municipality_code: Option<String>,
    },
    PostalCode {
        state_code: Option<String>,
        municipality_code: Option<String>,
    },
    /// CLUES health establishment.
    Establishment {
        operational_status: Option<String>,
        state_code: Option<String>,
    },
    Plain,
}

/// A single row of a reference catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique key within its catalog.
    pub code: String,
    pub description: String,
    pub source: Option<String>,
    pub version: Option<String>,
    pub attributes: EntryAttributes,
}

impl CatalogEntry {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        attributes: EntryAttributes,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            source: None,
            version: None,
            attributes,
        }
    }

    pub fn plain(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(code, description, EntryAttributes::Plain)
    }

    pub fn with_source(mut self, source: Option<String>, version: Option<String>) -> Self {
        self.source = source;
        self.version = version;
        self
    }

    /// Parent state code for geography, postal and establishment entries.
    pub fn state_code(&self) -> Option<&str> {
        match &self.attributes {
            EntryAttributes::Municipality { state_code }
            | EntryAttributes::Locality { state_code, .. }
            | EntryAttributes::PostalCode { state_code, .. }
            | EntryAttributes::Establishment { state_code, .. } => non_empty(state_code),
            _ => None,
        }
    }

    /// Parent municipality code for localities and postal codes.
    pub fn municipality_code(&self) -> Option<&str> {
        match &self.attributes {
            EntryAttributes::Locality {
                municipality_code, ..
            }
            | EntryAttributes::PostalCode {
                municipality_code, ..
            } => non_empty(municipality_code),
            _ => None,
        }
    }

    pub fn operational_status(&self) -> Option<&str> {
        match &self.attributes {
            EntryAttributes::Establishment {
                operational_status, ..
            } => non_empty(operational_status),
            _ => None,
        }
    }

    /// Case-insensitive substring match against code or description.
    ///
    /// `needle` must already be lower-cased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.code.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Outcome of validating a code against an optional or supplementary catalog.
///
/// When the catalog has not been loaded the check is non-blocking: `valid` is
/// `true` and `catalog_loaded` is `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeValidation {
    pub valid: bool,
    pub catalog_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CodeValidation {
    pub fn accepted() -> Self {
        Self {
            valid: true,
            catalog_loaded: true,
            reason: None,
        }
    }

    pub fn catalog_unavailable() -> Self {
        Self {
            valid: true,
            catalog_loaded: false,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            catalog_loaded: true,
            reason: Some(reason.into()),
        }
    }
}

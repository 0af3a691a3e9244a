//! Administrative geography payloads and validation results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Level of the state → municipality → locality hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoKind {
    Estado,
    Municipio,
    Localidad,
}

impl GeoKind {
    /// Reserved code meaning "not applicable" at this level.
    pub const fn sentinels(&self) -> &'static [&'static str] {
        match self {
            Self::Estado => &["NE", "00"],
            Self::Municipio => &["000"],
            Self::Localidad => &["0000"],
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Estado => "estado",
            Self::Municipio => "municipio",
            Self::Localidad => "localidad",
        }
    }
}

impl fmt::Display for GeoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized geography code.
///
/// Sentinels are recognized before any catalog is consulted, so a
/// `NotApplicable` value never reaches a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoCode {
    NotApplicable,
    Code(String),
}

impl GeoCode {
    /// Normalizes a raw field value. Empty or whitespace-only input yields `None`.
    ///
    /// State codes are upper-cased; municipality and locality codes are only
    /// trimmed.
    pub fn parse(kind: GeoKind, raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let normalized = match kind {
            GeoKind::Estado => trimmed.to_uppercase(),
            GeoKind::Municipio | GeoKind::Localidad => trimmed.to_string(),
        };
        if kind.sentinels().contains(&normalized.as_str()) {
            Some(Self::NotApplicable)
        } else {
            Some(Self::Code(normalized))
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::NotApplicable)
    }

    pub fn as_code(&self) -> Option<&str> {
        match self {
            Self::NotApplicable => None,
            Self::Code(code) => Some(code),
        }
    }
}

/// Geography fields of a record, as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographyPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entidad: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localidad: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codigo_postal: Option<String>,
}

impl GeographyPayload {
    pub fn new(
        entidad: Option<&str>,
        municipio: Option<&str>,
        localidad: Option<&str>,
    ) -> Self {
        Self {
            entidad: entidad.map(str::to_string),
            municipio: municipio.map(str::to_string),
            localidad: localidad.map(str::to_string),
            codigo_postal: None,
        }
    }

    pub fn with_postal_code(mut self, codigo_postal: impl Into<String>) -> Self {
        self.codigo_postal = Some(codigo_postal.into());
        self
    }

    /// Whether none of the geography fields carries a value.
    pub fn is_empty(&self) -> bool {
        [
            &self.entidad,
            &self.municipio,
            &self.localidad,
            &self.codigo_postal,
        ]
        .iter()
        .all(|field| field.as_deref().is_none_or(|value| value.trim().is_empty()))
    }
}

/// Payload field an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoField {
    Entidad,
    Municipio,
    Localidad,
    CodigoPostal,
}

impl GeoField {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Entidad => "entidad",
            Self::Municipio => "municipio",
            Self::Localidad => "localidad",
            Self::CodigoPostal => "codigo_postal",
        }
    }
}

impl fmt::Display for GeoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographyError {
    pub field: GeoField,
    pub reason: String,
}

/// Result of cross-field geography validation.
///
/// Errors accumulate independently per field; `valid` is true exactly when
/// `errors` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographyValidation {
    pub valid: bool,
    pub errors: Vec<GeographyError>,
}

impl GeographyValidation {
    pub fn from_errors(errors: Vec<GeographyError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn errors_for(&self, field: GeoField) -> impl Iterator<Item = &GeographyError> {
        self.errors.iter().filter(move |error| error.field == field)
    }
}

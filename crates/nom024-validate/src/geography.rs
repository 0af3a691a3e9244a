//! Cross-field validation of the state → municipality → locality hierarchy.

use nom024_catalog::{CatalogCache, locality_key};
use nom024_model::{
    CatalogType, GeoCode, GeoField, GeoKind, GeographyError, GeographyPayload,
    GeographyValidation,
};

/// Result of looking a postal code up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostalLookup {
    /// The postal-code catalog is not loaded; the check is skipped.
    CatalogUnavailable,
    Unknown,
    Known { state: Option<String> },
}

/// Catalog queries the geography validator depends on.
pub trait GeoLookup {
    /// Whether `code` exists at `kind`, under `parent` when given.
    fn validate_geo(&self, kind: GeoKind, code: &str, parent: Option<&str>) -> bool;

    fn postal_code(&self, code: &str) -> PostalLookup;
}

impl GeoLookup for CatalogCache {
    fn validate_geo(&self, kind: GeoKind, code: &str, parent: Option<&str>) -> bool {
        CatalogCache::validate_geo(self, kind, code, parent)
    }

    fn postal_code(&self, code: &str) -> PostalLookup {
        let Some(store) = self.store(CatalogType::PostalCodes) else {
            return PostalLookup::CatalogUnavailable;
        };
        match store.get(code) {
            Some(entry) => PostalLookup::Known {
                state: entry.state_code().map(str::to_string),
            },
            None => PostalLookup::Unknown,
        }
    }
}

/// Validate a geography payload.
///
/// Sentinel codes are accepted without consulting `lookup`. A municipality
/// without a state, or a locality without a municipality, is reported as a
/// missing dependency and not looked up.
pub fn validate_geography<L: GeoLookup + ?Sized>(
    lookup: &L,
    payload: &GeographyPayload,
) -> GeographyValidation {
    let parse = |kind: GeoKind, value: &Option<String>| {
        value.as_deref().and_then(|raw| GeoCode::parse(kind, raw))
    };
    let state = parse(GeoKind::Estado, &payload.entidad);
    let municipality = parse(GeoKind::Municipio, &payload.municipio);
    let locality = parse(GeoKind::Localidad, &payload.localidad);

    let mut errors = Vec::new();
    let mut fail = |field: GeoField, reason: String| errors.push(GeographyError { field, reason });

    if let Some(GeoCode::Code(state)) = &state
        && !lookup.validate_geo(GeoKind::Estado, state, None)
    {
        fail(
            GeoField::Entidad,
            format!("La entidad federativa '{state}' no existe en el catálogo"),
        );
    }

    if let Some(GeoCode::Code(mun)) = &municipality {
        match &state {
            None => fail(
                GeoField::Municipio,
                format!("Se requiere la entidad federativa para validar el municipio '{mun}'"),
            ),
            Some(GeoCode::NotApplicable) => {}
            Some(GeoCode::Code(state)) => {
                if !lookup.validate_geo(GeoKind::Municipio, mun, Some(state)) {
                    fail(
                        GeoField::Municipio,
                        format!("El municipio '{mun}' no pertenece a la entidad '{state}'"),
                    );
                }
            }
        }
    }

    if let Some(GeoCode::Code(loc)) = &locality {
        match (&municipality, &state) {
            (None, _) => fail(
                GeoField::Localidad,
                format!("Se requiere el municipio para validar la localidad '{loc}'"),
            ),
            (Some(GeoCode::NotApplicable), _) => {}
            (Some(GeoCode::Code(mun)), Some(GeoCode::Code(state))) => {
                let parent = locality_key(state, mun);
                if !lookup.validate_geo(GeoKind::Localidad, loc, Some(&parent)) {
                    fail(
                        GeoField::Localidad,
                        format!(
                            "La localidad '{loc}' no pertenece al municipio '{mun}' de la entidad '{state}'"
                        ),
                    );
                }
            }
            (Some(GeoCode::Code(_)), _) => {
                if !lookup.validate_geo(GeoKind::Localidad, loc, None) {
                    fail(
                        GeoField::Localidad,
                        format!("La localidad '{loc}' no existe en el catálogo"),
                    );
                }
            }
        }
    }

    if let Some(postal) = payload
        .codigo_postal
        .as_deref()
        .map(str::trim)
        .filter(|cp| !cp.is_empty())
    {
        match lookup.postal_code(postal) {
            PostalLookup::CatalogUnavailable => {}
            PostalLookup::Unknown => fail(
                GeoField::CodigoPostal,
                format!("El código postal '{postal}' no existe en el catálogo"),
            ),
            PostalLookup::Known {
                state: Some(postal_state),
            } => {
                if let Some(GeoCode::Code(state)) = &state
                    && !postal_state.eq_ignore_ascii_case(state)
                {
                    fail(
                        GeoField::CodigoPostal,
                        format!(
                            "El código postal '{postal}' no corresponde a la entidad '{state}'"
                        ),
                    );
                }
            }
            PostalLookup::Known { state: None } => {}
        }
    }

    GeographyValidation::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Knows municipality 999 only under state 01; counts every call.
    #[derive(Default)]
    struct CountingLookup {
        calls: Cell<usize>,
    }

    impl GeoLookup for CountingLookup {
        fn validate_geo(&self, kind: GeoKind, code: &str, parent: Option<&str>) -> bool {
            self.calls.set(self.calls.get() + 1);
            match kind {
                GeoKind::Estado => matches!(code, "01" | "25"),
                GeoKind::Municipio => code == "999" && parent.is_none_or(|p| p == "01"),
                GeoKind::Localidad => code == "0001" && parent.is_none_or(|p| p == "01-999"),
            }
        }

        fn postal_code(&self, code: &str) -> PostalLookup {
            self.calls.set(self.calls.get() + 1);
            match code {
                "20000" => PostalLookup::Known {
                    state: Some("01".to_string()),
                },
                _ => PostalLookup::Unknown,
            }
        }
    }

    #[test]
    fn municipality_of_another_state() {
        let lookup = CountingLookup::default();
        let result = validate_geography(
            &lookup,
            &GeographyPayload::new(Some("25"), Some("999"), None),
        );
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, GeoField::Municipio);
        assert!(result.errors[0].reason.contains("no pertenece"));
    }

    #[test]
    fn sentinel_payloads_make_no_calls() {
        let lookup = CountingLookup::default();
        let payloads = [
            GeographyPayload::new(Some("NE"), Some("001"), None),
            GeographyPayload::new(Some("00"), Some("000"), Some("0000")),
            GeographyPayload::new(Some("ne"), Some("000"), Some("0042")),
            GeographyPayload::default(),
        ];
        for payload in &payloads {
            let result = validate_geography(&lookup, payload);
            assert!(result.valid, "{payload:?}");
        }
        assert_eq!(lookup.calls.get(), 0);
    }

    #[test]
    fn missing_parents_are_reported_without_lookups() {
        let lookup = CountingLookup::default();
        let result = validate_geography(
            &lookup,
            &GeographyPayload::new(None, Some("001"), None),
        );
        assert_eq!(lookup.calls.get(), 0);
        insta::assert_snapshot!(
            result.errors[0].reason,
            @"Se requiere la entidad federativa para validar el municipio '001'"
        );

        let result = validate_geography(
            &lookup,
            &GeographyPayload::new(Some("01"), None, Some("0001")),
        );
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, GeoField::Localidad);
    }

    #[test]
    fn errors_accumulate_per_field() {
        let lookup = CountingLookup::default();
        let payload = GeographyPayload::new(Some("33"), Some("999"), Some("0002"))
            .with_postal_code("99999");
        let result = validate_geography(&lookup, &payload);
        let fields: Vec<GeoField> = result.errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            [
                GeoField::Entidad,
                GeoField::Municipio,
                GeoField::Localidad,
                GeoField::CodigoPostal
            ]
        );
    }

    #[test]
    fn locality_uses_compound_parent() {
        let lookup = CountingLookup::default();
        let ok = validate_geography(
            &lookup,
            &GeographyPayload::new(Some(" 01 "), Some("999"), Some("0001")),
        );
        assert!(ok.valid);
        let parentless = validate_geography(
            &lookup,
            &GeographyPayload::new(Some("NE"), Some("999"), Some("0001")),
        );
        assert!(parentless.valid);
    }

    #[test]
    fn postal_code_state_must_match() {
        let lookup = CountingLookup::default();
        let result = validate_geography(
            &lookup,
            &GeographyPayload::new(Some("25"), None, None).with_postal_code("20000"),
        );
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].reason.contains("no corresponde"));

        let sentinel_state = validate_geography(
            &lookup,
            &GeographyPayload::new(Some("NE"), None, None).with_postal_code("20000"),
        );
        assert!(sentinel_state.valid);
    }
}

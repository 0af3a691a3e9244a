//! Uniform requirement checks against a resolved policy.
//!
//! | Level             | Absent | Present, malformed | Present, well formed |
//! |-------------------|--------|--------------------|----------------------|
//! | `required`        | reject | reject             | accept               |
//! | `required_strict` | reject | reject*            | accept               |
//! | `optional`        | accept | reject             | accept               |
//!
//! \* for CURPs, generic placeholders count as malformed.

use nom024_model::{
    GeographyPayload, PolicyField, Regime, RegulatoryPolicy, RequirementLevel,
};
use nom024_validate::{
    GeoLookup, is_generic_curp, is_valid_curp, normalize_diagnosis_code, validate_geography,
};
use serde::{Deserialize, Serialize};

/// A field rejected by the policy in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyViolation {
    #[error("el campo {field} es obligatorio bajo el régimen {regime}")]
    Missing { regime: Regime, field: PolicyField },

    #[error("el campo {field} tiene un valor inválido '{value}' bajo el régimen {regime}")]
    Malformed {
        regime: Regime,
        field: PolicyField,
        value: String,
    },
}

impl PolicyViolation {
    pub fn field(&self) -> PolicyField {
        match self {
            Self::Missing { field, .. } | Self::Malformed { field, .. } => *field,
        }
    }
}

/// Apply the field's requirement level to `value`.
///
/// Blank values count as absent.
pub fn check_field(
    policy: &RegulatoryPolicy,
    field: PolicyField,
    value: Option<&str>,
    is_well_formed: impl Fn(&str) -> bool,
) -> Result<(), PolicyViolation> {
    let level = policy.validation.level(field);
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None if level.is_required() => Err(PolicyViolation::Missing {
            regime: policy.regime,
            field,
        }),
        None => Ok(()),
        Some(value) if !is_well_formed(value) => Err(PolicyViolation::Malformed {
            regime: policy.regime,
            field,
            value: value.to_string(),
        }),
        Some(_) => Ok(()),
    }
}

/// CURP check for the signer or worker field.
pub fn check_curp(
    policy: &RegulatoryPolicy,
    field: PolicyField,
    value: Option<&str>,
) -> Result<(), PolicyViolation> {
    let strict = policy.validation.level(field) == RequirementLevel::RequiredStrict;
    check_field(policy, field, value, |curp| {
        is_valid_curp(curp) && !(strict && is_generic_curp(curp))
    })
}

pub fn check_principal_diagnosis(
    policy: &RegulatoryPolicy,
    value: Option<&str>,
) -> Result<(), PolicyViolation> {
    check_field(policy, PolicyField::PrincipalDiagnosis, value, |code| {
        normalize_diagnosis_code(code).is_some()
    })
}

/// Geography is absent when every field is blank and malformed when the
/// geography validator rejects it.
pub fn check_geography<L: GeoLookup + ?Sized>(
    policy: &RegulatoryPolicy,
    lookup: &L,
    payload: &GeographyPayload,
) -> Result<(), PolicyViolation> {
    if payload.is_empty() {
        return check_field(policy, PolicyField::Geography, None, |_| true);
    }
    let validation = validate_geography(lookup, payload);
    if validation.valid {
        return Ok(());
    }
    let value = [
        &payload.entidad,
        &payload.municipio,
        &payload.localidad,
        &payload.codigo_postal,
    ]
    .iter()
    .map(|part| part.as_deref().map_or("-", str::trim))
    .collect::<Vec<_>>()
    .join("/");
    Err(PolicyViolation::Malformed {
        regime: policy.regime,
        field: PolicyField::Geography,
        value,
    })
}

/// Policy-gated fields of a clinical document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDraft {
    #[serde(default)]
    pub signer_curp: Option<String>,
    #[serde(default)]
    pub worker_curp: Option<String>,
    #[serde(default)]
    pub principal_diagnosis: Option<String>,
    #[serde(default)]
    pub geography: GeographyPayload,
}

/// Every violation in `draft`, in field order.
pub fn check_all<L: GeoLookup + ?Sized>(
    policy: &RegulatoryPolicy,
    lookup: &L,
    draft: &DocumentDraft,
) -> Vec<PolicyViolation> {
    [
        check_curp(policy, PolicyField::SignerCurp, draft.signer_curp.as_deref()),
        check_curp(policy, PolicyField::WorkerCurp, draft.worker_curp.as_deref()),
        check_principal_diagnosis(policy, draft.principal_diagnosis.as_deref()),
        check_geography(policy, lookup, &draft.geography),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}

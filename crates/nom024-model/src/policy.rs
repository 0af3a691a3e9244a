//! Regulatory regimes and per-field requirement levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Regulatory policy variant applied to a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Mexican national health-records standard.
    Nom024,
    Unregulated,
}

impl Regime {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Nom024 => "NOM-024",
            Self::Unregulated => "unregulated",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Regime {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "nom024" => Ok(Self::Nom024),
            "unregulated" | "none" | "generic" => Ok(Self::Unregulated),
            _ => Err(ModelError::UnknownRegime(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementLevel {
    Required,
    /// Required, and placeholder values are not accepted.
    RequiredStrict,
    Optional,
}

impl RequirementLevel {
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required | Self::RequiredStrict)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyFeatures {
    pub session_timeout: bool,
    pub enforce_ui_immutability: bool,
    pub enforce_document_immutability: bool,
    pub export_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyValidation {
    pub signer_curp: RequirementLevel,
    pub worker_curp: RequirementLevel,
    pub principal_diagnosis: RequirementLevel,
    pub geography: RequirementLevel,
}

impl PolicyValidation {
    pub fn level(&self, field: PolicyField) -> RequirementLevel {
        match field {
            PolicyField::SignerCurp => self.signer_curp,
            PolicyField::WorkerCurp => self.worker_curp,
            PolicyField::PrincipalDiagnosis => self.principal_diagnosis,
            PolicyField::Geography => self.geography,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulatoryPolicy {
    pub regime: Regime,
    pub features: PolicyFeatures,
    pub validation: PolicyValidation,
}

/// Field gated by a requirement level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyField {
    SignerCurp,
    WorkerCurp,
    PrincipalDiagnosis,
    Geography,
}

impl PolicyField {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SignerCurp => "signer_curp",
            Self::WorkerCurp => "worker_curp",
            Self::PrincipalDiagnosis => "principal_diagnosis",
            Self::Geography => "geography",
        }
    }
}

impl fmt::Display for PolicyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

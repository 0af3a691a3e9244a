//! Diagnosis eligibility rules and validation outcomes.
//!
//! CIE-10 catalogs publish eligibility as three raw columns: `LSEX` (sex
//! restriction), `LINF` and `LSUP` (lower and upper age bounds). Age bounds are
//! encoded as a zero-padded amount followed by a unit letter, e.g. `010A`
//! (10 years), `028D` (28 days) or `006M` (6 months). `NO` means unbounded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Which patients a diagnosis code may be recorded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SexRestriction {
    /// No restriction.
    No,
    Mujer,
    Hombre,
    /// Published by some catalog revisions; treated as unrestricted.
    Si,
}

impl SexRestriction {
    /// Parses an `LSEX` token. Anything unrecognized is unrestricted.
    pub fn from_token(token: Option<&str>) -> Self {
        let Some(token) = token else {
            return Self::No;
        };
        match token.trim().to_ascii_uppercase().as_str() {
            "MUJER" | "F" | "FEMENINO" => Self::Mujer,
            "HOMBRE" | "H" | "MASCULINO" => Self::Hombre,
            "SI" => Self::Si,
            _ => Self::No,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::No => "NO",
            Self::Mujer => "MUJER",
            Self::Hombre => "HOMBRE",
            Self::Si => "SI",
        }
    }

    /// Whether a patient of `sex` satisfies the restriction.
    pub fn allows(&self, sex: PatientSex) -> bool {
        match self {
            Self::No | Self::Si => true,
            Self::Mujer => sex == PatientSex::Female,
            Self::Hombre => sex == PatientSex::Male,
        }
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Mujer | Self::Hombre)
    }
}

impl fmt::Display for SexRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeUnit {
    Years,
    Months,
    Days,
}

impl AgeUnit {
    pub const fn letter(&self) -> char {
        match self {
            Self::Years => 'A',
            Self::Months => 'M',
            Self::Days => 'D',
        }
    }

    fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'A' => Some(Self::Years),
            'M' => Some(Self::Months),
            'D' => Some(Self::Days),
            _ => None,
        }
    }
}

/// One age bound of a diagnosis rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgeLimit {
    pub amount: u32,
    pub unit: AgeUnit,
}

impl AgeLimit {
    pub const fn years(amount: u32) -> Self {
        Self {
            amount,
            unit: AgeUnit::Years,
        }
    }

    /// Parses a raw `LINF`/`LSUP` token.
    ///
    /// Returns `Ok(None)` for an absent, empty or `NO` token. A bare number is
    /// read as years.
    pub fn parse(token: Option<&str>) -> Result<Option<Self>, ModelError> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        if token.eq_ignore_ascii_case("NO") {
            return Ok(None);
        }
        let invalid = || ModelError::InvalidAgeToken(token.to_string());
        let (digits, unit) = match token.char_indices().last() {
            Some((idx, last)) if last.is_ascii_alphabetic() => {
                (&token[..idx], AgeUnit::from_letter(last).ok_or_else(invalid)?)
            }
            _ => (token, AgeUnit::Years),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let amount = digits.parse::<u32>().map_err(|_| invalid())?;
        Ok(Some(Self { amount, unit }))
    }

    /// Fractional-year value of the bound.
    pub fn as_years(&self) -> f64 {
        let amount = f64::from(self.amount);
        match self.unit {
            AgeUnit::Years => amount,
            AgeUnit::Months => amount / 12.0,
            AgeUnit::Days => amount / 365.0,
        }
    }
}

impl fmt::Display for AgeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}{}", self.amount, self.unit.letter())
    }
}

impl FromStr for AgeLimit {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(Some(s))?.ok_or_else(|| ModelError::InvalidAgeToken(s.to_string()))
    }
}

/// Eligibility rule resolved for a diagnosis code.
///
/// `key` is the code that actually matched, which is the 3-character prefix
/// when no exact entry exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisRule {
    pub key: String,
    pub lsex: SexRestriction,
    pub linf: Option<String>,
    pub lsup: Option<String>,
}

impl DiagnosisRule {
    pub fn new(
        key: impl Into<String>,
        lsex: SexRestriction,
        linf: Option<String>,
        lsup: Option<String>,
    ) -> Self {
        Self {
            key: key.into(),
            lsex,
            linf,
            lsup,
        }
    }

    /// Lower bound, or `None` when unbounded or unparseable.
    pub fn min_age(&self) -> Option<AgeLimit> {
        AgeLimit::parse(self.linf.as_deref()).ok().flatten()
    }

    /// Upper bound, or `None` when unbounded or unparseable.
    pub fn max_age(&self) -> Option<AgeLimit> {
        AgeLimit::parse(self.lsup.as_deref()).ok().flatten()
    }

    /// Whether the rule constrains anything at all.
    pub fn is_restrictive(&self) -> bool {
        self.lsex.is_restricted() || self.min_age().is_some() || self.max_age().is_some()
    }
}

/// Binary patient sex used for eligibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientSex {
    Female,
    Male,
}

impl PatientSex {
    /// Normalizes a recorded sex value; returns `None` when it cannot be mapped.
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "F" | "FEMENINO" | "FEMALE" | "MUJER" | "M" => Some(Self::Female),
            "H" | "HOMBRE" | "MASCULINO" | "MALE" => Some(Self::Male),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueReason {
    #[serde(rename = "Sexo no permitido")]
    SexNotAllowed,
    #[serde(rename = "Edad fuera de rango")]
    AgeOutOfRange,
}

impl IssueReason {
    pub const fn message(&self) -> &'static str {
        match self {
            Self::SexNotAllowed => "Sexo no permitido",
            Self::AgeOutOfRange => "Edad fuera de rango",
        }
    }
}

impl fmt::Display for IssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A single eligibility violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisIssue {
    /// Code as submitted.
    pub code: String,
    /// Rule key that produced the violation.
    pub rule_key: String,
    pub reason: IssueReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisValidation {
    pub ok: bool,
    pub issues: Vec<DiagnosisIssue>,
}

impl DiagnosisValidation {
    pub fn from_issues(issues: Vec<DiagnosisIssue>) -> Self {
        Self {
            ok: issues.is_empty(),
            issues,
        }
    }
}

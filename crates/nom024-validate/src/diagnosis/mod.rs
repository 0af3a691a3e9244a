//! Diagnosis eligibility: resolving sex/age rules for CIE-10 codes and checking
//! a patient against them.
//!
//! Rules come from a [`RestrictionSource`]. Two sources ship with the crate:
//! [`StaticRestrictions`] (built-in category table) and [`CatalogRestrictions`]
//! (the loaded CIE-10 catalog). [`LayeredRestrictions`] asks the catalog first
//! and falls back to the table.

mod age;
mod static_rules;

use std::collections::HashMap;

use chrono::NaiveDate;
use nom024_catalog::CatalogCache;
use nom024_model::{
    AgeLimit, CatalogType, DiagnosisIssue, DiagnosisRule, DiagnosisValidation, EntryAttributes,
    IssueReason, PatientSex, SexRestriction,
};

pub use age::{age_in, parse_date, within_window};
pub use static_rules::StaticRestrictions;

/// Resolves the eligibility rule for a diagnosis code.
pub trait RestrictionSource {
    /// `None` means no rule applies and the code always passes.
    fn find_rule(&self, code: &str) -> Option<DiagnosisRule>;
}

/// Normalize a submitted code to its catalog key.
///
/// Drops a trailing `" - description"`, removes `.` separators and
/// upper-cases. Returns `None` unless the result starts with a letter and two
/// digits.
pub fn normalize_diagnosis_code(raw: &str) -> Option<String> {
    let head = raw.split_once(" - ").map_or(raw, |(code, _)| code);
    let code: String = head.trim().replace('.', "").to_uppercase();
    let bytes = code.as_bytes();
    let well_formed = bytes.len() >= 3
        && bytes[0].is_ascii_uppercase()
        && bytes[1].is_ascii_digit()
        && bytes[2].is_ascii_digit();
    well_formed.then_some(code)
}

/// Rules taken from the loaded CIE-10 catalog, exact key then category.
#[derive(Debug, Clone, Copy)]
pub struct CatalogRestrictions<'a> {
    cache: &'a CatalogCache,
}

impl<'a> CatalogRestrictions<'a> {
    pub fn new(cache: &'a CatalogCache) -> Self {
        Self { cache }
    }
}

impl RestrictionSource for CatalogRestrictions<'_> {
    fn find_rule(&self, code: &str) -> Option<DiagnosisRule> {
        find_diagnosis_rule(self.cache, code)
    }
}

/// Catalog rules first, built-in table when the catalog has none.
#[derive(Debug, Clone, Copy)]
pub struct LayeredRestrictions<'a> {
    catalog: CatalogRestrictions<'a>,
    fallback: StaticRestrictions,
}

impl<'a> LayeredRestrictions<'a> {
    pub fn new(cache: &'a CatalogCache) -> Self {
        Self {
            catalog: CatalogRestrictions::new(cache),
            fallback: StaticRestrictions,
        }
    }
}

impl RestrictionSource for LayeredRestrictions<'_> {
    fn find_rule(&self, code: &str) -> Option<DiagnosisRule> {
        self.catalog
            .find_rule(code)
            .or_else(|| self.fallback.find_rule(code))
    }
}

/// Look a code up in the CIE-10 catalog: exact key, then the 3-character
/// category.
pub fn find_diagnosis_rule(cache: &CatalogCache, code: &str) -> Option<DiagnosisRule> {
    let normalized = normalize_diagnosis_code(code)?;
    let store = cache.store(CatalogType::Diagnoses)?;
    let entry = store
        .get(&normalized)
        .or_else(|| store.get(&normalized[..3]))?;
    let EntryAttributes::Diagnosis { lsex, linf, lsup } = &entry.attributes else {
        return None;
    };
    Some(DiagnosisRule::new(
        entry.code.clone(),
        SexRestriction::from_token(lsex.as_deref()),
        linf.clone(),
        lsup.clone(),
    ))
}

/// Diagnoses and patient facts of one clinical document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosisRequest<'a> {
    pub principal: Option<&'a str>,
    pub complementary: &'a [String],
    pub sex: Option<&'a str>,
    pub birth_date: Option<&'a str>,
    /// Defaults to today when absent or unparseable.
    pub encounter_date: Option<&'a str>,
}

impl DiagnosisRequest<'_> {
    fn codes(&self) -> impl Iterator<Item = &str> {
        self.principal
            .into_iter()
            .chain(self.complementary.iter().map(String::as_str))
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

/// Check every diagnosis against the patient's sex and age.
pub fn validate_diagnoses_sex_age<S: RestrictionSource + ?Sized>(
    source: &S,
    request: &DiagnosisRequest<'_>,
) -> DiagnosisValidation {
    validate_diagnoses_sex_age_on(source, request, chrono::Local::now().date_naive())
}

/// As [`validate_diagnoses_sex_age`] with an explicit "today".
pub fn validate_diagnoses_sex_age_on<S: RestrictionSource + ?Sized>(
    source: &S,
    request: &DiagnosisRequest<'_>,
    today: NaiveDate,
) -> DiagnosisValidation {
    let sex = request.sex.and_then(PatientSex::normalize);
    let encounter = request
        .encounter_date
        .and_then(parse_date)
        .unwrap_or(today);
    let birth = request
        .birth_date
        .and_then(parse_date)
        .filter(|birth| *birth <= encounter);
    if request.birth_date.is_some() && birth.is_none() {
        tracing::debug!(
            birth_date = ?request.birth_date,
            "birth date unusable, skipping age checks"
        );
    }

    let mut issues = Vec::new();
    for code in request.codes() {
        let Some(rule) = source.find_rule(code) else {
            continue;
        };
        if let Some(sex) = sex
            && !rule.lsex.allows(sex)
        {
            issues.push(DiagnosisIssue {
                code: code.to_string(),
                rule_key: rule.key.clone(),
                reason: IssueReason::SexNotAllowed,
            });
        }
        if let Some(birth) = birth {
            let min = age_bound(&rule, rule.linf.as_deref());
            let max = age_bound(&rule, rule.lsup.as_deref());
            if !within_window(min, max, birth, encounter) {
                issues.push(DiagnosisIssue {
                    code: code.to_string(),
                    rule_key: rule.key.clone(),
                    reason: IssueReason::AgeOutOfRange,
                });
            }
        }
    }
    DiagnosisValidation::from_issues(issues)
}

fn age_bound(rule: &DiagnosisRule, token: Option<&str>) -> Option<AgeLimit> {
    match AgeLimit::parse(token) {
        Ok(limit) => limit,
        Err(error) => {
            tracing::debug!(rule = %rule.key, %error, "ignoring unparseable age bound");
            None
        }
    }
}

/// Codes that appear more than once across principal and complementary
/// diagnoses, in first-seen order.
///
/// Comparison ignores case and any trailing description.
pub fn find_duplicate_diagnoses<S: AsRef<str>>(
    principal: Option<&str>,
    complementary: &[S],
) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    let codes = principal
        .into_iter()
        .chain(complementary.iter().map(|code| -> &str { code.as_ref() }));
    for raw in codes {
        let key = normalize_diagnosis_code(raw).unwrap_or_else(|| {
            let head = raw.split_once(" - ").map_or(raw, |(code, _)| code);
            head.trim().to_uppercase()
        });
        if key.is_empty() {
            continue;
        }
        let count = counts.entry(key.clone()).or_insert(0);
        *count += 1;
        if *count == 2 {
            order.push(key);
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<DiagnosisRule>);

    impl RestrictionSource for Fixed {
        fn find_rule(&self, _code: &str) -> Option<DiagnosisRule> {
            self.0.clone()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize_diagnosis_code("c53.9"), Some("C539".to_string()));
        assert_eq!(
            normalize_diagnosis_code(" J45 - Asma "),
            Some("J45".to_string())
        );
        assert_eq!(normalize_diagnosis_code("45A"), None);
        assert_eq!(normalize_diagnosis_code("C5"), None);
    }

    #[test]
    fn no_rule_passes() {
        let request = DiagnosisRequest {
            principal: Some("A09"),
            sex: Some("F"),
            birth_date: Some("1990-01-01"),
            ..Default::default()
        };
        let result = validate_diagnoses_sex_age_on(&Fixed(None), &request, today());
        assert!(result.ok);
    }

    #[test]
    fn unknown_sex_skips_only_sex_check() {
        let rule = DiagnosisRule::new(
            "N40",
            SexRestriction::Hombre,
            Some("040A".to_string()),
            None,
        );
        let request = DiagnosisRequest {
            principal: Some("N40"),
            sex: Some("X"),
            birth_date: Some("2000-01-01"),
            encounter_date: Some("2025-01-01"),
            ..Default::default()
        };
        let result = validate_diagnoses_sex_age_on(&Fixed(Some(rule)), &request, today());
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].reason, IssueReason::AgeOutOfRange);
        assert_eq!(result.issues[0].rule_key, "N40");
    }

    #[test]
    fn birth_after_encounter_skips_age() {
        let rule = DiagnosisRule::new("O80", SexRestriction::Mujer, Some("010A".into()), None);
        let request = DiagnosisRequest {
            principal: Some("O80"),
            sex: Some("H"),
            birth_date: Some("2030-01-01"),
            encounter_date: Some("2025-01-01"),
            ..Default::default()
        };
        let result = validate_diagnoses_sex_age_on(&Fixed(Some(rule)), &request, today());
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].reason, IssueReason::SexNotAllowed);
    }

    #[test]
    fn duplicates_in_first_seen_order() {
        let complementary = ["j45 - Asma", "E11", "C53.9", "e11", "E11"];
        assert_eq!(
            find_duplicate_diagnoses(Some("J45"), &complementary),
            ["J45", "E11"]
        );
        assert!(find_duplicate_diagnoses::<&str>(Some("J45"), &[]).is_empty());
    }
}

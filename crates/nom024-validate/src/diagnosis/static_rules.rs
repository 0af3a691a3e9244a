//! Built-in sex/age restrictions by CIE-10 category.

use nom024_model::{DiagnosisRule, SexRestriction};

use super::{RestrictionSource, normalize_diagnosis_code};

struct PrefixRule {
    first: &'static str,
    last: &'static str,
    sex: SexRestriction,
    min_years: Option<u32>,
    max_years: Option<u32>,
}

const fn rule(
    first: &'static str,
    last: &'static str,
    sex: SexRestriction,
    min_years: Option<u32>,
    max_years: Option<u32>,
) -> PrefixRule {
    PrefixRule {
        first,
        last,
        sex,
        min_years,
        max_years,
    }
}

// First matching range wins, so narrower ranges come first.
const RULES: &[PrefixRule] = &[
    // Cervical cancer screening window.
    rule("C53", "C53", SexRestriction::Mujer, Some(25), Some(64)),
    rule("C51", "C58", SexRestriction::Mujer, None, None),
    rule("D06", "D06", SexRestriction::Mujer, None, None),
    rule("N70", "N77", SexRestriction::Mujer, None, None),
    rule("N80", "N98", SexRestriction::Mujer, None, None),
    rule("O00", "O99", SexRestriction::Mujer, Some(10), None),
    rule("Z32", "Z37", SexRestriction::Mujer, Some(10), None),
    rule("C61", "C61", SexRestriction::Hombre, Some(40), None),
    rule("C60", "C63", SexRestriction::Hombre, None, None),
    rule("N40", "N40", SexRestriction::Hombre, Some(40), None),
    rule("N41", "N51", SexRestriction::Hombre, None, None),
];

/// Restrictions hard-coded by 3-character category.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRestrictions;

impl RestrictionSource for StaticRestrictions {
    fn find_rule(&self, code: &str) -> Option<DiagnosisRule> {
        let normalized = normalize_diagnosis_code(code)?;
        let prefix = &normalized[..3];
        let matched = RULES
            .iter()
            .find(|rule| rule.first <= prefix && prefix <= rule.last)?;
        Some(DiagnosisRule::new(
            prefix,
            matched.sex,
            matched.min_years.map(|years| format!("{years:03}A")),
            matched.max_years.map(|years| format!("{years:03}A")),
        ))
    }
}

//! Subcommand implementations.
//!
//! Each `run_*` returns plain data; printing and exit codes live in `main`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use nom024_catalog::{CatalogCache, CatalogConfig, CatalogStats, LoadReport, clamp_search_limit};
use nom024_model::{
    CatalogEntry, DiagnosisValidation, GeographyPayload, GeographyValidation, RegulatoryPolicy,
};
use nom024_policy::{
    DocumentDraft, InMemoryProviderDirectory, PolicyViolation, check_all, get_regulatory_policy,
};
use nom024_validate::{
    CatalogRestrictions, DiagnosisRequest, LayeredRestrictions, StaticRestrictions,
    find_duplicate_diagnoses, validate_diagnoses_sex_age, validate_geography,
};

use crate::cli::{
    DiagnosisArgs, GeoArgs, LookupArgs, MunicipalitiesArgs, PolicyArgs, SearchArgs, StrategyArg,
};

/// Resolve the catalog configuration and load every configured catalog.
pub fn load_cache(catalog_dir: Option<&Path>) -> Result<(CatalogCache, LoadReport)> {
    let config =
        CatalogConfig::discover(catalog_dir).context("failed to resolve catalog configuration")?;
    tracing::debug!(root = %config.root().display(), "catalog configuration resolved");
    Ok(CatalogCache::initialize(&config))
}

pub fn run_catalogs(catalog_dir: Option<&Path>) -> Result<(CatalogStats, LoadReport)> {
    let (cache, report) = load_cache(catalog_dir)?;
    Ok((cache.stats(), report))
}

pub fn run_lookup(catalog_dir: Option<&Path>, args: &LookupArgs) -> Result<Option<CatalogEntry>> {
    let (cache, _) = load_cache(catalog_dir)?;
    Ok(cache.get(args.catalog, &args.code))
}

pub fn run_search(catalog_dir: Option<&Path>, args: &SearchArgs) -> Result<Vec<CatalogEntry>> {
    let (cache, _) = load_cache(catalog_dir)?;
    Ok(cache.search(
        args.catalog,
        args.query.trim(),
        clamp_search_limit(args.limit),
    ))
}

pub fn run_municipalities(
    catalog_dir: Option<&Path>,
    args: &MunicipalitiesArgs,
) -> Result<Vec<CatalogEntry>> {
    let (cache, _) = load_cache(catalog_dir)?;
    Ok(cache.municipalities_of(&args.state))
}

pub fn run_geo(catalog_dir: Option<&Path>, args: &GeoArgs) -> Result<GeographyValidation> {
    let (cache, _) = load_cache(catalog_dir)?;
    let mut payload = GeographyPayload::new(
        args.entidad.as_deref(),
        args.municipio.as_deref(),
        args.localidad.as_deref(),
    );
    payload.codigo_postal.clone_from(&args.codigo_postal);
    Ok(validate_geography(&cache, &payload))
}

/// Sex/age result plus codes listed more than once.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisReport {
    #[serde(flatten)]
    pub validation: DiagnosisValidation,
    pub duplicates: Vec<String>,
}

impl DiagnosisReport {
    pub fn ok(&self) -> bool {
        self.validation.ok
    }
}

pub fn run_diagnosis(catalog_dir: Option<&Path>, args: &DiagnosisArgs) -> Result<DiagnosisReport> {
    let request = DiagnosisRequest {
        principal: args.principal.as_deref(),
        complementary: &args.complementary,
        sex: args.sex.as_deref(),
        birth_date: args.birth_date.as_deref(),
        encounter_date: args.encounter_date.as_deref(),
    };
    let validation = match args.strategy {
        StrategyArg::Static => validate_diagnoses_sex_age(&StaticRestrictions, &request),
        StrategyArg::Catalog => {
            let (cache, _) = load_cache(catalog_dir)?;
            validate_diagnoses_sex_age(&CatalogRestrictions::new(&cache), &request)
        }
        StrategyArg::Layered => {
            let (cache, _) = load_cache(catalog_dir)?;
            validate_diagnoses_sex_age(&LayeredRestrictions::new(&cache), &request)
        }
    };
    Ok(DiagnosisReport {
        validation,
        duplicates: find_duplicate_diagnoses(args.principal.as_deref(), &args.complementary),
    })
}

/// Policy in force for a provider and, when a draft was given, its violations.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyReport {
    pub provider: String,
    pub policy: RegulatoryPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<PolicyViolationView>>,
}

impl PolicyReport {
    pub fn ok(&self) -> bool {
        self.violations.as_ref().is_none_or(Vec::is_empty)
    }
}

/// A violation with its rendered message alongside the structured fields.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyViolationView {
    #[serde(flatten)]
    pub violation: PolicyViolation,
    pub message: String,
}

impl From<PolicyViolation> for PolicyViolationView {
    fn from(violation: PolicyViolation) -> Self {
        let message = violation.to_string();
        Self { violation, message }
    }
}

pub fn run_policy(catalog_dir: Option<&Path>, args: &PolicyArgs) -> Result<PolicyReport> {
    let directory = InMemoryProviderDirectory::from_toml_file(&args.providers)
        .context("failed to load provider directory")?;
    let policy = get_regulatory_policy(&directory, &args.provider);
    let violations = match &args.draft {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read draft {}", path.display()))?;
            let draft: DocumentDraft = serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse draft {}", path.display()))?;
            let (cache, _) = load_cache(catalog_dir)?;
            Some(
                check_all(&policy, &cache, &draft)
                    .into_iter()
                    .map(PolicyViolationView::from)
                    .collect(),
            )
        }
        None => None,
    };
    Ok(PolicyReport {
        provider: args.provider.trim().to_string(),
        policy,
        violations,
    })
}

//! Regime resolution and per-regime presets.

use nom024_model::{
    PolicyFeatures, PolicyValidation, Regime, RegulatoryPolicy, RequirementLevel,
};

use crate::provider::{ProviderDirectory, ProviderProfile};

const NOM024_COUNTRIES: &[&str] = &["MX", "MEX"];

/// Regime for a known provider: explicit tag, then country.
pub fn resolve_regime(profile: &ProviderProfile) -> Regime {
    if let Some(regime) = profile.regime {
        return regime;
    }
    match profile.country_code.as_deref() {
        Some(country) if NOM024_COUNTRIES.contains(&country.trim().to_uppercase().as_str()) => {
            Regime::Nom024
        }
        _ => Regime::Unregulated,
    }
}

/// Preset policy for a regime.
pub fn policy_for(regime: Regime) -> RegulatoryPolicy {
    match regime {
        Regime::Nom024 => RegulatoryPolicy {
            regime,
            features: PolicyFeatures {
                session_timeout: true,
                enforce_ui_immutability: true,
                enforce_document_immutability: true,
                export_enabled: true,
            },
            validation: PolicyValidation {
                signer_curp: RequirementLevel::RequiredStrict,
                worker_curp: RequirementLevel::Required,
                principal_diagnosis: RequirementLevel::Required,
                geography: RequirementLevel::Required,
            },
        },
        Regime::Unregulated => RegulatoryPolicy {
            regime,
            features: PolicyFeatures {
                session_timeout: false,
                enforce_ui_immutability: false,
                enforce_document_immutability: false,
                export_enabled: false,
            },
            validation: PolicyValidation {
                signer_curp: RequirementLevel::Optional,
                worker_curp: RequirementLevel::Optional,
                principal_diagnosis: RequirementLevel::Optional,
                geography: RequirementLevel::Optional,
            },
        },
    }
}

/// Resolve the policy that applies to `provider_id`.
///
/// Unknown providers get the unregulated policy.
pub fn get_regulatory_policy<D: ProviderDirectory + ?Sized>(
    directory: &D,
    provider_id: &str,
) -> RegulatoryPolicy {
    let regime = match directory.find_provider(provider_id) {
        Some(profile) => resolve_regime(&profile),
        None => {
            tracing::warn!(provider = provider_id, "unknown provider, applying unregulated policy");
            Regime::Unregulated
        }
    };
    policy_for(regime)
}

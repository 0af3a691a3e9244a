//! Regulatory policy resolution.
//!
//! A provider maps to exactly one [`Regime`](nom024_model::Regime). The regime
//! fixes feature flags and a requirement level for each gated field; the
//! [`checks`] module applies those levels uniformly to document drafts.

pub mod checks;
pub mod provider;
pub mod resolver;

pub use checks::{
    DocumentDraft, PolicyViolation, check_all, check_curp, check_field, check_geography,
    check_principal_diagnosis,
};
pub use provider::{DirectoryError, InMemoryProviderDirectory, ProviderDirectory, ProviderProfile};
pub use resolver::{get_regulatory_policy, policy_for, resolve_regime};

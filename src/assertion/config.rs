//! Authority configuration handed to `initialize`
//!
//! The config is a JSON object. Both fields are optional:
//!
//! ```json
//! { "authority_type": "SGX Local", "attestation_domain": "A 16-byte string" }
//! ```
//!
//! An empty string is the empty config. Key material is never configured;
//! the report key is always derived on the platform.

use super::messages::{AttestationDomain, AuthorityType};
use crate::error::{AttestationError, AttestationResult};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    authority_type: Option<AuthorityType>,
    attestation_domain: Option<String>,
}

/// Parsed configuration of a local assertion authority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAuthorityConfig {
    pub attestation_domain: AttestationDomain,
}

impl LocalAuthorityConfig {
    pub fn parse(config: &str) -> AttestationResult<Self> {
        Self::parse_for(AuthorityType::SgxLocal, config).map(|attestation_domain| Self {
            attestation_domain,
        })
    }

    /// Shared parsing for every scheme: checks the optional tag against
    /// `expected` and returns the attestation domain
    pub(crate) fn parse_for(
        expected: AuthorityType,
        config: &str,
    ) -> AttestationResult<AttestationDomain> {
        let raw: RawConfig = if config.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_json::from_str(config)
                .map_err(|e| AttestationError::InvalidConfig(e.to_string()))?
        };

        if let Some(authority_type) = raw.authority_type {
            if authority_type != expected {
                return Err(AttestationError::InvalidConfig(format!(
                    "config is for authority {}, expected {}",
                    authority_type, expected
                )));
            }
        }

        match raw.attestation_domain {
            Some(label) => AttestationDomain::new(label),
            None => Ok(AttestationDomain::default()),
        }
    }
}

impl Default for LocalAuthorityConfig {
    fn default() -> Self {
        Self {
            attestation_domain: AttestationDomain::default(),
        }
    }
}

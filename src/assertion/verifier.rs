//! Local Assertion Verifier - checks a peer's assertion and extracts its identity
//!
//! Verification recomputes the binding from the user data and the tag
//! under the platform report key. The verifier must itself be executing
//! inside an enclave on the same platform; it does not need the generator's
//! identity since the key is shared by the whole platform.

use super::binding::{bind_user_data, compute_tag, verify_binding_and_tag};
use super::config::LocalAuthorityConfig;
use super::messages::{
    Assertion, AssertionOffer, AssertionRequest, AuthorityInfo, AuthorityType,
    ExtractedIdentity, LocalAssertionPayload,
};
use super::AssertionVerifier;
use crate::error::{AttestationError, AttestationResult};
use crate::identity::RootOfTrust;
use std::sync::{Arc, OnceLock};

/// Verifier side of the local assertion scheme
pub struct LocalAssertionVerifier {
    root: Arc<dyn RootOfTrust>,
    config: OnceLock<LocalAuthorityConfig>,
}

impl LocalAssertionVerifier {
    pub fn new(root: Arc<dyn RootOfTrust>) -> Self {
        Self {
            root,
            config: OnceLock::new(),
        }
    }

    fn config(&self) -> AttestationResult<&LocalAuthorityConfig> {
        self.config.get().ok_or(AttestationError::NotInitialized)
    }
}

impl AssertionVerifier for LocalAssertionVerifier {
    fn initialize(&self, config: &str) -> AttestationResult<()> {
        let parsed = LocalAuthorityConfig::parse(config)?;
        let domain = parsed.attestation_domain.clone();
        self.config
            .set(parsed)
            .map_err(|_| AttestationError::AlreadyInitialized)?;
        log::info!(
            "Local assertion verifier initialized: domain={:?}",
            domain.as_str()
        );
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.config.get().is_some()
    }

    fn authority_type(&self) -> AuthorityType {
        AuthorityType::SgxLocal
    }

    fn create_assertion_request(&self) -> AttestationResult<AssertionRequest> {
        let config = self.config()?;
        Ok(AssertionRequest::new(AuthorityInfo::SgxLocal {
            attestation_domain: config.attestation_domain.clone(),
        }))
    }

    fn can_verify(&self, offer: &AssertionOffer) -> AttestationResult<bool> {
        let config = self.config()?;
        Ok(offer.info.matches_local_domain(&config.attestation_domain))
    }

    fn verify(&self, user_data: &[u8], assertion: &Assertion) -> AttestationResult<ExtractedIdentity> {
        self.config()?;
        if assertion.authority_type != AuthorityType::SgxLocal {
            log::warn!(
                "Rejected assertion from authority {}",
                assertion.authority_type
            );
            return Err(AttestationError::IncompatibleAssertion);
        }

        let verifier_identity = self.root.current_identity()?;
        let key = self.root.derive_report_key()?;

        let payload = LocalAssertionPayload::decode(&assertion.payload)?;
        let binding = bind_user_data(user_data);
        let tag = compute_tag(&key, &payload.identity, &binding);

        if !verify_binding_and_tag(&binding, &payload.binding, &tag, &payload.tag) {
            log::warn!(
                "Local assertion failed verification in {}",
                verifier_identity.short_id()
            );
            return Err(AttestationError::InvalidAssertion);
        }

        log::debug!(
            "Verified local assertion from {} in {}",
            payload.identity.short_id(),
            verifier_identity.short_id()
        );
        Ok(ExtractedIdentity {
            authority_type: AuthorityType::SgxLocal,
            identity: Some(payload.identity),
        })
    }
}

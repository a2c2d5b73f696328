//! Null assertion authority - asserts no identity at all
//!
//! Shares the request/offer/assertion envelope with the local scheme. A
//! null assertion has an empty payload and verifies to an empty identity.

use super::config::LocalAuthorityConfig;
use super::messages::{
    Assertion, AssertionOffer, AssertionRequest, AuthorityInfo, AuthorityType, ExtractedIdentity,
};
use super::{AssertionGenerator, AssertionVerifier};
use crate::error::{AttestationError, AttestationResult};
use std::sync::OnceLock;

fn initialize_null(initialized: &OnceLock<()>, config: &str) -> AttestationResult<()> {
    LocalAuthorityConfig::parse_for(AuthorityType::Null, config)?;
    initialized
        .set(())
        .map_err(|_| AttestationError::AlreadyInitialized)
}

fn ensure_initialized(initialized: &OnceLock<()>) -> AttestationResult<()> {
    initialized.get().copied().ok_or(AttestationError::NotInitialized)
}

#[derive(Debug, Default)]
pub struct NullAssertionGenerator {
    initialized: OnceLock<()>,
}

impl NullAssertionGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssertionGenerator for NullAssertionGenerator {
    fn initialize(&self, config: &str) -> AttestationResult<()> {
        initialize_null(&self.initialized, config)
    }

    fn is_initialized(&self) -> bool {
        self.initialized.get().is_some()
    }

    fn authority_type(&self) -> AuthorityType {
        AuthorityType::Null
    }

    fn create_assertion_offer(&self) -> AttestationResult<AssertionOffer> {
        ensure_initialized(&self.initialized)?;
        Ok(AssertionOffer::new(AuthorityInfo::Null))
    }

    fn can_generate(&self, request: &AssertionRequest) -> AttestationResult<bool> {
        ensure_initialized(&self.initialized)?;
        Ok(request.info == AuthorityInfo::Null)
    }

    fn generate(&self, _user_data: &[u8], request: &AssertionRequest) -> AttestationResult<Assertion> {
        if !self.can_generate(request)? {
            return Err(AttestationError::IncompatibleRequest);
        }
        Ok(Assertion::new(AuthorityType::Null, Vec::new()))
    }
}

#[derive(Debug, Default)]
pub struct NullAssertionVerifier {
    initialized: OnceLock<()>,
}

impl NullAssertionVerifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssertionVerifier for NullAssertionVerifier {
    fn initialize(&self, config: &str) -> AttestationResult<()> {
        initialize_null(&self.initialized, config)
    }

    fn is_initialized(&self) -> bool {
        self.initialized.get().is_some()
    }

    fn authority_type(&self) -> AuthorityType {
        AuthorityType::Null
    }

    fn create_assertion_request(&self) -> AttestationResult<AssertionRequest> {
        ensure_initialized(&self.initialized)?;
        Ok(AssertionRequest::new(AuthorityInfo::Null))
    }

    fn can_verify(&self, offer: &AssertionOffer) -> AttestationResult<bool> {
        ensure_initialized(&self.initialized)?;
        Ok(offer.info == AuthorityInfo::Null)
    }

    fn verify(&self, _user_data: &[u8], assertion: &Assertion) -> AttestationResult<ExtractedIdentity> {
        ensure_initialized(&self.initialized)?;
        if assertion.authority_type != AuthorityType::Null {
            return Err(AttestationError::IncompatibleAssertion);
        }
        if !assertion.payload.is_empty() {
            return Err(AttestationError::InvalidAssertion);
        }
        Ok(ExtractedIdentity {
            authority_type: AuthorityType::Null,
            identity: None,
        })
    }
}

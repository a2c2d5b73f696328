//! Assertion - enclave identity assertions between peers on one platform
//!
//! Protocol flow:
//! 1. The verifier publishes an [`AssertionRequest`]; the generator checks
//!    it with [`AssertionGenerator::can_generate`]
//! 2. The generator publishes an [`AssertionOffer`]; the verifier checks it
//!    with [`AssertionVerifier::can_verify`]
//! 3. The generator turns the request and the user data into an [`Assertion`]
//! 4. The verifier turns the assertion and the same user data into an
//!    [`ExtractedIdentity`]
//!
//! No session state is kept between steps; everything the verifier needs
//! travels inside the assertion.

pub mod binding;
pub mod config;
pub mod generator;
pub mod messages;
pub mod null;
pub mod verifier;

use crate::error::AttestationResult;

pub use config::LocalAuthorityConfig;
pub use generator::LocalAssertionGenerator;
pub use messages::{
    Assertion, AssertionOffer, AssertionRequest, AttestationDomain, AuthorityInfo, AuthorityType,
    ExtractedIdentity, LocalAssertionPayload, ATTESTATION_DOMAIN_LEN,
};
pub use null::{NullAssertionGenerator, NullAssertionVerifier};
pub use verifier::LocalAssertionVerifier;

/// Producing side of an assertion scheme
pub trait AssertionGenerator: Send + Sync {
    /// Must succeed once before any other operation
    fn initialize(&self, config: &str) -> AttestationResult<()>;

    fn is_initialized(&self) -> bool;

    fn authority_type(&self) -> AuthorityType;

    fn create_assertion_offer(&self) -> AttestationResult<AssertionOffer>;

    /// Whether `request` can be fulfilled. Static property of the
    /// authority; does not depend on the executing identity.
    fn can_generate(&self, request: &AssertionRequest) -> AttestationResult<bool>;

    fn generate(&self, user_data: &[u8], request: &AssertionRequest) -> AttestationResult<Assertion>;
}

/// Checking side of an assertion scheme
pub trait AssertionVerifier: Send + Sync {
    /// Must succeed once before any other operation
    fn initialize(&self, config: &str) -> AttestationResult<()>;

    fn is_initialized(&self) -> bool;

    fn authority_type(&self) -> AuthorityType;

    fn create_assertion_request(&self) -> AttestationResult<AssertionRequest>;

    fn can_verify(&self, offer: &AssertionOffer) -> AttestationResult<bool>;

    fn verify(&self, user_data: &[u8], assertion: &Assertion) -> AttestationResult<ExtractedIdentity>;
}

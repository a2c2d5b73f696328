//! Local Assertion - hardware-rooted identity attestation between enclaves
//!
//! Lets code running in one enclave prove its identity to code running in
//! another enclave on the same platform, bound to caller-supplied data so
//! the proof cannot be replayed for another purpose or forwarded to
//! another machine.

pub mod assertion;
pub mod error;
pub mod identity;

pub use assertion::{
    Assertion, AssertionGenerator, AssertionOffer, AssertionRequest, AssertionVerifier,
    AttestationDomain, AuthorityType, ExtractedIdentity, LocalAssertionGenerator,
    LocalAssertionVerifier, NullAssertionGenerator, NullAssertionVerifier,
};
pub use error::{AttestationError, AttestationResult};
pub use identity::{IdentityModel, IdentityRegister, RootOfTrust, SimulatedEnclave};

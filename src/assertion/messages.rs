//! Protocol Messages - the envelope shared by every assertion scheme
//!
//! A verifier publishes an [`AssertionRequest`], a generator publishes an
//! [`AssertionOffer`], the generator answers a request with an
//! [`Assertion`], and a successful verification yields an
//! [`ExtractedIdentity`]. Requests and offers are tagged unions over the
//! supported schemes; they describe capability only and never carry
//! identity or key material.

use super::binding::{BINDING_LEN, TAG_LEN};
use crate::error::{AttestationError, AttestationResult};
use crate::identity::IdentityModel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of an attestation domain label
pub const ATTESTATION_DOMAIN_LEN: usize = 16;

/// Supported assertion schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorityType {
    /// Local assertion between enclaves on the same platform
    #[serde(rename = "SGX Local")]
    SgxLocal,
    /// Asserts nothing; accepted by any null verifier
    #[serde(rename = "Any")]
    Null,
}

impl AuthorityType {
    pub fn name(&self) -> &'static str {
        match self {
            AuthorityType::SgxLocal => "SGX Local",
            AuthorityType::Null => "Any",
        }
    }
}

impl fmt::Display for AuthorityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Label naming the local attestation domain both peers expect to share
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttestationDomain(String);

impl AttestationDomain {
    pub fn new(label: impl Into<String>) -> AttestationResult<Self> {
        let label = label.into();
        if label.len() != ATTESTATION_DOMAIN_LEN {
            return Err(AttestationError::InvalidConfig(format!(
                "attestation domain must be {} bytes, got {}",
                ATTESTATION_DOMAIN_LEN,
                label.len()
            )));
        }
        Ok(Self(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AttestationDomain {
    fn default() -> Self {
        Self("A 16-byte string".to_string())
    }
}

impl TryFrom<String> for AttestationDomain {
    type Error = AttestationError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Self::new(label)
    }
}

impl From<AttestationDomain> for String {
    fn from(domain: AttestationDomain) -> Self {
        domain.0
    }
}

/// Scheme-specific capability description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "authority_type")]
pub enum AuthorityInfo {
    #[serde(rename = "SGX Local")]
    SgxLocal { attestation_domain: AttestationDomain },
    #[serde(rename = "Any")]
    Null,
}

impl AuthorityInfo {
    pub fn authority_type(&self) -> AuthorityType {
        match self {
            AuthorityInfo::SgxLocal { .. } => AuthorityType::SgxLocal,
            AuthorityInfo::Null => AuthorityType::Null,
        }
    }

    /// True iff this is a local-scheme description for `domain`
    pub fn matches_local_domain(&self, domain: &AttestationDomain) -> bool {
        match self {
            AuthorityInfo::SgxLocal { attestation_domain } => attestation_domain == domain,
            AuthorityInfo::Null => false,
        }
    }
}

/// What a verifier is prepared to accept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionRequest {
    pub info: AuthorityInfo,
}

impl AssertionRequest {
    pub fn new(info: AuthorityInfo) -> Self {
        Self { info }
    }

    pub fn authority_type(&self) -> AuthorityType {
        self.info.authority_type()
    }
}

/// What a generator is able to produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionOffer {
    pub info: AuthorityInfo,
}

impl AssertionOffer {
    pub fn new(info: AuthorityInfo) -> Self {
        Self { info }
    }

    pub fn authority_type(&self) -> AuthorityType {
        self.info.authority_type()
    }
}

/// Proof of identity bound to caller-supplied data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    pub authority_type: AuthorityType,
    /// Scheme-specific, opaque to the envelope
    #[serde(with = "hex")]
    pub payload: Vec<u8>,
}

impl Assertion {
    pub fn new(authority_type: AuthorityType, payload: Vec<u8>) -> Self {
        Self {
            authority_type,
            payload,
        }
    }

    pub fn to_bytes(&self) -> AttestationResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> AttestationResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Payload of an [`AuthorityType::SgxLocal`] assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalAssertionPayload {
    /// Identity of the generating enclave
    pub identity: IdentityModel,
    /// SHA-256 of the user data
    #[serde(with = "hex")]
    pub binding: [u8; BINDING_LEN],
    /// Keyed hash over identity and binding under the report key
    #[serde(with = "hex")]
    pub tag: [u8; TAG_LEN],
}

impl LocalAssertionPayload {
    pub fn encode(&self) -> AttestationResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Any decoding failure is reported as [`AttestationError::InvalidAssertion`]
    pub fn decode(bytes: &[u8]) -> AttestationResult<Self> {
        serde_json::from_slice(bytes).map_err(|_| AttestationError::InvalidAssertion)
    }
}

/// Identity recovered from a verified assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedIdentity {
    pub authority_type: AuthorityType,
    /// `None` for schemes that assert no identity
    pub identity: Option<IdentityModel>,
}

impl ExtractedIdentity {
    pub fn identity(&self) -> Option<&IdentityModel> {
        self.identity.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attestation_domain_length() {
        assert!(AttestationDomain::new("A 16-byte string").is_ok());
        assert!(matches!(
            AttestationDomain::new("short"),
            Err(AttestationError::InvalidConfig(_))
        ));
        assert_eq!(AttestationDomain::default().as_str().len(), ATTESTATION_DOMAIN_LEN);
    }

    #[test]
    fn test_request_wire_form() {
        let request = AssertionRequest::new(AuthorityInfo::SgxLocal {
            attestation_domain: AttestationDomain::default(),
        });
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["info"]["authority_type"], "SGX Local");
        assert_eq!(json["info"]["attestation_domain"], "A 16-byte string");

        let back: AssertionRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
        assert_eq!(back.authority_type(), AuthorityType::SgxLocal);
    }

    #[test]
    fn test_bad_domain_rejected_on_decode() {
        let json = r#"{"info":{"authority_type":"SGX Local","attestation_domain":"nope"}}"#;
        assert!(serde_json::from_str::<AssertionOffer>(json).is_err());
    }

    #[test]
    fn test_matches_local_domain() {
        let domain = AttestationDomain::default();
        let other = AttestationDomain::new("0123456789abcdef").unwrap();
        let info = AuthorityInfo::SgxLocal {
            attestation_domain: domain.clone(),
        };

        assert!(info.matches_local_domain(&domain));
        assert!(!info.matches_local_domain(&other));
        assert!(!AuthorityInfo::Null.matches_local_domain(&domain));
    }

    #[test]
    fn test_null_info() {
        let offer = AssertionOffer::new(AuthorityInfo::Null);
        assert_eq!(offer.authority_type(), AuthorityType::Null);
        assert_eq!(AuthorityType::Null.to_string(), "Any");
    }

    #[test]
    fn test_assertion_bytes() {
        let assertion = Assertion::new(AuthorityType::SgxLocal, vec![1, 2, 3, 0xff]);
        let bytes = assertion.to_bytes().unwrap();
        assert_eq!(Assertion::from_bytes(&bytes).unwrap(), assertion);
        assert!(Assertion::from_bytes(b"not json").is_err());
    }

    #[test]
    fn test_payload_decode_failure_is_invalid_assertion() {
        assert!(matches!(
            LocalAssertionPayload::decode(b"{}"),
            Err(AttestationError::InvalidAssertion)
        ));
    }
}

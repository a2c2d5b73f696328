//! Cryptographic binding of an assertion to user data and to the platform
//!
//! binding = SHA-256(user_data)
//! tag     = BLAKE3-keyed(report_key, canonical(identity) || binding)

use crate::identity::{IdentityModel, ReportKey};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub const BINDING_LEN: usize = 32;
pub const TAG_LEN: usize = blake3::OUT_LEN;

/// Hash of the caller-supplied data
pub fn bind_user_data(user_data: &[u8]) -> [u8; BINDING_LEN] {
    Sha256::digest(user_data).into()
}

/// Authentication tag over `identity` and `binding`
pub fn compute_tag(
    key: &ReportKey,
    identity: &IdentityModel,
    binding: &[u8; BINDING_LEN],
) -> [u8; TAG_LEN] {
    let mut hasher = blake3::Hasher::new_keyed(key.as_bytes());
    hasher.update(&identity.canonical_bytes());
    hasher.update(binding);
    *hasher.finalize().as_bytes()
}

/// Checks both binding and tag in constant time. Both comparisons are
/// always evaluated; the result does not reveal which one failed.
pub fn verify_binding_and_tag(
    expected_binding: &[u8; BINDING_LEN],
    binding: &[u8; BINDING_LEN],
    expected_tag: &[u8; TAG_LEN],
    tag: &[u8; TAG_LEN],
) -> bool {
    let binding_ok = expected_binding[..].ct_eq(&binding[..]);
    let tag_ok = expected_tag[..].ct_eq(&tag[..]);
    (binding_ok & tag_ok).into()
}

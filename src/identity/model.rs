//! Identity Model - the measured identity of a piece of enclave code
//!
//! An [`IdentityModel`] is what a local assertion proves: the code
//! measurement (MRENCLAVE), the signer (MRSIGNER), the product/version pair
//! used for compatibility gating, and the runtime capability bitmasks.
//! Equality is exact: two identities are equal iff every field is equal.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of the measurement and signer digests
pub const DIGEST_LEN: usize = 32;

/// Length of [`IdentityModel::canonical_bytes`]
pub const CANONICAL_LEN: usize = DIGEST_LEN * 2 + 2 + 2 + 4 + 8 + 8;

/// Enclave attribute bitmasks (SECS.ATTRIBUTES)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attributes {
    /// Feature flags (INIT, DEBUG, MODE64BIT, ...)
    pub flags: u64,
    /// Extended feature request mask
    pub xfrm: u64,
}

impl Attributes {
    pub const INIT: u64 = 0x0000_0000_0000_0001;
    pub const DEBUG: u64 = 0x0000_0000_0000_0002;
    pub const MODE64BIT: u64 = 0x0000_0000_0000_0004;
    pub const PROVISION_KEY: u64 = 0x0000_0000_0000_0010;

    /// x87 and SSE state, the minimum legal XFRM
    pub const XFRM_LEGACY: u64 = 0x0000_0000_0000_0003;

    pub fn new(flags: u64, xfrm: u64) -> Self {
        Self { flags, xfrm }
    }

    pub fn is_debug(&self) -> bool {
        self.flags & Self::DEBUG != 0
    }

    pub fn is_set(&self, flag: u64) -> bool {
        self.flags & flag == flag
    }
}

/// Measured identity of enclave code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityModel {
    /// MRENCLAVE - hash of enclave code + data at build time
    #[serde(with = "hex")]
    measurement: [u8; DIGEST_LEN],
    /// MRSIGNER - hash of the signing key
    #[serde(with = "hex")]
    signer: [u8; DIGEST_LEN],
    /// ISVPRODID
    product_id: u16,
    /// ISVSVN
    version: u16,
    /// MISCSELECT
    misc_select: u32,
    attributes: Attributes,
}

impl IdentityModel {
    /// Create an identity with the given digests, version 0, product 0 and
    /// a non-debug 64-bit attribute set
    pub fn new(measurement: [u8; DIGEST_LEN], signer: [u8; DIGEST_LEN]) -> Self {
        Self {
            measurement,
            signer,
            product_id: 0,
            version: 0,
            misc_select: 0,
            attributes: Attributes::new(
                Attributes::INIT | Attributes::MODE64BIT,
                Attributes::XFRM_LEGACY,
            ),
        }
    }

    /// Compute an identity from code and signer key bytes (simulated via SHA256)
    pub fn measure(code: &[u8], signer_key: &[u8]) -> Self {
        let measurement = {
            let mut h = Sha256::new();
            h.update(code);
            h.update(b"mrenclave-v1");
            h.finalize().into()
        };
        let signer = {
            let mut h = Sha256::new();
            h.update(signer_key);
            h.update(b"mrsigner-v1");
            h.finalize().into()
        };
        Self::new(measurement, signer)
    }

    /// A fresh identity with random digests, product ID, version, MISCSELECT
    /// and XFRM. INIT and MODE64BIT are always set; DEBUG is random.
    pub fn random() -> Self {
        let mut flags = Attributes::INIT | Attributes::MODE64BIT;
        if rand::random::<bool>() {
            flags |= Attributes::DEBUG;
        }
        Self {
            measurement: rand::random(),
            signer: rand::random(),
            product_id: rand::random(),
            version: rand::random(),
            misc_select: rand::random(),
            attributes: Attributes::new(flags, Attributes::XFRM_LEGACY | rand::random::<u64>()),
        }
    }

    pub fn with_product_id(mut self, product_id: u16) -> Self {
        self.product_id = product_id;
        self
    }

    pub fn with_version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    pub fn with_misc_select(mut self, misc_select: u32) -> Self {
        self.misc_select = misc_select;
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn measurement(&self) -> &[u8; DIGEST_LEN] {
        &self.measurement
    }

    pub fn signer(&self) -> &[u8; DIGEST_LEN] {
        &self.signer
    }

    pub fn product_id(&self) -> u16 {
        self.product_id
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn misc_select(&self) -> u32 {
        self.misc_select
    }

    pub fn attributes(&self) -> Attributes {
        self.attributes
    }

    pub fn is_debug(&self) -> bool {
        self.attributes.is_debug()
    }

    /// Fixed-width little-endian encoding, used as MAC input.
    ///
    /// Layout: measurement | signer | product_id | version | misc_select |
    /// attributes.flags | attributes.xfrm
    pub fn canonical_bytes(&self) -> [u8; CANONICAL_LEN] {
        let mut out = [0u8; CANONICAL_LEN];
        let mut at = 0;
        let mut put = |bytes: &[u8]| {
            out[at..at + bytes.len()].copy_from_slice(bytes);
            at += bytes.len();
        };
        put(&self.measurement);
        put(&self.signer);
        put(&self.product_id.to_le_bytes());
        put(&self.version.to_le_bytes());
        put(&self.misc_select.to_le_bytes());
        put(&self.attributes.flags.to_le_bytes());
        put(&self.attributes.xfrm.to_le_bytes());
        out
    }

    /// First four measurement bytes as hex, for log lines
    pub fn short_id(&self) -> String {
        hex::encode(&self.measurement[..4])
    }
}

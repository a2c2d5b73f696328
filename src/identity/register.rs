//! Identity Register - simulated hardware root of trust
//!
//! Stands in for the identity and key-derivation instructions of a real
//! enclave platform:
//! - **Current identity**: the one identity presently executing, toggled by
//!   explicit enter/exit calls
//! - **Platform secret**: one secret per simulated machine, materialized on
//!   first use and shared by every identity on that machine
//!
//! One [`IdentityRegister`] models one machine. Generators and verifiers
//! receive it through the [`RootOfTrust`] trait, so a hardware-backed
//! implementation can replace it without touching the authorities.

use super::model::IdentityModel;
use crate::error::{AttestationError, AttestationResult};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// Length of the platform secret and of derived keys
pub const KEY_LEN: usize = 32;

const REPORT_KEY_CONTEXT: &str = "local-assertion report key v1";

/// Access to the executing identity and the platform key hierarchy
pub trait RootOfTrust: Send + Sync {
    /// Identity of the code presently executing
    fn current_identity(&self) -> AttestationResult<IdentityModel>;

    /// Key used to authenticate local assertions. Identical for every
    /// identity on the same platform.
    fn derive_report_key(&self) -> AttestationResult<ReportKey>;
}

/// The shared secret of one simulated machine
pub struct PlatformSecret([u8; KEY_LEN]);

impl PlatformSecret {
    fn generate() -> Self {
        Self(rand::random())
    }

    fn derive_key(&self, context: &str) -> [u8; KEY_LEN] {
        blake3::derive_key(context, &self.0)
    }
}

impl fmt::Debug for PlatformSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlatformSecret(<redacted>)")
    }
}

/// MAC key derived from the platform secret
#[derive(Clone)]
pub struct ReportKey([u8; KEY_LEN]);

impl ReportKey {
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReportKey(<redacted>)")
    }
}

/// Process-local model of one machine's identity hardware
pub struct IdentityRegister {
    current: Mutex<Option<IdentityModel>>,
    secret: OnceLock<PlatformSecret>,
}

impl IdentityRegister {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
            secret: OnceLock::new(),
        }
    }

    /// Make `identity` available for entry on this platform
    pub fn set_identity(self: &Arc<Self>, identity: IdentityModel) -> SimulatedEnclave {
        SimulatedEnclave {
            register: Arc::clone(self),
            identity,
        }
    }

    /// Make a freshly randomized identity available for entry
    pub fn set_random_identity(self: &Arc<Self>) -> SimulatedEnclave {
        self.set_identity(IdentityModel::random())
    }

    /// Start executing as `identity`.
    ///
    /// Fails with [`AttestationError::AlreadyInEnclave`] if any identity is
    /// already active; nesting is not supported.
    pub fn enter(&self, identity: IdentityModel) -> AttestationResult<()> {
        let mut slot = self.slot();
        if slot.is_some() {
            log::warn!("Rejected enclave entry for {}: slot occupied", identity.short_id());
            return Err(AttestationError::AlreadyInEnclave);
        }
        log::info!("Entered enclave {}", identity.short_id());
        *slot = Some(identity);
        Ok(())
    }

    /// Stop executing inside an enclave. No-op when the slot is empty.
    pub fn exit(&self) {
        if let Some(identity) = self.slot().take() {
            log::info!("Exited enclave {}", identity.short_id());
        }
    }

    /// Clears the slot only while it still holds `identity`
    pub(crate) fn exit_if(&self, identity: &IdentityModel) {
        let mut slot = self.slot();
        if slot.as_ref() == Some(identity) {
            log::info!("Exited enclave {}", identity.short_id());
            *slot = None;
        }
    }

    /// Whether some identity is currently active
    pub fn is_inside(&self) -> bool {
        self.slot().is_some()
    }

    /// The active identity, or [`AttestationError::NotInEnclave`]
    pub fn current_identity(&self) -> AttestationResult<IdentityModel> {
        self.slot().clone().ok_or(AttestationError::NotInEnclave)
    }

    /// The platform secret, created on first call and fixed afterwards
    pub fn derive_platform_secret(&self) -> &PlatformSecret {
        self.secret.get_or_init(|| {
            log::info!("Materialized platform secret");
            PlatformSecret::generate()
        })
    }

    // The slot only ever holds a complete value, so a panic while the
    // lock was held cannot leave it inconsistent.
    fn slot(&self) -> MutexGuard<'_, Option<IdentityModel>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for IdentityRegister {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdentityRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityRegister")
            .field("current", &*self.slot())
            .field("secret_initialized", &self.secret.get().is_some())
            .finish()
    }
}

impl RootOfTrust for IdentityRegister {
    fn current_identity(&self) -> AttestationResult<IdentityModel> {
        IdentityRegister::current_identity(self)
    }

    fn derive_report_key(&self) -> AttestationResult<ReportKey> {
        Ok(ReportKey(self.derive_platform_secret().derive_key(REPORT_KEY_CONTEXT)))
    }
}

/// An identity loaded on a simulated platform, ready to be entered
#[derive(Debug, Clone)]
pub struct SimulatedEnclave {
    register: Arc<IdentityRegister>,
    identity: IdentityModel,
}

impl SimulatedEnclave {
    pub fn identity(&self) -> &IdentityModel {
        &self.identity
    }

    pub fn register(&self) -> &Arc<IdentityRegister> {
        &self.register
    }

    pub fn set_identity(&mut self, identity: IdentityModel) {
        self.identity = identity;
    }

    pub fn set_random_identity(&mut self) {
        self.identity = IdentityModel::random();
    }

    /// Enter this enclave on its platform
    pub fn enter(&self) -> AttestationResult<()> {
        self.register.enter(self.identity.clone())
    }

    /// Enter this enclave and exit again when the guard drops
    pub fn enter_scoped(&self) -> AttestationResult<EnclaveGuard<'_>> {
        self.enter()?;
        Ok(EnclaveGuard {
            register: &self.register,
            identity: self.identity.clone(),
        })
    }
}

/// Exits the enclave on drop, unless another identity has taken the slot
#[must_use = "the enclave is exited as soon as the guard is dropped"]
#[derive(Debug)]
pub struct EnclaveGuard<'a> {
    register: &'a IdentityRegister,
    identity: IdentityModel,
}

impl Drop for EnclaveGuard<'_> {
    fn drop(&mut self) {
        self.register.exit_if(&self.identity);
    }
}

//! Identity - who is executing, and the platform secret they share
//!
//! - **Model**: the measured identity of enclave code
//! - **Register**: the simulated root of trust holding the executing
//!   identity and the per-machine platform secret

pub mod model;
pub mod register;

pub use model::{Attributes, IdentityModel, CANONICAL_LEN, DIGEST_LEN};
pub use register::{
    EnclaveGuard, IdentityRegister, PlatformSecret, ReportKey, RootOfTrust, SimulatedEnclave,
    KEY_LEN,
};

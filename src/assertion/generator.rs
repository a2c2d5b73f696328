//! Local Assertion Generator - proves the executing identity to a peer
//!
//! The assertion carries the generator's identity, a hash of the user data
//! and a tag keyed with the platform report key. Only code on the same
//! platform can derive that key, so only it can check the tag.

use super::binding::{bind_user_data, compute_tag};
use super::config::LocalAuthorityConfig;
use super::messages::{
    Assertion, AssertionOffer, AssertionRequest, AuthorityInfo, AuthorityType,
    LocalAssertionPayload,
};
use super::AssertionGenerator;
use crate::error::{AttestationError, AttestationResult};
use crate::identity::RootOfTrust;
use std::sync::{Arc, OnceLock};

/// Generator side of the local assertion scheme
pub struct LocalAssertionGenerator {
    root: Arc<dyn RootOfTrust>,
    config: OnceLock<LocalAuthorityConfig>,
}

impl LocalAssertionGenerator {
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

impl AssertionGenerator for LocalAssertionGenerator {
    fn initialize(&self, config: &str) -> AttestationResult<()> {
        let parsed = LocalAuthorityConfig::parse(config)?;
        let domain = parsed.attestation_domain.clone();
        self.config
            .set(parsed)
            .map_err(|_| AttestationError::AlreadyInitialized)?;
        log::info!(
            "Local assertion generator initialized: domain={:?}",
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

    fn create_assertion_offer(&self) -> AttestationResult<AssertionOffer> {
        let config = self.config()?;
        Ok(AssertionOffer::new(AuthorityInfo::SgxLocal {
            attestation_domain: config.attestation_domain.clone(),
        }))
    }

    fn can_generate(&self, request: &AssertionRequest) -> AttestationResult<bool> {
        let config = self.config()?;
        Ok(request.info.matches_local_domain(&config.attestation_domain))
    }

    fn generate(&self, user_data: &[u8], request: &AssertionRequest) -> AttestationResult<Assertion> {
        if !self.can_generate(request)? {
            log::warn!(
                "Rejected assertion request for authority {}",
                request.authority_type()
            );
            return Err(AttestationError::IncompatibleRequest);
        }

        let identity = self.root.current_identity()?;
        let key = self.root.derive_report_key()?;

        let binding = bind_user_data(user_data);
        let tag = compute_tag(&key, &identity, &binding);
        let payload = LocalAssertionPayload {
            identity,
            binding,
            tag,
        };

        log::debug!("Generated local assertion for {}", payload.identity.short_id());
        Ok(Assertion::new(AuthorityType::SgxLocal, payload.encode()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::messages::AttestationDomain;
    use crate::identity::{IdentityModel, IdentityRegister};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn local_request(domain: &str) -> AssertionRequest {
        AssertionRequest::new(AuthorityInfo::SgxLocal {
            attestation_domain: AttestationDomain::new(domain).unwrap(),
        })
    }

    fn initialized(register: &Arc<IdentityRegister>) -> LocalAssertionGenerator {
        let generator = LocalAssertionGenerator::new(register.clone());
        generator.initialize("").unwrap();
        generator
    }

    #[test]
    fn test_uninitialized_operations_fail() {
        init_logging();
        let generator = LocalAssertionGenerator::new(Arc::new(IdentityRegister::new()));
        let request = local_request("A 16-byte string");

        assert!(!generator.is_initialized());
        assert!(matches!(
            generator.create_assertion_offer(),
            Err(AttestationError::NotInitialized)
        ));
        assert!(matches!(
            generator.can_generate(&request),
            Err(AttestationError::NotInitialized)
        ));
        assert!(matches!(
            generator.generate(b"data", &request),
            Err(AttestationError::NotInitialized)
        ));
    }

    #[test]
    fn test_initialize_once() {
        let generator = LocalAssertionGenerator::new(Arc::new(IdentityRegister::new()));
        generator.initialize("{}").unwrap();
        assert!(generator.is_initialized());
        assert!(matches!(
            generator.initialize("{}"),
            Err(AttestationError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_invalid_config_leaves_uninitialized() {
        let generator = LocalAssertionGenerator::new(Arc::new(IdentityRegister::new()));
        assert!(matches!(
            generator.initialize("{"),
            Err(AttestationError::InvalidConfig(_))
        ));
        assert!(!generator.is_initialized());
        generator.initialize("").unwrap();
    }

    #[test]
    fn test_offer_carries_only_scheme() {
        let register = Arc::new(IdentityRegister::new());
        let enclave = register.set_random_identity();
        enclave.enter().unwrap();

        let generator = initialized(&register);
        let offer = generator.create_assertion_offer().unwrap();
        assert_eq!(offer.authority_type(), AuthorityType::SgxLocal);

        let json = serde_json::to_string(&offer).unwrap();
        assert!(!json.contains(&hex::encode(enclave.identity().measurement())));
        register.exit();
    }

    #[test]
    fn test_can_generate() {
        let register = Arc::new(IdentityRegister::new());
        let generator = initialized(&register);

        assert!(generator.can_generate(&local_request("A 16-byte string")).unwrap());
        assert!(!generator.can_generate(&local_request("another domain..")).unwrap());
        assert!(!generator
            .can_generate(&AssertionRequest::new(AuthorityInfo::Null))
            .unwrap());
    }

    #[test]
    fn test_can_generate_ignores_current_identity() {
        let register = Arc::new(IdentityRegister::new());
        let generator = initialized(&register);
        assert!(!register.is_inside());
        assert!(generator.can_generate(&local_request("A 16-byte string")).unwrap());
    }

    #[test]
    fn test_configured_domain() {
        let register = Arc::new(IdentityRegister::new());
        let generator = LocalAssertionGenerator::new(register);
        generator
            .initialize(r#"{"attestation_domain":"0123456789abcdef"}"#)
            .unwrap();

        assert!(generator.can_generate(&local_request("0123456789abcdef")).unwrap());
        assert!(!generator.can_generate(&local_request("A 16-byte string")).unwrap());
    }

    #[test]
    fn test_generate_incompatible_request() {
        let register = Arc::new(IdentityRegister::new());
        register.enter(IdentityModel::random()).unwrap();
        let generator = initialized(&register);

        let result = generator.generate(b"data", &AssertionRequest::new(AuthorityInfo::Null));
        assert!(matches!(result, Err(AttestationError::IncompatibleRequest)));
    }

    #[test]
    fn test_generate_outside_enclave() {
        let register = Arc::new(IdentityRegister::new());
        let generator = initialized(&register);

        let result = generator.generate(b"data", &local_request("A 16-byte string"));
        assert!(matches!(result, Err(AttestationError::NotInEnclave)));
    }

    #[test]
    fn test_generate_payload() {
        init_logging();
        let register = Arc::new(IdentityRegister::new());
        let enclave = register.set_random_identity();
        let _guard = enclave.enter_scoped().unwrap();
        let generator = initialized(&register);

        let assertion = generator
            .generate(b"User data", &local_request("A 16-byte string"))
            .unwrap();
        assert_eq!(assertion.authority_type, AuthorityType::SgxLocal);

        let payload = LocalAssertionPayload::decode(&assertion.payload).unwrap();
        assert_eq!(&payload.identity, enclave.identity());
        assert_eq!(payload.binding, bind_user_data(b"User data"));

        let key = register.derive_report_key().unwrap();
        assert_eq!(
            payload.tag,
            compute_tag(&key, enclave.identity(), &payload.binding)
        );
    }
}

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::{
    crypto::{
        es256kr::Es256kR,
        keys::{KeyReference, PrivateKey},
        signature::Signature,
    },
    error::{AuthError, Result},
};

/// A JWS signing algorithm the token engine can dispatch to
///
/// Implementations are stateless and shared across threads.
pub trait SigningMethod: Send + Sync {
    /// Value of the `alg` header this method handles
    fn alg(&self) -> &'static str;

    fn sign(&self, message: &[u8], key: &PrivateKey) -> Result<Signature>;

    fn verify(&self, message: &[u8], signature: &[u8], key: &KeyReference) -> Result<()>;
}

static ES256K_R_METHOD: Es256kR = Es256kR;

static REGISTRY: OnceLock<AlgorithmRegistry> = OnceLock::new();

/// Read-only table from `alg` identifier to signing method
pub struct AlgorithmRegistry {
    methods: HashMap<&'static str, &'static dyn SigningMethod>,
}

impl AlgorithmRegistry {
    fn with_builtin_methods() -> Self {
        let builtin: [&'static dyn SigningMethod; 1] = [&ES256K_R_METHOD];
        let methods = builtin
            .into_iter()
            .map(|method| (method.alg(), method))
            .collect::<HashMap<_, _>>();
        tracing::debug!(algorithms = ?methods.keys().collect::<Vec<_>>(), "signing method registry initialized");
        Self { methods }
    }

    pub fn get(&self, alg: &str) -> Option<&'static dyn SigningMethod> {
        self.methods.get(alg).copied()
    }

    /// Registered identifiers, sorted
    pub fn algorithms(&self) -> Vec<&'static str> {
        let mut algs = self.methods.keys().copied().collect::<Vec<_>>();
        algs.sort_unstable();
        algs
    }
}

/// Initialize the process-wide registry
///
/// Populates the table on the first call; every later call, from any
/// thread, returns the same instance.
pub fn init() -> &'static AlgorithmRegistry {
    REGISTRY.get_or_init(AlgorithmRegistry::with_builtin_methods)
}

/// Look up a signing method by its `alg` identifier
///
/// # Example
/// ```rust
/// use filjwt::crypto::registry::lookup;
///
/// let method = lookup("ES256K-R").unwrap();
/// assert_eq!(method.alg(), "ES256K-R");
/// assert!(lookup("HS256").is_err());
/// ```
pub fn lookup(alg: &str) -> Result<&'static dyn SigningMethod> {
    init()
        .get(alg)
        .ok_or_else(|| AuthError::UnsupportedAlgorithm(alg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::es256kr::ES256K_R;

    #[test]
    fn test_registry_contains_es256kr() {
        assert_eq!(init().algorithms(), vec![ES256K_R]);
        assert_eq!(lookup(ES256K_R).unwrap().alg(), ES256K_R);
    }

    #[test]
    fn test_unknown_algorithm() {
        for alg in ["ES256K", "es256k-r", "none", ""] {
            assert!(matches!(lookup(alg), Err(AuthError::UnsupportedAlgorithm(a)) if a == alg));
        }
    }

    #[test]
    fn test_init_returns_same_instance() {
        let handles = (0..4)
            .map(|_| std::thread::spawn(|| init() as *const AlgorithmRegistry as usize))
            .collect::<Vec<_>>();
        let first = init() as *const AlgorithmRegistry as usize;
        for handle in handles {
            assert_eq!(handle.join().unwrap(), first);
        }
    }

    #[test]
    fn test_dispatch_signs_and_verifies() {
        let key = PrivateKey::random();
        let method = lookup(ES256K_R).unwrap();
        let sig = method.sign(b"dispatch", &key).unwrap();
        assert!(method
            .verify(b"dispatch", sig.as_bytes(), &key.public_key().into())
            .is_ok());
    }
}

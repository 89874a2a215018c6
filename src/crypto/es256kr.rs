use k256::ecdsa::{RecoveryId, Signature as K256Signature, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::{
    address::{Address, Protocol},
    crypto::{
        keys::{KeyReference, PrivateKey, PublicKey},
        registry::SigningMethod,
        signature::{self, Signature, COMPACT_RECOVERY_BASE, SIGNATURE_LEN},
    },
    error::{AuthError, Result},
};

/// JWS algorithm identifier of this scheme
pub const ES256K_R: &str = "ES256K-R";

/// ES256K-R: deterministic (RFC 6979) secp256k1 ECDSA over SHA-256, with a
/// trailing recovery byte so the verifier only needs the signer's address
#[derive(Clone, Copy, Debug, Default)]
pub struct Es256kR;

impl SigningMethod for Es256kR {
    fn alg(&self) -> &'static str {
        ES256K_R
    }

    fn sign(&self, message: &[u8], key: &PrivateKey) -> Result<Signature> {
        sign(message, key)
    }

    fn verify(&self, message: &[u8], signature: &[u8], key: &KeyReference) -> Result<()> {
        verify(message, signature, key)
    }
}

/// Sign a message, producing a 65-byte `R || S || V` signature
///
/// The same message and key always produce the same signature.
///
/// # Example
/// ```rust
/// use filjwt::crypto::{es256kr::{sign, verify}, keys::PrivateKey};
///
/// let key = PrivateKey::random();
/// let signature = sign(b"hello", &key).unwrap();
/// assert_eq!(signature.as_bytes().len(), 65);
///
/// let addr = key.address().unwrap();
/// assert!(verify(b"hello", signature.as_bytes(), &addr.into()).is_ok());
/// ```
pub fn sign(message: &[u8], key: &PrivateKey) -> Result<Signature> {
    let hash = Sha256::digest(message);
    let (sig, recovery_id) = key
        .signing_key()
        .sign_prehash_recoverable(&hash)
        .map_err(|e| AuthError::CryptoError(format!("Failed to sign: {}", e)))?;

    let mut compact = [0u8; SIGNATURE_LEN];
    compact[0] = COMPACT_RECOVERY_BASE + recovery_id.to_byte();
    compact[1..].copy_from_slice(&sig.to_bytes());
    signature::to_wire(&compact)
}

/// Verify that `signature` over `message` recovers to the referenced address
///
/// # Arguments
/// * `message` - signed bytes
/// * `signature` - 65-byte `R || S || V` signature
/// * `key` - public key, address, or address string of the expected signer
///
/// # Returns
/// * `Ok(())` if the recovered address payload equals the referenced one
/// * `Err(AuthError::InvalidKeyType)` if the reference is not a SECP256K1 address
/// * `Err(AuthError::InvalidSignatureLength)` if the signature is not 65 bytes
/// * `Err(AuthError::EcdsaVerificationFailed)` on recovery failure or mismatch
pub fn verify(message: &[u8], signature: &[u8], key: &KeyReference) -> Result<()> {
    let expected = resolve_address(key)?;

    if signature.len() != SIGNATURE_LEN {
        return Err(AuthError::InvalidSignatureLength {
            len: signature.len(),
        });
    }

    let hash = Sha256::digest(message);
    let compact = signature::to_compact(signature)?;
    let recovered = recover_compact(&compact, &hash)?;

    let recovered_addr = recovered
        .address()
        .map_err(|_| AuthError::EcdsaVerificationFailed)?;
    if recovered_addr.payload() != expected.payload() {
        return Err(AuthError::EcdsaVerificationFailed);
    }
    Ok(())
}

/// Normalize a key reference to a SECP256K1 address
fn resolve_address(key: &KeyReference) -> Result<Address> {
    let addr = match key {
        KeyReference::PublicKey(public_key) => public_key
            .address()
            .map_err(|_| AuthError::InvalidKeyType)?,
        KeyReference::Address(addr) => addr.clone(),
        KeyReference::AddressString(s) => s.parse().map_err(|_| AuthError::InvalidKeyType)?,
    };
    if addr.protocol() != Protocol::Secp256k1 {
        return Err(AuthError::InvalidKeyType);
    }
    Ok(addr)
}

/// Recover the signer from `27 + recid || R || S`
fn recover_compact(compact: &[u8; SIGNATURE_LEN], prehash: &[u8]) -> Result<PublicKey> {
    let recovery_id = RecoveryId::from_byte(compact[0].wrapping_sub(COMPACT_RECOVERY_BASE))
        .ok_or(AuthError::EcdsaVerificationFailed)?;
    let sig = K256Signature::from_slice(&compact[1..])
        .map_err(|_| AuthError::EcdsaVerificationFailed)?;

    // k256 only recovers from low-S; (r, n - s) with the flipped recovery id
    // recovers the same key
    let (sig, recovery_id) = match sig.normalize_s() {
        Some(normalized) => (
            normalized,
            RecoveryId::from_byte(recovery_id.to_byte() ^ 1)
                .ok_or(AuthError::EcdsaVerificationFailed)?,
        ),
        None => (sig, recovery_id),
    };
    let recovered = VerifyingKey::recover_from_prehash(prehash, &sig, recovery_id)
        .map_err(|_| AuthError::EcdsaVerificationFailed)?;
    Ok(recovered.into())
}
